//! ALB ingress controller cluster cache
//!
//! Node-event handling needs cheap, consistent reads of cluster state. This crate maintains
//! in-memory indexes fed by Kubernetes watches:
//!
//! - [`Index`] holds every `Ingress` and `Service`, keyed by namespace and name. It answers the
//!   [`ClusterReader`] and [`IngressConfigs`] lookups used to resolve impacted ingresses. An
//!   ingress's target mode is read from its `alb.ingress.kubernetes.io/target-type` annotation,
//!   falling back to the controller-wide default.
//! - [`NodeIndex`] remembers the last observed snapshot of each `Node` so that watch updates can
//!   be decoded into [`NodeEvent`]s carrying both the old and new state.
//!
//! ```text
//! [ Node ] -> NodeIndex -> NodeEvent -> handler -> Reader -> [ Ingress ] -> [ Service ]
//! ```
//!
//! [`ClusterReader`]: alb_ingress_controller_core::ClusterReader
//! [`IngressConfigs`]: alb_ingress_controller_core::IngressConfigs
//! [`NodeEvent`]: alb_ingress_controller_core::NodeEvent

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod index;
pub mod metrics;
mod node;

#[cfg(test)]
mod tests;

pub use self::{
    index::{Error, Index, Reader, SharedIndex},
    node::{NodeIndex, SharedNodeIndex},
};
