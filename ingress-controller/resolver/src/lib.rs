//! Resolves which ingresses must be reconciled when a node's eligibility as a traffic proxy
//! changes.
//!
//! An ingress in `instance` target mode registers nodes as load balancer targets, so any change
//! in the set of eligible nodes affects it. An ingress in `ip` target mode registers pod IPs and
//! is unaffected by node changes, unless one of its backend services is a `NodePort` service:
//! such a service routes through node identity, so the ingress is affected as well.
//!
//! [`NodeHandler`] gates node events on an eligibility change and [`ImpactResolver`] submits
//! one reconciliation request for each impacted ingress.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod handler;
pub mod metrics;
mod resolver;


pub use self::{
    handler::NodeHandler,
    metrics::ResolverMetrics,
    resolver::{ImpactResolver, Outcome},
};
