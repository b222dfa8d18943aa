#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Domain types shared by the ingress controller's node-event handling.
//!
//! When a node starts or stops being usable as a traffic proxy, load balancer targets that are
//! bound to node identity must be re-registered. This crate models the pieces needed to decide
//! which ingresses are affected:
//!
//! - [`ProxyEligibility`] decides whether a node may receive load balancer traffic.
//! - [`IngressClass`] decides whether an ingress belongs to this controller.
//! - [`target::classify`] determines an ingress's [`TargetMode`] and, in IP mode, its backend
//!   services.
//! - [`ClusterReader`] and [`IngressConfigs`] read cached cluster state.
//! - [`Dispatch`] accepts reconciliation requests.

pub mod class;
pub mod node;
pub mod service;
pub mod target;


pub use self::{
    class::IngressClass,
    node::{NodeEvent, TrafficProxyEligibility},
    service::ServiceType,
    target::{Target, TargetMode},
};
use alb_ingress_controller_k8s_api::{self as k8s, ResourceExt};
use anyhow::Result;

/// Identifies a namespaced resource.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResourceId {
    pub namespace: String,
    pub name: String,
}

/// The `namespace/name` key used to address reconciliation requests.
pub type IngressKey = ResourceId;

/// Names a backend service in an ingress's namespace.
pub type ServiceRef = ResourceId;

/// Read-only access to cached ingresses and services.
#[async_trait::async_trait]
pub trait ClusterReader: Send + Sync {
    async fn list_ingresses(&self) -> Result<Vec<k8s::Ingress>>;

    async fn get_service(&self, service: &ServiceRef) -> Result<k8s::Service>;
}

/// Looks up the persisted configuration of an ingress.
#[async_trait::async_trait]
pub trait IngressConfigs: Send + Sync {
    async fn target_mode(&self, ingress: &IngressKey) -> Result<TargetMode>;
}

/// Decides whether a node snapshot is usable as a traffic proxy.
pub trait ProxyEligibility<N>: Send + Sync {
    fn is_eligible_proxy(&self, node: &N) -> bool;
}

/// Accepts reconciliation requests.
///
/// Implementations must tolerate concurrent submissions and collapse duplicate pending keys.
pub trait Dispatch: Send + Sync {
    fn submit(&self, ingress: IngressKey);
}

// === impl ResourceId ===

impl ResourceId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Builds an identifier from a resource's metadata, if it is namespaced and named.
    pub fn from_resource<R: ResourceExt>(resource: &R) -> Option<Self> {
        let namespace = resource.namespace()?;
        let name = resource.meta().name.clone()?;
        Some(Self { namespace, name })
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl std::str::FromStr for ResourceId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(ns, name))
            }
            _ => anyhow::bail!("invalid resource key {s:?}; expected namespace/name"),
        }
    }
}

// === impl Dispatch ===

impl<D: Dispatch + ?Sized> Dispatch for std::sync::Arc<D> {
    fn submit(&self, ingress: IngressKey) {
        (**self).submit(ingress)
    }
}
