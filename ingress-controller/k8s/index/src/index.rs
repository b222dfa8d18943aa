use ahash::AHashMap as HashMap;
use alb_ingress_controller_core::{
    target::InvalidTargetMode, ClusterReader, IngressConfigs, IngressKey, ResourceId, ServiceRef,
    TargetMode,
};
use alb_ingress_controller_k8s_api::{self as k8s, ResourceExt};
use kubert::index::{IndexNamespacedResource, NamespacedRemoved};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub type SharedIndex = Arc<RwLock<Index>>;

/// Caches ingresses and services for node-event handling.
#[derive(Debug)]
pub struct Index {
    /// Applies to ingresses that do not annotate a target type.
    default_target_mode: TargetMode,

    ingresses: HashMap<IngressKey, k8s::Ingress>,
    services: HashMap<ServiceRef, k8s::Service>,

    /// Set once the initial ingress list has been observed. Until then, a listing would be
    /// incomplete.
    ingresses_synced: bool,
}

/// Serves cluster reads against a shared index.
#[derive(Clone, Debug)]
pub struct Reader(SharedIndex);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ingresses have not been synced")]
    NotSynced,

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: ResourceId },

    #[error("ingress {id} has an invalid target type")]
    InvalidTargetType {
        id: IngressKey,
        #[source]
        source: InvalidTargetMode,
    },
}

// === impl Index ===

impl Index {
    pub fn new(default_target_mode: TargetMode) -> Self {
        Self {
            default_target_mode,
            ingresses: HashMap::default(),
            services: HashMap::default(),
            ingresses_synced: false,
        }
    }

    pub fn shared(default_target_mode: TargetMode) -> SharedIndex {
        Arc::new(RwLock::new(Self::new(default_target_mode)))
    }

    pub fn list_ingresses(&self) -> Result<Vec<k8s::Ingress>, Error> {
        if !self.ingresses_synced {
            return Err(Error::NotSynced);
        }
        Ok(self.ingresses.values().cloned().collect())
    }

    pub fn get_service(&self, id: &ServiceRef) -> Result<k8s::Service, Error> {
        self.services
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                kind: "service",
                id: id.clone(),
            })
    }

    pub fn target_mode(&self, id: &IngressKey) -> Result<TargetMode, Error> {
        let ingress = self.ingresses.get(id).ok_or_else(|| Error::NotFound {
            kind: "ingress",
            id: id.clone(),
        })?;
        let mode = TargetMode::from_annotations(ingress).map_err(|source| {
            Error::InvalidTargetType {
                id: id.clone(),
                source,
            }
        })?;
        Ok(mode.unwrap_or(self.default_target_mode))
    }

    pub(crate) fn ingresses_len(&self) -> usize {
        self.ingresses.len()
    }

    pub(crate) fn services_len(&self) -> usize {
        self.services.len()
    }
}

impl IndexNamespacedResource<k8s::Ingress> for Index {
    fn apply(&mut self, ingress: k8s::Ingress) {
        let Some(id) = ResourceId::from_resource(&ingress) else {
            warn!(name = ?ingress.metadata.name, "Ignoring ingress without a namespace");
            return;
        };
        trace!(%id, "Applying ingress");
        self.ingresses.insert(id, ingress);
    }

    fn delete(&mut self, namespace: String, name: String) {
        let id = ResourceId::new(namespace, name);
        if self.ingresses.remove(&id).is_some() {
            debug!(%id, "Deleted ingress");
        }
    }

    fn reset(&mut self, ingresses: Vec<k8s::Ingress>, removed: NamespacedRemoved) {
        for ingress in ingresses {
            <Self as IndexNamespacedResource<k8s::Ingress>>::apply(self, ingress);
        }
        for (namespace, names) in removed {
            for name in names {
                <Self as IndexNamespacedResource<k8s::Ingress>>::delete(
                    self,
                    namespace.clone(),
                    name,
                );
            }
        }

        if !self.ingresses_synced {
            debug!(ingresses = self.ingresses.len(), "Ingresses synced");
            self.ingresses_synced = true;
        }
    }
}

impl IndexNamespacedResource<k8s::Service> for Index {
    fn apply(&mut self, service: k8s::Service) {
        let Some(id) = ResourceId::from_resource(&service) else {
            warn!(name = ?service.name_any(), "Ignoring service without a namespace");
            return;
        };
        trace!(%id, "Applying service");
        self.services.insert(id, service);
    }

    fn delete(&mut self, namespace: String, name: String) {
        let id = ResourceId::new(namespace, name);
        if self.services.remove(&id).is_some() {
            debug!(%id, "Deleted service");
        }
    }

    // Since apply only reindexes a single Service at a time, there's no need
    // to handle resets specially.
}

// === impl Reader ===

impl Reader {
    pub fn new(index: SharedIndex) -> Self {
        Self(index)
    }
}

#[async_trait::async_trait]
impl ClusterReader for Reader {
    async fn list_ingresses(&self) -> anyhow::Result<Vec<k8s::Ingress>> {
        let ingresses = self.0.read().list_ingresses()?;
        Ok(ingresses)
    }

    async fn get_service(&self, service: &ServiceRef) -> anyhow::Result<k8s::Service> {
        let service = self.0.read().get_service(service)?;
        Ok(service)
    }
}

#[async_trait::async_trait]
impl IngressConfigs for Reader {
    async fn target_mode(&self, ingress: &IngressKey) -> anyhow::Result<TargetMode> {
        let mode = self.0.read().target_mode(ingress)?;
        Ok(mode)
    }
}
