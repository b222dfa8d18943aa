use crate::metrics::{Lookup, ResolverMetrics};
use alb_ingress_controller_core::{
    target::{self, Target},
    ClusterReader, Dispatch, IngressClass, IngressConfigs, IngressKey, ServiceType,
};
use alb_ingress_controller_k8s_api as k8s;
use futures::{future, prelude::*};
use std::num::NonZeroUsize;
use tracing::{debug, error, instrument, trace, warn};

/// Submits a reconciliation request for every owned ingress whose load balancer targets depend
/// on node membership.
///
/// The resolver holds no state between invocations and may be shared by concurrent callers.
#[derive(Debug)]
pub struct ImpactResolver<R, C, D> {
    class: IngressClass,
    reader: R,
    configs: C,
    dispatch: D,

    /// Bounds the number of ingresses evaluated concurrently.
    workers: NonZeroUsize,

    metrics: ResolverMetrics,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The event did not change any node's eligibility; nothing was read or dispatched.
    Irrelevant,

    /// Ingresses could not be listed; nothing was dispatched.
    Aborted,

    Resolved { impacted: usize },
}

// === impl ImpactResolver ===

impl<R, C, D> ImpactResolver<R, C, D>
where
    R: ClusterReader,
    C: IngressConfigs,
    D: Dispatch,
{
    pub fn new(
        class: IngressClass,
        reader: R,
        configs: C,
        dispatch: D,
        workers: NonZeroUsize,
        metrics: ResolverMetrics,
    ) -> Self {
        Self {
            class,
            reader,
            configs,
            dispatch,
            workers,
            metrics,
        }
    }

    pub(crate) fn metrics(&self) -> &ResolverMetrics {
        &self.metrics
    }

    /// Lists all ingresses and dispatches those impacted by a node eligibility change.
    ///
    /// Failing to list ingresses aborts the pass. Failures to read a single ingress's
    /// configuration or a single backend service only exclude that ingress or backend.
    #[instrument(skip_all, fields(class = %self.class))]
    pub async fn resolve(&self) -> Outcome {
        let ingresses = match self.reader.list_ingresses().await {
            Ok(ingresses) => ingresses,
            Err(error) => {
                error!(%error, "Failed to list ingresses");
                self.metrics.lookup_failed(Lookup::IngressList);
                return Outcome::Aborted;
            }
        };
        trace!(ingresses = ingresses.len(), "Resolving impacted ingresses");

        let impacted = stream::iter(ingresses)
            .filter(|ingress| future::ready(self.class.owns(ingress)))
            .map(|ingress| self.impacted(ingress))
            .buffer_unordered(self.workers.get())
            .filter_map(future::ready)
            .fold(0, |impacted, key| {
                debug!(%key, "Requesting reconciliation");
                self.dispatch.submit(key);
                future::ready(impacted + 1)
            })
            .await;

        self.metrics.impacted(impacted);
        Outcome::Resolved { impacted }
    }

    /// Returns the ingress's key if its targets depend on node membership.
    async fn impacted(&self, ingress: k8s::Ingress) -> Option<IngressKey> {
        let Some(key) = IngressKey::from_resource(&ingress) else {
            warn!(name = ?ingress.metadata.name, "Ignoring ingress without a namespace");
            return None;
        };

        let services = match target::classify(&self.configs, &key, &ingress).await {
            Ok(Target::Instance) => return Some(key),
            Ok(Target::Ip(services)) => services,
            Err(error) => {
                warn!(%key, %error, "Failed to read ingress configuration");
                self.metrics.lookup_failed(Lookup::IngressConfig);
                return None;
            }
        };

        for service in services {
            let svc = match self.reader.get_service(&service).await {
                Ok(svc) => svc,
                Err(error) => {
                    warn!(%key, %service, %error, "Failed to fetch backend service");
                    self.metrics.lookup_failed(Lookup::Service);
                    continue;
                }
            };
            match ServiceType::of(&svc) {
                Ok(ty) if ty.is_node_port() => {
                    trace!(%key, %service, "Backed by a node port service");
                    return Some(key);
                }
                Ok(ty) => trace!(%key, %service, %ty, "Backend does not depend on nodes"),
                Err(error) => {
                    warn!(%key, %service, %error, "Invalid backend service");
                    self.metrics.lookup_failed(Lookup::Service);
                }
            }
        }

        None
    }
}
