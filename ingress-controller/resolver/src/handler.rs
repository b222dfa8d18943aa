use crate::{ImpactResolver, Outcome};
use alb_ingress_controller_core::{
    ClusterReader, Dispatch, IngressConfigs, NodeEvent, ProxyEligibility,
};
use tracing::{debug, instrument, trace};

/// Requests reconciliation of impacted ingresses when a node's traffic proxy eligibility
/// changes.
#[derive(Debug)]
pub struct NodeHandler<E, R, C, D> {
    eligibility: E,
    resolver: ImpactResolver<R, C, D>,
}

// === impl NodeHandler ===

impl<E, R, C, D> NodeHandler<E, R, C, D>
where
    R: ClusterReader,
    C: IngressConfigs,
    D: Dispatch,
{
    pub fn new(eligibility: E, resolver: ImpactResolver<R, C, D>) -> Self {
        Self {
            eligibility,
            resolver,
        }
    }

    #[instrument(skip_all, fields(kind = event.kind()))]
    pub async fn handle<N>(&self, event: NodeEvent<N>) -> Outcome
    where
        E: ProxyEligibility<N>,
        N: Send + Sync,
    {
        let relevant = match &event {
            NodeEvent::Created(node) | NodeEvent::Deleted(node) => {
                self.eligibility.is_eligible_proxy(node)
            }
            NodeEvent::Updated { old, new } => {
                self.eligibility.is_eligible_proxy(old) != self.eligibility.is_eligible_proxy(new)
            }
            NodeEvent::Generic => false,
        };
        self.resolver.metrics().observe(&event, relevant);

        if !relevant {
            trace!("Node eligibility unaffected");
            return Outcome::Irrelevant;
        }
        debug!("Node eligibility changed");
        self.resolver.resolve().await
    }

    /// Handles a node that was added to the cluster.
    pub async fn create<N>(&self, node: N) -> Outcome
    where
        E: ProxyEligibility<N>,
        N: Send + Sync,
    {
        self.handle(NodeEvent::Created(node)).await
    }

    /// Handles a node that was removed from the cluster.
    pub async fn delete<N>(&self, node: N) -> Outcome
    where
        E: ProxyEligibility<N>,
        N: Send + Sync,
    {
        self.handle(NodeEvent::Deleted(node)).await
    }

    /// Handles a change to a node. Only changes in eligibility are acted upon.
    pub async fn update<N>(&self, old: N, new: N) -> Outcome
    where
        E: ProxyEligibility<N>,
        N: Send + Sync,
    {
        self.handle(NodeEvent::Updated { old, new }).await
    }

    /// Unrecognized events never imply an eligibility change.
    pub fn generic(&self) -> Outcome {
        self.resolver
            .metrics()
            .observe(&NodeEvent::<()>::Generic, false);
        Outcome::Irrelevant
    }
}
