use crate::ProxyEligibility;
use alb_ingress_controller_k8s_api::{self as k8s, labels};

/// A change to a node, as observed by the node watch.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeEvent<N = k8s::Node> {
    Created(N),
    Deleted(N),
    Updated { old: N, new: N },

    /// An event of an unknown kind. Never implies an eligibility change.
    Generic,
}

/// Nodes are usable as traffic proxies when they are `Ready` and not excluded from load
/// balancers by a well-known label.
#[derive(Copy, Clone, Debug, Default)]
pub struct TrafficProxyEligibility;

// === impl NodeEvent ===

impl<N> NodeEvent<N> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Deleted(_) => "deleted",
            Self::Updated { .. } => "updated",
            Self::Generic => "generic",
        }
    }
}

// === impl TrafficProxyEligibility ===

impl ProxyEligibility<k8s::Node> for TrafficProxyEligibility {
    fn is_eligible_proxy(&self, node: &k8s::Node) -> bool {
        if let Some(node_labels) = node.metadata.labels.as_ref() {
            if labels::EXCLUDED_NODE_LABELS
                .iter()
                .any(|label| node_labels.contains_key(*label))
            {
                return false;
            }
        }

        node.status
            .as_ref()
            .and_then(|status| status.conditions.as_ref())
            .and_then(|conditions| conditions.iter().find(|c| c.type_ == "Ready"))
            .map(|ready| ready.status == "True")
            .unwrap_or(false)
    }
}
