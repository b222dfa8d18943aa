//! Node watch events -> `NodeEvent`

use ahash::AHashMap as HashMap;
use alb_ingress_controller_core::NodeEvent;
use alb_ingress_controller_k8s_api::{self as k8s, ResourceExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

pub type SharedNodeIndex = Arc<RwLock<NodeIndex>>;

/// Tracks the last observed state of each node so that watch updates can be published with both
/// the prior and current snapshot.
#[derive(Debug)]
pub struct NodeIndex {
    nodes: HashMap<String, k8s::Node>,
    events: mpsc::UnboundedSender<NodeEvent>,
}

// === impl NodeIndex ===

impl NodeIndex {
    pub fn shared(events: mpsc::UnboundedSender<NodeEvent>) -> SharedNodeIndex {
        Arc::new(RwLock::new(Self {
            nodes: HashMap::default(),
            events,
        }))
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    fn publish(&self, event: NodeEvent) {
        if self.events.send(event).is_err() {
            warn!("Node event receiver dropped");
        }
    }
}

impl kubert::index::IndexClusterResource<k8s::Node> for NodeIndex {
    fn apply(&mut self, node: k8s::Node) {
        let name = node.name_unchecked();
        let event = match self.nodes.insert(name.clone(), node.clone()) {
            None => {
                debug!(%name, "Node created");
                NodeEvent::Created(node)
            }
            Some(old) if old == node => {
                trace!(%name, "Node unchanged");
                return;
            }
            Some(old) => {
                trace!(%name, "Node updated");
                NodeEvent::Updated { old, new: node }
            }
        };
        self.publish(event);
    }

    fn delete(&mut self, name: String) {
        match self.nodes.remove(&name) {
            Some(node) => {
                debug!(%name, "Node deleted");
                self.publish(NodeEvent::Deleted(node));
            }
            None => debug!(%name, "Ignoring deletion of unknown node"),
        }
    }

    // Resets apply each live node and delete the rest, which yields the same events as
    // individual updates.
}
