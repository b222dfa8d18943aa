use alb_ingress_controller_core::NodeEvent;
use prometheus_client::{
    encoding::{EncodeLabelSet, EncodeLabelValue},
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug, Default)]
pub struct ResolverMetrics {
    node_events: Family<EventLabels, Counter>,
    relevant_node_events: Family<EventLabels, Counter>,
    impacted_ingresses: Counter,
    lookup_failures: Family<LookupLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct EventLabels {
    kind: EventKind,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
enum EventKind {
    Created,
    Deleted,
    Updated,
    Generic,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct LookupLabels {
    lookup: Lookup,
}

/// The cluster read that failed.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Lookup {
    IngressList,
    IngressConfig,
    Service,
}

// === impl ResolverMetrics ===

impl ResolverMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let metrics = Self::default();
        prom.register(
            "node_events",
            "Count of node events observed",
            metrics.node_events.clone(),
        );
        prom.register(
            "relevant_node_events",
            "Count of node events that changed a node's traffic proxy eligibility",
            metrics.relevant_node_events.clone(),
        );
        prom.register(
            "impacted_ingresses",
            "Count of ingresses submitted for reconciliation after a node change",
            metrics.impacted_ingresses.clone(),
        );
        prom.register(
            "lookup_failures",
            "Count of failed cluster reads while resolving impacted ingresses",
            metrics.lookup_failures.clone(),
        );
        metrics
    }

    pub(crate) fn observe<N>(&self, event: &NodeEvent<N>, relevant: bool) {
        let labels = EventLabels {
            kind: EventKind::from(event),
        };
        self.node_events.get_or_create(&labels).inc();
        if relevant {
            self.relevant_node_events.get_or_create(&labels).inc();
        }
    }

    pub(crate) fn impacted(&self, ingresses: usize) {
        self.impacted_ingresses.inc_by(ingresses as u64);
    }

    pub(crate) fn lookup_failed(&self, lookup: Lookup) {
        self.lookup_failures
            .get_or_create(&LookupLabels { lookup })
            .inc();
    }

    #[cfg(test)]
    pub(crate) fn lookup_failures(&self, lookup: Lookup) -> u64 {
        self.lookup_failures
            .get_or_create(&LookupLabels { lookup })
            .get()
    }

    #[cfg(test)]
    pub(crate) fn impacted_ingresses(&self) -> u64 {
        self.impacted_ingresses.get()
    }
}

impl<N> From<&NodeEvent<N>> for EventKind {
    fn from(event: &NodeEvent<N>) -> Self {
        match event {
            NodeEvent::Created(_) => Self::Created,
            NodeEvent::Deleted(_) => Self::Deleted,
            NodeEvent::Updated { .. } => Self::Updated,
            NodeEvent::Generic => Self::Generic,
        }
    }
}
