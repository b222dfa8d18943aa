use crate::{SharedIndex, SharedNodeIndex};
use prometheus_client::{
    collector::Collector,
    encoding::{DescriptorEncoder, EncodeMetric},
    metrics::{gauge::ConstGauge, MetricType},
    registry::Registry,
};

#[derive(Debug)]
struct Instrumented {
    index: SharedIndex,
    nodes: SharedNodeIndex,
}

pub fn register(reg: &mut Registry, index: SharedIndex, nodes: SharedNodeIndex) {
    reg.register_collector(Box::new(Instrumented { index, nodes }));
}

impl Collector for Instrumented {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), std::fmt::Error> {
        let (ingresses, services) = {
            let index = self.index.read();
            (index.ingresses_len(), index.services_len())
        };
        let nodes = self.nodes.read().len();

        let ingress_encoder = encoder.encode_descriptor(
            "ingress_index_size",
            "The number of entries in the ingress index",
            None,
            MetricType::Gauge,
        )?;
        ConstGauge::new(ingresses as u32).encode(ingress_encoder)?;

        let service_encoder = encoder.encode_descriptor(
            "service_index_size",
            "The number of entries in the service index",
            None,
            MetricType::Gauge,
        )?;
        ConstGauge::new(services as u32).encode(service_encoder)?;

        let node_encoder = encoder.encode_descriptor(
            "node_index_size",
            "The number of entries in the node index",
            None,
            MetricType::Gauge,
        )?;
        ConstGauge::new(nodes as u32).encode(node_encoder)?;

        Ok(())
    }
}
