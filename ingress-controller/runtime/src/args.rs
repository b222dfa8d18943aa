use crate::{
    core::{IngressClass, NodeEvent, TargetMode, TrafficProxyEligibility},
    index::{self, Index, NodeIndex},
    k8s,
    queue::{self, Requests, WorkQueue},
    resolver::{ImpactResolver, NodeHandler, ResolverMetrics},
};
use anyhow::{bail, Result};
use clap::Parser;
use kube::runtime::watcher;
use prometheus_client::{metrics::counter::Counter, registry::Registry};
use std::num::{NonZeroU64, NonZeroUsize};
use tokio::{sync::mpsc, time::Duration};
use tracing::{info, info_span, Instrument};

type Handler = NodeHandler<TrafficProxyEligibility, index::Reader, index::Reader, WorkQueue>;

#[derive(Debug, Parser)]
#[clap(
    name = "alb-ingress-controller",
    about = "Requests reconciliation of ingresses impacted by node changes"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "alb_ingress_controller=info,warn",
        env = "ALB_INGRESS_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// The ingress class managed by this controller.
    ///
    /// When empty, ingresses without a class and ingresses of the `alb` class are managed.
    #[clap(long, default_value = "")]
    ingress_class: IngressClass,

    /// The target type of ingresses that do not set the target-type annotation.
    #[clap(long, default_value = "instance")]
    default_target_type: TargetMode,

    /// The number of ingresses evaluated concurrently when a node changes.
    #[clap(long, default_value = "8")]
    ingress_workers: NonZeroUsize,

    /// The minimum interval between reconciliation requests.
    #[clap(long, default_value = "100")]
    reconcile_interval_ms: NonZeroU64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            ingress_class,
            default_target_type,
            ingress_workers,
            reconcile_interval_ms,
        } = self;

        let index = Index::shared(default_target_type);
        let (node_events_tx, node_events_rx) = mpsc::unbounded_channel();
        let nodes = NodeIndex::shared(node_events_tx);

        let mut prom = <Registry>::default();
        index::metrics::register(
            prom.sub_registry_with_prefix("index"),
            index.clone(),
            nodes.clone(),
        );
        let resolver_metrics =
            ResolverMetrics::register(prom.sub_registry_with_prefix("node_impact"));
        let requested = Counter::default();
        prom.register(
            "reconciliations_requested",
            "Count of reconciliation requests released from the queue",
            requested.clone(),
        );
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let mut runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        // Spawn resource watches.

        let ingresses = runtime.watch_all::<k8s::Ingress>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), ingresses).instrument(info_span!("ingresses")),
        );

        let services = runtime.watch_all::<k8s::Service>(watcher::Config::default());
        tokio::spawn(
            kubert::index::namespaced(index.clone(), services).instrument(info_span!("services")),
        );

        let node_watch = runtime.watch_all::<k8s::Node>(watcher::Config::default());
        tokio::spawn(kubert::index::cluster(nodes, node_watch).instrument(info_span!("nodes")));

        // Resolve impacted ingresses for each node event and queue them for reconciliation.

        let (queue, requests) = queue::channel(Duration::from_millis(reconcile_interval_ms.get()));
        let reader = index::Reader::new(index);
        let resolver = ImpactResolver::new(
            ingress_class,
            reader.clone(),
            reader,
            queue,
            ingress_workers,
            resolver_metrics,
        );
        let handler = NodeHandler::new(TrafficProxyEligibility, resolver);
        tokio::spawn(
            handle_node_events(handler, node_events_rx).instrument(info_span!("node_events")),
        );
        tokio::spawn(release_requests(requests, requested).instrument(info_span!("reconcile")));

        // Block the main thread on the shutdown signal.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

async fn handle_node_events(handler: Handler, mut events: mpsc::UnboundedReceiver<NodeEvent>) {
    while let Some(event) = events.recv().await {
        handler.handle(event).await;
    }
}

/// Hands queued requests to the reconciler.
async fn release_requests(mut requests: Requests, requested: Counter) {
    while let Some(ingress) = requests.next().await {
        info!(%ingress, "Reconciliation requested");
        requested.inc();
    }
}
