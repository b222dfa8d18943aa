use crate::{Error, Index, NodeIndex, Reader};
use alb_ingress_controller_core::{
    ClusterReader, IngressConfigs, NodeEvent, ResourceId, ServiceType, TargetMode,
};
use alb_ingress_controller_k8s_api::{self as k8s, annotations, ObjectMeta};
use kubert::index::{IndexClusterResource, IndexNamespacedResource};
use maplit::*;
use tokio::sync::mpsc;

fn mk_ingress(ns: &str, name: &str, target_type: Option<&str>) -> k8s::Ingress {
    k8s::Ingress {
        metadata: ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            annotations: target_type
                .map(|tt| convert_args!(btreemap!(annotations::TARGET_TYPE => tt))),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn mk_service(ns: &str, name: &str, ty: &str) -> k8s::Service {
    k8s::Service {
        metadata: ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        },
        spec: Some(k8s::ServiceSpec {
            type_: Some(ty.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn mk_node(name: &str, ready: &str) -> k8s::Node {
    k8s::Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        status: Some(k8s::NodeStatus {
            conditions: Some(vec![k8s::NodeCondition {
                type_: "Ready".to_string(),
                status: ready.to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[tokio::test]
async fn ingress_listing_requires_sync() {
    let index = Index::shared(TargetMode::Instance);
    let reader = Reader::new(index.clone());

    index.write().apply(mk_ingress("ns-0", "ing-0", None));
    let err = reader.list_ingresses().await.expect_err("must not be synced");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotSynced)));

    index.write().reset(
        vec![
            mk_ingress("ns-0", "ing-0", None),
            mk_ingress("ns-1", "ing-1", None),
        ],
        Default::default(),
    );
    let mut names = reader
        .list_ingresses()
        .await
        .expect("ingresses must be listed")
        .into_iter()
        .filter_map(|ing| ResourceId::from_resource(&ing))
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(
        names,
        vec![
            ResourceId::new("ns-0", "ing-0"),
            ResourceId::new("ns-1", "ing-1"),
        ]
    );

    <Index as IndexNamespacedResource<k8s::Ingress>>::delete(
        &mut index.write(),
        "ns-0".to_string(),
        "ing-0".to_string(),
    );
    assert_eq!(reader.list_ingresses().await.unwrap().len(), 1);
}

#[tokio::test]
async fn reset_removes_ingresses() {
    let index = Index::shared(TargetMode::Instance);
    let reader = Reader::new(index.clone());
    index.write().reset(
        vec![
            mk_ingress("ns-0", "ing-0", None),
            mk_ingress("ns-0", "ing-1", None),
        ],
        Default::default(),
    );

    index.write().reset(
        vec![mk_ingress("ns-0", "ing-1", None)],
        Some(("ns-0".to_string(), Some("ing-0".to_string()).into_iter().collect()))
            .into_iter()
            .collect(),
    );
    let ingresses = reader.list_ingresses().await.unwrap();
    assert_eq!(ingresses.len(), 1);
    assert_eq!(
        ResourceId::from_resource(&ingresses[0]),
        Some(ResourceId::new("ns-0", "ing-1"))
    );
}

#[tokio::test]
async fn service_lookup() {
    let index = Index::shared(TargetMode::Instance);
    let reader = Reader::new(index.clone());
    index.write().apply(mk_service("ns-0", "svc-0", "NodePort"));

    let svc = reader
        .get_service(&ResourceId::new("ns-0", "svc-0"))
        .await
        .expect("service must exist");
    assert_eq!(ServiceType::of(&svc), Ok(ServiceType::NodePort));

    let err = reader
        .get_service(&ResourceId::new("ns-1", "svc-0"))
        .await
        .expect_err("service must not exist in another namespace");
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::NotFound { kind: "service", .. })
    ));

    <Index as IndexNamespacedResource<k8s::Service>>::delete(
        &mut index.write(),
        "ns-0".to_string(),
        "svc-0".to_string(),
    );
    assert!(reader
        .get_service(&ResourceId::new("ns-0", "svc-0"))
        .await
        .is_err());
}

#[tokio::test]
async fn target_mode_from_annotations() {
    let index = Index::shared(TargetMode::Instance);
    let reader = Reader::new(index.clone());
    index.write().reset(
        vec![
            mk_ingress("ns-0", "default", None),
            mk_ingress("ns-0", "instance", Some("instance")),
            mk_ingress("ns-0", "ip", Some("ip")),
            mk_ingress("ns-0", "bogus", Some("pod")),
        ],
        Default::default(),
    );

    let mode = |name: &str| {
        let reader = reader.clone();
        let key = ResourceId::new("ns-0", name);
        async move { reader.target_mode(&key).await }
    };

    assert_eq!(mode("default").await.unwrap(), TargetMode::Instance);
    assert_eq!(mode("instance").await.unwrap(), TargetMode::Instance);
    assert_eq!(mode("ip").await.unwrap(), TargetMode::Ip);

    let err = mode("bogus").await.expect_err("target type must be invalid");
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InvalidTargetType { .. })
    ));

    let err = mode("missing").await.expect_err("ingress must not exist");
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::NotFound { kind: "ingress", .. })
    ));
}

#[tokio::test]
async fn default_target_mode_applies_to_unannotated_ingresses() {
    let index = Index::shared(TargetMode::Ip);
    let reader = Reader::new(index.clone());
    index.write().reset(
        vec![
            mk_ingress("ns-0", "default", None),
            mk_ingress("ns-0", "instance", Some("instance")),
        ],
        Default::default(),
    );

    let key = ResourceId::new("ns-0", "default");
    assert_eq!(reader.target_mode(&key).await.unwrap(), TargetMode::Ip);
    let key = ResourceId::new("ns-0", "instance");
    assert_eq!(reader.target_mode(&key).await.unwrap(), TargetMode::Instance);
}

#[test]
fn node_events() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let nodes = NodeIndex::shared(tx);

    let ready = mk_node("node-0", "True");
    nodes.write().apply(ready.clone());
    assert_eq!(rx.try_recv().unwrap(), NodeEvent::Created(ready.clone()));

    // Unchanged snapshots are not republished.
    nodes.write().apply(ready.clone());
    assert!(rx.try_recv().is_err());

    let not_ready = mk_node("node-0", "False");
    nodes.write().apply(not_ready.clone());
    assert_eq!(
        rx.try_recv().unwrap(),
        NodeEvent::Updated {
            old: ready,
            new: not_ready.clone(),
        }
    );

    nodes.write().delete("node-0".to_string());
    assert_eq!(rx.try_recv().unwrap(), NodeEvent::Deleted(not_ready));

    nodes.write().delete("node-0".to_string());
    assert!(rx.try_recv().is_err());
    assert_eq!(nodes.read().len(), 0);
}

#[test]
fn node_reset_publishes_differences() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let nodes = NodeIndex::shared(tx);

    let node0 = mk_node("node-0", "True");
    let node1 = mk_node("node-1", "True");
    nodes.write().apply(node0.clone());
    nodes.write().apply(node1.clone());
    while rx.try_recv().is_ok() {}

    let node2 = mk_node("node-2", "False");
    nodes
        .write()
        .reset(vec![node0, node2.clone()], Some("node-1".to_string()).into_iter().collect());

    assert_eq!(rx.try_recv().unwrap(), NodeEvent::Created(node2));
    assert_eq!(rx.try_recv().unwrap(), NodeEvent::Deleted(node1));
    assert!(rx.try_recv().is_err());
}
