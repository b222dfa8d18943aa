use super::*;
use crate::core::ResourceId;

#[tokio::test(start_paused = true)]
async fn duplicate_requests_collapse_while_pending() {
    let (queue, mut requests) = channel(Duration::from_millis(10));

    queue.submit(ResourceId::new("ns", "a"));
    queue.submit(ResourceId::new("ns", "a"));
    queue.submit(ResourceId::new("ns", "b"));
    assert_eq!(queue.len(), 2);

    assert_eq!(requests.next().await, Some(ResourceId::new("ns", "a")));
    assert_eq!(queue.len(), 1);

    // Once yielded, the same ingress may be requested again.
    queue.submit(ResourceId::new("ns", "a"));
    assert_eq!(requests.next().await, Some(ResourceId::new("ns", "b")));
    assert_eq!(requests.next().await, Some(ResourceId::new("ns", "a")));
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn requests_are_rate_limited() {
    let (queue, mut requests) = channel(Duration::from_secs(1));
    for name in ["a", "b", "c"] {
        queue.submit(ResourceId::new("ns", name));
    }

    let start = time::Instant::now();
    requests.next().await.expect("request must be pending");
    assert!(start.elapsed() < Duration::from_secs(1));

    requests.next().await.expect("request must be pending");
    requests.next().await.expect("request must be pending");
    assert!(start.elapsed() >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn requests_after_idle_period_are_rate_limited() {
    let (queue, mut requests) = channel(Duration::from_secs(1));

    time::sleep(Duration::from_secs(100)).await;
    queue.submit(ResourceId::new("ns", "a"));
    queue.submit(ResourceId::new("ns", "b"));

    assert_eq!(requests.next().await, Some(ResourceId::new("ns", "a")));
    let released = time::Instant::now();
    assert_eq!(requests.next().await, Some(ResourceId::new("ns", "b")));
    assert!(released.elapsed() >= Duration::from_secs(1));
}

#[tokio::test]
async fn closed_queue_yields_nothing() {
    let (queue, mut requests) = channel(Duration::from_millis(1));
    drop(queue);
    assert_eq!(requests.next().await, None);
}
