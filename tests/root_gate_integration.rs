/*!
 * Root Gate Integration Tests
 *
 * The root request must run at most once per process, no matter how many
 * tasks ask at the same time, and scan cycles must never wait on it.
 */

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use wpsrecon::core::{
    PrivilegeBroker, RootGate, RootState, WpsCapabilityResolver, WpsDetail, WpsDumpSource,
};

/// Counts requests and answers after a short delay
struct SlowBroker {
    calls: AtomicUsize,
    answer: bool,
}

impl SlowBroker {
    fn new(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            answer,
        })
    }
}

#[async_trait]
impl PrivilegeBroker for SlowBroker {
    async fn request_root(&self) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(self.answer)
    }
}

/// Blocks until released, so the test can observe the in-flight state
struct HeldBroker {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl PrivilegeBroker for HeldBroker {
    async fn request_root(&self) -> Result<bool> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(true)
    }
}

struct OneEntryDump {
    fetches: AtomicUsize,
}

#[async_trait]
impl WpsDumpSource for OneEntryDump {
    async fn fetch_wps_map(&self) -> HashMap<String, WpsDetail> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        HashMap::from([(
            "C8:3A:35:12:34:56".to_string(),
            WpsDetail::from_config_methods(0x008c),
        )])
    }
}

// =========================================================================
// Single Flight
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_probes_share_one_request() {
    let broker = SlowBroker::new(true);
    let gate = Arc::new(RootGate::new(broker.clone()));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move { gate.probe().await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }

    assert_eq!(broker.calls.load(Ordering::SeqCst), 1);
    assert_eq!(gate.peek_cached(), RootState::Granted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_denial_is_shared_and_final() {
    let broker = SlowBroker::new(false);
    let gate = Arc::new(RootGate::new(broker.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move { gate.probe().await })
        })
        .collect();
    for handle in handles {
        assert!(!handle.await.unwrap());
    }

    assert!(!gate.probe().await);
    assert_eq!(broker.calls.load(Ordering::SeqCst), 1);
    assert_eq!(gate.resolved(), Some(false));
    assert!(gate.was_requested());
}

// =========================================================================
// Non-blocking Reads
// =========================================================================

#[tokio::test]
async fn test_in_flight_request_reads_as_unknown() {
    let broker = Arc::new(HeldBroker {
        started: Notify::new(),
        release: Notify::new(),
    });
    let gate = Arc::new(RootGate::new(broker.clone()));
    let dump = Arc::new(OneEntryDump {
        fetches: AtomicUsize::new(0),
    });
    let resolver = WpsCapabilityResolver::new(gate.clone(), dump.clone());

    let probe = tokio::spawn({
        let gate = gate.clone();
        async move { gate.probe().await }
    });
    broker.started.notified().await;

    assert_eq!(gate.peek_cached(), RootState::Unknown);
    assert!(gate.was_requested());
    assert_eq!(gate.resolved(), None);

    // A scan cycle during the request goes ahead without the dump
    assert_eq!(resolver.refresh().await, 0);
    assert_eq!(dump.fetches.load(Ordering::SeqCst), 0);

    broker.release.notify_one();
    assert!(probe.await.unwrap());

    assert_eq!(resolver.refresh().await, 1);
    assert_eq!(dump.fetches.load(Ordering::SeqCst), 1);
    assert!(resolver
        .authoritative_for("c8:3a:35:12:34:56")
        .unwrap()
        .pin_supported);
}
