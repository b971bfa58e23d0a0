/*!
 * PIN Candidate Integration Tests
 *
 * Drives the full candidate pipeline through the public API:
 * PIN database → algorithm registry → fallback PIN → attack hand-off.
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use wpsrecon::core::{
    collect_outcome, dispatch, is_valid_pin, AlgorithmId, AlgorithmOutcome, AlgorithmRegistry,
    AttackEvent, AttackExecutor, AttackOutcome, AttackRequest, EngineConfig, InMemoryPinDatabase,
    PinCandidate, PinCandidateService, PinDatabase, StaticSerialSource,
};

const BSSID: &str = "00:11:22:33:44:55";

fn service(database: InMemoryPinDatabase) -> PinCandidateService {
    PinCandidateService::new(
        Arc::new(AlgorithmRegistry::without_serials()),
        Arc::new(database),
        &EngineConfig::default(),
    )
}

fn pins(candidates: &[PinCandidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.pin.as_str()).collect()
}

// =========================================================================
// Registry
// =========================================================================

#[test]
fn test_known_vendor_vectors() {
    let serials = StaticSerialSource::new()
        .with_serial(BSSID, "12345678")
        .with_serial("AA:BB:CC:DD:EE:FF", "A1B2C3");
    let registry = AlgorithmRegistry::new(Arc::new(serials));

    let cases = [
        (AlgorithmId::Dlink, BSSID, None, "67456000"),
        (AlgorithmId::DlinkPlusOne, BSSID, None, "56271874"),
        (AlgorithmId::TrendNet, BSSID, None, "55880190"),
        (AlgorithmId::Arris, BSSID, None, "23496514"),
        (AlgorithmId::Asus, BSSID, None, "10403853"),
        (AlgorithmId::AiroconRealtek, BSSID, None, "71593579"),
        (AlgorithmId::Arcadyan, BSSID, None, "32520330"),
        (AlgorithmId::Fte, BSSID, Some("Jazztel_AB"), "00132343"),
        (AlgorithmId::Belkin, BSSID, None, "24329286"),
        (AlgorithmId::Orange, "AA:BB:CC:DD:EE:FF", None, "33622033"),
    ];

    for (id, bssid, ssid, expected) in cases {
        match registry.generate_pin(id, bssid, ssid) {
            AlgorithmOutcome::Success { pin, .. } => {
                assert_eq!(pin, expected, "{} for {}", id.display_name(), bssid);
                assert!(is_valid_pin(&pin));
            }
            AlgorithmOutcome::Failure { reason } => {
                panic!("{} failed: {}", id.display_name(), reason)
            }
        }
    }
}

#[test]
fn test_every_success_has_valid_checksum() {
    let registry = AlgorithmRegistry::without_serials();
    for bssid in ["00:00:00:00:00:00", "AA:BB:CC:DD:EE:FF", "14:CC:20:0A:0B:0C"] {
        for suggestion in registry.generate_suggested_pins(bssid, Some("Jazztel_12")) {
            assert_eq!(suggestion.pin.len(), 8);
            assert!(
                is_valid_pin(&suggestion.pin),
                "{} produced {}",
                suggestion.algorithm_name,
                suggestion.pin
            );
        }
    }
}

#[test]
fn test_invalid_bssid_never_panics() {
    let registry = AlgorithmRegistry::without_serials();
    for bssid in ["", "nonsense", "00:11:22", "GG:HH:II:JJ:KK:LL"] {
        assert!(registry.generate_suggested_pins(bssid, None).is_empty());
        assert!(!registry.generate_pin(AlgorithmId::Arris, bssid, None).is_success());
    }
}

// =========================================================================
// Candidate Service
// =========================================================================

#[tokio::test]
async fn test_database_pins_come_first() {
    let database = InMemoryPinDatabase::new(8).with_pins("00:11:22", ["11112222", "33334444"]);
    let candidates = service(database).candidates(BSSID, None).await;

    assert_eq!(&pins(&candidates)[..2], &["11112222", "33334444"]);
    assert!(candidates[0].is_from_database && candidates[1].is_from_database);
    assert!(candidates[2..].iter().all(|c| !c.is_from_database));

    let last = candidates.last().unwrap();
    assert_eq!(last.pin, "12345670");
    assert_eq!(last.source, "Default");

    let dlink = candidates.iter().find(|c| c.source == "DLink").unwrap();
    assert_eq!(dlink.pin, "67456000");
}

#[tokio::test]
async fn test_candidates_have_no_duplicates() {
    // The database already knows the D-Link PIN
    let database = InMemoryPinDatabase::new(8).with_pins("001122", ["67456000", "12345670"]);
    let candidates = service(database).candidates(BSSID, Some("Jazztel_AB")).await;

    let unique: HashSet<&str> = pins(&candidates).into_iter().collect();
    assert_eq!(unique.len(), candidates.len());

    assert_eq!(candidates[0].source, "Database (vendor default)");
    assert_eq!(candidates[1].pin, "12345670");
    assert!(candidates[1].is_from_database);
    assert!(!candidates.iter().any(|c| c.source == "DLink"));
    assert!(candidates.iter().any(|c| c.pin == "00132343"));
}

#[tokio::test]
async fn test_database_limit_applies() {
    let database = InMemoryPinDatabase::new(1).with_pins("001122", ["11112222", "33334444"]);
    let candidates = service(database).candidates(BSSID, None).await;

    assert_eq!(candidates[0].pin, "11112222");
    assert!(!candidates.iter().any(|c| c.pin == "33334444"));
}

struct BrokenDatabase;

#[async_trait]
impl PinDatabase for BrokenDatabase {
    async fn pins_for(&self, _bssid: &str) -> Result<Vec<String>> {
        Err(anyhow!("database file is corrupt"))
    }
}

#[tokio::test]
async fn test_database_failure_falls_back_to_algorithms() {
    let service = PinCandidateService::new(
        Arc::new(AlgorithmRegistry::without_serials()),
        Arc::new(BrokenDatabase),
        &EngineConfig::default(),
    );
    let candidates = service.candidates(BSSID, None).await;

    assert!(candidates.len() > 1);
    assert!(candidates.iter().all(|c| !c.is_from_database));
    assert_eq!(candidates.last().unwrap().pin, "12345670");
}

#[tokio::test]
async fn test_garbage_bssid_still_gets_fallback() {
    let candidates = service(InMemoryPinDatabase::new(8))
        .candidates("not-a-mac", None)
        .await;
    assert_eq!(pins(&candidates), vec!["12345670"]);
}

// =========================================================================
// Attack Hand-off
// =========================================================================

/// Accepts the second PIN it is offered
struct SecondPinAccessPoint;

#[async_trait]
impl AttackExecutor for SecondPinAccessPoint {
    async fn execute(
        &self,
        request: AttackRequest,
        events: UnboundedSender<AttackEvent>,
    ) -> Result<()> {
        let AttackRequest::TestPins { pins, .. } = request else {
            return Err(anyhow!("only PIN tests supported"));
        };
        let _ = events.send(AttackEvent::Started);
        for (index, pin) in pins.into_iter().enumerate() {
            let _ = events.send(AttackEvent::PinTried { pin: pin.clone() });
            if index == 1 {
                let _ = events.send(AttackEvent::Success {
                    pin,
                    password: "correct horse".to_string(),
                });
                return Ok(());
            }
        }
        let _ = events.send(AttackEvent::Failure {
            reason: "exhausted".to_string(),
        });
        Ok(())
    }
}

#[tokio::test]
async fn test_candidates_hand_off_in_order() {
    let database = InMemoryPinDatabase::new(8).with_pins("001122", ["11112222", "33334444"]);
    let candidates = service(database).candidates(BSSID, None).await;

    let request = AttackRequest::test_pins(BSSID, None, &candidates);
    let mut tried = Vec::new();
    let outcome = collect_outcome(dispatch(Arc::new(SecondPinAccessPoint), request), |event| {
        if let AttackEvent::PinTried { pin } = event {
            tried.push(pin.clone());
        }
    })
    .await;

    assert_eq!(tried, vec!["11112222", "33334444"]);
    assert_eq!(
        outcome,
        AttackOutcome::Found {
            pin: "33334444".to_string(),
            password: "correct horse".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unsupported_request_reports_failure() {
    let outcome = collect_outcome(
        dispatch(
            Arc::new(SecondPinAccessPoint),
            AttackRequest::pixie_dust(BSSID, None),
        ),
        |_| {},
    )
    .await;
    assert!(matches!(outcome, AttackOutcome::Failed { .. }));
}
