/*!
 * Hand-off to the external WPS attack executor
 *
 * The executor owns everything over the air (EAPOL exchange, Pixie-Dust,
 * lockout back-off). This module only defines what it is asked to do and
 * the progress events it reports back over an unbounded channel.
 */

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use super::pins::PinCandidate;

/// What the executor should attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackRequest {
    /// Try these PINs in order
    TestPins {
        bssid: String,
        ssid: Option<String>,
        pins: Vec<String>,
    },

    /// Offline PIN recovery from the M1-M3 nonces
    PixieDust { bssid: String, ssid: Option<String> },

    /// Full online PIN search, driven by the executor
    BruteForce { bssid: String, ssid: Option<String> },
}

impl AttackRequest {
    /// Ordered PIN test from a candidate list
    pub fn test_pins(bssid: &str, ssid: Option<&str>, candidates: &[PinCandidate]) -> Self {
        Self::TestPins {
            bssid: bssid.to_string(),
            ssid: ssid.map(str::to_string),
            pins: candidates.iter().map(|c| c.pin.clone()).collect(),
        }
    }

    pub fn pixie_dust(bssid: &str, ssid: Option<&str>) -> Self {
        Self::PixieDust {
            bssid: bssid.to_string(),
            ssid: ssid.map(str::to_string),
        }
    }

    pub fn brute_force(bssid: &str, ssid: Option<&str>) -> Self {
        Self::BruteForce {
            bssid: bssid.to_string(),
            ssid: ssid.map(str::to_string),
        }
    }

    pub fn bssid(&self) -> &str {
        match self {
            Self::TestPins { bssid, .. }
            | Self::PixieDust { bssid, .. }
            | Self::BruteForce { bssid, .. } => bssid,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::TestPins { .. } => "pin-test",
            Self::PixieDust { .. } => "pixie-dust",
            Self::BruteForce { .. } => "brute-force",
        }
    }
}

/// Progress reported by the executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackEvent {
    Started,
    Progress { message: String },
    PinTried { pin: String },
    Success { pin: String, password: String },
    Failure { reason: String },
}

impl AttackEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failure { .. })
    }
}

/// Final result as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackOutcome {
    Found { pin: String, password: String },
    Failed { reason: String },
    /// Channel closed before a terminal event
    Interrupted,
}

/// External component that performs the attack
#[async_trait]
pub trait AttackExecutor: Send + Sync {
    async fn execute(
        &self,
        request: AttackRequest,
        events: UnboundedSender<AttackEvent>,
    ) -> Result<()>;
}

/// Run `request` on a background task and return its event stream.
/// An executor error is delivered as a final `Failure` event.
pub fn dispatch(
    executor: Arc<dyn AttackExecutor>,
    request: AttackRequest,
) -> UnboundedReceiver<AttackEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        info!(attack = request.name(), bssid = %request.bssid(), "dispatching attack");
        let error_tx = tx.clone();
        if let Err(e) = executor.execute(request, tx).await {
            warn!("attack executor failed: {:#}", e);
            let _ = error_tx.send(AttackEvent::Failure {
                reason: format!("{:#}", e),
            });
        }
    });

    rx
}

/// Drain events until a terminal one arrives, calling `on_event` for each
pub async fn collect_outcome<F>(
    mut events: UnboundedReceiver<AttackEvent>,
    mut on_event: F,
) -> AttackOutcome
where
    F: FnMut(&AttackEvent),
{
    while let Some(event) = events.recv().await {
        on_event(&event);
        match event {
            AttackEvent::Success { pin, password } => {
                return AttackOutcome::Found { pin, password }
            }
            AttackEvent::Failure { reason } => return AttackOutcome::Failed { reason },
            _ => {}
        }
    }
    AttackOutcome::Interrupted
}
