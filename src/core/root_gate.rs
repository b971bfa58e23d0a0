/*!
 * Root access gate
 *
 * Asking for root may pop a consent dialog, so it happens at most once per
 * process: concurrent `probe()` callers wait on one in-flight request and
 * all see the same answer. Failures during the request count as denial;
 * a request that is cancelled or panics leaves the gate unasked.
 */

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::shell::{ShellCommand, ShellExecutor};

/// Privileged access state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RootState {
    Unknown,
    Requesting,
    Granted,
    Denied,
}

impl RootState {
    fn as_u8(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Requesting => 1,
            Self::Granted => 2,
            Self::Denied => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Requesting,
            2 => Self::Granted,
            3 => Self::Denied,
            _ => Self::Unknown,
        }
    }

    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Granted | Self::Denied)
    }
}

/// Makes the single yes/no root decision, possibly interactively
#[async_trait]
pub trait PrivilegeBroker: Send + Sync {
    async fn request_root(&self) -> Result<bool>;
}

/// Broker with a predetermined answer, e.g. when working from captured data
#[derive(Debug, Clone, Copy)]
pub struct FixedPrivilegeBroker(pub bool);

#[async_trait]
impl PrivilegeBroker for FixedPrivilegeBroker {
    async fn request_root(&self) -> Result<bool> {
        Ok(self.0)
    }
}

/// Broker that asks the shell who it is running as (`id -u` == 0)
pub struct ShellPrivilegeBroker {
    shell: Arc<dyn ShellExecutor>,
}

impl ShellPrivilegeBroker {
    pub fn new(shell: Arc<dyn ShellExecutor>) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl PrivilegeBroker for ShellPrivilegeBroker {
    async fn request_root(&self) -> Result<bool> {
        let output = self
            .shell
            .execute(&ShellCommand::new("id").arg("-u"))
            .await?;
        let uid = output.stdout_lines.first().map(|l| l.trim());
        Ok(output.success && uid == Some("0"))
    }
}

/// Single-flight, memoized root probe
pub struct RootGate {
    broker: Arc<dyn PrivilegeBroker>,
    state: AtomicU8,
    probe_lock: Mutex<()>,
}

impl RootGate {
    pub fn new(broker: Arc<dyn PrivilegeBroker>) -> Self {
        Self {
            broker,
            state: AtomicU8::new(RootState::Unknown.as_u8()),
            probe_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> RootState {
        RootState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn store(&self, state: RootState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Resolve root access, asking the broker only if nobody has yet
    pub async fn probe(&self) -> bool {
        if let Some(granted) = self.resolved() {
            return granted;
        }

        let _guard = self.probe_lock.lock().await;
        // Another caller may have finished while we waited
        if let Some(granted) = self.resolved() {
            return granted;
        }

        self.store(RootState::Requesting);
        let mut in_flight = RequestInFlight {
            gate: self,
            done: false,
        };
        let granted = match self.broker.request_root().await {
            Ok(granted) => granted,
            Err(e) => {
                warn!("root request failed, treating as denied: {:#}", e);
                false
            }
        };
        in_flight.done = true;

        self.store(if granted {
            RootState::Granted
        } else {
            RootState::Denied
        });
        info!(granted, "root access resolved");
        granted
    }

    /// Non-blocking view; an in-flight request reads as `Unknown`
    pub fn peek_cached(&self) -> RootState {
        match self.load() {
            RootState::Requesting => RootState::Unknown,
            state => state,
        }
    }

    /// `Some(granted)` once resolved, `None` before
    pub fn resolved(&self) -> Option<bool> {
        match self.load() {
            RootState::Granted => Some(true),
            RootState::Denied => Some(false),
            _ => None,
        }
    }

    /// True once a probe has started, distinguishing "never asked" from "denied"
    pub fn was_requested(&self) -> bool {
        self.load() != RootState::Unknown
    }
}

/// Puts the gate back to `Unknown` if the broker call never returns,
/// i.e. the probe future was dropped or the broker panicked
struct RequestInFlight<'a> {
    gate: &'a RootGate,
    done: bool,
}

impl Drop for RequestInFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            warn!("root request abandoned before an answer");
            self.gate.store(RootState::Unknown);
        }
    }
}
