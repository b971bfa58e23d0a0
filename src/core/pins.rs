/*!
 * Prioritised WPS PIN candidates
 *
 * Order: known vendor defaults from the static database, then algorithm
 * suggestions, then the fallback PIN. The first occurrence of a PIN wins,
 * keeping its label and tier.
 */

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::algorithms::{AlgorithmRegistry, SuggestedPin};
use super::config::EngineConfig;
use super::lookup::PinDatabase;

pub const DATABASE_LABEL: &str = "Database (vendor default)";
pub const FALLBACK_LABEL: &str = "Default";

/// One PIN to try; priority is its position in the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinCandidate {
    pub pin: String,
    pub source: String,
    pub is_from_database: bool,
}

/// Merge the three tiers, dropping repeated PINs
pub fn merge_candidates(
    database_pins: &[String],
    suggestions: &[SuggestedPin],
    fallback_pin: &str,
) -> Vec<PinCandidate> {
    let database = database_pins.iter().map(|pin| PinCandidate {
        pin: pin.clone(),
        source: DATABASE_LABEL.to_string(),
        is_from_database: true,
    });
    let algorithms = suggestions.iter().map(|s| PinCandidate {
        pin: s.pin.clone(),
        source: s.algorithm_name.clone(),
        is_from_database: false,
    });
    let fallback = std::iter::once(PinCandidate {
        pin: fallback_pin.to_string(),
        source: FALLBACK_LABEL.to_string(),
        is_from_database: false,
    });

    let mut seen = HashSet::new();
    database
        .chain(algorithms)
        .chain(fallback)
        .filter(|candidate| seen.insert(candidate.pin.clone()))
        .collect()
}

pub struct PinCandidateService {
    registry: Arc<AlgorithmRegistry>,
    database: Arc<dyn PinDatabase>,
    fallback_pin: String,
}

impl PinCandidateService {
    pub fn new(
        registry: Arc<AlgorithmRegistry>,
        database: Arc<dyn PinDatabase>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            registry,
            database,
            fallback_pin: config.fallback_pin.clone(),
        }
    }

    /// Candidates for one network. A failing database counts as empty.
    pub async fn candidates(&self, bssid: &str, ssid: Option<&str>) -> Vec<PinCandidate> {
        let database_pins = match self.database.pins_for(bssid).await {
            Ok(pins) => pins,
            Err(e) => {
                warn!(%bssid, "PIN database lookup failed: {:#}", e);
                Vec::new()
            }
        };

        let suggestions = self.registry.generate_unique_suggested_pins(bssid, ssid);
        let candidates = merge_candidates(&database_pins, &suggestions, &self.fallback_pin);

        debug!(
            %bssid,
            database = database_pins.len(),
            algorithms = suggestions.len(),
            total = candidates.len(),
            "PIN candidates built"
        );
        candidates
    }
}
