/*!
 * Vendor PIN derivation algorithms
 *
 * Many routers ship a default WPS PIN computed from their own BSSID (and
 * sometimes SSID or serial number). Each known derivation is a strategy
 * implementing [`WpsAlgorithm`], registered under a stable [`AlgorithmId`].
 * [`AlgorithmRegistry`] is the single dispatch point: it validates input,
 * runs the strategy and folds every failure into [`AlgorithmOutcome::Failure`].
 */

mod bit_based;
mod serial;
mod vendor;

pub use bit_based::{BitBasedAlgorithm, BitWidth, Pin24Algorithm};
pub use serial::{
    BelkinAlgorithm, DirectorySerialSource, NoSerialSource, OrangeAlgorithm, SerialSource,
    StaticSerialSource,
};
pub use vendor::{
    AiroconRealtekAlgorithm, ArcadyanAlgorithm, ArrisAlgorithm, AsusAlgorithm, DlinkAlgorithm,
    FteAlgorithm, TrendNetAlgorithm,
};

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::{AlgorithmError, AlgorithmResult};
use super::mac;

/// Identifier of every PIN derivation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmId {
    Pin24,
    AiroconRealtek,
    Arcadyan,
    Arris,
    Asus,
    Belkin,
    Dlink,
    DlinkPlusOne,
    FortyBit,
    FortyEightBit,
    Orange,
    FortyFourBit,
    ThirtySixBit,
    ThirtyTwoBit,
    TwentyEightBit,
    TrendNet,
    Fte,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 17] = [
        Self::Pin24,
        Self::AiroconRealtek,
        Self::Arcadyan,
        Self::Arris,
        Self::Asus,
        Self::Belkin,
        Self::Dlink,
        Self::DlinkPlusOne,
        Self::FortyBit,
        Self::FortyEightBit,
        Self::Orange,
        Self::FortyFourBit,
        Self::ThirtySixBit,
        Self::ThirtyTwoBit,
        Self::TwentyEightBit,
        Self::TrendNet,
        Self::Fte,
    ];

    /// Stable numeric code
    pub fn code(&self) -> u16 {
        match self {
            Self::Pin24 => 101,
            Self::AiroconRealtek => 102,
            Self::Arcadyan => 103,
            Self::Arris => 104,
            Self::Asus => 105,
            Self::Belkin => 106,
            Self::Dlink => 107,
            Self::DlinkPlusOne => 108,
            Self::FortyBit => 109,
            Self::FortyEightBit => 110,
            Self::Orange => 111,
            Self::FortyFourBit => 112,
            Self::ThirtySixBit => 113,
            Self::ThirtyTwoBit => 114,
            Self::TwentyEightBit => 115,
            Self::TrendNet => 116,
            Self::Fte => 117,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.code() == code)
    }

    /// Get human-readable name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pin24 => "24-bit",
            Self::AiroconRealtek => "Airocon",
            Self::Arcadyan => "EasyBox",
            Self::Arris => "Arris",
            Self::Asus => "Asus",
            Self::Belkin => "Belkin",
            Self::Dlink => "DLink",
            Self::DlinkPlusOne => "DLink+1",
            Self::FortyBit => "40-bit",
            Self::FortyEightBit => "48-bit",
            Self::Orange => "Orange",
            Self::FortyFourBit => "44-bit",
            Self::ThirtySixBit => "36-bit",
            Self::ThirtyTwoBit => "32-bit",
            Self::TwentyEightBit => "28-bit",
            Self::TrendNet => "TrendNet",
            Self::Fte => "FTE",
        }
    }

    /// Whether the strategy needs per-device serial data
    pub fn requires_serial(&self) -> bool {
        matches!(self, Self::Belkin | Self::Orange)
    }
}

/// Algorithms run by the suggestion pass, in priority order.
/// None of them needs serial data.
pub const SUGGESTED_ALGORITHMS: [AlgorithmId; 15] = [
    AlgorithmId::Pin24,
    AlgorithmId::TwentyEightBit,
    AlgorithmId::ThirtyTwoBit,
    AlgorithmId::ThirtySixBit,
    AlgorithmId::FortyBit,
    AlgorithmId::FortyFourBit,
    AlgorithmId::FortyEightBit,
    AlgorithmId::Dlink,
    AlgorithmId::DlinkPlusOne,
    AlgorithmId::TrendNet,
    AlgorithmId::Arris,
    AlgorithmId::Asus,
    AlgorithmId::AiroconRealtek,
    AlgorithmId::Arcadyan,
    AlgorithmId::Fte,
];

/// Result of running one algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmOutcome {
    Success { pin: String, algorithm_name: String },
    Failure { reason: String },
}

impl AlgorithmOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn pin(&self) -> Option<&str> {
        match self {
            Self::Success { pin, .. } => Some(pin),
            Self::Failure { .. } => None,
        }
    }
}

/// A generated PIN together with the algorithm that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedPin {
    pub pin: String,
    pub algorithm_name: String,
}

/// Strategy interface for WPS PIN derivation
pub trait WpsAlgorithm: Send + Sync {
    /// Name shown next to generated PINs
    fn name(&self) -> &'static str;

    /// Reject input the strategy cannot work with
    fn validate(&self, bssid: &str, _ssid: Option<&str>) -> AlgorithmResult<()> {
        if mac::is_valid_mac(bssid) {
            Ok(())
        } else {
            Err(AlgorithmError::InvalidMac {
                bssid: bssid.to_string(),
            })
        }
    }

    /// Derive the 8-digit PIN
    fn generate(&self, bssid: &str, ssid: Option<&str>) -> AlgorithmResult<String>;
}

/// Identifier → strategy table, populated once at construction
pub struct AlgorithmRegistry {
    algorithms: HashMap<AlgorithmId, Box<dyn WpsAlgorithm>>,
}

impl AlgorithmRegistry {
    /// Registry with every built-in strategy; serial-based ones read from `serials`
    pub fn new(serials: Arc<dyn SerialSource>) -> Self {
        let mut registry = Self::empty();
        registry.register(AlgorithmId::Pin24, Box::new(Pin24Algorithm));
        registry.register(AlgorithmId::AiroconRealtek, Box::new(AiroconRealtekAlgorithm));
        registry.register(AlgorithmId::Arcadyan, Box::new(ArcadyanAlgorithm));
        registry.register(AlgorithmId::Arris, Box::new(ArrisAlgorithm));
        registry.register(AlgorithmId::Asus, Box::new(AsusAlgorithm));
        registry.register(
            AlgorithmId::Belkin,
            Box::new(BelkinAlgorithm::new(serials.clone())),
        );
        registry.register(AlgorithmId::Dlink, Box::new(DlinkAlgorithm::new(false)));
        registry.register(AlgorithmId::DlinkPlusOne, Box::new(DlinkAlgorithm::new(true)));
        registry.register(AlgorithmId::Orange, Box::new(OrangeAlgorithm::new(serials)));
        registry.register(AlgorithmId::TrendNet, Box::new(TrendNetAlgorithm));
        registry.register(AlgorithmId::Fte, Box::new(FteAlgorithm));

        for (id, width) in [
            (AlgorithmId::TwentyEightBit, BitWidth::TwentyEight),
            (AlgorithmId::ThirtyTwoBit, BitWidth::ThirtyTwo),
            (AlgorithmId::ThirtySixBit, BitWidth::ThirtySix),
            (AlgorithmId::FortyBit, BitWidth::Forty),
            (AlgorithmId::FortyFourBit, BitWidth::FortyFour),
            (AlgorithmId::FortyEightBit, BitWidth::FortyEight),
        ] {
            registry.register(id, Box::new(BitBasedAlgorithm::new(width)));
        }

        registry
    }

    /// Registry without serial data: Belkin and Orange always fail validation
    pub fn without_serials() -> Self {
        Self::new(Arc::new(NoSerialSource))
    }

    /// Registry with nothing registered
    pub fn empty() -> Self {
        Self {
            algorithms: HashMap::new(),
        }
    }

    /// Register or replace the strategy for `id`
    pub fn register(&mut self, id: AlgorithmId, algorithm: Box<dyn WpsAlgorithm>) {
        self.algorithms.insert(id, algorithm);
    }

    pub fn contains(&self, id: AlgorithmId) -> bool {
        self.algorithms.contains_key(&id)
    }

    /// Run one strategy. Never panics and never returns an error: unknown
    /// ids, invalid input and computation faults all become `Failure`.
    pub fn generate_pin(
        &self,
        id: AlgorithmId,
        bssid: &str,
        ssid: Option<&str>,
    ) -> AlgorithmOutcome {
        let Some(algorithm) = self.algorithms.get(&id) else {
            return AlgorithmOutcome::Failure {
                reason: "unsupported algorithm".to_string(),
            };
        };

        if let Err(e) = algorithm.validate(bssid, ssid) {
            debug!(algorithm = algorithm.name(), %bssid, "input rejected: {}", e);
            return AlgorithmOutcome::Failure {
                reason: format!("Invalid input for algorithm {}: {}", algorithm.name(), e),
            };
        }

        let run = panic::catch_unwind(AssertUnwindSafe(|| algorithm.generate(bssid, ssid)));
        match run {
            Ok(Ok(pin)) => AlgorithmOutcome::Success {
                pin,
                algorithm_name: algorithm.name().to_string(),
            },
            Ok(Err(e)) => {
                warn!(algorithm = algorithm.name(), %bssid, "algorithm error: {}", e);
                AlgorithmOutcome::Failure {
                    reason: e.to_string(),
                }
            }
            Err(payload) => {
                let detail = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown fault".to_string());
                warn!(algorithm = algorithm.name(), %bssid, "algorithm faulted: {}", detail);
                AlgorithmOutcome::Failure {
                    reason: format!("Error: {}", detail),
                }
            }
        }
    }

    /// Run the suggested subset and keep successes, in invocation order
    pub fn generate_suggested_pins(&self, bssid: &str, ssid: Option<&str>) -> Vec<SuggestedPin> {
        SUGGESTED_ALGORITHMS
            .iter()
            .filter_map(|id| match self.generate_pin(*id, bssid, ssid) {
                AlgorithmOutcome::Success {
                    pin,
                    algorithm_name,
                } => Some(SuggestedPin {
                    pin,
                    algorithm_name,
                }),
                AlgorithmOutcome::Failure { .. } => None,
            })
            .collect()
    }

    /// Like [`generate_suggested_pins`](Self::generate_suggested_pins) but
    /// deduplicated by PIN, keeping the earliest algorithm's label
    pub fn generate_unique_suggested_pins(
        &self,
        bssid: &str,
        ssid: Option<&str>,
    ) -> Vec<SuggestedPin> {
        let mut seen = HashSet::new();
        self.generate_suggested_pins(bssid, ssid)
            .into_iter()
            .filter(|suggestion| seen.insert(suggestion.pin.clone()))
            .collect()
    }
}

/// Normalized 12-digit MAC, so callers can slice it freely
fn normalized_mac(bssid: &str) -> AlgorithmResult<String> {
    let normalized = mac::normalize(bssid);
    if mac::is_valid_mac(&normalized) {
        Ok(normalized)
    } else {
        Err(AlgorithmError::InvalidMac {
            bssid: bssid.to_string(),
        })
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::without_serials()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FaultyAlgorithm;

    impl WpsAlgorithm for FaultyAlgorithm {
        fn name(&self) -> &'static str {
            "Faulty"
        }

        fn generate(&self, _bssid: &str, _ssid: Option<&str>) -> AlgorithmResult<String> {
            let digits: Vec<u32> = Vec::new();
            Ok(format!("{:08}", digits[3]))
        }
    }

    #[test]
    fn test_codes_round_trip() {
        for id in AlgorithmId::ALL {
            assert_eq!(AlgorithmId::from_code(id.code()), Some(id));
        }
        assert_eq!(AlgorithmId::from_code(100), None);
        assert_eq!(AlgorithmId::from_code(118), None);
        assert_eq!(AlgorithmId::Arcadyan.display_name(), "EasyBox");
    }

    #[test]
    fn test_suggested_subset_needs_no_serial() {
        assert!(SUGGESTED_ALGORITHMS.iter().all(|id| !id.requires_serial()));
        assert!(!SUGGESTED_ALGORITHMS.contains(&AlgorithmId::Belkin));
        assert!(!SUGGESTED_ALGORITHMS.contains(&AlgorithmId::Orange));
    }

    #[test]
    fn test_every_builtin_is_registered() {
        let registry = AlgorithmRegistry::without_serials();
        for id in AlgorithmId::ALL {
            assert!(registry.contains(id), "{:?} missing", id);
        }
    }

    #[test]
    fn test_unknown_algorithm_fails() {
        let registry = AlgorithmRegistry::empty();
        let outcome = registry.generate_pin(AlgorithmId::Pin24, "00:11:22:33:44:55", None);
        assert_eq!(
            outcome,
            AlgorithmOutcome::Failure {
                reason: "unsupported algorithm".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_mac_fails_without_panicking() {
        let registry = AlgorithmRegistry::without_serials();
        for id in AlgorithmId::ALL {
            let outcome = registry.generate_pin(id, "not-a-mac", Some("Network"));
            assert!(!outcome.is_success(), "{:?} accepted a bad MAC", id);
        }
    }

    #[test]
    fn test_fault_is_converted_to_failure() {
        let mut registry = AlgorithmRegistry::empty();
        registry.register(AlgorithmId::Pin24, Box::new(FaultyAlgorithm));

        let outcome = registry.generate_pin(AlgorithmId::Pin24, "00:11:22:33:44:55", None);
        match outcome {
            AlgorithmOutcome::Failure { reason } => assert!(reason.starts_with("Error:")),
            other => panic!("expected failure, got {:?}", other),
        }

        // A faulting strategy is simply left out of the suggestions
        assert!(registry
            .generate_suggested_pins("00:11:22:33:44:55", None)
            .is_empty());
    }

    #[test]
    fn test_suggestions_for_known_bssid() {
        let registry = AlgorithmRegistry::without_serials();
        let pins: Vec<(String, String)> = registry
            .generate_suggested_pins("00:11:22:33:44:55", Some("Jazztel_AB"))
            .into_iter()
            .map(|s| (s.algorithm_name, s.pin))
            .collect();

        let expected = [
            ("24-bit", "33598291"),
            ("28-bit", "69142611"),
            ("32-bit", "37851736"),
            ("36-bit", "87524697"),
            ("40-bit", "82292058"),
            ("44-bit", "82292058"),
            ("48-bit", "82292058"),
            ("DLink", "67456000"),
            ("DLink+1", "56271874"),
            ("TrendNet", "55880190"),
            ("Arris", "23496514"),
            ("Asus", "10403853"),
            ("Airocon", "71593579"),
            ("EasyBox", "32520330"),
            ("FTE", "00132343"),
        ]
        .map(|(name, pin)| (name.to_string(), pin.to_string()));

        assert_eq!(pins, expected.to_vec());
    }

    #[test]
    fn test_unique_suggestions_keep_first_label() {
        let registry = AlgorithmRegistry::without_serials();
        let unique = registry.generate_unique_suggested_pins("00:11:22:33:44:55", None);

        let mut seen = HashSet::new();
        assert!(unique.iter().all(|s| seen.insert(s.pin.clone())));

        let shared: Vec<&SuggestedPin> = unique.iter().filter(|s| s.pin == "82292058").collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].algorithm_name, "40-bit");

        // FTE needs an SSID, so it is absent here
        assert!(unique.iter().all(|s| s.algorithm_name != "FTE"));
        assert_eq!(unique.len(), 12);
    }

    #[test]
    fn test_all_zero_bssid_collapses_duplicates() {
        let registry = AlgorithmRegistry::without_serials();
        let unique = registry.generate_unique_suggested_pins("00:00:00:00:00:00", None);
        let labels: Vec<&str> = unique.iter().map(|s| s.algorithm_name.as_str()).collect();
        assert_eq!(labels, vec!["24-bit", "DLink", "DLink+1", "Arris"]);
        assert_eq!(unique[0].pin, "00000000");
    }
}
