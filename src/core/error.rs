/*!
 * Error types for PIN derivation
 *
 * Algorithms report expected "no PIN for this input" conditions through
 * `AlgorithmError`; the registry turns every one of them into an
 * `AlgorithmOutcome::Failure` so callers never see an `Err`.
 */

use thiserror::Error;

/// Reasons a vendor algorithm can refuse or fail to derive a PIN
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    #[error("Invalid MAC address '{bssid}': expected 12 hex digits")]
    InvalidMac { bssid: String },

    #[error("Invalid MAC address format: expected six colon-separated octets")]
    MacNotColonDelimited,

    #[error("SSID is required and must be at least {min_len} characters")]
    SsidRequired { min_len: usize },

    #[error("Serial number not available for {bssid}: {reason}")]
    SerialUnavailable { bssid: String, reason: String },

    #[error("Serial must be at least {min_len} characters")]
    SerialTooShort { min_len: usize },

    #[error("Arithmetic fault in {algorithm}: {detail}")]
    Arithmetic {
        algorithm: &'static str,
        detail: String,
    },
}

impl AlgorithmError {
    pub fn arithmetic(algorithm: &'static str, detail: impl Into<String>) -> Self {
        Self::Arithmetic {
            algorithm,
            detail: detail.into(),
        }
    }
}

pub type AlgorithmResult<T> = std::result::Result<T, AlgorithmError>;
