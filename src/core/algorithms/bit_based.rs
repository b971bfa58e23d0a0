/*!
 * Bit-slice algorithms
 *
 * The PIN payload is the low N bits of the BSSID, reduced modulo 10^7.
 */

use super::{normalized_mac, WpsAlgorithm};
use crate::core::checksum::{format_with_checksum, PIN_MODULO};
use crate::core::error::AlgorithmResult;
use crate::core::mac;

/// Classic "ComputePIN": the NIC (last 24 bits) modulo 10^7
pub struct Pin24Algorithm;

impl WpsAlgorithm for Pin24Algorithm {
    fn name(&self) -> &'static str {
        "24-bit"
    }

    fn generate(&self, bssid: &str, _ssid: Option<&str>) -> AlgorithmResult<String> {
        let nic = mac::parse_hex_or(&mac::last_three_bytes(bssid), 1234567);
        Ok(format_with_checksum(nic % PIN_MODULO))
    }
}

/// Width of the BSSID suffix fed into the PIN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitWidth {
    TwentyEight,
    ThirtyTwo,
    ThirtySix,
    Forty,
    FortyFour,
    FortyEight,
}

impl BitWidth {
    /// Index of the first hex digit of the slice within the 12-digit MAC
    fn start_index(&self) -> usize {
        match self {
            Self::TwentyEight => 5,
            Self::ThirtyTwo => 4,
            Self::ThirtySix => 3,
            Self::Forty => 2,
            Self::FortyFour => 1,
            Self::FortyEight => 0,
        }
    }
}

pub struct BitBasedAlgorithm {
    width: BitWidth,
}

impl BitBasedAlgorithm {
    pub fn new(width: BitWidth) -> Self {
        Self { width }
    }
}

impl WpsAlgorithm for BitBasedAlgorithm {
    fn name(&self) -> &'static str {
        match self.width {
            BitWidth::TwentyEight => "28-bit",
            BitWidth::ThirtyTwo => "32-bit",
            BitWidth::ThirtySix => "36-bit",
            BitWidth::Forty => "40-bit",
            BitWidth::FortyFour => "44-bit",
            BitWidth::FortyEight => "48-bit",
        }
    }

    fn generate(&self, bssid: &str, _ssid: Option<&str>) -> AlgorithmResult<String> {
        let normalized = normalized_mac(bssid)?;

        let payload = if self.width == BitWidth::ThirtyTwo {
            // 32-bit folds the top nibble in with a fixed multiplier
            let low = mac::parse_hex_or(&normalized[5..12], 0) % PIN_MODULO;
            let high = mac::parse_hex_or(&normalized[4..5], 0);
            (high * 8_435_456 + low) % PIN_MODULO
        } else {
            let slice = &normalized[self.width.start_index()..12];
            (mac::parse_hex_u64_or(slice, 1234567) % u64::from(PIN_MODULO)) as u32
        };

        Ok(format_with_checksum(payload))
    }
}
