/*!
 * Network records built from scan samples
 *
 * A `NetworkRecord` stores what the scan reported plus the resolved vendor
 * and WPS detail. Channel, band, distance and security are computed on
 * demand from those fields.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use super::wps::WpsDetail;

/// Free-space path-loss constant for MHz and metres
const DISTANCE_MHZ_M: f64 = 27.55;

/// One raw entry from the platform scan API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEntry {
    pub bssid: String,
    #[serde(default)]
    pub ssid: String,
    /// dBm, usually negative
    pub signal_level: i32,
    /// MHz
    pub frequency: i32,
    #[serde(default)]
    pub capabilities: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityType {
    Open,
    Wep,
    Wpa,
    Wpa2,
    WpaWpa2,
    Wpa3,
    Owe,
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Open => "Open",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::Wpa2 => "WPA2",
            Self::WpaWpa2 => "WPA/WPA2",
            Self::Wpa3 => "WPA3",
            Self::Owe => "OWE",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiBand {
    Band2_4GHz,
    Band5GHz,
    Band6GHz,
    Unknown,
}

impl fmt::Display for WifiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Band2_4GHz => "2.4 GHz",
            Self::Band5GHz => "5 GHz",
            Self::Band6GHz => "6 GHz",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalStrength {
    Weak,
    Fair,
    Good,
    Excellent,
}

impl SignalStrength {
    pub fn from_dbm(level: i32) -> Self {
        match level {
            l if l >= -50 => Self::Excellent,
            l if l >= -60 => Self::Good,
            l if l >= -70 => Self::Fair,
            _ => Self::Weak,
        }
    }
}

/// Channel number for a frequency, -1 when outside the known bands
pub fn frequency_to_channel(frequency: i32) -> i32 {
    match frequency {
        2412..=2484 => (frequency - 2412) / 5 + 1,
        5170..=5825 => (frequency - 5170) / 5 + 34,
        5925..=7125 => (frequency - 5925) / 5 + 1,
        _ => -1,
    }
}

pub fn frequency_to_band(frequency: i32) -> WifiBand {
    match frequency {
        2412..=2484 => WifiBand::Band2_4GHz,
        5170..=5825 => WifiBand::Band5GHz,
        5925..=7125 => WifiBand::Band6GHz,
        _ => WifiBand::Unknown,
    }
}

/// Log-distance path-loss estimate in metres. An approximation only:
/// antenna gain, walls and transmit power are all ignored.
pub fn estimate_distance(frequency: i32, signal_level: i32) -> f64 {
    if frequency <= 0 {
        return f64::INFINITY;
    }
    let signal_dbm = f64::from(signal_level.unsigned_abs());
    let exponent = (DISTANCE_MHZ_M - 20.0 * f64::from(frequency).log10() + signal_dbm) / 20.0;
    10f64.powf(exponent)
}

/// True when `caps` holds a "WPA" that is not the start of "WPA2"/"WPA3"
fn has_plain_wpa(caps: &str) -> bool {
    caps.match_indices("WPA")
        .any(|(i, _)| !matches!(caps.as_bytes().get(i + 3), Some(b'2') | Some(b'3')))
}

/// Security class of a capability string, first match wins:
/// WPA3, WPA+WPA2, WPA2, WPA, WEP, OWE, else open
pub fn classify_security(capabilities: &str) -> SecurityType {
    let caps = capabilities.to_ascii_uppercase();
    let wpa2 = caps.contains("WPA2");
    let wpa = has_plain_wpa(&caps);

    if caps.contains("WPA3") {
        SecurityType::Wpa3
    } else if wpa2 && wpa {
        SecurityType::WpaWpa2
    } else if wpa2 {
        SecurityType::Wpa2
    } else if wpa {
        SecurityType::Wpa
    } else if caps.contains("WEP") {
        SecurityType::Wep
    } else if caps.contains("OWE") {
        SecurityType::Owe
    } else {
        SecurityType::Open
    }
}

/// Scanned access point with resolved vendor and WPS detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub bssid: String,
    pub ssid: String,
    pub signal_level: i32,
    pub frequency: i32,
    pub capabilities: String,
    pub vendor: String,
    pub is_hidden: bool,
    pub wps: Option<WpsDetail>,
}

impl NetworkRecord {
    /// Build from a scan sample. An empty SSID becomes `hidden_label`;
    /// a missing vendor becomes "Unknown".
    pub fn from_scan(
        entry: &ScanEntry,
        vendor: Option<String>,
        wps: Option<WpsDetail>,
        hidden_label: &str,
    ) -> Self {
        let is_hidden = entry.ssid.is_empty() || entry.ssid == hidden_label;
        let ssid = if entry.ssid.is_empty() {
            hidden_label.to_string()
        } else {
            entry.ssid.clone()
        };

        Self {
            bssid: entry.bssid.clone(),
            ssid,
            signal_level: entry.signal_level,
            frequency: entry.frequency,
            capabilities: entry.capabilities.clone(),
            vendor: vendor
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            is_hidden,
            wps,
        }
    }

    pub fn channel(&self) -> i32 {
        frequency_to_channel(self.frequency)
    }

    pub fn band(&self) -> WifiBand {
        frequency_to_band(self.frequency)
    }

    pub fn distance(&self) -> f64 {
        estimate_distance(self.frequency, self.signal_level)
    }

    pub fn security(&self) -> SecurityType {
        classify_security(&self.capabilities)
    }

    pub fn signal_strength(&self) -> SignalStrength {
        SignalStrength::from_dbm(self.signal_level)
    }

    /// WPS advertised in the capability string, whatever the dump says
    pub fn has_wps(&self) -> bool {
        self.capabilities.to_ascii_uppercase().contains("WPS")
    }

    pub fn is_wps_locked(&self) -> bool {
        self.wps.as_ref().map(|w| w.locked).unwrap_or(false)
    }

    /// SSID to hand to algorithms: `None` for hidden networks
    pub fn algorithm_ssid(&self) -> Option<&str> {
        if self.is_hidden {
            None
        } else {
            Some(&self.ssid)
        }
    }
}

/// WPS-capable networks first, then strongest signal first
pub fn sort_for_display(records: &mut [NetworkRecord]) {
    records.sort_by(|a, b| {
        b.has_wps()
            .cmp(&a.has_wps())
            .then_with(|| b.signal_level.cmp(&a.signal_level))
    });
}
