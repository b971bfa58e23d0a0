/*!
 * MAC-prefix lookups: vendor names and known default PINs
 *
 * Both stores are external key lookups. The traits are the seam; the
 * in-memory implementations serve tests and JSON-backed setups.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::mac;

/// OUI prefix → manufacturer name
#[async_trait]
pub trait VendorLookup: Send + Sync {
    /// `Ok(None)` on a miss
    async fn vendor_for(&self, bssid: &str) -> Result<Option<String>>;
}

/// OUI prefix → ordered default PINs
#[async_trait]
pub trait PinDatabase: Send + Sync {
    /// Empty on a miss, in store order otherwise
    async fn pins_for(&self, bssid: &str) -> Result<Vec<String>>;
}

/// Vendor table keyed by uppercase 6-hex-digit prefix
#[derive(Debug, Clone, Default)]
pub struct InMemoryVendorLookup {
    vendors: HashMap<String, String>,
}

impl InMemoryVendorLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// `prefix` may be written with separators, e.g. `"C8:3A:35"`
    pub fn with_vendor(mut self, prefix: &str, vendor: impl Into<String>) -> Self {
        if let Some(key) = mac::oui_prefix(prefix) {
            self.vendors.insert(key, vendor.into());
        }
        self
    }

    /// Load a JSON prefix → vendor name file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let table: HashMap<String, String> = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;

        Ok(table
            .into_iter()
            .fold(Self::new(), |lookup, (prefix, vendor)| {
                lookup.with_vendor(&prefix, vendor)
            }))
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}

#[async_trait]
impl VendorLookup for InMemoryVendorLookup {
    async fn vendor_for(&self, bssid: &str) -> Result<Option<String>> {
        Ok(mac::oui_prefix(bssid).and_then(|prefix| self.vendors.get(&prefix).cloned()))
    }
}

/// Default-PIN table keyed by lowercase 6-hex-digit prefix
#[derive(Debug, Clone)]
pub struct InMemoryPinDatabase {
    pins: HashMap<String, Vec<String>>,
    max_pins: usize,
}

/// On-disk layout: `{"c83a35": ["12345670", ...], ...}`
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct PinDatabaseFile(HashMap<String, Vec<String>>);

impl InMemoryPinDatabase {
    pub fn new(max_pins: usize) -> Self {
        Self {
            pins: HashMap::new(),
            max_pins,
        }
    }

    pub fn with_pins<I, S>(mut self, prefix: &str, pins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(key) = Self::key(prefix) {
            self.pins
                .entry(key)
                .or_default()
                .extend(pins.into_iter().map(Into::into));
        }
        self
    }

    /// Load a JSON prefix → PIN list file
    pub fn from_json_file(path: &Path, max_pins: usize) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file: PinDatabaseFile = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;

        Ok(file
            .0
            .into_iter()
            .fold(Self::new(max_pins), |db, (prefix, pins)| {
                db.with_pins(&prefix, pins)
            }))
    }

    fn key(mac_or_prefix: &str) -> Option<String> {
        mac::oui_prefix(mac_or_prefix).map(|p| p.to_ascii_lowercase())
    }
}

#[async_trait]
impl PinDatabase for InMemoryPinDatabase {
    async fn pins_for(&self, bssid: &str) -> Result<Vec<String>> {
        let pins = Self::key(bssid)
            .and_then(|key| self.pins.get(&key))
            .map(|pins| pins.iter().take(self.max_pins).cloned().collect())
            .unwrap_or_default();
        Ok(pins)
    }
}
