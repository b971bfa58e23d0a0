/*!
 * Engine configuration
 *
 * Loaded from a JSON file. Every field has a default, so a partial file (or
 * no file at all) is valid.
 */

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::checksum::is_valid_pin;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name of the iw binary (or path to it)
    pub iw_binary: String,

    /// Directory holding a bundled iw and its shared libraries.
    /// When set, iw runs from there with `LD_LIBRARY_PATH` pointing at it.
    pub iw_library_dir: Option<PathBuf>,

    /// Interface used when no `wlan*` interface is found
    pub default_interface: String,

    /// Appended to every candidate list unless already present
    pub fallback_pin: String,

    /// Cap on PINs taken from the static database per MAC prefix
    pub max_database_pins: usize,

    /// Directory of `<BSSID>serial` files for serial-based algorithms
    pub serial_dir: Option<PathBuf>,

    /// SSID shown for networks that do not broadcast one
    pub hidden_ssid_label: String,

    /// JSON file mapping MAC prefix to default PINs
    pub pin_database_path: Option<PathBuf>,

    /// JSON file mapping MAC prefix to vendor name
    pub vendor_database_path: Option<PathBuf>,

    /// Wrapper for privileged commands, e.g. `["su", "-c"]`; empty runs directly
    pub privilege_prefix: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iw_binary: "iw".to_string(),
            iw_library_dir: None,
            default_interface: "wlan0".to_string(),
            fallback_pin: "12345670".to_string(),
            max_database_pins: 8,
            serial_dir: None,
            hidden_ssid_label: "*Hidden Network*".to_string(),
            pin_database_path: None,
            vendor_database_path: None,
            privilege_prefix: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing config")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_pin(&self.fallback_pin) {
            bail!(
                "fallback_pin '{}' must be 8 digits with a valid checksum",
                self.fallback_pin
            );
        }
        if self.iw_binary.trim().is_empty() {
            bail!("iw_binary must not be empty");
        }
        if self.default_interface.trim().is_empty() {
            bail!("default_interface must not be empty");
        }
        Ok(())
    }
}
