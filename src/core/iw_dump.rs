/*!
 * `iw dev <iface> scan dump` WPS parser
 *
 * The dump is a sequence of `BSS <mac>(on <iface>)` stanzas. Inside each,
 * the WPS element looks like:
 *
 * ```text
 *     WPS:     * Version: 1.0
 *              * Wi-Fi Protected Setup State: 2 (Configured)
 *              * Manufacturer: Broadcom
 *              * Model: Broadcom
 *              * Model Number: 123456
 *              * Device name: BroadcomAP
 *              * Config methods: 0x008c
 * ```
 *
 * Only stanzas with a WPS state line produce an entry. Lines the parser does
 * not recognise are skipped; the dump format is not stable across iw builds.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::EngineConfig;
use super::shell::{ShellCommand, ShellExecutor};
use super::wps::WpsDetail;

static BSS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^BSS ([0-9a-fA-F]{2}(?::[0-9a-fA-F]{2}){5})").unwrap());
static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").unwrap());
static HEX_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"0x([0-9a-fA-F]+)").unwrap());

const WPS_STATE_PREFIX: &str = "* Wi-Fi Protected Setup State:";
const CONFIG_METHODS_PREFIX: &str = "* Config methods:";
const DEVICE_NAME_PREFIX: &str = "* Device name:";
const MANUFACTURER_PREFIX: &str = "* Manufacturer:";
const MODEL_PREFIX: &str = "* Model:";
const MODEL_NUMBER_PREFIX: &str = "* Model Number:";

/// Fields collected for the stanza currently being read
#[derive(Debug, Default)]
struct BssAccumulator {
    bssid: String,
    wps_state: Option<u32>,
    config_methods: Option<u16>,
    device_name: Option<String>,
    manufacturer: Option<String>,
    model_name: Option<String>,
    model_number: Option<String>,
}

impl BssAccumulator {
    fn new(bssid: &str) -> Self {
        Self {
            bssid: bssid.to_ascii_uppercase(),
            ..Default::default()
        }
    }

    fn absorb(&mut self, line: &str) {
        if line.starts_with(WPS_STATE_PREFIX) {
            self.wps_state = FIRST_NUMBER
                .captures(line)
                .and_then(|c| c[1].parse().ok());
        } else if line.starts_with(CONFIG_METHODS_PREFIX) {
            self.config_methods = Some(parse_config_methods(line));
        } else if line.starts_with(DEVICE_NAME_PREFIX) {
            self.device_name = field_value(line);
        } else if line.starts_with(MANUFACTURER_PREFIX) {
            self.manufacturer = field_value(line);
        } else if line.starts_with(MODEL_PREFIX) {
            self.model_name = field_value(line);
        } else if line.starts_with(MODEL_NUMBER_PREFIX) {
            self.model_number = field_value(line);
        }
    }

    /// `None` when the stanza had no WPS state line
    fn finish(self) -> Option<(String, WpsDetail)> {
        self.wps_state?;

        let detail = WpsDetail {
            device_name: self.device_name,
            manufacturer: self.manufacturer,
            model_name: self.model_name,
            model_number: self.model_number,
            ..WpsDetail::from_config_methods(self.config_methods.unwrap_or(0))
        };
        debug!(
            bssid = %self.bssid,
            pbc = detail.pbc_supported,
            pin = detail.pin_supported,
            config_methods = self.config_methods.unwrap_or(0),
            "WPS element found"
        );
        Some((self.bssid, detail))
    }
}

/// Text after the first ':' (trimmed), `None` when empty
fn field_value(line: &str) -> Option<String> {
    line.split_once(':')
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// First `0x...` token as a bitmask, 0 when absent or unparseable
fn parse_config_methods(line: &str) -> u16 {
    HEX_TOKEN
        .captures(line)
        .and_then(|c| u32::from_str_radix(&c[1], 16).ok())
        .map(|bits| (bits & 0xffff) as u16)
        .unwrap_or(0)
}

/// Parse dump lines into a map keyed by uppercased BSSID
pub fn parse_scan_dump<S: AsRef<str>>(lines: &[S]) -> HashMap<String, WpsDetail> {
    let mut result = HashMap::new();
    let mut current: Option<BssAccumulator> = None;

    for raw in lines {
        let trimmed = raw.as_ref().trim();

        if let Some(caps) = BSS_HEADER.captures(trimmed) {
            if let Some((bssid, detail)) = current.take().and_then(BssAccumulator::finish) {
                result.insert(bssid, detail);
            }
            current = Some(BssAccumulator::new(&caps[1]));
            continue;
        }

        // The first WPS attribute shares its line with the "WPS:" element tag
        let field = trimmed
            .strip_prefix("WPS:")
            .map(str::trim_start)
            .unwrap_or(trimmed);

        if let Some(acc) = current.as_mut() {
            acc.absorb(field);
        }
    }

    if let Some((bssid, detail)) = current.and_then(BssAccumulator::finish) {
        result.insert(bssid, detail);
    }

    debug!(lines = lines.len(), networks = result.len(), "parsed scan dump");
    result
}

/// Convenience wrapper over [`parse_scan_dump`] for a whole text blob
pub fn parse_scan_dump_text(text: &str) -> HashMap<String, WpsDetail> {
    let lines: Vec<&str> = text.lines().collect();
    parse_scan_dump(&lines)
}

/// Provider of the authoritative BSSID → WPS map
#[async_trait]
pub trait WpsDumpSource: Send + Sync {
    /// Never fails: problems yield an empty map
    async fn fetch_wps_map(&self) -> HashMap<String, WpsDetail>;
}

/// Runs iw through the privileged shell
pub struct IwDumpSource {
    shell: Arc<dyn ShellExecutor>,
    iw_binary: String,
    library_dir: Option<PathBuf>,
    default_interface: String,
}

impl IwDumpSource {
    pub fn new(shell: Arc<dyn ShellExecutor>, config: &EngineConfig) -> Self {
        Self {
            shell,
            iw_binary: config.iw_binary.clone(),
            library_dir: config.iw_library_dir.clone(),
            default_interface: config.default_interface.clone(),
        }
    }

    /// Bundled binaries must exist in the library dir; a bare name is assumed on PATH
    pub async fn is_binary_available(&self) -> bool {
        match &self.library_dir {
            Some(dir) => tokio::fs::metadata(dir.join(&self.iw_binary))
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            None => true,
        }
    }

    /// First `wlan*` entry of `/sys/class/net`, else the configured default
    pub async fn wireless_interface(&self) -> String {
        let listing = self
            .shell
            .execute(&ShellCommand::new("ls").arg("/sys/class/net/"))
            .await;

        match listing {
            Ok(output) if output.success => output
                .stdout_lines
                .iter()
                .flat_map(|line| line.split_whitespace())
                .find(|name| name.starts_with("wlan"))
                .map(str::to_string)
                .unwrap_or_else(|| self.default_interface.clone()),
            Ok(_) => self.default_interface.clone(),
            Err(e) => {
                warn!("failed to list network interfaces: {:#}", e);
                self.default_interface.clone()
            }
        }
    }

    fn dump_command(&self, interface: &str) -> ShellCommand {
        let command = ShellCommand::new(&self.iw_binary).args(["dev", interface, "scan", "dump"]);
        match &self.library_dir {
            Some(dir) => command.in_library_dir(dir),
            None => command,
        }
    }

    /// Run the dump and return its raw stdout lines
    pub async fn dump_lines(&self) -> Result<Vec<String>> {
        let interface = self.wireless_interface().await;
        let command = self.dump_command(&interface);

        let output = self
            .shell
            .execute(&command)
            .await
            .context("iw scan dump could not be started")?;

        if !output.success {
            anyhow::bail!("iw scan dump failed: {}", output.stderr_lines.join("\n"));
        }
        if output.stdout_lines.is_empty() {
            warn!(%interface, "iw scan dump returned no output");
        }
        Ok(output.stdout_lines)
    }
}

#[async_trait]
impl WpsDumpSource for IwDumpSource {
    async fn fetch_wps_map(&self) -> HashMap<String, WpsDetail> {
        if !self.is_binary_available().await {
            debug!(binary = %self.iw_binary, "iw binary not available");
            return HashMap::new();
        }

        match self.dump_lines().await {
            Ok(lines) => parse_scan_dump(&lines),
            Err(e) => {
                warn!("{:#}", e);
                HashMap::new()
            }
        }
    }
}

/// Reads a previously captured dump from disk
pub struct FileDumpSource {
    path: PathBuf,
}

impl FileDumpSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WpsDumpSource for FileDumpSource {
    async fn fetch_wps_map(&self) -> HashMap<String, WpsDetail> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => parse_scan_dump_text(&text),
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read dump: {}", e);
                HashMap::new()
            }
        }
    }
}
