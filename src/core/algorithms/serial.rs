/*!
 * Serial-number based algorithms (Belkin, Orange/Livebox)
 *
 * These need the device serial number in addition to the BSSID. Serials are
 * never part of a scan result, so they come from a pluggable [`SerialSource`].
 */

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use super::{normalized_mac, WpsAlgorithm};
use crate::core::checksum::{format_with_checksum, PIN_MODULO};
use crate::core::error::{AlgorithmError, AlgorithmResult};
use crate::core::mac;

const MIN_SERIAL_LEN: usize = 4;

/// Provides the serial number printed on a device, keyed by BSSID
pub trait SerialSource: Send + Sync {
    fn serial_for(&self, bssid: &str) -> Result<String>;
}

/// Reads `<dir>/<bssid>serial`, first line only
#[derive(Debug, Clone)]
pub struct DirectorySerialSource {
    dir: PathBuf,
}

impl DirectorySerialSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SerialSource for DirectorySerialSource {
    fn serial_for(&self, bssid: &str) -> Result<String> {
        let path = self.dir.join(format!("{}serial", bssid));
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read serial file {}", path.display()))?;

        let serial = content.lines().next().unwrap_or("").trim();
        if serial.is_empty() {
            bail!("Serial file {} is empty", path.display());
        }
        Ok(serial.to_string())
    }
}

/// Fixed BSSID → serial table
#[derive(Debug, Clone, Default)]
pub struct StaticSerialSource {
    serials: HashMap<String, String>,
}

impl StaticSerialSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a serial; the BSSID is matched in canonical form
    pub fn with_serial(mut self, bssid: &str, serial: impl Into<String>) -> Self {
        let key = mac::canonical(bssid).unwrap_or_else(|| bssid.to_string());
        self.serials.insert(key, serial.into());
        self
    }
}

impl SerialSource for StaticSerialSource {
    fn serial_for(&self, bssid: &str) -> Result<String> {
        let key = mac::canonical(bssid).unwrap_or_else(|| bssid.to_string());
        self.serials
            .get(&key)
            .cloned()
            .with_context(|| format!("No serial known for {}", bssid))
    }
}

/// Source that never has a serial
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSerialSource;

impl SerialSource for NoSerialSource {
    fn serial_for(&self, bssid: &str) -> Result<String> {
        bail!("No serial source configured (requested {})", bssid)
    }
}

/// Serial for `bssid`, at least [`MIN_SERIAL_LEN`] characters long.
/// Characters are counted, not bytes; non-hex characters weigh 0 later.
fn fetch_serial(source: &dyn SerialSource, bssid: &str) -> AlgorithmResult<String> {
    let serial = source
        .serial_for(bssid)
        .map_err(|e| AlgorithmError::SerialUnavailable {
            bssid: bssid.to_string(),
            reason: format!("{:#}", e),
        })?;

    if serial.chars().count() < MIN_SERIAL_LEN {
        return Err(AlgorithmError::SerialTooShort {
            min_len: MIN_SERIAL_LEN,
        });
    }
    Ok(serial)
}

fn validate_with_serial(source: &dyn SerialSource, bssid: &str) -> AlgorithmResult<()> {
    normalized_mac(bssid)?;
    fetch_serial(source, bssid).map(|_| ())
}

/// Hex value of each character of `s`, non-hex characters count as 0
fn nibbles(s: &str) -> Vec<u32> {
    s.chars().map(|c| c.to_digit(16).unwrap_or(0)).collect()
}

/// Last four hex nibbles of `s`, most significant first
fn last_four_nibbles(s: &str) -> [u32; 4] {
    let values = nibbles(s);
    let offset = values.len().saturating_sub(4);
    std::array::from_fn(|i| values.get(offset + i).copied().unwrap_or(0))
}

/// Belkin: mixes the last four serial digits with the last four BSSID digits
pub struct BelkinAlgorithm {
    serials: Arc<dyn SerialSource>,
}

impl BelkinAlgorithm {
    pub fn new(serials: Arc<dyn SerialSource>) -> Self {
        Self { serials }
    }
}

impl WpsAlgorithm for BelkinAlgorithm {
    fn name(&self) -> &'static str {
        "Belkin"
    }

    fn validate(&self, bssid: &str, _ssid: Option<&str>) -> AlgorithmResult<()> {
        validate_with_serial(self.serials.as_ref(), bssid)
    }

    fn generate(&self, bssid: &str, _ssid: Option<&str>) -> AlgorithmResult<String> {
        let normalized = normalized_mac(bssid)?;
        let serial = fetch_serial(self.serials.as_ref(), bssid)?;

        let sn = last_four_nibbles(&serial);
        let nic = last_four_nibbles(&normalized);

        let mut k1 = (sn[2] + sn[3] + nic[0] + nic[1]) % 16;
        let k2 = (sn[0] + sn[1] + nic[3] + nic[2]) % 16;

        let mut pin = k1 ^ sn[1];
        let t1 = k1 ^ sn[0];
        let t2 = k2 ^ nic[1];
        let p1 = nic[0] ^ sn[1] ^ t1;
        let p2 = k2 ^ nic[0] ^ t2;
        let p3 = k1 ^ sn[2] ^ k2 ^ nic[2];
        k1 ^= k2;

        pin = (pin ^ k1) * 16;
        for x in [t1, p1, t2, p2, k1] {
            pin = (pin ^ x) * 16;
        }
        pin += p3;

        Ok(format_with_checksum(pin % PIN_MODULO))
    }
}

/// Orange Livebox (Arcadyan): serial tail mixed with the derived WAN MAC
pub struct OrangeAlgorithm {
    serials: Arc<dyn SerialSource>,
}

impl OrangeAlgorithm {
    pub fn new(serials: Arc<dyn SerialSource>) -> Self {
        Self { serials }
    }

    /// Low hex digit of a nibble sum (the sum itself when it is one digit)
    fn low_hex_digit(sum: u32) -> u32 {
        sum % 16
    }
}

impl WpsAlgorithm for OrangeAlgorithm {
    fn name(&self) -> &'static str {
        "Orange"
    }

    fn validate(&self, bssid: &str, _ssid: Option<&str>) -> AlgorithmResult<()> {
        validate_with_serial(self.serials.as_ref(), bssid)
    }

    fn generate(&self, bssid: &str, _ssid: Option<&str>) -> AlgorithmResult<String> {
        normalized_mac(bssid)?;
        let serial = fetch_serial(self.serials.as_ref(), bssid)?;

        let wan = mac::last_two_bytes_wan(bssid);
        let sh = last_four_nibbles(&serial);
        let wh: [u32; 4] = {
            let values = nibbles(&wan);
            std::array::from_fn(|i| values.get(i).copied().unwrap_or(0))
        };

        // The sums stay below 0x3d, so the second hex digit is the low nibble
        let k1 = Self::low_hex_digit(sh[0] + sh[1] + wh[2] + wh[3]);
        let k2 = Self::low_hex_digit(sh[2] + sh[3] + wh[0] + wh[1]);

        let digits = [
            sh[3] ^ k1,
            sh[2] ^ k1,
            wh[1] ^ k2,
            wh[2] ^ k2,
            sh[3] ^ wh[2],
            sh[2] ^ wh[3],
            sh[1] ^ k1,
        ];
        let hex_pin: String = digits.iter().map(|d| format!("{:x}", d)).collect();

        let payload = mac::parse_hex_or(&hex_pin, 1234567) % PIN_MODULO;
        Ok(format_with_checksum(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn source() -> Arc<dyn SerialSource> {
        Arc::new(
            StaticSerialSource::new()
                .with_serial("00:11:22:33:44:55", "12345678")
                .with_serial("AA:BB:CC:DD:EE:FF", "A1B2C3")
                .with_serial("14:CC:20:0A:0B:0C", "AB"),
        )
    }

    #[test]
    fn test_belkin_known_vector() {
        let algo = BelkinAlgorithm::new(source());
        assert!(algo.validate("00:11:22:33:44:55", None).is_ok());
        assert_eq!(algo.generate("00:11:22:33:44:55", None).unwrap(), "24329286");
    }

    #[test]
    fn test_orange_known_vectors() {
        let serials: Arc<dyn SerialSource> = Arc::new(
            StaticSerialSource::new()
                .with_serial("00:11:22:33:44:55", "A1B2C3")
                .with_serial("AA:BB:CC:DD:EE:FF", "A1B2C3")
                .with_serial("00:00:00:00:00:00", "A1B2C3"),
        );
        let algo = OrangeAlgorithm::new(serials);
        assert_eq!(algo.generate("00:11:22:33:44:55", None).unwrap(), "03070635");
        assert_eq!(algo.generate("AA:BB:CC:DD:EE:FF", None).unwrap(), "33622033");
        // WAN wraps to fffe
        assert_eq!(algo.generate("00:00:00:00:00:00", None).unwrap(), "74287765");
    }

    #[test]
    fn test_missing_or_short_serial_is_rejected() {
        let belkin = BelkinAlgorithm::new(source());
        match belkin.validate("C8:3A:35:12:34:56", None) {
            Err(AlgorithmError::SerialUnavailable { bssid, reason }) => {
                assert_eq!(bssid, "C8:3A:35:12:34:56");
                assert!(reason.contains("No serial known"), "{}", reason);
            }
            other => panic!("unexpected result {:?}", other),
        }

        let orange = OrangeAlgorithm::new(source());
        assert_eq!(
            orange.validate("14:CC:20:0A:0B:0C", None),
            Err(AlgorithmError::SerialTooShort { min_len: 4 })
        );

        let none = BelkinAlgorithm::new(Arc::new(NoSerialSource));
        assert!(none.validate("00:11:22:33:44:55", None).is_err());
    }

    #[test]
    fn test_directory_error_keeps_its_cause() {
        let dir = TempDir::new().unwrap();
        let belkin = BelkinAlgorithm::new(Arc::new(DirectorySerialSource::new(dir.path())));

        let err = belkin.validate("00:11:22:33:44:55", None).unwrap_err();
        assert!(err.to_string().contains("Failed to read serial file"), "{}", err);
    }

    #[test]
    fn test_non_ascii_serial_counts_characters() {
        // Non-hex characters weigh 0, so these match the all-hex serials
        let serials: Arc<dyn SerialSource> = Arc::new(
            StaticSerialSource::new()
                .with_serial("00:11:22:33:44:55", "Ä234")
                .with_serial("AA:BB:CC:DD:EE:FF", "ÄB2C3"),
        );
        let reference: Arc<dyn SerialSource> = Arc::new(
            StaticSerialSource::new()
                .with_serial("00:11:22:33:44:55", "0234")
                .with_serial("AA:BB:CC:DD:EE:FF", "A1B2C3"),
        );

        let belkin = BelkinAlgorithm::new(serials.clone());
        assert!(belkin.validate("00:11:22:33:44:55", None).is_ok());
        assert_eq!(
            belkin.generate("00:11:22:33:44:55", None).unwrap(),
            BelkinAlgorithm::new(reference.clone())
                .generate("00:11:22:33:44:55", None)
                .unwrap()
        );

        let orange = OrangeAlgorithm::new(serials);
        assert!(orange.validate("AA:BB:CC:DD:EE:FF", None).is_ok());
        assert_eq!(
            orange.generate("AA:BB:CC:DD:EE:FF", None).unwrap(),
            OrangeAlgorithm::new(reference)
                .generate("AA:BB:CC:DD:EE:FF", None)
                .unwrap()
        );

        // Three characters, six bytes
        let short = BelkinAlgorithm::new(Arc::new(
            StaticSerialSource::new().with_serial("00:11:22:33:44:55", "ÄÖÜ"),
        ));
        assert_eq!(
            short.validate("00:11:22:33:44:55", None),
            Err(AlgorithmError::SerialTooShort { min_len: 4 })
        );
    }

    #[test]
    fn test_directory_source_reads_first_line() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("00:11:22:33:44:55serial"), "  12345678 \nignored\n").unwrap();
        fs::write(dir.path().join("AA:BB:CC:DD:EE:FFserial"), "\n").unwrap();

        let source = DirectorySerialSource::new(dir.path());
        assert_eq!(source.serial_for("00:11:22:33:44:55").unwrap(), "12345678");
        assert!(source.serial_for("AA:BB:CC:DD:EE:FF").is_err());
        assert!(source.serial_for("C8:3A:35:12:34:56").is_err());

        let belkin = BelkinAlgorithm::new(Arc::new(source));
        assert_eq!(
            belkin.generate("00:11:22:33:44:55", None).unwrap(),
            "24329286"
        );
    }

    #[test]
    fn test_static_source_matches_any_mac_form() {
        let source = StaticSerialSource::new().with_serial("aa-bb-cc-dd-ee-ff", "XYZ9");
        assert_eq!(source.serial_for("AA:BB:CC:DD:EE:FF").unwrap(), "XYZ9");
        assert_eq!(source.serial_for("aabbccddeeff").unwrap(), "XYZ9");
    }
}
