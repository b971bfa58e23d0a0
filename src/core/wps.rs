/*!
 * WPS capability model
 *
 * A `WpsDetail` comes from one of two places:
 * - the scan capability string (heuristic, always available)
 * - an `iw ... scan dump` (authoritative, needs root)
 *
 * Only the authoritative source carries a config-methods bitmask, so only
 * it can say which pairing methods an access point really supports.
 */

use serde::{Deserialize, Serialize};

/// WPS pairing input method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WpsMethod {
    PushButton,
    Pin,
    Nfc,
}

/// Config-methods masks. A method is supported when any bit of its mask is set.
///
/// 0x0004 Label, 0x0008 Display, 0x0100 Keypad, 0x2008 Virtual Display PIN;
/// 0x0080 Push Button, 0x0280 Virtual PB, 0x0480 Physical PB;
/// 0x0010 / 0x0020 / 0x0040 NFC token and interface.
pub const PUSH_BUTTON_MASKS: [u16; 3] = [0x0080, 0x0280, 0x0480];
pub const PIN_MASKS: [u16; 4] = [0x0004, 0x0008, 0x0100, 0x2008];
pub const NFC_MASKS: [u16; 3] = [0x0010, 0x0020, 0x0040];

fn any_mask_set(config_methods: u16, masks: &[u16]) -> bool {
    masks.iter().any(|mask| config_methods & mask != 0)
}

/// Decoded config-methods bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigMethods {
    pub push_button: bool,
    pub pin: bool,
    pub nfc: bool,
}

impl ConfigMethods {
    /// Decode a raw bitmask; unknown bits are ignored
    pub fn decode(bits: u16) -> Self {
        Self {
            push_button: any_mask_set(bits, &PUSH_BUTTON_MASKS),
            pin: any_mask_set(bits, &PIN_MASKS),
            nfc: any_mask_set(bits, &NFC_MASKS),
        }
    }

    /// Supported methods in PushButton, Pin, Nfc order
    pub fn methods(&self) -> Vec<WpsMethod> {
        let mut methods = Vec::new();
        if self.push_button {
            methods.push(WpsMethod::PushButton);
        }
        if self.pin {
            methods.push(WpsMethod::Pin);
        }
        if self.nfc {
            methods.push(WpsMethod::Nfc);
        }
        methods
    }
}

/// WPS information for one access point
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WpsDetail {
    pub enabled: bool,
    pub pbc_supported: bool,
    pub pin_supported: bool,
    pub locked: bool,
    pub methods: Vec<WpsMethod>,
    pub device_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    pub model_number: Option<String>,
    /// True when the method flags come from a decoded config-methods bitmask
    pub from_authoritative_source: bool,
}

impl WpsDetail {
    /// Heuristic detail from a scan capability string.
    ///
    /// Missing `WPS-PBC` / `WPS-PIN` tokens mean "unknown", not "unsupported":
    /// scan APIs rarely emit them.
    pub fn from_capabilities(capabilities: &str) -> Self {
        let caps = capabilities.to_ascii_uppercase();

        let mut methods = Vec::new();
        if caps.contains("WPS-PBC") {
            methods.push(WpsMethod::PushButton);
        }
        if caps.contains("WPS-PIN") {
            methods.push(WpsMethod::Pin);
        }
        if caps.contains("WPS-NFC") {
            methods.push(WpsMethod::Nfc);
        }

        Self {
            enabled: caps.contains("WPS"),
            pbc_supported: caps.contains("WPS-PBC"),
            pin_supported: caps.contains("WPS-PIN"),
            locked: caps.contains("WPS-LOCKED"),
            methods,
            from_authoritative_source: false,
            ..Default::default()
        }
    }

    /// Authoritative detail from a decoded bitmask (`0` when the dump had none).
    /// Lock state is never reported by the dump, so it is always `false`.
    pub fn from_config_methods(config_methods: u16) -> Self {
        let decoded = ConfigMethods::decode(config_methods);
        Self {
            enabled: true,
            pbc_supported: decoded.push_button,
            pin_supported: decoded.pin,
            locked: false,
            methods: decoded.methods(),
            from_authoritative_source: true,
            ..Default::default()
        }
    }

    /// Short human label such as `"PBC+PIN"` or `"WPS (methods unknown)"`
    pub fn summary(&self) -> String {
        if !self.enabled {
            return "WPS disabled".to_string();
        }
        let labels: Vec<&str> = self
            .methods
            .iter()
            .map(|m| match m {
                WpsMethod::PushButton => "PBC",
                WpsMethod::Pin => "PIN",
                WpsMethod::Nfc => "NFC",
            })
            .collect();

        let mut summary = if labels.is_empty() {
            "WPS (methods unknown)".to_string()
        } else {
            labels.join("+")
        };
        if self.locked {
            summary.push_str(" [locked]");
        }
        summary
    }
}
