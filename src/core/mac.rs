/*!
 * MAC address helpers
 *
 * BSSIDs arrive either colon-delimited (`aa:bb:cc:dd:ee:ff`) or as a bare
 * 12-digit hex string. Every helper here accepts both forms.
 */

/// True when the address holds exactly 12 hex digits once colons are removed
pub fn is_valid_mac(mac: &str) -> bool {
    let normalized = mac.replace(':', "");
    normalized.len() == 12 && normalized.chars().all(|c| c.is_ascii_hexdigit())
}

/// Strip colons and uppercase
pub fn normalize(mac: &str) -> String {
    mac.replace(':', "").to_ascii_uppercase()
}

/// Canonical colon-delimited uppercase form used as a map key.
/// Returns `None` for anything that is not a 12-hex-digit address.
pub fn canonical(mac: &str) -> Option<String> {
    let normalized = normalize(&mac.replace('-', ":"));
    if !is_valid_mac(&normalized) {
        return None;
    }
    let octets: Vec<&str> = (0..6).map(|i| &normalized[i * 2..i * 2 + 2]).collect();
    Some(octets.join(":"))
}

/// Last three octets as six hex characters (NIC part).
/// Short input is returned whole, normalized.
pub fn last_three_bytes(mac: &str) -> String {
    let normalized = normalize(mac);
    match normalized.get(6..12) {
        Some(nic) if normalized.len() >= 12 => nic.to_string(),
        _ => normalized,
    }
}

/// Split into six two-character octets, padding missing ones with "00"
pub fn split_bytes(mac: &str) -> [String; 6] {
    let normalized = normalize(mac);
    std::array::from_fn(|i| {
        let start = i * 2;
        normalized
            .get(start..start + 2)
            .map(str::to_string)
            .unwrap_or_else(|| "00".to_string())
    })
}

/// Derive the last two bytes of the WAN MAC from the wireless MAC.
///
/// ISP boxes usually expose the WAN interface two addresses below the radio;
/// `0000` and `0001` wrap around to `fffe` and `ffff`.
pub fn last_two_bytes_wan(mac: &str) -> String {
    let normalized = normalize(mac);
    if normalized.len() < 12 || !normalized.is_ascii() {
        return "0000".to_string();
    }

    let wimac = &normalized[8..12];
    match wimac {
        "0000" => "fffe".to_string(),
        "0001" => "ffff".to_string(),
        _ => match i32::from_str_radix(&wimac[3..4], 16) {
            // Negative values print as 32-bit two's complement; only the
            // first four characters of the result are ever consumed.
            Ok(last) => format!("{}{:x}", &wimac[0..3], last - 2),
            Err(_) => wimac.to_string(),
        },
    }
}

/// OUI prefix: first six normalized hex digits, `None` when too short
pub fn oui_prefix(mac: &str) -> Option<String> {
    let normalized = normalize(&mac.replace('-', ""));
    normalized.get(0..6).map(str::to_string)
}

/// Parse a hex string, falling back to `default` on any parse failure
pub fn parse_hex_or(hex: &str, default: u32) -> u32 {
    u32::from_str_radix(hex, 16).unwrap_or(default)
}

/// 64-bit variant of [`parse_hex_or`] for the 40/44/48-bit slices
pub fn parse_hex_u64_or(hex: &str, default: u64) -> u64 {
    u64::from_str_radix(hex, 16).unwrap_or(default)
}
