/*!
 * WPS PIN checksum
 *
 * The eighth digit of a WPS PIN is a check digit over the first seven,
 * weighted 3,1,3,1,3,1,3 from the most significant digit. Only 10^7 of the
 * 10^8 possible PINs carry a valid check digit.
 */

/// Largest 7-digit payload plus one
pub const PIN_MODULO: u32 = 10_000_000;

/// Calculate the check digit for a 7-digit payload (`d1..d7`, `d1` most significant)
///
/// # Arguments
/// * `payload` - 7-digit PIN without checksum; higher digits are ignored
///
/// # Returns
/// Checksum digit (0-9)
pub fn calculate_wps_checksum(payload: u32) -> u8 {
    checksum_premultiplied(u64::from(payload % PIN_MODULO) * 10)
}

/// Same computation over a payload that was already shifted left by one
/// decimal digit (`payload * 10`), reading digits from 10^7 down to 10^1.
pub fn checksum_premultiplied(pin: u64) -> u8 {
    let mut accum = 0u64;
    accum += 3 * ((pin / 10_000_000) % 10);
    accum += (pin / 1_000_000) % 10;
    accum += 3 * ((pin / 100_000) % 10);
    accum += (pin / 10_000) % 10;
    accum += 3 * ((pin / 1_000) % 10);
    accum += (pin / 100) % 10;
    accum += 3 * ((pin / 10) % 10);

    ((10 - (accum % 10)) % 10) as u8
}

/// Format a payload as the full 8-digit PIN string
pub fn format_with_checksum(payload: u32) -> String {
    let payload = payload % PIN_MODULO;
    format!("{:07}{}", payload, calculate_wps_checksum(payload))
}

/// Format a payload as `"PPPPPPPC --name"`
pub fn format_labeled(payload: u32, algorithm_name: &str) -> String {
    format!("{} --{}", format_with_checksum(payload), algorithm_name)
}

/// True for an 8-digit numeric string whose last digit matches its checksum
pub fn is_valid_pin(pin: &str) -> bool {
    if pin.len() != 8 || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match (pin[..7].parse::<u32>(), pin[7..].parse::<u8>()) {
        (Ok(payload), Ok(check)) => calculate_wps_checksum(payload) == check,
        _ => false,
    }
}
