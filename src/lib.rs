/*!
 * wpsrecon - WPS reconnaissance and PIN candidate generation
 *
 * Classifies scanned access points (security, WPS posture) and builds a
 * prioritised list of WPS PINs to try against them.
 */

pub mod core;

pub use crate::core::*;
