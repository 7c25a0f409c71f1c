// Licensed under the Apache-2.0 license

//! CPU pin name decomposition.
//!
//! CPU pins are named `P<port>_<index>`, e.g. `P17_0`. Both numbers are
//! plain decimal and may have any number of digits.

use crate::error::{PinGenError, Result};

/// Splits a CPU pin name into its `(port, index)` pair.
///
/// # Examples
/// ```
/// use mcu_pins_generator::name::decompose_pin_name;
/// assert_eq!(decompose_pin_name("P17_0").unwrap(), (17, 0));
/// assert_eq!(decompose_pin_name("P123_45").unwrap(), (123, 45));
/// assert!(decompose_pin_name("P170").is_err());
/// ```
pub fn decompose_pin_name(name: &str) -> Result<(u32, u32)> {
    let malformed = || PinGenError::MalformedPinName {
        name: name.to_string(),
    };

    let rest = name.strip_prefix('P').ok_or_else(malformed)?;
    let (port, index) = rest.split_once('_').ok_or_else(malformed)?;
    Ok((
        parse_decimal(port).ok_or_else(malformed)?,
        parse_decimal(index).ok_or_else(malformed)?,
    ))
}

/// Parses a non-empty run of ASCII digits. Signs and whitespace are rejected,
/// which `str::parse` alone would partly accept.
pub(crate) fn parse_decimal(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
