// Licensed under the Apache-2.0 license

//! Alternate function cell decoding.
//!
//! Every non-empty cell of the AF table names the peripheral signal routed
//! to a pin when its HSIOM selector is set to the cell's column index.
//! Cells are decoded into [`AlternateFunctionBinding`]s by a decoder chosen
//! from a [`DecoderRegistry`] by token prefix.
//!
//! ```text
//! column "ACT_3", cell "SCB3_I2C_SDA"
//!   -> af_index 3, peripheral SCB3, family I2C, instance 3, role SDA
//! ```

use crate::config::CapabilityTable;
use crate::error::{PinGenError, Result};
use crate::name::parse_decimal;

/// Highest HSIOM selector value. The selector is a 4-bit field.
pub const MAX_AF_INDEX: usize = 15;

/// Token prefix of the serial communication block.
pub const SCB_PREFIX: &str = "SCB";

/// One non-empty AF table cell, before decoding.
#[derive(Clone, Copy, Debug)]
pub struct AfCell<'a> {
    /// Column position relative to the first AF column.
    pub af_index: usize,
    /// Column label from the AF table header.
    pub raw_header: &'a str,
    /// Cell text, e.g. `SCB3_I2C_SDA`.
    pub peripheral_token: &'a str,
}

/// A peripheral signal routable to a pin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlternateFunctionBinding {
    pub af_index: u8,
    /// Function family, e.g. `I2C`.
    pub family: String,
    /// Peripheral instance number, when the peripheral is numbered.
    pub instance: Option<u32>,
    /// Signal role within the family, e.g. `SDA`.
    pub role: String,
    /// Column label, always `ACT_<af_index>`.
    pub raw_header: String,
    pub peripheral_token: String,
}

impl AlternateFunctionBinding {
    /// Whether the firmware can drive this function/role combination.
    pub fn is_supported(&self, capabilities: &CapabilityTable) -> bool {
        capabilities.supports(&self.family, &self.role)
    }

    /// The peripheral block the signal belongs to, e.g. `SCB3`.
    pub fn peripheral(&self) -> &str {
        self.peripheral_token
            .split('_')
            .next()
            .unwrap_or(&self.peripheral_token)
    }
}

/// Decodes a cell whose token starts with the registered prefix.
///
/// `Ok(None)` leaves the cell unclassified.
pub type DecodeFn = fn(&AfCell<'_>) -> Result<Option<AlternateFunctionBinding>>;

/// Peripheral token decoders keyed by token prefix.
///
/// New peripheral families are supported by registering a decoder; cells
/// whose token matches no prefix are ignored.
#[derive(Clone, Debug, Default)]
pub struct DecoderRegistry {
    decoders: Vec<(String, DecodeFn)>,
}

impl DecoderRegistry {
    /// Registry with the `SCB` decoder only.
    pub fn with_defaults() -> Self {
        Self::none().register(SCB_PREFIX, decode_scb)
    }

    /// Empty registry; every cell is left unclassified.
    pub fn none() -> Self {
        Self::default()
    }

    /// Register a decoder. A later registration for the same prefix replaces
    /// the earlier one.
    pub fn register(mut self, prefix: &str, decoder: DecodeFn) -> Self {
        self.decoders.retain(|(p, _)| p != prefix);
        self.decoders.push((prefix.to_string(), decoder));
        self
    }

    /// Find the decoder for a token. The longest matching prefix wins.
    pub fn lookup(&self, token: &str) -> Option<DecodeFn> {
        self.decoders
            .iter()
            .filter(|(prefix, _)| token.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, decoder)| *decoder)
    }
}

/// Decode one AF table cell.
///
/// Out-of-range selector values are skipped. The column label is checked
/// before the token is looked at, so misaligned tables fail even on cells
/// of unregistered families.
pub fn decode_cell(
    cell: &AfCell<'_>,
    registry: &DecoderRegistry,
) -> Result<Option<AlternateFunctionBinding>> {
    if cell.af_index > MAX_AF_INDEX {
        return Ok(None);
    }

    if cell.raw_header != format!("ACT_{}", cell.af_index) {
        return Err(PinGenError::MalformedAfHeader {
            header: cell.raw_header.to_string(),
            af_index: cell.af_index,
        });
    }

    match registry.lookup(cell.peripheral_token) {
        Some(decoder) => decoder(cell),
        None => {
            log::trace!(
                "{}: no decoder for '{}'",
                cell.raw_header,
                cell.peripheral_token
            );
            Ok(None)
        }
    }
}

/// Decoder for `SCB<n>_<family>_<role>` tokens.
pub fn decode_scb(cell: &AfCell<'_>) -> Result<Option<AlternateFunctionBinding>> {
    let parts: Vec<&str> = cell.peripheral_token.split('_').collect();
    let [peripheral, family, role] = parts.as_slice() else {
        log::debug!(
            "{}: '{}' is not a <block>_<function>_<signal> token",
            cell.raw_header,
            cell.peripheral_token
        );
        return Ok(None);
    };
    if family.is_empty() || role.is_empty() {
        return Ok(None);
    }

    let instance = peripheral
        .strip_prefix(SCB_PREFIX)
        .and_then(parse_decimal)
        .ok_or_else(|| PinGenError::MalformedPeripheralToken {
            token: cell.peripheral_token.to_string(),
            header: cell.raw_header.to_string(),
        })?;

    Ok(Some(AlternateFunctionBinding {
        // The range check in decode_cell keeps this lossless.
        af_index: cell.af_index as u8,
        family: family.to_string(),
        instance: Some(instance),
        role: role.to_string(),
        raw_header: cell.raw_header.to_string(),
        peripheral_token: cell.peripheral_token.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(
        af_index: usize,
        raw_header: &str,
        token: &str,
    ) -> Result<Option<AlternateFunctionBinding>> {
        decode_cell(
            &AfCell {
                af_index,
                raw_header,
                peripheral_token: token,
            },
            &DecoderRegistry::with_defaults(),
        )
    }

    #[test]
    fn test_decode_scb() {
        let binding = decode(3, "ACT_3", "SCB3_I2C_SDA").unwrap().unwrap();
        assert_eq!(
            binding,
            AlternateFunctionBinding {
                af_index: 3,
                family: "I2C".into(),
                instance: Some(3),
                role: "SDA".into(),
                raw_header: "ACT_3".into(),
                peripheral_token: "SCB3_I2C_SDA".into(),
            }
        );
        assert_eq!(binding.peripheral(), "SCB3");
        assert!(binding.is_supported(&CapabilityTable::with_defaults()));
    }

    #[test]
    fn test_multi_digit_instance() {
        let binding = decode(15, "ACT_15", "SCB11_SPI_SELECT1").unwrap().unwrap();
        assert_eq!(binding.af_index, 15);
        assert_eq!(binding.instance, Some(11));
        assert_eq!(binding.peripheral(), "SCB11");
    }

    #[test]
    fn test_out_of_range_index_is_skipped() {
        // Even a mislabelled column is not an error past the selector range.
        assert_eq!(decode(16, "ACT_16", "SCB0_UART_TX").unwrap(), None);
        assert_eq!(decode(16, "DS_0", "SCB0_UART_TX").unwrap(), None);
    }

    #[test]
    fn test_header_mismatch() {
        let err = decode(3, "ACT_2", "SCB3_I2C_SDA").unwrap_err();
        match err {
            PinGenError::MalformedAfHeader { header, af_index } => {
                assert_eq!(header, "ACT_2");
                assert_eq!(af_index, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(decode(0, "GPIO", "SCB3_I2C_SDA").is_err());
        assert!(decode(0, "act_0", "SCB3_I2C_SDA").is_err());
        // Checked regardless of the token family
        assert!(decode(4, "ACT_5", "TCPWM0_LINE3").is_err());
    }

    #[test]
    fn test_unregistered_prefix() {
        assert_eq!(decode(4, "ACT_4", "TCPWM0_LINE3").unwrap(), None);
        assert_eq!(decode(8, "ACT_8", "PDM_CLK0").unwrap(), None);
        let empty = DecoderRegistry::none();
        let cell = AfCell {
            af_index: 3,
            raw_header: "ACT_3",
            peripheral_token: "SCB3_I2C_SDA",
        };
        assert_eq!(decode_cell(&cell, &empty).unwrap(), None);
    }

    #[test]
    fn test_other_field_counts_are_unclassified() {
        assert_eq!(decode(1, "ACT_1", "SCB3_I2C").unwrap(), None);
        assert_eq!(decode(1, "ACT_1", "SCB3_SPI_SELECT_0").unwrap(), None);
        assert_eq!(decode(1, "ACT_1", "SCB3").unwrap(), None);
    }

    #[test]
    fn test_bad_instance_is_an_error() {
        for token in ["SCB_I2C_SDA", "SCBX_I2C_SDA", "SCB3A_I2C_SDA"] {
            let err = decode(2, "ACT_2", token).unwrap_err();
            assert!(
                matches!(err, PinGenError::MalformedPeripheralToken { token: ref t, .. } if t == token),
                "unexpected error for {token}: {err}"
            );
        }
    }

    #[test]
    fn test_unsupported_is_still_decoded() {
        let caps = CapabilityTable::with_defaults();
        let binding = decode(6, "ACT_6", "SCB1_SPI_SELECT2").unwrap().unwrap();
        assert!(!binding.is_supported(&caps));
        let binding = decode(6, "ACT_6", "SCB1_I2C_TX").unwrap().unwrap();
        assert!(!binding.is_supported(&caps));
    }

    #[test]
    fn test_register_decoder() {
        fn decode_pdm(cell: &AfCell<'_>) -> Result<Option<AlternateFunctionBinding>> {
            let role = cell.peripheral_token.trim_start_matches("PDM_");
            Ok(Some(AlternateFunctionBinding {
                af_index: cell.af_index as u8,
                family: "PDM".into(),
                instance: None,
                role: role.into(),
                raw_header: cell.raw_header.into(),
                peripheral_token: cell.peripheral_token.into(),
            }))
        }

        let registry = DecoderRegistry::with_defaults().register("PDM", decode_pdm);
        let cell = AfCell {
            af_index: 8,
            raw_header: "ACT_8",
            peripheral_token: "PDM_CLK",
        };
        let binding = decode_cell(&cell, &registry).unwrap().unwrap();
        assert_eq!(binding.family, "PDM");
        assert_eq!(binding.instance, None);
        assert_eq!(binding.peripheral(), "PDM");
        assert!(registry.lookup("SCB0_UART_RX").is_some());
    }

    #[test]
    fn test_longest_prefix_wins() {
        fn unclassified(_: &AfCell<'_>) -> Result<Option<AlternateFunctionBinding>> {
            Ok(None)
        }
        let registry = DecoderRegistry::with_defaults().register("SCB1", unclassified);
        let cell = AfCell {
            af_index: 2,
            raw_header: "ACT_2",
            peripheral_token: "SCB12_UART_TX",
        };
        assert_eq!(decode_cell(&cell, &registry).unwrap(), None);
        let cell = AfCell {
            peripheral_token: "SCB2_UART_TX",
            ..cell
        };
        assert!(decode_cell(&cell, &registry).unwrap().is_some());
    }
}
