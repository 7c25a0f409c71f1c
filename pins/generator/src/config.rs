// Licensed under the Apache-2.0 license

//! Configuration for AF table layout and alternate function support.
//!
//! [`CapabilityTable`] lists the peripheral functions and signals that the
//! firmware knows how to drive. Bindings outside of it are still generated,
//! but commented out.
//!
//! [`GeneratorConfig`] bundles the capability table with the AF CSV layout
//! and the registry of peripheral token decoders.

use crate::af::DecoderRegistry;
use std::collections::{BTreeMap, BTreeSet};

/// Peripheral functions and the signal roles supported for each of them.
///
/// # Example
///
/// ```
/// use mcu_pins_generator::config::CapabilityTable;
///
/// let caps = CapabilityTable::with_defaults();
/// assert!(caps.supports("I2C", "SDA"));
/// assert!(!caps.supports("I2C", "TX"));
///
/// let caps = CapabilityTable::none().allow("PDM", &["CLK", "DATA"]);
/// assert!(caps.supports("PDM", "DATA"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapabilityTable {
    roles: BTreeMap<String, BTreeSet<String>>,
}

impl CapabilityTable {
    /// The functions driven by the `machine` module today:
    /// - `I2C`: `SDA`, `SCL`
    /// - `UART`: `TX`, `RX`, `CTS`, `RTS`
    /// - `SPI`: `MOSI`, `MISO`, `CLK`, `SELECT0`, `SELECT1`
    pub fn with_defaults() -> Self {
        Self::none()
            .allow("I2C", &["SDA", "SCL"])
            .allow("UART", &["TX", "RX", "CTS", "RTS"])
            .allow("SPI", &["MOSI", "MISO", "CLK", "SELECT0", "SELECT1"])
    }

    /// An empty table; every binding is unsupported.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add signal roles for a function. Roles accumulate across calls.
    pub fn allow(mut self, family: &str, roles: &[&str]) -> Self {
        self.roles
            .entry(family.to_string())
            .or_default()
            .extend(roles.iter().map(|r| r.to_string()));
        self
    }

    /// Exact, case-sensitive membership test.
    pub fn supports(&self, family: &str, role: &str) -> bool {
        self.roles
            .get(family)
            .is_some_and(|roles| roles.contains(role))
    }
}

/// Layout of the AF CSV and decoding configuration.
///
/// # Example
///
/// ```
/// use mcu_pins_generator::config::GeneratorConfig;
///
/// let config = GeneratorConfig::with_defaults()
///     .af_header_rows(2)
///     .af_first_column(2);
/// assert_eq!(config.af_header_rows, 2);
/// assert_eq!(config.af_pin_column, 0);
/// ```
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Number of leading header rows in the AF CSV. The first one carries
    /// the `ACT_<n>` column labels.
    pub af_header_rows: usize,

    /// Column holding the CPU pin name in AF rows.
    pub af_pin_column: usize,

    /// Column of AF index 0. Later columns map to consecutive indices.
    pub af_first_column: usize,

    /// Supported function/signal combinations.
    pub capabilities: CapabilityTable,

    /// Peripheral token decoders, by token prefix.
    pub decoders: DecoderRegistry,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GeneratorConfig {
    /// One header row, pin name in column 0, `ACT_0` in column 1, default
    /// capabilities and the `SCB` decoder.
    pub fn with_defaults() -> Self {
        Self {
            af_header_rows: 1,
            af_pin_column: 0,
            af_first_column: 1,
            capabilities: CapabilityTable::with_defaults(),
            decoders: DecoderRegistry::with_defaults(),
        }
    }

    pub fn af_header_rows(mut self, rows: usize) -> Self {
        self.af_header_rows = rows;
        self
    }

    pub fn af_pin_column(mut self, column: usize) -> Self {
        self.af_pin_column = column;
        self
    }

    pub fn af_first_column(mut self, column: usize) -> Self {
        self.af_first_column = column;
        self
    }

    pub fn capabilities(mut self, capabilities: CapabilityTable) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn decoders(mut self, decoders: DecoderRegistry) -> Self {
        self.decoders = decoders;
        self
    }
}
