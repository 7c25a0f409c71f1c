// Licensed under the Apache-2.0 license

//! Pin descriptor compiler.
//!
//! This crate turns a board pin table and an optional alternate function
//! (AF) table into a C header and source file describing the pins of a
//! board: one pin object per CPU pin, board aliases, port macros and
//! per-pin AF tables.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use mcu_pins_generator::{
//!     generate_pins_from_files, generate_pins_from_files_with_config, CapabilityTable,
//!     GeneratorConfig,
//! };
//!
//! // Generate with the default configuration
//! let files = generate_pins_from_files(
//!     Path::new("boards/KIT_PSE84_AI/pins.csv"),
//!     Some(Path::new("boards/pse84_af.csv")),
//!     None,
//! )
//! .unwrap();
//!
//! // Or restrict which peripheral roles get live AF entries
//! let config = GeneratorConfig::with_defaults()
//!     .capabilities(CapabilityTable::none().allow("UART", &["RX", "TX"]));
//! let files = generate_pins_from_files_with_config(
//!     Path::new("boards/KIT_PSE84_AI/pins.csv"),
//!     Some(Path::new("boards/pse84_af.csv")),
//!     None,
//!     config,
//! )
//! .unwrap();
//! files
//!     .write(Path::new("pins.h"), Path::new("pins.c"))
//!     .unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`name`]: CPU pin name decomposition
//! - [`table`]: CSV rows
//! - [`af`]: AF cell decoding and the decoder registry
//! - [`config`]: Generator configuration ([`GeneratorConfig`], [`CapabilityTable`])
//! - [`model`]: The pin model and port aggregation
//! - [`output`]: C emission and output extensions
//! - [`error`]: Error type

pub mod af;
pub mod config;
pub mod error;
pub mod model;
pub mod name;
pub mod output;
pub mod table;

mod codegen;

// Re-export main public API
pub use af::{AlternateFunctionBinding, DecoderRegistry};
pub use codegen::{
    generate_pins_from_files, generate_pins_from_files_with_config, GeneratedFiles, InputFile,
    PinGenerator, PinInputs,
};
pub use config::{CapabilityTable, GeneratorConfig};
pub use error::{PinGenError, Result};
pub use model::{BoardName, PinDescriptor, PinModel, PortSet};
pub use output::SourceExtension;
