// Licensed under the Apache-2.0 license

//! In-memory pin and port model.
//!
//! The model is built in two phases and is read-only afterwards:
//!
//! ```text
//! board CSV → PinModel::from_board_csv  (CPU pins, hidden flags, board names)
//! AF CSV    → PinModel::load_af_csv     (alternate function bindings)
//!           → PinModel::ports           (port count, visible ports)
//! ```

use crate::af::{decode_cell, AfCell, AlternateFunctionBinding};
use crate::config::GeneratorConfig;
use crate::error::{PinGenError, Result};
use crate::name::decompose_pin_name;
use crate::table::parse_csv;
use std::collections::{HashMap, HashSet};

/// Prefix marking a hidden entry in the board CSV.
const HIDDEN_MARKER: char = '-';

/// A board-level alias for a CPU pin, e.g. `LED1` for `P16_5`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardName {
    pub name: String,
    /// Hidden board names get a C define but no dictionary entry.
    pub hidden: bool,
}

/// A CPU pin and everything known about it.
#[derive(Clone, Debug)]
pub struct PinDescriptor {
    name: String,
    port: u32,
    index: u32,
    hidden: bool,
    board_names: Vec<BoardName>,
    bindings: Vec<AlternateFunctionBinding>,
}

impl PinDescriptor {
    fn new(name: &str, hidden: bool) -> Result<Self> {
        let (port, index) = decompose_pin_name(name)?;
        Ok(Self {
            name: name.to_string(),
            port,
            index,
            hidden,
            board_names: Vec::new(),
            bindings: Vec::new(),
        })
    }

    /// CPU pin name, e.g. `P16_5`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn port(&self) -> u32 {
        self.port
    }

    /// Pin number within the port.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Hidden pins exist in firmware but are not listed to users.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn board_names(&self) -> &[BoardName] {
        &self.board_names
    }

    /// Alternate functions in AF table column order.
    pub fn bindings(&self) -> &[AlternateFunctionBinding] {
        &self.bindings
    }
}

/// Ports derived from the pin set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PortSet {
    /// Highest port number over all pins, hidden ones included.
    pub max_port_index: Option<u32>,
    /// Distinct ports of visible pins, in order of first appearance.
    pub visible_ports: Vec<u32>,
}

impl PortSet {
    /// Number of entries a table indexed by port number needs.
    ///
    /// Widened to `u64` so a pin on port `u32::MAX` still has a count.
    pub fn num_entries(&self) -> u64 {
        self.max_port_index.map_or(0, |max| u64::from(max) + 1)
    }
}

/// All CPU pins of a board, in board table order.
#[derive(Clone, Debug, Default)]
pub struct PinModel {
    pins: Vec<PinDescriptor>,
    by_name: HashMap<String, usize>,
    board_names: HashSet<String>,
}

impl PinModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a CPU pin. Declaring an existing pin again merges the two
    /// references: the pin stays hidden only if every reference hides it.
    pub fn add_pin(&mut self, name: &str, hidden: bool) -> Result<&PinDescriptor> {
        let existing = self.by_name.get(name).copied();
        let idx = match existing {
            Some(idx) => {
                self.pins[idx].hidden &= hidden;
                idx
            }
            None => {
                self.pins.push(PinDescriptor::new(name, hidden)?);
                self.by_name.insert(name.to_string(), self.pins.len() - 1);
                self.pins.len() - 1
            }
        };
        Ok(&self.pins[idx])
    }

    /// Add a board alias to a declared CPU pin. Board names are unique
    /// across the whole board.
    pub fn add_board_name(
        &mut self,
        pin_name: &str,
        board_name: &str,
        hidden: bool,
    ) -> Result<()> {
        let idx = self.index_of(pin_name)?;
        if !self.board_names.insert(board_name.to_string()) {
            return Err(PinGenError::DuplicateBoardName {
                name: board_name.to_string(),
            });
        }
        self.pins[idx].board_names.push(BoardName {
            name: board_name.to_string(),
            hidden,
        });
        Ok(())
    }

    /// Append an alternate function to a declared CPU pin.
    pub fn attach_binding(
        &mut self,
        pin_name: &str,
        binding: AlternateFunctionBinding,
    ) -> Result<()> {
        let idx = self.index_of(pin_name)?;
        self.pins[idx].bindings.push(binding);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PinDescriptor> {
        self.by_name.get(name).map(|&idx| &self.pins[idx])
    }

    pub fn pins(&self) -> impl Iterator<Item = &PinDescriptor> {
        self.pins.iter()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Total number of board aliases, hidden ones included.
    pub fn num_board_names(&self) -> usize {
        self.board_names.len()
    }

    /// Single pass over all pins computing the port count and the visible
    /// ports.
    pub fn ports(&self) -> PortSet {
        let mut ports = PortSet::default();
        for pin in &self.pins {
            ports.max_port_index = Some(match ports.max_port_index {
                Some(max) => max.max(pin.port),
                None => pin.port,
            });
            if !pin.hidden && !ports.visible_ports.contains(&pin.port) {
                ports.visible_ports.push(pin.port);
            }
        }
        ports
    }

    fn index_of(&self, pin_name: &str) -> Result<usize> {
        self.by_name
            .get(pin_name)
            .copied()
            .ok_or_else(|| PinGenError::UnknownPin {
                name: pin_name.to_string(),
            })
    }

    /// Build the model from the board CSV.
    ///
    /// Rows are `BOARD_NAME,CPU_NAME`. A leading `-` hides either name, an
    /// empty board name declares the CPU pin without an alias, and rows
    /// starting with `#` are comments.
    pub fn from_board_csv(path: &str, text: &str) -> Result<Self> {
        let mut model = Self::new();
        for row in parse_csv(path, text)? {
            let board_name = row.cell_or_empty(0);
            if board_name.starts_with('#') {
                continue;
            }
            let cpu_name = row.cell(path, 1)?;

            let (cpu_name, cpu_hidden) = strip_hidden(cpu_name);
            model.add_pin(cpu_name, cpu_hidden)?;

            let (board_name, board_hidden) = strip_hidden(board_name);
            if !board_name.is_empty() {
                model.add_board_name(cpu_name, board_name, board_hidden)?;
            }
        }
        log::debug!(
            "{path}: {} CPU pins, {} board names",
            model.len(),
            model.num_board_names()
        );
        Ok(model)
    }

    /// Attach the alternate functions of the AF CSV to the declared pins.
    ///
    /// Every AF row must name a pin of the board table, whether or not any
    /// of its cells decode to a binding.
    pub fn load_af_csv(
        &mut self,
        path: &str,
        text: &str,
        config: &GeneratorConfig,
    ) -> Result<()> {
        let rows = parse_csv(path, text)?;
        let header_rows = config.af_header_rows.min(rows.len());
        let (headers, data) = rows.split_at(header_rows);
        let headings: &[String] = headers
            .first()
            .map(|row| row.cells.as_slice())
            .unwrap_or_default();

        let mut count = 0;
        for row in data {
            let pin_name = row.cell(path, config.af_pin_column)?;
            if pin_name.is_empty() {
                continue;
            }
            self.index_of(pin_name)?;

            for (column, token) in row.cells.iter().enumerate().skip(config.af_first_column) {
                if token.is_empty() {
                    continue;
                }
                let cell = AfCell {
                    af_index: column - config.af_first_column,
                    raw_header: headings.get(column).map_or("", String::as_str),
                    peripheral_token: token,
                };
                if let Some(binding) = decode_cell(&cell, &config.decoders)? {
                    self.attach_binding(pin_name, binding)?;
                    count += 1;
                }
            }
        }
        log::debug!("{path}: {count} alternate functions");
        Ok(())
    }
}

fn strip_hidden(name: &str) -> (&str, bool) {
    match name.strip_prefix(HIDDEN_MARKER) {
        Some(name) => (name, true),
        None => (name, false),
    }
}
