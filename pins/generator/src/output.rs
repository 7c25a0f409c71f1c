// Licensed under the Apache-2.0 license

//! C header and source generation.
//!
//! The base emitter writes the boilerplate every port needs (pin objects,
//! pin defines, and the CPU/board pin dictionaries). Registered
//! [`SourceExtension`]s then append their own definitions, first to the
//! header and then to the source.
//!
//! ```text
//! PinModel ─┬─ base header ─ PortMacros          → pins.h
//!           └─ base source ─ AfTables            → pins.c
//! ```
//!
//! For a board with pins on ports 0 and 7 the header ends with:
//!
//! ```text
//! #define MICROPY_PY_MACHINE_PIN_PORT_NUM_ENTRIES (8)
//! #define MICROPY_PY_MACHINE_PIN_FOR_ALL_PORTS(DO) \
//!     DO(0) \
//!     DO(7)
//! ```

use crate::af::AlternateFunctionBinding;
use crate::config::CapabilityTable;
use crate::model::{PinDescriptor, PinModel, PortSet};
use std::fmt::{self, Write};

/// Role emitted for a binding without one.
const NO_ROLE: &str = "NONE";

/// Everything an emitter may look at. Read-only by construction.
#[derive(Clone, Copy, Debug)]
pub struct EmitContext<'a> {
    pub model: &'a PinModel,
    pub ports: &'a PortSet,
    pub capabilities: &'a CapabilityTable,
}

/// Input file names and prefix text, echoed into the generated files.
#[derive(Clone, Debug, Default)]
pub struct SourceInfo {
    pub board_csv: String,
    pub af_csv: Option<String>,
    pub prefix: Option<String>,
    /// Contents of the prefix file, copied to the top of the source.
    pub prefix_text: Option<String>,
}

/// Appends port-specific definitions after the base output.
///
/// Extensions run in registration order, each seeing the output written so
/// far.
pub trait SourceExtension {
    fn extend_header(&self, _ctx: &EmitContext<'_>, _out: &mut String) -> fmt::Result {
        Ok(())
    }

    fn extend_source(&self, _ctx: &EmitContext<'_>, _out: &mut String) -> fmt::Result {
        Ok(())
    }
}

/// Port count and port iteration macros.
#[derive(Clone, Copy, Debug, Default)]
pub struct PortMacros;

impl SourceExtension for PortMacros {
    fn extend_header(&self, ctx: &EmitContext<'_>, out: &mut String) -> fmt::Result {
        writeln!(out)?;
        writeln!(
            out,
            "#define MICROPY_PY_MACHINE_PIN_PORT_NUM_ENTRIES ({})",
            ctx.ports.num_entries()
        )?;
        write!(out, "#define MICROPY_PY_MACHINE_PIN_FOR_ALL_PORTS(DO)")?;
        for port in &ctx.ports.visible_ports {
            write!(out, " \\\n    DO({port})")?;
        }
        writeln!(out)
    }
}

/// Per-pin alternate function tables.
///
/// Every pin with at least one binding gets an array sized by its supported
/// bindings. When none are supported the array is `[0]` with only comments
/// in its initializer, which relies on the GNU C zero-length array
/// extension rather than ISO C. Ports built with GCC or Clang accept it.
#[derive(Clone, Copy, Debug, Default)]
pub struct AfTables;

impl AfTables {
    fn write_pin(pin: &PinDescriptor, caps: &CapabilityTable, out: &mut String) -> fmt::Result {
        let supported = pin
            .bindings()
            .iter()
            .filter(|b| b.is_supported(caps))
            .count();

        writeln!(out)?;
        writeln!(
            out,
            "const machine_pin_af_obj_t {}[{supported}] = {{",
            af_table_name(pin.name())
        )?;
        for binding in pin.bindings() {
            let element = af_element(binding);
            if binding.is_supported(caps) {
                writeln!(out, "    {element},")?;
            } else {
                log::warn!(
                    "{}: {} ({}) is not supported, emitting it commented out",
                    pin.name(),
                    binding.peripheral_token,
                    binding.raw_header
                );
                writeln!(
                    out,
                    "    // {element}, // {}_{}_{}",
                    binding.peripheral(),
                    binding.family,
                    role_or_none(binding)
                )?;
            }
        }
        writeln!(out, "}};")
    }
}

impl SourceExtension for AfTables {
    fn extend_source(&self, ctx: &EmitContext<'_>, out: &mut String) -> fmt::Result {
        for pin in ctx.model.pins().filter(|p| !p.bindings().is_empty()) {
            Self::write_pin(pin, ctx.capabilities, out)?;
        }
        Ok(())
    }
}

/// Name of the alternate function array of a pin.
pub fn af_table_name(pin_name: &str) -> String {
    format!("pin_{pin_name}_af")
}

fn role_or_none(binding: &AlternateFunctionBinding) -> &str {
    if binding.role.is_empty() {
        NO_ROLE
    } else {
        &binding.role
    }
}

fn af_element(binding: &AlternateFunctionBinding) -> String {
    format!(
        "AF({}, {}, {}, {}, {})",
        binding.raw_header,
        binding.family,
        binding.instance.unwrap_or(0),
        role_or_none(binding),
        binding.peripheral()
    )
}

fn write_banner(info: &SourceInfo, out: &mut String) -> fmt::Result {
    writeln!(out, "// This file was automatically generated by make-pins.")?;
    writeln!(out, "//")?;
    writeln!(out, "// --board-csv {}", info.board_csv)?;
    if let Some(af_csv) = &info.af_csv {
        writeln!(out, "// --af-csv {af_csv}")?;
    }
    if let Some(prefix) = &info.prefix {
        writeln!(out, "// --prefix {prefix}")?;
    }
    writeln!(out)
}

/// Pin counts, object declarations and pin defines.
pub fn write_base_header(
    ctx: &EmitContext<'_>,
    info: &SourceInfo,
    out: &mut String,
) -> fmt::Result {
    write_banner(info, out)?;
    writeln!(
        out,
        "#define MICROPY_PY_MACHINE_PIN_CPU_NUM_ENTRIES ({})",
        ctx.model.len()
    )?;
    writeln!(
        out,
        "#define MICROPY_PY_MACHINE_PIN_BOARD_NUM_ENTRIES ({})",
        ctx.model.num_board_names()
    )?;

    writeln!(out)?;
    for pin in ctx.model.pins() {
        let name = pin.name();
        writeln!(out, "extern const machine_pin_obj_t pin_{name}_obj;")?;
        writeln!(out, "#define pin_{name} (&pin_{name}_obj)")?;
    }

    // An alias spelled like its CPU pin already has its define above
    let mut first = true;
    for pin in ctx.model.pins() {
        for board in pin.board_names().iter().filter(|b| b.name != pin.name()) {
            if std::mem::take(&mut first) {
                writeln!(out)?;
            }
            writeln!(out, "#define pin_{} (&pin_{}_obj)", board.name, pin.name())?;
        }
    }
    Ok(())
}

/// Prefix text, pin objects and the CPU/board pin dictionaries.
pub fn write_base_source(
    ctx: &EmitContext<'_>,
    info: &SourceInfo,
    out: &mut String,
) -> fmt::Result {
    write_banner(info, out)?;
    if let Some(prefix_text) = &info.prefix_text {
        write!(out, "{prefix_text}")?;
        if !prefix_text.ends_with('\n') {
            writeln!(out)?;
        }
        writeln!(out)?;
    }

    for pin in ctx.model.pins() {
        writeln!(
            out,
            "const machine_pin_obj_t pin_{}_obj = PIN({}, {});",
            pin.name(),
            pin.port(),
            pin.index()
        )?;
    }

    let cpu_entries = ctx
        .model
        .pins()
        .filter(|p| !p.is_hidden())
        .map(|p| (p.name(), p.name()));
    write_dict("machine_pin_cpu_pins_locals_dict", cpu_entries, out)?;

    let board_entries = ctx.model.pins().flat_map(|p| {
        p.board_names()
            .iter()
            .filter(|b| !b.hidden)
            .map(move |b| (b.name.as_str(), p.name()))
    });
    write_dict("machine_pin_board_pins_locals_dict", board_entries, out)
}

fn write_dict<'a>(
    dict: &str,
    entries: impl Iterator<Item = (&'a str, &'a str)>,
    out: &mut String,
) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "static const mp_rom_map_elem_t {dict}_table[] = {{")?;
    for (key, pin) in entries {
        writeln!(
            out,
            "    {{ MP_ROM_QSTR(MP_QSTR_{key}), MP_ROM_PTR(&pin_{pin}_obj) }},"
        )?;
    }
    writeln!(out, "}};")?;
    writeln!(out, "MP_DEFINE_CONST_DICT({dict}, {dict}_table);")
}
