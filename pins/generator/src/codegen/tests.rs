// Licensed under the Apache-2.0 license

//! Tests for the generation pipeline.

mod test {
    use super::super::*;
    use crate::config::CapabilityTable;
    use crate::output::EmitContext;
    use std::fmt::{self, Write as _};
    use std::path::Path;

    const BOARD_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/boards");

    fn inputs(board: &str, af: Option<&str>) -> PinInputs {
        PinInputs {
            board_csv: InputFile::new("pins.csv", board),
            af_csv: af.map(|text| InputFile::new("af.csv", text)),
            prefix: None,
        }
    }

    #[test]
    fn test_kit_pse84_ai() {
        let board = Path::new(BOARD_DIR).join("KIT_PSE84_AI/pins.csv");
        let af = Path::new(BOARD_DIR).join("pse84_af.csv");
        let prefix = Path::new(BOARD_DIR).join("pse84_prefix.c");
        let files = generate_pins_from_files(&board, Some(&af), Some(&prefix)).unwrap();
        println!("{}", files.header);
        println!("{}", files.source);

        assert!(files
            .header
            .contains("#define MICROPY_PY_MACHINE_PIN_PORT_NUM_ENTRIES (22)\n"));
        assert!(files.header.ends_with(
            "#define MICROPY_PY_MACHINE_PIN_FOR_ALL_PORTS(DO) \\\n    DO(6) \\\n    DO(8) \\\n    DO(16) \\\n    DO(21)\n"
        ));
        assert!(files.header.contains("#define pin_LED1 (&pin_P16_5_obj)\n"));

        // Prefix comes first, AF tables last
        let prefix_pos = files.source.find("#define AF(").unwrap();
        let pin_pos = files.source.find("pin_P6_0_obj = PIN(6, 0);").unwrap();
        let af_pos = files.source.find("pin_P6_0_af[3]").unwrap();
        assert!(prefix_pos < pin_pos && pin_pos < af_pos);

        assert!(files.source.contains(
            "const machine_pin_af_obj_t pin_P6_0_af[3] = {\n    \
             AF(ACT_6, UART, 3, RX, SCB3),\n    \
             AF(ACT_7, I2C, 3, SCL, SCB3),\n    \
             AF(ACT_8, SPI, 3, MOSI, SCB3),\n};\n"
        ));
        assert!(files.source.contains(
            "const machine_pin_af_obj_t pin_P6_5_af[0] = {\n    \
             // AF(ACT_8, SPI, 3, SELECT2, SCB3), // SCB3_SPI_SELECT2\n};\n"
        ));
        assert!(files
            .source
            .contains("    AF(ACT_7, I2C, 11, SDA, SCB11),\n"));
        // Hidden pins keep their AF tables
        assert!(files.source.contains("pin_P10_1_af[1]"));
        // Pins without decoded bindings get no table
        assert!(!files.source.contains("pin_P21_0_af"));
        assert!(!files.source.contains("pin_P1_0_af"));
        assert!(!files.source.contains("pin_P16_5_af"));
    }

    #[test]
    fn test_deterministic() {
        let board = ",P0_0\n,P3_0\n,-P3_1\nLED,P7_2\n";
        let af = "Pin,ACT_0,ACT_1\nP0_0,,SCB0_UART_RX\nP7_2,SCB1_SPI_CLK,SCB1_SPI_SELECT3\n";
        let first = PinGenerator::default().generate(&inputs(board, Some(af))).unwrap();
        let second = PinGenerator::default().generate(&inputs(board, Some(af))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_without_af_table() {
        let files = PinGenerator::default()
            .generate(&inputs(",P0_0\n,-P3_1\n", None))
            .unwrap();
        assert!(files.header.contains("PORT_NUM_ENTRIES (4)"));
        assert!(files.header.ends_with("FOR_ALL_PORTS(DO) \\\n    DO(0)\n"));
        assert!(!files.source.contains("machine_pin_af_obj_t"));
        assert!(!files.header.contains("--af-csv"));
    }

    #[test]
    fn test_max_port_number() {
        let files = PinGenerator::default()
            .generate(&inputs(",P4294967295_0\n", None))
            .unwrap();
        assert!(files.header.contains("PORT_NUM_ENTRIES (4294967296)\n"));
        assert!(files.header.ends_with("DO(4294967295)\n"));
        assert!(files.source.contains("PIN(4294967295, 0);"));
    }

    #[test]
    fn test_base_only() {
        let files = PinGenerator::base_only(GeneratorConfig::with_defaults())
            .generate(&inputs(",P0_0\n", Some("Pin,ACT_0\nP0_0,SCB0_UART_RX\n")))
            .unwrap();
        assert!(!files.header.contains("PORT_NUM_ENTRIES"));
        assert!(!files.source.contains("pin_P0_0_af"));
    }

    #[test]
    fn test_capabilities_from_config() {
        let config = GeneratorConfig::with_defaults().capabilities(CapabilityTable::none());
        let files = PinGenerator::new(config)
            .generate(&inputs(",P0_0\n", Some("Pin,ACT_0\nP0_0,SCB0_UART_RX\n")))
            .unwrap();
        assert!(files.source.contains(
            "pin_P0_0_af[0] = {\n    // AF(ACT_0, UART, 0, RX, SCB0), // SCB0_UART_RX\n};\n"
        ));
    }

    #[test]
    fn test_extensions_run_after_base_in_order() {
        struct Marker(&'static str);

        impl SourceExtension for Marker {
            fn extend_header(&self, ctx: &EmitContext<'_>, out: &mut String) -> fmt::Result {
                writeln!(out, "// {} header, {} pins", self.0, ctx.model.len())
            }
            fn extend_source(&self, _ctx: &EmitContext<'_>, out: &mut String) -> fmt::Result {
                writeln!(out, "// {} source", self.0)
            }
        }

        let files = PinGenerator::base_only(GeneratorConfig::with_defaults())
            .add_extension(Marker("first"))
            .add_extension(Marker("second"))
            .generate(&inputs(",P0_0\n,P0_1\n", None))
            .unwrap();
        assert!(files
            .header
            .ends_with("#define pin_P0_1 (&pin_P0_1_obj)\n// first header, 2 pins\n// second header, 2 pins\n"));
        assert!(files
            .source
            .ends_with("machine_pin_board_pins_locals_dict_table);\n// first source\n// second source\n"));
    }

    #[test]
    fn test_fatal_errors() {
        let generator = PinGenerator::default();

        let err = generator.generate(&inputs("LED,P7\n", None)).unwrap_err();
        assert!(matches!(err, PinGenError::MalformedPinName { .. }));

        let err = generator
            .generate(&inputs(",P0_0\n", Some("Pin,ACT_0,ACT_1,ACT_2,ACT_2\nP0_0,,,,SCB3_I2C_SDA\n")))
            .unwrap_err();
        assert!(matches!(
            err,
            PinGenError::MalformedAfHeader { ref header, af_index: 3 } if header == "ACT_2"
        ));

        let err = generator
            .generate(&inputs(",P0_0\n", Some("Pin,ACT_0\nP0_1,SCB0_UART_RX\n")))
            .unwrap_err();
        assert!(matches!(err, PinGenError::UnknownPin { .. }));

        let err = generator
            .generate(&inputs(",P0_0\n", Some("Pin,ACT_0\nP0_0,SCBX_UART_RX\n")))
            .unwrap_err();
        assert!(matches!(err, PinGenError::MalformedPeripheralToken { .. }));
    }

    #[test]
    fn test_missing_input_file() {
        let err = generate_pins_from_files(Path::new("/nonexistent/pins.csv"), None, None)
            .unwrap_err();
        assert!(matches!(err, PinGenError::Io { .. }));
    }
}

#[cfg(test)]
mod write_tests {
    //! Tests for persisting generated files.

    use super::super::*;
    use tempfile::TempDir;

    fn files() -> GeneratedFiles {
        GeneratedFiles {
            header: "#define X 1\n".into(),
            source: "int x;\n".into(),
        }
    }

    #[test]
    fn test_write_both() {
        let dir = TempDir::new().unwrap();
        let header = dir.path().join("pins.h");
        let source = dir.path().join("pins.c");
        files().write(&header, &source).unwrap();
        assert_eq!(fs::read_to_string(&header).unwrap(), "#define X 1\n");
        assert_eq!(fs::read_to_string(&source).unwrap(), "int x;\n");
        // No staging files are left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let header = dir.path().join("pins.h");
        let source = dir.path().join("pins.c");
        fs::write(&header, "old").unwrap();
        files().write(&header, &source).unwrap();
        assert_eq!(fs::read_to_string(&header).unwrap(), "#define X 1\n");
    }

    #[test]
    fn test_write_is_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let header = dir.path().join("pins.h");
        // The source directory does not exist, so staging the source fails
        let source = dir.path().join("missing/pins.c");
        let err = files().write(&header, &source).unwrap_err();
        assert!(matches!(err, PinGenError::Io { .. }));
        assert!(!header.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_failed_rename_removes_header() {
        let dir = TempDir::new().unwrap();
        let header = dir.path().join("pins.h");
        // A directory in the way of the source makes the final rename fail
        let source = dir.path().join("pins.c");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("keep"), "").unwrap();
        assert!(files().write(&header, &source).is_err());
        assert!(!header.exists());
    }
}
