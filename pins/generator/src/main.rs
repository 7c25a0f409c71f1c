// Licensed under the Apache-2.0 license

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

use mcu_pins_generator::{GeneratorConfig, PinGenerator, PinInputs};

#[derive(Parser, Debug)]
#[command(
    name = "make-pins",
    author,
    version,
    about = "Generate pin descriptor C files from board and AF tables"
)]
struct Cli {
    /// Board CSV: board pin name, CPU pin name
    #[arg(long, value_name = "FILE")]
    board_csv: PathBuf,

    /// Alternate function CSV
    #[arg(long, value_name = "FILE")]
    af_csv: Option<PathBuf>,

    /// File copied verbatim to the top of the generated source
    #[arg(long, value_name = "FILE")]
    prefix: Option<PathBuf>,

    /// Generated C source
    #[arg(long, value_name = "FILE", default_value = "pins.c")]
    output_source: PathBuf,

    /// Generated C header
    #[arg(long, value_name = "FILE", default_value = "pins.h")]
    output_header: PathBuf,

    /// Number of header rows in the AF CSV
    #[arg(long, default_value_t = 1)]
    af_header_rows: usize,

    /// AF CSV column holding the CPU pin name
    #[arg(long, default_value_t = 0)]
    af_pin_column: usize,

    /// AF CSV column holding AF index 0
    #[arg(long, default_value_t = 1)]
    af_first_column: usize,

    /// More logging, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = GeneratorConfig::with_defaults()
        .af_header_rows(cli.af_header_rows)
        .af_pin_column(cli.af_pin_column)
        .af_first_column(cli.af_first_column);

    let inputs = PinInputs::read(
        &cli.board_csv,
        cli.af_csv.as_deref(),
        cli.prefix.as_deref(),
    )?;
    let files = PinGenerator::new(config)
        .generate(&inputs)
        .with_context(|| format!("Failed to generate pins for {}", cli.board_csv.display()))?;
    files.write(&cli.output_header, &cli.output_source)?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let _ = SimpleLogger::new().with_level(level(cli.verbose)).init();

    if let Err(e) = run(&cli) {
        eprintln!("make-pins: {:#}", e);
        std::process::exit(1);
    }
}
