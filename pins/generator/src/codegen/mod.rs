// Licensed under the Apache-2.0 license

//! Pin generation pipeline.
//!
//! Phases run strictly in order and any failure stops the run:
//!
//! 1. parse the board CSV into a [`PinModel`]
//! 2. attach the AF CSV bindings, if an AF table is given
//! 3. aggregate ports
//! 4. render the header, then the source, in memory
//!
//! Nothing touches the filesystem until [`GeneratedFiles::write`], which
//! persists both files or neither.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::GeneratorConfig;
use crate::error::{PinGenError, Result};
use crate::model::PinModel;
use crate::output::{
    write_base_header, write_base_source, AfTables, EmitContext, PortMacros, SourceExtension,
    SourceInfo,
};

/// An input table or prefix file: the name it is reported under and its text.
#[derive(Clone, Debug)]
pub struct InputFile {
    pub name: String,
    pub text: String,
}

impl InputFile {
    pub fn new(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| PinGenError::io(path, e))?;
        Ok(Self {
            name: path.display().to_string(),
            text,
        })
    }
}

/// The inputs of one generation run.
#[derive(Clone, Debug)]
pub struct PinInputs {
    pub board_csv: InputFile,
    /// Without an AF table no alternate function tables are generated.
    pub af_csv: Option<InputFile>,
    pub prefix: Option<InputFile>,
}

impl PinInputs {
    /// Read all input files up front.
    pub fn read(board_csv: &Path, af_csv: Option<&Path>, prefix: Option<&Path>) -> Result<Self> {
        Ok(Self {
            board_csv: InputFile::read(board_csv)?,
            af_csv: af_csv.map(InputFile::read).transpose()?,
            prefix: prefix.map(InputFile::read).transpose()?,
        })
    }
}

/// Generated header and source text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub header: String,
    pub source: String,
}

impl GeneratedFiles {
    /// Write both files, or neither.
    ///
    /// Each file is staged in a temporary file next to its destination and
    /// renamed into place once both are staged. If the second rename fails
    /// the first file is removed again.
    pub fn write(&self, header_path: &Path, source_path: &Path) -> Result<()> {
        let header = stage(header_path, &self.header)?;
        let source = stage(source_path, &self.source)?;

        header
            .persist(header_path)
            .map_err(|e| PinGenError::io(header_path, e.error))?;
        if let Err(e) = source.persist(source_path) {
            if let Err(remove) = fs::remove_file(header_path) {
                log::error!("Failed to remove {}: {remove}", header_path.display());
            }
            return Err(PinGenError::io(source_path, e.error));
        }

        log::info!("Wrote {}", header_path.display());
        log::info!("Wrote {}", source_path.display());
        Ok(())
    }
}

fn stage(path: &Path, contents: &str) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut file = NamedTempFile::new_in(&dir).map_err(|e| PinGenError::io(&dir, e))?;
    file.write_all(contents.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| PinGenError::io(path, e))?;
    Ok(file)
}

/// Runs the generation phases with a fixed set of output extensions.
pub struct PinGenerator {
    config: GeneratorConfig,
    extensions: Vec<Box<dyn SourceExtension>>,
}

impl PinGenerator {
    /// Generator with the port macros and the alternate function tables.
    pub fn new(config: GeneratorConfig) -> Self {
        Self::base_only(config)
            .add_extension(PortMacros)
            .add_extension(AfTables)
    }

    /// Generator that only writes the base boilerplate.
    pub fn base_only(config: GeneratorConfig) -> Self {
        Self {
            config,
            extensions: Vec::new(),
        }
    }

    /// Register an extension. It runs after the ones registered before it.
    pub fn add_extension(mut self, extension: impl SourceExtension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build the pin model from the input tables.
    pub fn build_model(&self, inputs: &PinInputs) -> Result<PinModel> {
        let board = &inputs.board_csv;
        let mut model = PinModel::from_board_csv(&board.name, &board.text)?;
        if let Some(af) = &inputs.af_csv {
            model.load_af_csv(&af.name, &af.text, &self.config)?;
        }
        Ok(model)
    }

    /// Run every phase and return the generated text.
    pub fn generate(&self, inputs: &PinInputs) -> Result<GeneratedFiles> {
        let model = self.build_model(inputs)?;
        let ports = model.ports();
        log::debug!(
            "{} ports, visible: {:?}",
            ports.num_entries(),
            ports.visible_ports
        );

        let ctx = EmitContext {
            model: &model,
            ports: &ports,
            capabilities: &self.config.capabilities,
        };
        let info = SourceInfo {
            board_csv: inputs.board_csv.name.clone(),
            af_csv: inputs.af_csv.as_ref().map(|f| f.name.clone()),
            prefix: inputs.prefix.as_ref().map(|f| f.name.clone()),
            prefix_text: inputs.prefix.as_ref().map(|f| f.text.clone()),
        };

        let mut files = GeneratedFiles::default();
        write_base_header(&ctx, &info, &mut files.header)?;
        for extension in &self.extensions {
            extension.extend_header(&ctx, &mut files.header)?;
        }
        write_base_source(&ctx, &info, &mut files.source)?;
        for extension in &self.extensions {
            extension.extend_source(&ctx, &mut files.source)?;
        }
        Ok(files)
    }
}

impl Default for PinGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::with_defaults())
    }
}

/// Generate pin files from input files with the default configuration.
pub fn generate_pins_from_files(
    board_csv: &Path,
    af_csv: Option<&Path>,
    prefix: Option<&Path>,
) -> Result<GeneratedFiles> {
    generate_pins_from_files_with_config(
        board_csv,
        af_csv,
        prefix,
        GeneratorConfig::with_defaults(),
    )
}

/// Generate pin files from input files with a custom configuration.
pub fn generate_pins_from_files_with_config(
    board_csv: &Path,
    af_csv: Option<&Path>,
    prefix: Option<&Path>,
    config: GeneratorConfig,
) -> Result<GeneratedFiles> {
    let inputs = PinInputs::read(board_csv, af_csv, prefix)?;
    PinGenerator::new(config).generate(&inputs)
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
