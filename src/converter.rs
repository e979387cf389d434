/*!
 * PDF to DOCX conversion.
 *
 * Layout reconstruction is left to an external program; this module only
 * defines the seam and a command-line implementation of it.
 */

use log::debug;
use std::path::Path;
use std::process::Command;

use crate::app_config::ConverterConfig;
use crate::errors::ConversionError;

/// Placeholder replaced by the source path in converter arguments
pub const INPUT_PLACEHOLDER: &str = "{input}";
/// Placeholder replaced by the destination path in converter arguments
pub const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Converts a source document into an editable DOCX at `destination`
pub trait DocumentConverter {
    fn convert(&self, source: &Path, destination: &Path) -> Result<(), ConversionError>;
}

/// Runs an external converter program
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(&config.program, config.args.clone())
    }

    /// Arguments with placeholders filled in
    pub fn render_args(&self, source: &Path, destination: &Path) -> Vec<String> {
        let source = source.to_string_lossy();
        let destination = destination.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &source)
                    .replace(OUTPUT_PLACEHOLDER, &destination)
            })
            .collect()
    }
}

impl DocumentConverter for CommandConverter {
    fn convert(&self, source: &Path, destination: &Path) -> Result<(), ConversionError> {
        let args = self.render_args(source, destination);
        debug!("Running converter: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| ConversionError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConversionError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !destination.is_file() {
            return Err(ConversionError::MissingOutput(destination.to_path_buf()));
        }

        Ok(())
    }
}
