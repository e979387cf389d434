use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::substitution::SubstitutionMode;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory scanned for input documents
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory receiving translated documents
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Mapping file with one `source=target` pair per line
    #[serde(default = "default_mapping_file")]
    pub mapping_file: PathBuf,

    /// Kind of input documents to pick up
    #[serde(default)]
    pub input_kind: InputKind,

    /// Substitution strategies to run
    #[serde(default)]
    pub substitution_mode: SubstitutionMode,

    /// External PDF converter
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Input document kind
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    // @kind: PDF, converted before translation
    #[default]
    Pdf,
    // @kind: DOCX, translated directly
    Docx,
}

impl InputKind {
    // @returns: File extension matched during discovery
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for InputKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().trim_start_matches('.') {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            _ => Err(anyhow!("Invalid input kind: {}", s)),
        }
    }
}

/// External converter configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConverterConfig {
    // @field: Program to run
    #[serde(default = "default_converter_program")]
    pub program: String,

    // @field: Arguments; {input} and {output} are substituted
    #[serde(default = "default_converter_args")]
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: default_converter_program(),
            args: default_converter_args(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("invoice")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("translated")
}

fn default_mapping_file() -> PathBuf {
    PathBuf::from("words.txt")
}

fn default_converter_program() -> String {
    "pdf2docx".to_string()
}

fn default_converter_args() -> Vec<String> {
    vec![
        "convert".to_string(),
        "{input}".to_string(),
        "{output}".to_string(),
    ]
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(anyhow!("Input directory must not be empty"));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("Output directory must not be empty"));
        }

        if self.mapping_file.as_os_str().is_empty() {
            return Err(anyhow!("Mapping file must not be empty"));
        }

        // Only PDF input goes through the converter
        if self.input_kind == InputKind::Pdf && self.converter.program.trim().is_empty() {
            return Err(anyhow!("A converter program is required for PDF input"));
        }

        Ok(())
    }

    /// Load the configuration file, writing a default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            mapping_file: default_mapping_file(),
            input_kind: InputKind::default(),
            substitution_mode: SubstitutionMode::default(),
            converter: ConverterConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
