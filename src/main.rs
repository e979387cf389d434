// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{error, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use doctranslate::app_config::{self, Config, InputKind};
use doctranslate::{AppError, Controller, SubstitutionMode};

/// CLI Wrapper for InputKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliInputKind {
    Pdf,
    Docx,
}

impl From<CliInputKind> for InputKind {
    fn from(cli_kind: CliInputKind) -> Self {
        match cli_kind {
            CliInputKind::Pdf => InputKind::Pdf,
            CliInputKind::Docx => InputKind::Docx,
        }
    }
}

/// CLI Wrapper for SubstitutionMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubstitutionMode {
    Layered,
    RunLocal,
}

impl From<CliSubstitutionMode> for SubstitutionMode {
    fn from(cli_mode: CliSubstitutionMode) -> Self {
        match cli_mode {
            CliSubstitutionMode::Layered => SubstitutionMode::Layered,
            CliSubstitutionMode::RunLocal => SubstitutionMode::RunLocal,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate every document of the input directory (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for doctranslate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct TranslateArgs {
    /// Directory containing the documents to translate
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory receiving translated documents
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Mapping file with one source=target pair per line
    #[arg(short, long)]
    mapping: Option<PathBuf>,

    /// Kind of input document
    #[arg(short, long, value_enum)]
    kind: Option<CliInputKind>,

    /// Substitution strategies to apply
    #[arg(long, value_enum)]
    mode: Option<CliSubstitutionMode>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// doctranslate - dictionary translation for PDF and DOCX documents
///
/// Converts PDFs to DOCX and replaces text using a source=target mapping
/// file, keeping paragraph, table, header and footer formatting where possible.
#[derive(Parser, Debug)]
#[command(name = "doctranslate")]
#[command(version)]
#[command(about = "Dictionary translation for PDF and DOCX documents")]
#[command(long_about = "doctranslate converts PDF documents to DOCX and replaces their text using a mapping file.

EXAMPLES:
    doctranslate                                  # Translate invoice/*.pdf into translated/
    doctranslate -k docx -i letters               # Translate existing DOCX files
    doctranslate -m words.txt --mode run-local    # Never merge formatting runs
    doctranslate completions bash > doctranslate.bash

MAPPING FILE:
    One source=target pair per line. Lines are split on the first '='.
    Blank lines, lines starting with '#' and lines without '=' are ignored.

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file
    doesn't exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // The logger accepts everything; the max level filters
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctranslate", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args),
        None => run_translate(cli.translate),
    }
}

fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, options.clone());

    config.validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    info!(
        "Translating {} files from {:?} into {:?} ({} mode)",
        config.input_kind, config.input_dir, config.output_dir, config.substitution_mode
    );

    let controller = Controller::with_config(config)?.with_progress(true);
    match controller.run() {
        Ok(report) => {
            if !report.failed.is_empty() {
                error!("{} of {} file(s) failed", report.failed.len(), report.total());
            }
            Ok(())
        }
        Err(e @ AppError::ResourceNotFound(_)) => Err(e).context("Cannot start translation"),
        Err(e) => Err(e.into()),
    }
}

// Override config with CLI options if provided
fn apply_overrides(config: &mut Config, options: TranslateArgs) {
    if let Some(input_dir) = options.input_dir {
        config.input_dir = input_dir;
    }
    if let Some(output_dir) = options.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(mapping) = options.mapping {
        config.mapping_file = mapping;
    }
    if let Some(kind) = options.kind {
        config.input_kind = kind.into();
    }
    if let Some(mode) = options.mode {
        config.substitution_mode = mode.into();
    }
    if let Some(log_level) = options.log_level {
        config.log_level = log_level.into();
    }
}
