use anyhow::Result;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::{Config, InputKind};
use crate::converter::{CommandConverter, DocumentConverter};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::mapping::Mapping;
use crate::substitution::SubstitutionEngine;
use crate::translator;

// @module: Application controller for batch document translation

/// Outcome of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output paths of documents translated successfully
    pub translated: Vec<PathBuf>,
    /// Inputs that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.translated.len() + self.failed.len()
    }
}

/// Main application controller for document translation
pub struct Controller<C: DocumentConverter = CommandConverter> {
    // @field: App configuration
    config: Config,
    // @field: PDF to DOCX collaborator
    converter: C,
    // @field: Substitution strategies for the configured mode
    engine: SubstitutionEngine,
    // @field: Whether to draw a progress bar
    show_progress: bool,
}

impl Controller<CommandConverter> {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let converter = CommandConverter::from_config(&config.converter);
        Self::with_converter(config, converter)
    }
}

impl<C: DocumentConverter> Controller<C> {
    /// Create a controller with an explicit converter
    pub fn with_converter(config: Config, converter: C) -> Result<Self> {
        config.validate()?;
        let engine = SubstitutionEngine::new(config.substitution_mode);

        Ok(Self {
            config,
            converter,
            engine,
            show_progress: false,
        })
    }

    /// Enable or disable the batch progress bar
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Translate every input document of the configured directory.
    ///
    /// A missing input directory or mapping file aborts before any work.
    /// Failures of individual files are logged and collected in the report.
    pub fn run(&self) -> Result<BatchReport, AppError> {
        let start_time = std::time::Instant::now();
        let input_dir = &self.config.input_dir;

        if !FileManager::dir_exists(input_dir) {
            return Err(AppError::ResourceNotFound(input_dir.clone()));
        }
        if !FileManager::file_exists(&self.config.mapping_file) {
            return Err(AppError::ResourceNotFound(self.config.mapping_file.clone()));
        }

        let mapping = Mapping::load(&self.config.mapping_file)?;
        info!("Loaded {} translation mappings", mapping.len());

        let extension = self.config.input_kind.extension();
        let input_files = FileManager::find_files(input_dir, extension)?;
        let mut report = BatchReport::default();

        if input_files.is_empty() {
            warn!("No {} files found in {:?}", extension.to_uppercase(), input_dir);
            return Ok(report);
        }
        info!("Found {} {} file(s) to process", input_files.len(), extension.to_uppercase());

        let progress_bar = self.create_progress_bar(input_files.len() as u64);

        for input_file in &input_files {
            let file_name = input_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress_bar.set_message(format!("Processing: {}", file_name));

            match self.process_file(input_file, &mapping) {
                Ok(output_path) => {
                    info!("Successfully processed: {} -> {:?}", file_name, output_path);
                    report.translated.push(output_path);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", file_name, e);
                    report.failed.push((input_file.clone(), e.to_string()));
                }
            }

            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();

        info!(
            "Batch completed in {}: {} translated, {} failed",
            Self::format_duration(start_time.elapsed()),
            report.translated.len(),
            report.failed.len()
        );

        Ok(report)
    }

    /// Translate one input document according to the configured input kind
    pub fn process_file(&self, input_file: &Path, mapping: &Mapping) -> Result<PathBuf, AppError> {
        match self.config.input_kind {
            InputKind::Pdf => self.process_pdf(input_file, mapping),
            InputKind::Docx => {
                let output_path =
                    FileManager::generate_output_path(input_file, &self.config.output_dir, None);
                translator::translate_file(input_file, &output_path, mapping, &self.engine)
            }
        }
    }

    /// Convert a PDF to a temporary DOCX, then translate it.
    ///
    /// The intermediate document lives in a temporary directory inside the
    /// output directory and is removed when this returns.
    fn process_pdf(&self, pdf_path: &Path, mapping: &Mapping) -> Result<PathBuf, AppError> {
        let output_dir = &self.config.output_dir;
        FileManager::ensure_dir(output_dir)?;

        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());

        let workspace = tempfile::Builder::new()
            .prefix(".doctranslate-")
            .tempdir_in(output_dir)?;
        let structured_path = workspace.path().join(format!("{}_structured.docx", stem));

        info!("Converting PDF to DOCX: {:?}", pdf_path);
        self.converter.convert(pdf_path, &structured_path)?;

        let output_path = FileManager::generate_output_path(pdf_path, output_dir, Some("docx"));
        let result = translator::translate_file(&structured_path, &output_path, mapping, &self.engine);

        if let Err(e) = workspace.close() {
            warn!("Could not remove temporary conversion files: {}", e);
        }

        result
    }

    fn create_progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
