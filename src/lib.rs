/*!
 * # doctranslate - dictionary translation for PDF and DOCX documents
 *
 * A Rust library that converts PDF documents to editable DOCX files and
 * translates their text with a literal find/replace mapping while keeping as
 * much of the formatting as possible.
 *
 * ## Features
 *
 * - Convert PDFs to DOCX through an external converter program
 * - Load `source=target` mapping files
 * - Replace text in paragraphs, tables, headers and footers
 * - Layered fallback passes for matches split across formatting runs
 * - Batch processing of a whole input directory
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `mapping`: Mapping file loading
 * - `document`: DOCX object model:
 *   - `document::markup`: Raw element tree with text and tail content
 *   - `document::model`: Paragraph/run views and story traversal
 *   - `document::package`: Zip package loading and saving
 * - `substitution`: Substitution engine and its fallback strategies
 * - `translator`: Per-document driver (substitute, then save)
 * - `converter`: PDF to DOCX collaborator
 * - `file_utils`: File system operations
 * - `app_controller`: Batch controller
 * - `errors`: Custom error types for the application
 *
 * ## Known limitation
 *
 * When a match straddles formatting runs, the paragraph's text is rewritten
 * into its first run and the other runs are blanked, so the paragraph takes
 * the first run's formatting.
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod converter;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod mapping;
pub mod substitution;
pub mod translator;

// Re-export main types for easier usage
pub use app_config::{Config, InputKind};
pub use app_controller::{BatchReport, Controller};
pub use converter::{CommandConverter, DocumentConverter};
pub use document::{Document, Paragraph, TextRuns};
pub use errors::{AppError, ConversionError, DocumentError};
pub use mapping::Mapping;
pub use substitution::{SubstitutionEngine, SubstitutionMode};
