/*!
 * End-to-end translation of single documents
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use doctranslate::document::Document;
use doctranslate::errors::AppError;
use doctranslate::file_utils::FileManager;
use doctranslate::mapping::Mapping;
use doctranslate::substitution::{SubstitutionEngine, SubstitutionMode};
use doctranslate::translator;
use crate::common;

fn invoice_mapping() -> Mapping {
    Mapping::parse("Invoice=Factura\nTotal=Importe\nPage=Pagina\n")
}

fn write_invoice(path: &Path) -> Result<()> {
    let body = format!(
        "{}{}{}",
        common::paragraph_xml(&["Inv", "oice #123"]),
        common::paragraph_xml(&["Customer: ACME"]),
        common::table_xml(&[&["Total"], &["42.00"]]),
    );
    common::write_docx(
        path,
        &body,
        &common::paragraph_xml(&["Invoice header"]),
        &common::paragraph_xml(&["Page 1"]),
    )
}

/// Body, table, header and footer are all translated
#[test]
fn test_translateFile_shouldTranslateEveryContainer() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("invoice_2024.docx");
    let output = temp_dir.path().join("translated").join("invoice_2024_translated.docx");
    write_invoice(&input)?;

    let saved = translator::translate_file(&input, &output, &invoice_mapping(), &SubstitutionEngine::default())?;

    assert_eq!(saved, output);
    let document = Document::open(&output)?;
    assert_eq!(document.paragraph_texts(), vec!["Factura #123", "Customer: ACME"]);

    let body_text = document.markup().text_content();
    assert!(body_text.contains("Importe"));
    assert!(body_text.contains("42.00"));
    assert!(!body_text.contains("Total"));

    let header = document.story("word/header1.xml").expect("header part");
    let footer = document.story("word/footer1.xml").expect("footer part");
    assert_eq!(header.text_content(), "Factura header");
    assert_eq!(footer.text_content(), "Pagina 1");
    Ok(())
}

/// The input document is never modified
#[test]
fn test_translateFile_shouldLeaveInputUnchanged() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("invoice.docx");
    let output = temp_dir.path().join("out.docx");
    write_invoice(&input)?;
    let original = fs::read(&input)?;

    translator::translate_file(&input, &output, &invoice_mapping(), &SubstitutionEngine::default())?;

    assert_eq!(fs::read(&input)?, original);
    Ok(())
}

/// An empty mapping produces a document with the same text
#[test]
fn test_translateFile_withEmptyMapping_shouldKeepText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("invoice.docx");
    let output = temp_dir.path().join("out.docx");
    write_invoice(&input)?;

    translator::translate_file(&input, &output, &Mapping::new(), &SubstitutionEngine::default())?;

    let before = Document::open(&input)?;
    let after = Document::open(&output)?;
    assert_eq!(after.paragraph_texts(), before.paragraph_texts());
    assert_eq!(after.markup(), before.markup());
    Ok(())
}

/// Run-local mode keeps straddling matches but still fixes whole-run ones
#[test]
fn test_translateDocument_withRunLocalMode_shouldNotMergeRuns() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("invoice.docx");
    write_invoice(&input)?;

    let mut document = Document::open(&input)?;
    let engine = SubstitutionEngine::new(SubstitutionMode::RunLocal);
    let stats = translator::translate_document(&mut document, &invoice_mapping(), &engine);

    assert_eq!(document.paragraph_texts(), vec!["Invoice #123", "Customer: ACME"]);
    assert!(stats.markup.is_none());
    assert_eq!(stats.forced_runs, 0);
    assert!(document.markup().text_content().contains("Importe"));
    Ok(())
}

/// Translation statistics count every visited container
#[test]
fn test_translateDocument_shouldReportVisitedParagraphs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("invoice.docx");
    write_invoice(&input)?;

    let mut document = Document::open(&input)?;
    let stats = translator::translate_document(&mut document, &invoice_mapping(), &SubstitutionEngine::default());

    // 2 body paragraphs, 2 table cells, 1 header and 1 footer paragraph
    assert_eq!(stats.paragraphs, 6);
    assert_eq!(stats.paragraphs_changed, 4);
    assert!(stats.markup.is_some());
    Ok(())
}

/// Output names follow the input stem
#[test]
fn test_outputPath_forPdfInput_shouldBeStemTranslatedDocx() {
    let output = FileManager::generate_output_path(
        Path::new("invoice/invoice_2024.pdf"),
        Path::new("translated"),
        Some("docx"),
    );
    assert_eq!(output, Path::new("translated/invoice_2024_translated.docx"));
}

/// Failing to create the output directory is a persistence failure
#[test]
fn test_saveTranslated_withUnwritableTarget_shouldReportPersistenceFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("invoice.docx");
    write_invoice(&input)?;
    // A regular file where a parent of the output directory should be
    let blocker = common::create_test_file(temp_dir.path(), "blocked", "file")?;
    let output = blocker.join("translated").join("out.docx");

    let document = Document::open(&input)?;
    let result = translator::save_translated(&document, &output);

    assert!(matches!(result, Err(AppError::PersistenceFailure { path, .. }) if path == output));
    Ok(())
}

/// Saving over a directory fails after the output directory exists
#[test]
fn test_saveTranslated_withDirectoryAsTarget_shouldReportPersistenceFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("invoice.docx");
    write_invoice(&input)?;
    let output = temp_dir.path().join("occupied.docx");
    fs::create_dir(&output)?;

    let document = Document::open(&input)?;
    let result = translator::save_translated(&document, &output);

    assert!(matches!(result, Err(AppError::PersistenceFailure { .. })));
    Ok(())
}
