/*!
 * Tests for the document object model and package handling
 */

use anyhow::Result;
use doctranslate::document::model::{paragraph_element, run_text};
use doctranslate::document::{Document, Element, MarkupTree, Paragraph, Section, TextRuns};
use doctranslate::errors::DocumentError;
use crate::common;

/// Runs split by the converter read back as one paragraph text
#[test]
fn test_paragraphTexts_withSplitRuns_shouldConcatenateRuns() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("split.docx");
    let body = format!(
        "{}{}",
        common::paragraph_xml(&["Inv", "oice #123"]),
        common::paragraph_xml(&["Total ", "due"])
    );
    common::write_docx(&path, &body, &common::paragraph_xml(&["Header"]), &common::paragraph_xml(&["Footer"]))?;

    let document = Document::open(&path)?;

    assert_eq!(document.paragraph_texts(), vec!["Invoice #123", "Total due"]);
    Ok(())
}

/// Header and footer parts are resolved through the section properties
#[test]
fn test_open_shouldResolveSectionHeaderAndFooter() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("sections.docx");
    common::write_docx(
        &path,
        &common::paragraph_xml(&["Body"]),
        &common::paragraph_xml(&["Invoice header"]),
        &common::paragraph_xml(&["Page footer"]),
    )?;

    let document = Document::open(&path)?;

    assert_eq!(document.main_part(), "word/document.xml");
    assert_eq!(
        document.sections(),
        &[Section {
            header: Some("word/header1.xml".to_string()),
            footer: Some("word/footer1.xml".to_string()),
        }]
    );
    let header = document.story("word/header1.xml").expect("header part");
    assert_eq!(header.text_content(), "Invoice header");
    Ok(())
}

/// Saving without changes keeps every part readable and the same text
#[test]
fn test_save_withoutChanges_shouldPreserveContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("in.docx");
    let output = temp_dir.path().join("out.docx");
    let body = format!(
        "{}{}",
        common::paragraph_xml(&["A & B < C"]),
        common::table_xml(&[&["Cell"]])
    );
    common::write_docx(&input, &body, &common::paragraph_xml(&["H"]), &common::paragraph_xml(&["F"]))?;

    let document = Document::open(&input)?;
    document.save(&output)?;
    let reloaded = Document::open(&output)?;

    assert_eq!(reloaded.paragraph_texts(), document.paragraph_texts());
    assert_eq!(reloaded.markup(), document.markup());
    assert_eq!(reloaded.sections(), document.sections());
    Ok(())
}

/// Bytes that are not a zip package fail to load
#[test]
fn test_open_withCorruptPackage_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.docx", "definitely not a zip")?;

    let result = Document::open(&path);

    assert!(matches!(result, Err(DocumentError::Package(_))));
    Ok(())
}

#[test]
fn test_fromDocumentXml_withMalformedMarkup_shouldReportPart() {
    let result = Document::from_document_xml("<w:document><w:body></w:document>");

    match result {
        Err(DocumentError::Markup { part, .. }) => assert_eq!(part, "word/document.xml"),
        other => panic!("expected markup error, got {:?}", other.map(|_| ())),
    }
}

/// Tabs and breaks are read as characters and written back as elements
#[test]
fn test_setRunText_withTabAndBreak_shouldRoundTripThroughElements() -> Result<()> {
    let mut element = paragraph_element(&["placeholder"]);
    let mut paragraph = Paragraph::new(&mut element);

    paragraph.set_run_text(0, "Qty\tPrice\nTotal")?;

    assert_eq!(paragraph.text(), "Qty\tPrice\nTotal");
    let run = &element.children[0];
    let names: Vec<&str> = run.children.iter().map(|c| c.local_name()).collect();
    assert_eq!(names, vec!["rPr", "t", "tab", "t", "br", "t"]);
    assert_eq!(run_text(run), "Qty\tPrice\nTotal");
    Ok(())
}

/// Control characters are rejected without touching the run
#[test]
fn test_setRunText_withControlCharacter_shouldFailAndKeepRun() {
    let mut element = paragraph_element(&["Keep me"]);
    let mut paragraph = Paragraph::new(&mut element);

    let result = paragraph.set_run_text(0, "bad\u{1}text");

    assert!(matches!(result, Err(DocumentError::NodeMutationFailure { .. })));
    assert_eq!(paragraph.text(), "Keep me");
}

/// Text and tails survive a parse/render cycle
#[test]
fn test_markupTree_shouldKeepTextAndTail() -> Result<()> {
    let xml = br#"<root><a>lead</a>tail<b/>more</root>"#;

    let tree = MarkupTree::parse("part.xml", xml)?;
    let a: &Element = tree.root.child("a").expect("a");

    assert_eq!(a.text(), Some("lead"));
    assert_eq!(a.tail(), Some("tail"));
    assert_eq!(tree.root.child("b").and_then(|b| b.tail()), Some("more"));

    let rendered = String::from_utf8(tree.to_xml()?)?;
    assert!(rendered.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
    assert!(rendered.ends_with("<root><a>lead</a>tail<b/>more</root>"));
    Ok(())
}
