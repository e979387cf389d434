/*!
 * Tests for the substitution engine and its strategies
 */

use doctranslate::document::model::paragraph_element;
use doctranslate::document::{Element, Paragraph, TextRuns};
use doctranslate::errors::DocumentError;
use doctranslate::mapping::Mapping;
use doctranslate::substitution::{
    ForceFirstRunPass, MarkupTextPass, ParagraphRebuildPass, ParagraphStrategy, RunLocalPass,
    SubstitutionEngine, SubstitutionMode,
};
use crate::common;

fn invoice_mapping() -> Mapping {
    Mapping::parse("Invoice=Factura\nTotal=Importe\n")
}

fn runs(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

/// Paragraph whose text can come from content outside any run
struct LooseTextParagraph {
    loose: String,
    runs: Vec<String>,
}

impl TextRuns for LooseTextParagraph {
    fn run_count(&self) -> usize {
        self.runs.len()
    }

    fn run_text(&self, index: usize) -> String {
        self.runs[index].clone()
    }

    fn set_run_text(&mut self, index: usize, text: &str) -> Result<(), DocumentError> {
        self.runs[index] = text.to_string();
        Ok(())
    }

    fn append_run(&mut self, text: &str) -> Result<(), DocumentError> {
        self.loose.clear();
        self.runs.push(text.to_string());
        Ok(())
    }

    fn text(&self) -> String {
        format!("{}{}", self.loose, self.runs.concat())
    }
}

/// A match inside one run keeps every run
#[test]
fn test_substitute_withMatchInsideRun_shouldKeepRunStructure() {
    let engine = SubstitutionEngine::default();
    let mut paragraph = runs(&["Invoice", " #123 ", "Total"]);

    engine.substitute(&mut paragraph, &invoice_mapping());

    assert_eq!(paragraph, runs(&["Factura", " #123 ", "Importe"]));
}

/// A match straddling runs is collapsed into the first run
#[test]
fn test_substitute_withStraddlingMatch_shouldCollapseIntoFirstRun() {
    common::init_logging();
    let engine = SubstitutionEngine::new(SubstitutionMode::Layered);
    let mut element = paragraph_element(&["Inv", "oice #123"]);

    engine.substitute(&mut Paragraph::new(&mut element), &invoice_mapping());

    let paragraph = Paragraph::new(&mut element);
    assert_eq!(paragraph.text(), "Factura #123");
    assert_eq!(paragraph.run_count(), 2);
    assert_eq!(paragraph.run_text(0), "Factura #123");
    assert_eq!(paragraph.run_text(1), "");
    // Formatting of the first run survives
    assert!(element.children[0].child("rPr").is_some());
}

/// Run-local mode never merges runs, so a straddling match stays
#[test]
fn test_substitute_withRunLocalMode_shouldLeaveStraddlingMatch() {
    let engine = SubstitutionEngine::new(SubstitutionMode::RunLocal);
    let mut paragraph = runs(&["Inv", "oice ", "Total"]);

    engine.substitute(&mut paragraph, &invoice_mapping());

    assert_eq!(paragraph, runs(&["Inv", "oice ", "Importe"]));
    assert_eq!(engine.strategy_names(), vec!["run-local"]);
}

/// Text without any source is left untouched
#[test]
fn test_substitute_withoutMatches_shouldNotModifyRuns() {
    let engine = SubstitutionEngine::default();
    let mut paragraph = runs(&["Nothing", " here"]);

    engine.substitute(&mut paragraph, &invoice_mapping());

    assert_eq!(paragraph, runs(&["Nothing", " here"]));
}

/// Mapping order decides overlapping replacements
#[test]
fn test_substitute_withOverlappingSources_shouldFollowMappingOrder() {
    let engine = SubstitutionEngine::default();
    let mapping = Mapping::parse("cat=gato\ncategory=categoria\n");
    let mut paragraph = runs(&["category"]);

    engine.substitute(&mut paragraph, &mapping);

    assert_eq!(paragraph, runs(&["gatoegory"]));
}

#[test]
fn test_engine_layeredMode_shouldListStrategiesInOrder() {
    let engine = SubstitutionEngine::new(SubstitutionMode::Layered);
    assert_eq!(engine.strategy_names(), vec!["run-local", "paragraph-rebuild"]);
    assert_eq!(engine.mode(), SubstitutionMode::Layered);
}

#[test]
fn test_engine_withCustomStrategies_shouldOnlyRunThem() {
    let engine = SubstitutionEngine::with_strategies(
        SubstitutionMode::Layered,
        vec![Box::new(ParagraphRebuildPass)],
    );
    let mut paragraph = runs(&["Invoice", " ", "Total"]);

    engine.substitute(&mut paragraph, &invoice_mapping());

    assert_eq!(paragraph, runs(&["Factura Importe", "", ""]));
}

#[test]
fn test_runLocalPass_shouldReportRewrittenRuns() {
    let mut paragraph = runs(&["Invoice", "Invoice", "x"]);

    let rewritten = RunLocalPass.apply(&mut paragraph, &invoice_mapping());

    assert_eq!(rewritten, 2);
}

/// The forced pass rewrites a lone run in place
#[test]
fn test_forceFirstRunPass_withSingleRun_shouldRewriteIt() {
    let mut paragraph = runs(&["Invoice Total"]);

    let rewritten = ForceFirstRunPass.apply(&mut paragraph, &invoice_mapping());

    assert_eq!(rewritten, 1);
    assert_eq!(paragraph, runs(&["Factura Importe"]));
}

/// The markup pass reaches text outside of runs, including tails
#[test]
fn test_markupTextPass_shouldRewriteTextAndTails() {
    let mut root = Element::new("root")
        .with_child(Element::new("w:instrText").with_text("Invoice field"))
        .with_child(Element::new("other"));
    if let Some(other) = root.child_mut("other") {
        other.set_tail(Some("Total tail".to_string())).unwrap();
    }

    let stats = MarkupTextPass.apply(&mut root, &invoice_mapping());

    assert_eq!(stats.rewritten, 2);
    assert_eq!(stats.failures, 0);
    assert_eq!(root.child("instrText").and_then(|e| e.text()), Some("Factura field"));
    assert_eq!(root.child("other").and_then(|e| e.tail()), Some("Importe tail"));
}

/// Targets the markup cannot carry are counted as failures, not fatal
#[test]
fn test_markupTextPass_withInvalidTarget_shouldCountFailure() {
    common::init_logging();
    let mapping = Mapping::parse("Invoice=bad\u{1}\n");
    let mut root = Element::new("root").with_child(Element::new("t").with_text("Invoice"));

    let stats = MarkupTextPass.apply(&mut root, &mapping);

    assert_eq!(stats.failures, 1);
    assert_eq!(root.child("t").and_then(|e| e.text()), Some("Invoice"));
}

/// Text held outside runs gets a new run carrying the substituted text
#[test]
fn test_forceFirstRunPass_withTextOutsideRuns_shouldCreateRun() {
    let mut paragraph = LooseTextParagraph {
        loose: "Invoice Total".to_string(),
        runs: Vec::new(),
    };

    let rewritten = ForceFirstRunPass.apply(&mut paragraph, &invoice_mapping());

    assert_eq!(rewritten, 1);
    assert_eq!(paragraph.runs, runs(&["Factura Importe"]));
    assert_eq!(paragraph.text(), "Factura Importe");
}

/// Without runs or text there is nothing to rewrite
#[test]
fn test_forceFirstRunPass_withEmptyParagraphElement_shouldNotCreateRun() {
    let mut element = Element::new("w:p");

    let rewritten = ForceFirstRunPass.apply(&mut Paragraph::new(&mut element), &invoice_mapping());

    assert_eq!(rewritten, 0);
    assert!(element.children.is_empty());
}
