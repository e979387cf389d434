/*!
 * Paragraph-level substitution strategies.
 *
 * Each strategy is a fallback for the one before it:
 * 1. `RunLocalPass` replaces matches lying wholly inside one run
 * 2. `ParagraphRebuildPass` rewrites the paragraph through its first run
 *    when a match still straddles run boundaries
 * 3. `ForceFirstRunPass` does the same for paragraphs without usable runs
 *
 * Strategies 2 and 3 collapse the paragraph's formatting to that of its first
 * run. Visible text wins over run styling.
 */

use log::warn;

use crate::document::TextRuns;
use crate::mapping::Mapping;

/// One fallback step applied to a single paragraph.
pub trait ParagraphStrategy {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Apply the strategy, returning how many runs were rewritten.
    ///
    /// Node failures are logged and skipped, never returned.
    fn apply(&self, paragraph: &mut dyn TextRuns, mapping: &Mapping) -> usize;
}

/// Replace each source inside every run that wholly contains it
#[derive(Debug, Default, Clone, Copy)]
pub struct RunLocalPass;

impl ParagraphStrategy for RunLocalPass {
    fn name(&self) -> &'static str {
        "run-local"
    }

    fn apply(&self, paragraph: &mut dyn TextRuns, mapping: &Mapping) -> usize {
        let mut rewritten = 0;

        for (source, target) in mapping.iter() {
            if !paragraph.text().contains(source) {
                continue;
            }

            for index in 0..paragraph.run_count() {
                let run_text = paragraph.run_text(index);
                if !run_text.contains(source) {
                    continue;
                }
                match paragraph.set_run_text(index, &run_text.replace(source, target)) {
                    Ok(()) => rewritten += 1,
                    Err(e) => warn!("{} pass skipped run {}: {}", self.name(), index, e),
                }
            }
        }

        rewritten
    }
}

/// Write the fully substituted paragraph text into the first run
#[derive(Debug, Default, Clone, Copy)]
pub struct ParagraphRebuildPass;

impl ParagraphStrategy for ParagraphRebuildPass {
    fn name(&self) -> &'static str {
        "paragraph-rebuild"
    }

    fn apply(&self, paragraph: &mut dyn TextRuns, mapping: &Mapping) -> usize {
        let text = paragraph.text();
        if paragraph.run_count() == 0 || !mapping.contains_any_source(&text) {
            return 0;
        }

        if let Err(e) = paragraph.set_run_text(0, &mapping.apply(&text)) {
            // Leave the remaining runs alone so no text is lost
            warn!("{} pass could not rewrite first run: {}", self.name(), e);
            return 0;
        }

        1 + blank_runs_after_first(paragraph, self.name())
    }
}

/// Blank every run, then put the substituted text in the first one,
/// creating it when the paragraph has no runs.
///
/// A `Paragraph` without runs always reads as empty text, so the creating
/// branch is only reached by `TextRuns` implementations whose text does not
/// come from runs alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForceFirstRunPass;

impl ParagraphStrategy for ForceFirstRunPass {
    fn name(&self) -> &'static str {
        "force-first-run"
    }

    fn apply(&self, paragraph: &mut dyn TextRuns, mapping: &Mapping) -> usize {
        let text = paragraph.text();
        if text.is_empty() || !mapping.contains_any_source(&text) {
            return 0;
        }
        let substituted = mapping.apply(&text);

        if paragraph.run_count() == 0 {
            return match paragraph.append_run(&substituted) {
                Ok(()) => 1,
                Err(e) => {
                    warn!("{} pass could not add a run: {}", self.name(), e);
                    0
                }
            };
        }

        if let Err(e) = paragraph.set_run_text(0, &substituted) {
            warn!("{} pass could not rewrite first run: {}", self.name(), e);
            return 0;
        }
        1 + blank_runs_after_first(paragraph, self.name())
    }
}

fn blank_runs_after_first(paragraph: &mut dyn TextRuns, pass: &str) -> usize {
    let mut blanked = 0;
    for index in 1..paragraph.run_count() {
        match paragraph.set_run_text(index, "") {
            Ok(()) => blanked += 1,
            Err(e) => warn!("{} pass could not blank run {}: {}", pass, index, e),
        }
    }
    blanked
}
