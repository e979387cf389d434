/*!
 * Document driver: runs the substitution engine over every text container of
 * a loaded document and persists the result.
 *
 * Containers are visited in a fixed order: body paragraphs, body table cells,
 * then each section's header and footer. In layered mode the raw markup pass
 * and a final forced pass over body paragraphs follow.
 */

use log::{debug, info};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::document::{Document, Paragraph, TextRuns, walk_story};
use crate::errors::{AppError, DocumentError};
use crate::file_utils::FileManager;
use crate::mapping::Mapping;
use crate::substitution::{
    ForceFirstRunPass, MarkupPassStats, MarkupTextPass, ParagraphStrategy, SubstitutionEngine,
};

/// What one document translation changed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TranslationStats {
    /// Paragraphs visited by the engine
    pub paragraphs: usize,
    /// Paragraphs whose aggregate text changed
    pub paragraphs_changed: usize,
    /// Raw markup pass counters (layered mode only)
    pub markup: Option<MarkupPassStats>,
    /// Runs rewritten by the final forced pass
    pub forced_runs: usize,
}

/// Apply the mapping to every text container of `document`, in place.
pub fn translate_document(
    document: &mut Document,
    mapping: &Mapping,
    engine: &SubstitutionEngine,
) -> TranslationStats {
    let mut stats = TranslationStats::default();

    {
        let mut visit = |paragraph: &mut Paragraph<'_>| {
            let before = paragraph.text();
            engine.substitute(paragraph, mapping);
            stats.paragraphs += 1;
            if paragraph.text() != before {
                stats.paragraphs_changed += 1;
            }
        };

        document.for_each_paragraph(&mut visit);
        document.for_each_table_paragraph(&mut visit);

        // Sections without their own parts inherit the previous ones; each
        // part is translated once.
        let mut visited = HashSet::new();
        let parts: Vec<String> = document
            .sections()
            .iter()
            .flat_map(|s| s.header.iter().chain(s.footer.iter()))
            .cloned()
            .collect();
        for part in parts {
            if !visited.insert(part.clone()) {
                continue;
            }
            if let Some(story) = document.story_mut(&part) {
                walk_story(story, &mut visit);
            }
        }
    }

    if engine.mode().is_layered() {
        let markup = MarkupTextPass.apply(document.markup_mut(), mapping);
        debug!(
            "Markup pass visited {} node(s), rewrote {}, failed {}",
            markup.nodes, markup.rewritten, markup.failures
        );
        stats.markup = Some(markup);

        let force = ForceFirstRunPass;
        document.for_each_paragraph(&mut |paragraph| {
            stats.forced_runs += force.apply(paragraph, mapping);
        });
    }

    stats
}

/// Persist a translated document, creating the output directory if needed.
pub fn save_translated(document: &Document, output_path: &Path) -> Result<(), AppError> {
    let persistence_failure = |source: DocumentError| AppError::PersistenceFailure {
        path: output_path.to_path_buf(),
        source,
    };

    if let Some(parent) = output_path.parent() {
        FileManager::ensure_dir(parent).map_err(|e| {
            persistence_failure(DocumentError::Io(std::io::Error::other(format!("{:#}", e))))
        })?;
    }

    document.save(output_path).map_err(persistence_failure)
}

/// Load, translate and save one document: Loaded → Substituted → Saved.
///
/// `output_path` is written; `input` is only read.
pub fn translate_file(
    input: &Path,
    output_path: &Path,
    mapping: &Mapping,
    engine: &SubstitutionEngine,
) -> Result<PathBuf, AppError> {
    let mut document = Document::open(input)?;
    let stats = translate_document(&mut document, mapping, engine);
    save_translated(&document, output_path)?;

    info!(
        "Translated document saved: {:?} ({} of {} paragraph(s) changed)",
        output_path, stats.paragraphs_changed, stats.paragraphs
    );
    Ok(output_path.to_path_buf())
}
