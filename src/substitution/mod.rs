/*!
 * Text substitution engine.
 *
 * Applies a mapping to document text while tolerating the arbitrary run
 * boundaries left by the upstream converter. Substitution is an ordered list
 * of fallback strategies:
 *
 * - `passes`: paragraph strategies (run-local, paragraph rebuild, force first run)
 * - `markup_pass`: document-wide rewrite of raw markup text and tails
 */

pub mod markup_pass;
pub mod passes;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::document::TextRuns;
use crate::mapping::Mapping;

pub use markup_pass::{MarkupPassStats, MarkupTextPass};
pub use passes::{ForceFirstRunPass, ParagraphRebuildPass, ParagraphStrategy, RunLocalPass};

/// Which fallback strategies run
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SubstitutionMode {
    /// Run-local and paragraph-rebuild per paragraph, then the markup pass and
    /// a final forced pass over body paragraphs
    #[default]
    Layered,
    /// Run-local replacement only; never collapses runs
    RunLocal,
}

impl SubstitutionMode {
    pub fn is_layered(&self) -> bool {
        matches!(self, Self::Layered)
    }
}

impl std::fmt::Display for SubstitutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layered => write!(f, "layered"),
            Self::RunLocal => write!(f, "run-local"),
        }
    }
}

/// Ordered paragraph strategies for one substitution mode
pub struct SubstitutionEngine {
    mode: SubstitutionMode,
    strategies: Vec<Box<dyn ParagraphStrategy>>,
}

impl SubstitutionEngine {
    pub fn new(mode: SubstitutionMode) -> Self {
        let mut strategies: Vec<Box<dyn ParagraphStrategy>> = vec![Box::new(RunLocalPass)];
        if mode.is_layered() {
            strategies.push(Box::new(ParagraphRebuildPass));
        }
        Self { mode, strategies }
    }

    /// Engine with a custom strategy list
    pub fn with_strategies(mode: SubstitutionMode, strategies: Vec<Box<dyn ParagraphStrategy>>) -> Self {
        Self { mode, strategies }
    }

    pub fn mode(&self) -> SubstitutionMode {
        self.mode
    }

    /// Names of the paragraph strategies in application order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Substitute every mapping source in one paragraph, in place.
    pub fn substitute(&self, paragraph: &mut dyn TextRuns, mapping: &Mapping) {
        if mapping.is_empty() {
            return;
        }
        for strategy in &self.strategies {
            let rewritten = strategy.apply(paragraph, mapping);
            if rewritten > 0 {
                trace!("{} rewrote {} run(s)", strategy.name(), rewritten);
            }
        }
    }
}

impl Default for SubstitutionEngine {
    fn default() -> Self {
        Self::new(SubstitutionMode::default())
    }
}
