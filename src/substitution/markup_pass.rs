/*!
 * Document-wide substitution over raw markup nodes.
 *
 * Catches text the paragraph/run views never reach: every node's leading
 * text and trailing tail are rewritten independently.
 */

use log::warn;

use crate::document::Element;
use crate::mapping::Mapping;

/// Counters from one markup pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MarkupPassStats {
    /// Nodes visited
    pub nodes: usize,
    /// Text or tail fields rewritten
    pub rewritten: usize,
    /// Fields that could not be rewritten
    pub failures: usize,
}

/// Apply the mapping to the text and tail of every node under `root`
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupTextPass;

impl MarkupTextPass {
    pub fn apply(&self, root: &mut Element, mapping: &Mapping) -> MarkupPassStats {
        let mut stats = MarkupPassStats::default();

        root.for_each_node_mut(&mut |node| {
            stats.nodes += 1;

            if let Some(text) = node.text().filter(|t| mapping.contains_any_source(t)) {
                let replaced = mapping.apply(text);
                match node.set_text(Some(replaced)) {
                    Ok(()) => stats.rewritten += 1,
                    Err(e) => {
                        stats.failures += 1;
                        warn!("Could not modify text for element {}: {}", node.name, e);
                    }
                }
            }

            if let Some(tail) = node.tail().filter(|t| mapping.contains_any_source(t)) {
                let replaced = mapping.apply(tail);
                match node.set_tail(Some(replaced)) {
                    Ok(()) => stats.rewritten += 1,
                    Err(e) => {
                        stats.failures += 1;
                        warn!("Could not modify tail text for element {}: {}", node.name, e);
                    }
                }
            }
        });

        stats
    }
}
