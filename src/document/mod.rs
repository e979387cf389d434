/*!
 * Document object model for word-processing packages.
 *
 * - `markup`: raw element tree with text/tail content
 * - `model`: paragraph and run views plus story traversal
 * - `package`: DOCX zip loading, section resolution and saving
 */

pub mod markup;
pub mod model;
pub mod package;

// Re-export types used by other modules
pub use markup::{Element, MarkupTree};
pub use model::{Paragraph, TextRuns, walk_story};
pub use package::{Document, Section};
