/*!
 * Paragraph and run views over the markup tree.
 *
 * A paragraph (`w:p`) owns runs (`w:r`); a run's visible text is the
 * concatenation of its `w:t` content, with `w:tab` read as a tab and
 * `w:br`/`w:cr` read as a line break.
 */

use crate::document::markup::Element;
use crate::errors::DocumentError;

/// Text access to an ordered sequence of runs.
///
/// This is the surface the substitution strategies work against, so they can
/// be exercised without a full document package.
pub trait TextRuns {
    fn run_count(&self) -> usize;

    fn run_text(&self, index: usize) -> String;

    /// Overwrite the text of one run, keeping its formatting properties
    fn set_run_text(&mut self, index: usize, text: &str) -> Result<(), DocumentError>;

    /// Append a new unformatted run
    fn append_run(&mut self, text: &str) -> Result<(), DocumentError>;

    /// Aggregate text: the concatenation of all run texts
    fn text(&self) -> String {
        (0..self.run_count()).map(|i| self.run_text(i)).collect()
    }
}

/// Plain in-memory runs, mostly useful for exercising strategies
impl TextRuns for Vec<String> {
    fn run_count(&self) -> usize {
        self.len()
    }

    fn run_text(&self, index: usize) -> String {
        self[index].clone()
    }

    fn set_run_text(&mut self, index: usize, text: &str) -> Result<(), DocumentError> {
        self[index] = text.to_string();
        Ok(())
    }

    fn append_run(&mut self, text: &str) -> Result<(), DocumentError> {
        self.push(text.to_string());
        Ok(())
    }
}

/// Mutable view of a `w:p` element
pub struct Paragraph<'a> {
    element: &'a mut Element,
}

impl<'a> Paragraph<'a> {
    pub fn new(element: &'a mut Element) -> Self {
        Self { element }
    }

    fn runs(&self) -> impl Iterator<Item = &Element> {
        self.element.children.iter().filter(|c| c.is("r"))
    }

    fn run_mut(&mut self, index: usize) -> Option<&mut Element> {
        self.element
            .children
            .iter_mut()
            .filter(|c| c.is("r"))
            .nth(index)
    }
}

impl TextRuns for Paragraph<'_> {
    fn run_count(&self) -> usize {
        self.runs().count()
    }

    fn run_text(&self, index: usize) -> String {
        self.runs().nth(index).map(run_text).unwrap_or_default()
    }

    fn set_run_text(&mut self, index: usize, text: &str) -> Result<(), DocumentError> {
        match self.run_mut(index) {
            Some(run) => set_run_text(run, text),
            None => Err(DocumentError::NodeMutationFailure {
                node: "w:r".to_string(),
                reason: format!("run {} does not exist", index),
            }),
        }
    }

    fn append_run(&mut self, text: &str) -> Result<(), DocumentError> {
        let prefix = self.element.prefix().to_string();
        let mut run = Element::new(&format!("{}r", prefix));
        set_run_text(&mut run, text)?;
        self.element.children.push(run);
        Ok(())
    }
}

/// Visible text of a `w:r` element
pub fn run_text(run: &Element) -> String {
    let mut text = String::new();
    for child in &run.children {
        match child.local_name() {
            "t" => text.push_str(child.text().unwrap_or_default()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    text
}

/// Replace the content of a `w:r`, keeping its `w:rPr`.
///
/// Tabs and line breaks become `w:tab` and `w:br` elements. The run is left
/// unchanged when the text cannot be stored.
pub fn set_run_text(run: &mut Element, text: &str) -> Result<(), DocumentError> {
    let prefix = run.prefix().to_string();
    let mut content = Vec::new();
    let mut pending = String::new();

    for c in text.chars() {
        match c {
            '\t' | '\n' | '\r' => {
                if !pending.is_empty() {
                    content.push(text_element(&prefix, &pending)?);
                    pending.clear();
                }
                let name = if c == '\t' { "tab" } else { "br" };
                content.push(Element::new(&format!("{}{}", prefix, name)));
            }
            _ => pending.push(c),
        }
    }
    if !pending.is_empty() {
        content.push(text_element(&prefix, &pending)?);
    }

    run.children.retain(|child| child.is("rPr"));
    run.children.extend(content);
    Ok(())
}

fn text_element(prefix: &str, text: &str) -> Result<Element, DocumentError> {
    let mut element = Element::new(&format!("{}t", prefix));
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        element.attributes.push(("xml:space".to_string(), "preserve".to_string()));
    }
    element.set_text(Some(text.to_string()))?;
    Ok(element)
}

/// Visit the paragraphs directly inside a story (body, header or footer)
pub fn for_each_paragraph(story: &mut Element, visitor: &mut dyn FnMut(&mut Paragraph<'_>)) {
    for child in story.children_named_mut("p") {
        visitor(&mut Paragraph::new(child));
    }
}

/// Visit every cell paragraph of the tables directly inside a story
pub fn for_each_table_paragraph(story: &mut Element, visitor: &mut dyn FnMut(&mut Paragraph<'_>)) {
    for table in story.children_named_mut("tbl") {
        for row in table.children_named_mut("tr") {
            for cell in row.children_named_mut("tc") {
                for_each_paragraph(cell, visitor);
            }
        }
    }
}

/// Visit a story's paragraphs, then its table cell paragraphs
pub fn walk_story(story: &mut Element, visitor: &mut dyn FnMut(&mut Paragraph<'_>)) {
    for_each_paragraph(story, visitor);
    for_each_table_paragraph(story, visitor);
}

/// Build a `w:p` element from run texts
pub fn paragraph_element(runs: &[&str]) -> Element {
    let mut paragraph = Element::new("w:p");
    for text in runs {
        let mut run = Element::new("w:r").with_child(Element::new("w:rPr"));
        // Fixture text never carries control characters
        if set_run_text(&mut run, text).is_ok() {
            paragraph.children.push(run);
        }
    }
    paragraph
}
