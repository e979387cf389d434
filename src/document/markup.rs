/*!
 * Raw markup tree for document parts.
 *
 * Every element carries an optional leading `text` (content before its first
 * child) and an optional `tail` (content after its end tag, before the next
 * sibling). This mirrors how the serialized XML interleaves character data
 * with elements, so writing the tree back reproduces the same document.
 */

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::DocumentError;

/// One element of a markup part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written, e.g. `w:p`
    pub name: String,
    pub attributes: Vec<(String, String)>,
    text: Option<String>,
    tail: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            text: None,
            tail: None,
            children: Vec::new(),
        }
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style text setter, for content known to be valid
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Namespace prefix including the colon, or an empty string
    pub fn prefix(&self) -> &str {
        match self.name.find(':') {
            Some(idx) => &self.name[..=idx],
            None => "",
        }
    }

    /// Whether this element has the given local name
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Look up an attribute by local name, ignoring its prefix
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_part(key) == local)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn tail(&self) -> Option<&str> {
        self.tail.as_deref()
    }

    /// Replace the leading text of this element.
    ///
    /// Fails without touching the node when the value holds characters that
    /// cannot be represented in XML 1.0.
    pub fn set_text(&mut self, value: Option<String>) -> Result<(), DocumentError> {
        if let Some(text) = &value {
            validate_xml_chars(&self.name, text)?;
        }
        self.text = value;
        Ok(())
    }

    /// Replace the trailing text of this element
    pub fn set_tail(&mut self, value: Option<String>) -> Result<(), DocumentError> {
        if let Some(tail) = &value {
            validate_xml_chars(&self.name, tail)?;
        }
        self.tail = value;
        Ok(())
    }

    /// Direct children with the given local name
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.is(local))
    }

    /// Mutable direct children with the given local name
    pub fn children_named_mut<'a>(
        &'a mut self,
        local: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.children.iter_mut().filter(move |child| child.is(local))
    }

    /// First direct child with the given local name
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.is(local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|child| child.is(local))
    }

    /// Visit this element and all descendants in document order.
    pub fn for_each_node_mut(&mut self, visitor: &mut dyn FnMut(&mut Element)) {
        visitor(self);
        for child in &mut self.children {
            child.for_each_node_mut(visitor);
        }
    }

    /// Visit this element and all descendants in document order, read-only.
    pub fn for_each_node(&self, visitor: &mut dyn FnMut(&Element)) {
        visitor(self);
        for child in &self.children {
            child.for_each_node(visitor);
        }
    }

    /// Concatenated text and tails of every descendant
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, false);
        out
    }

    fn collect_text(&self, out: &mut String, include_tail: bool) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out, true);
        }
        if include_tail {
            if let Some(tail) = &self.tail {
                out.push_str(tail);
            }
        }
    }
}

fn local_part(name: &str) -> &str {
    match name.rfind(':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

fn validate_xml_chars(node: &str, value: &str) -> Result<(), DocumentError> {
    match value.chars().find(|c| !is_xml_char(*c)) {
        Some(bad) => Err(DocumentError::NodeMutationFailure {
            node: node.to_string(),
            reason: format!("character U+{:04X} is not allowed in XML", bad as u32),
        }),
        None => Ok(()),
    }
}

/// A parsed markup part with its root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupTree {
    pub root: Element,
}

impl MarkupTree {
    /// Parse a part. `part` only labels errors.
    pub fn parse(part: &str, bytes: &[u8]) -> Result<Self, DocumentError> {
        let malformed = |message: String| DocumentError::Markup {
            part: part.to_string(),
            message,
        };

        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    stack.push(element_from_start(e).map_err(&malformed)?);
                }
                Ok(Event::Empty(ref e)) => {
                    let element = element_from_start(e).map_err(&malformed)?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Text(t)) => {
                    let text = t.unescape().map_err(|e| malformed(e.to_string()))?;
                    append_character_data(&mut stack, &text);
                }
                Ok(Event::CData(c)) => {
                    let data = c.into_inner();
                    append_character_data(&mut stack, &String::from_utf8_lossy(&data));
                }
                Ok(Event::Eof) => break,
                // Declarations, comments and processing instructions are not kept
                Ok(_) => {}
                Err(e) => return Err(malformed(e.to_string())),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(malformed(format!("{} unclosed element(s)", stack.len())));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| malformed("no root element".to_string()))
    }

    /// Serialize with a standalone UTF-8 declaration
    pub fn to_xml(&self) -> Result<Vec<u8>, DocumentError> {
        let mut writer = Writer::new(Vec::new());
        let io_error = |e: quick_xml::Error| DocumentError::Markup {
            part: self.root.name.clone(),
            message: e.to_string(),
        };

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(io_error)?;
        writer.get_mut().extend_from_slice(b"\r\n");
        write_element(&mut writer, &self.root).map_err(io_error)?;

        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element, String> {
    let mut element = Element::new(&String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn append_character_data(stack: &mut [Element], data: &str) {
    // Whitespace around the root element is dropped
    let Some(parent) = stack.last_mut() else {
        return;
    };
    let slot = match parent.children.last_mut() {
        Some(previous) => &mut previous.tail,
        None => &mut parent.text,
    };
    slot.get_or_insert_with(String::new).push_str(data);
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> quick_xml::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        if let Some(text) = &element.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &element.children {
            write_element(writer, child)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    }

    if let Some(tail) = &element.tail {
        writer.write_event(Event::Text(BytesText::new(tail)))?;
    }
    Ok(())
}
