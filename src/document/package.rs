/*!
 * DOCX package loading and saving.
 *
 * The package is kept as its ordered list of zip entries. Only the main
 * document part and the header/footer parts referenced by its sections are
 * parsed; every other entry is written back byte-for-byte.
 */

use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::document::markup::{Element, MarkupTree};
use crate::document::model::{self, Paragraph};
use crate::errors::DocumentError;

const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// Header and footer parts in effect for one section.
///
/// A section without its own default reference inherits the previous
/// section's part, so the same part may appear in several sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub header: Option<String>,
    pub footer: Option<String>,
}

/// A loaded word-processing document
#[derive(Debug, Clone)]
pub struct Document {
    entries: Vec<PackageEntry>,
    main_part: String,
    main: MarkupTree,
    stories: BTreeMap<String, MarkupTree>,
    sections: Vec<Section>,
}

impl Document {
    /// Open a document from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Load a document from the bytes of a zip package
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                is_dir: file.is_dir(),
            });
        }

        Self::from_entries(entries)
    }

    /// Build a single-part document from main document markup
    pub fn from_document_xml(xml: &str) -> Result<Self, DocumentError> {
        Self::from_entries(vec![PackageEntry {
            name: DEFAULT_MAIN_PART.to_string(),
            data: xml.as_bytes().to_vec(),
            is_dir: false,
        }])
    }

    fn from_entries(entries: Vec<PackageEntry>) -> Result<Self, DocumentError> {
        let main_part = find_main_part(&entries);
        let main_bytes = entry_data(&entries, &main_part)
            .ok_or_else(|| DocumentError::MissingPart(main_part.clone()))?;
        let main = MarkupTree::parse(&main_part, main_bytes)?;

        let relationships = read_relationships(&entries, &main_part)?;
        let sections = collect_sections(&main.root, &relationships);

        let mut stories = BTreeMap::new();
        for part in sections
            .iter()
            .flat_map(|s| s.header.iter().chain(s.footer.iter()))
        {
            if stories.contains_key(part) {
                continue;
            }
            match entry_data(&entries, part) {
                Some(bytes) => {
                    stories.insert(part.clone(), MarkupTree::parse(part, bytes)?);
                }
                None => warn!("Section references missing part {}", part),
            }
        }

        debug!(
            "Loaded {} with {} section(s) and {} header/footer part(s)",
            main_part,
            sections.len(),
            stories.len()
        );

        Ok(Self {
            entries,
            main_part,
            main,
            stories,
            sections,
        })
    }

    /// Name of the main document part
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    /// Root of the main document markup tree
    pub fn markup(&self) -> &Element {
        &self.main.root
    }

    pub fn markup_mut(&mut self) -> &mut Element {
        &mut self.main.root
    }

    /// The `w:body` element, if present
    pub fn body_mut(&mut self) -> Option<&mut Element> {
        self.main.root.child_mut("body")
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Root element of a header or footer part
    pub fn story(&self, part: &str) -> Option<&Element> {
        self.stories.get(part).map(|tree| &tree.root)
    }

    pub fn story_mut(&mut self, part: &str) -> Option<&mut Element> {
        self.stories.get_mut(part).map(|tree| &mut tree.root)
    }

    /// Visit the top-level body paragraphs
    pub fn for_each_paragraph(&mut self, visitor: &mut dyn FnMut(&mut Paragraph<'_>)) {
        if let Some(body) = self.body_mut() {
            model::for_each_paragraph(body, visitor);
        }
    }

    /// Visit the cell paragraphs of top-level body tables
    pub fn for_each_table_paragraph(&mut self, visitor: &mut dyn FnMut(&mut Paragraph<'_>)) {
        if let Some(body) = self.body_mut() {
            model::for_each_table_paragraph(body, visitor);
        }
    }

    /// Aggregate text of each top-level body paragraph
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.main
            .root
            .child("body")
            .map(|body| story_paragraph_texts(body))
            .unwrap_or_default()
    }

    /// Serialize the package, with parsed parts re-rendered
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut rendered: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
        rendered.insert(self.main_part.as_str(), self.main.to_xml()?);
        for (part, tree) in &self.stories {
            rendered.insert(part.as_str(), tree.to_xml()?);
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for entry in &self.entries {
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), deflated)?;
                continue;
            }
            // Media is already compressed
            let options = if entry.name.starts_with("word/media/") {
                stored
            } else {
                deflated
            };
            zip.start_file(entry.name.as_str(), options)?;
            let data = rendered
                .get(entry.name.as_str())
                .map(Vec::as_slice)
                .unwrap_or(entry.data.as_slice());
            zip.write_all(data)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Write the package to `path`.
    ///
    /// The bytes go to a temporary file next to the destination, which is
    /// renamed into place only once fully written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&bytes)?;
        temp.flush()?;
        temp.persist(path).map_err(|e| DocumentError::Io(e.error))?;
        Ok(())
    }
}

/// Aggregate text of each paragraph directly inside a story element
pub fn story_paragraph_texts(story: &Element) -> Vec<String> {
    story
        .children_named("p")
        .map(|p| p.children_named("r").map(model::run_text).collect::<String>())
        .collect()
}

fn entry_data<'a>(entries: &'a [PackageEntry], name: &str) -> Option<&'a [u8]> {
    entries
        .iter()
        .find(|e| e.name == name)
        .map(|e| e.data.as_slice())
}

fn find_main_part(entries: &[PackageEntry]) -> String {
    let Some(bytes) = entry_data(entries, "_rels/.rels") else {
        return DEFAULT_MAIN_PART.to_string();
    };

    match MarkupTree::parse("_rels/.rels", bytes) {
        Ok(tree) => tree
            .root
            .children_named("Relationship")
            .find(|rel| {
                rel.attribute("Type")
                    .is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_REL))
            })
            .and_then(|rel| rel.attribute("Target"))
            .map(|target| resolve_target("", target))
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()),
        Err(e) => {
            warn!("Ignoring unreadable package relationships: {}", e);
            DEFAULT_MAIN_PART.to_string()
        }
    }
}

/// Relationship id → part name for the main document part
fn read_relationships(
    entries: &[PackageEntry],
    main_part: &str,
) -> Result<BTreeMap<String, String>, DocumentError> {
    let (dir, file) = match main_part.rfind('/') {
        Some(idx) => (&main_part[..idx], &main_part[idx + 1..]),
        None => ("", main_part),
    };
    let rels_part = if dir.is_empty() {
        format!("_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", dir, file)
    };

    let mut relationships = BTreeMap::new();
    let Some(bytes) = entry_data(entries, &rels_part) else {
        return Ok(relationships);
    };

    let tree = MarkupTree::parse(&rels_part, bytes)?;
    for rel in tree.root.children_named("Relationship") {
        if rel.attribute("TargetMode") == Some("External") {
            continue;
        }
        if let (Some(id), Some(target)) = (rel.attribute("Id"), rel.attribute("Target")) {
            relationships.insert(id.to_string(), resolve_target(dir, target));
        }
    }
    Ok(relationships)
}

fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn collect_sections(root: &Element, relationships: &BTreeMap<String, String>) -> Vec<Section> {
    let mut properties = Vec::new();
    root.for_each_node(&mut |node| {
        if node.is("sectPr") {
            properties.push(node.clone());
        }
    });

    let mut sections: Vec<Section> = Vec::with_capacity(properties.len());
    for sect_pr in &properties {
        let previous = sections.last().cloned().unwrap_or_default();
        let header = default_reference(sect_pr, "headerReference", relationships);
        let footer = default_reference(sect_pr, "footerReference", relationships);
        sections.push(Section {
            header: header.or(previous.header),
            footer: footer.or(previous.footer),
        });
    }
    sections
}

fn default_reference(
    sect_pr: &Element,
    kind: &str,
    relationships: &BTreeMap<String, String>,
) -> Option<String> {
    sect_pr
        .children_named(kind)
        .find(|r| r.attribute("type") == Some("default"))
        .and_then(|r| r.attribute("id"))
        .and_then(|id| relationships.get(id).cloned())
}
