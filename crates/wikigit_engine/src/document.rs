//! The subset of the `Special:Export` XML document an import reads.
//!
//! Read with the streaming reader so that article text reaches the working
//! tree byte for byte; indentation is markup in wikitext.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use thiserror::Error;
use wikigit_core::{Contributor, RevisionRecord, Segment};

use crate::ImportError;

/// One page of an export batch, revisions in export order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPage {
    pub title: String,
    pub revisions: Vec<RevisionRecord>,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document ends before all elements are closed")]
    Truncated,
    #[error("no <mediawiki> root element")]
    NotAnExport,
    #[error("revision {index} has no <{field}>")]
    MissingField { index: usize, field: &'static str },
}

/// Parse an export document. `Ok(None)` means the document has no page,
/// i.e. the article does not exist.
pub fn parse_export<R: BufRead>(reader: R) -> Result<Option<ExportPage>, DocumentError> {
    let mut reader = Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut state = ExportReader::default();
    loop {
        let page = match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                state.open(&e)?;
                None
            }
            Event::Empty(e) => {
                state.open(&e)?;
                state.close()?
            }
            Event::End(_) => state.close()?,
            Event::Text(e) => {
                state.text(&e.unescape()?);
                None
            }
            Event::CData(e) => {
                state.text(&String::from_utf8_lossy(&e));
                None
            }
            Event::Eof => return state.finish().map(|()| None),
            _ => None,
        };
        if page.is_some() {
            return Ok(page);
        }
        buf.clear();
    }
}

/// [`parse_export`] on a cached batch file.
pub fn parse_export_file(path: &Path) -> Result<Option<ExportPage>, ImportError> {
    let file = File::open(path)?;
    parse_export(BufReader::new(file)).map_err(|err| ImportError::MalformedExport {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Root,
    Page,
    Revision,
    Contributor,
    Field(Field),
    Other,
}

/// Elements whose text is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    RevisionId,
    Timestamp,
    Comment,
    Text,
    Username,
    ContributorId,
    Ip,
}

#[derive(Debug, Default)]
struct PageBuilder {
    title: String,
    revisions: Vec<RevisionRecord>,
}

#[derive(Debug, Default)]
struct RevisionBuilder {
    id: Option<String>,
    timestamp: Option<String>,
    comment: Option<String>,
    contributor: Contributor,
    segments: Vec<Segment>,
}

impl RevisionBuilder {
    fn build(self, index: usize) -> Result<RevisionRecord, DocumentError> {
        Ok(RevisionRecord {
            id: self
                .id
                .ok_or(DocumentError::MissingField { index, field: "id" })?,
            timestamp: self.timestamp.ok_or(DocumentError::MissingField {
                index,
                field: "timestamp",
            })?,
            comment: self.comment,
            contributor: self.contributor,
            segments: self.segments,
        })
    }
}

#[derive(Debug, Default)]
struct ExportReader {
    stack: Vec<Element>,
    saw_root: bool,
    page: Option<PageBuilder>,
    revision: Option<RevisionBuilder>,
    field_text: String,
    field_deleted: bool,
}

impl ExportReader {
    fn open(&mut self, start: &BytesStart<'_>) -> Result<(), DocumentError> {
        let parent = self.stack.last().copied();
        let element = match (parent, start.local_name().as_ref()) {
            (None, b"mediawiki") => {
                self.saw_root = true;
                Element::Root
            }
            (Some(Element::Root), b"page") if self.page.is_none() => {
                self.page = Some(PageBuilder::default());
                Element::Page
            }
            (Some(Element::Page), b"title") => Element::Field(Field::Title),
            (Some(Element::Page), b"revision") => {
                self.revision = Some(RevisionBuilder::default());
                Element::Revision
            }
            (Some(Element::Revision), b"id") => Element::Field(Field::RevisionId),
            (Some(Element::Revision), b"timestamp") => Element::Field(Field::Timestamp),
            (Some(Element::Revision), b"comment") => Element::Field(Field::Comment),
            (Some(Element::Revision), b"text") => Element::Field(Field::Text),
            (Some(Element::Revision), b"contributor") => Element::Contributor,
            (Some(Element::Contributor), b"username") => Element::Field(Field::Username),
            (Some(Element::Contributor), b"id") => Element::Field(Field::ContributorId),
            (Some(Element::Contributor), b"ip") => Element::Field(Field::Ip),
            _ => Element::Other,
        };
        if let Element::Field(_) = element {
            self.field_text.clear();
            self.field_deleted = start
                .try_get_attribute("deleted")
                .map_err(quick_xml::Error::from)?
                .is_some();
        }
        self.stack.push(element);
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(Element::Field(_)) = self.stack.last() {
            self.field_text.push_str(text);
        }
    }

    /// Close the innermost element; yields the page once it is complete.
    fn close(&mut self) -> Result<Option<ExportPage>, DocumentError> {
        match self.stack.pop() {
            Some(Element::Field(field)) => {
                let text = mem::take(&mut self.field_text);
                // Suppressed or without any text node: absent.
                let value = (!self.field_deleted && !text.is_empty()).then_some(text);
                self.assign(field, value);
            }
            Some(Element::Revision) => {
                if let (Some(page), Some(revision)) = (self.page.as_mut(), self.revision.take()) {
                    let index = page.revisions.len();
                    page.revisions.push(revision.build(index)?);
                }
            }
            Some(Element::Page) => {
                return Ok(self.page.take().map(|page| ExportPage {
                    title: page.title,
                    revisions: page.revisions,
                }));
            }
            _ => {}
        }
        Ok(None)
    }

    fn assign(&mut self, field: Field, value: Option<String>) {
        if field == Field::Title {
            if let Some(page) = self.page.as_mut() {
                page.title = value.unwrap_or_default();
            }
            return;
        }
        let Some(revision) = self.revision.as_mut() else {
            return;
        };
        match field {
            Field::Title => {}
            Field::RevisionId => revision.id = value,
            Field::Timestamp => revision.timestamp = value,
            Field::Comment => revision.comment = value,
            Field::Text => {
                let index = revision.segments.len();
                revision.segments.push(Segment { index, value });
            }
            Field::Username => revision.contributor.username = value,
            Field::ContributorId => revision.contributor.id = value,
            Field::Ip => revision.contributor.ip = value,
        }
    }

    fn finish(&self) -> Result<(), DocumentError> {
        if !self.stack.is_empty() {
            return Err(DocumentError::Truncated);
        }
        if !self.saw_root {
            return Err(DocumentError::NotAnExport);
        }
        Ok(())
    }
}
