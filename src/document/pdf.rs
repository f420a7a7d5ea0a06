//! Rendered PDF reading
//!
//! Exposes, per page and in page order, the targets of the page's link
//! annotations and its plain text. Every text line ends with a line break,
//! including lines that share one text object.

use crate::error::ExtractionError;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Links and text of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// 1-based page number
    pub number: u32,
    /// URI targets of link annotations, in annotation order
    pub links: Vec<String>,
    /// Extracted plain text
    pub text: String,
}

/// An opened rendered document
pub struct RenderedDocument {
    path: PathBuf,
    doc: Document,
}

impl RenderedDocument {
    /// Open and parse a PDF file
    pub fn open(path: &Path) -> Result<Self, ExtractionError> {
        let mut doc = Document::load(path).map_err(|e| ExtractionError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        for (number, id) in doc.get_pages() {
            if let Err(e) = break_text_lines(&mut doc, id) {
                warn!("Page {} of {} keeps its text layout: {}", number, path.display(), e);
            }
        }
        debug!("Opened {} ({} pages)", path.display(), doc.get_pages().len());

        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Read every page in document order
    pub fn pages(&self) -> Result<Vec<PageContent>, ExtractionError> {
        self.doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| {
                Ok(PageContent {
                    number,
                    links: self.page_links(number, id)?,
                    text: self.page_text(number),
                })
            })
            .collect()
    }

    fn page_links(&self, number: u32, id: ObjectId) -> Result<Vec<String>, ExtractionError> {
        let page = self
            .doc
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| ExtractionError::Page {
                page: number,
                message: e.to_string(),
            })?;

        let annots = match page.get(b"Annots").and_then(|a| self.resolve(a)) {
            Ok(Object::Array(annots)) => annots,
            _ => return Ok(Vec::new()),
        };

        let links = annots
            .iter()
            .filter_map(|annot| match self.resolve(annot) {
                Ok(Object::Dictionary(annot)) => self.link_target(annot),
                _ => None,
            })
            .collect();
        Ok(links)
    }

    /// URI of a `/Link` annotation with a `/URI` action
    fn link_target(&self, annot: &Dictionary) -> Option<String> {
        if !has_name(annot, b"Subtype", b"Link") {
            return None;
        }
        let action = match annot.get(b"A").and_then(|a| self.resolve(a)) {
            Ok(Object::Dictionary(action)) => action,
            _ => return None,
        };
        if !has_name(action, b"S", b"URI") {
            return None;
        }
        match action.get(b"URI").and_then(|u| self.resolve(u)) {
            Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
            _ => None,
        }
    }

    fn page_text(&self, number: u32) -> String {
        match self.doc.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "No text layer for page {} of {}: {}",
                    number,
                    self.path.display(),
                    e
                );
                String::new()
            }
        }
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id),
            other => Ok(other),
        }
    }
}

/// Rewrite a page's content so each text line sits in its own text object.
///
/// Text extraction only separates lines at `ET`, so a line move inside one
/// `BT`..`ET` block would glue two lines together.
fn break_text_lines(doc: &mut Document, page: ObjectId) -> Result<(), lopdf::Error> {
    let content = Content::decode(&doc.get_page_content(page)?)?;
    let (content, changed) = split_text_lines(content);
    if changed {
        doc.change_page_content(page, content.encode()?)?;
    }
    Ok(())
}

/// Close and reopen the text object at every line move that follows shown
/// text. `'` and `"` become a line break followed by `Tj`.
fn split_text_lines(content: Content) -> (Content, bool) {
    let mut operations = Vec::with_capacity(content.operations.len());
    let mut in_text = false;
    let mut line_has_text = false;
    let mut changed = false;

    for op in content.operations {
        match op.operator.as_str() {
            "BT" => {
                in_text = true;
                line_has_text = false;
                operations.push(op);
            }
            "ET" => {
                in_text = false;
                operations.push(op);
            }
            "Td" | "TD" | "T*" | "Tm" if in_text => {
                changed |= end_line(&mut operations, &mut line_has_text);
                operations.push(op);
            }
            "'" | "\"" if in_text => {
                end_line(&mut operations, &mut line_has_text);
                let text = op.operands.last().cloned().into_iter().collect();
                operations.push(Operation::new("Tj", text));
                line_has_text = true;
                changed = true;
            }
            "Tj" | "TJ" => {
                line_has_text = true;
                operations.push(op);
            }
            _ => operations.push(op),
        }
    }

    (Content { operations }, changed)
}

fn end_line(operations: &mut Vec<Operation>, line_has_text: &mut bool) -> bool {
    if !*line_has_text {
        return false;
    }
    operations.push(Operation::new("ET", vec![]));
    operations.push(Operation::new("BT", vec![]));
    *line_has_text = false;
    true
}

fn has_name(dict: &Dictionary, key: &[u8], expected: &[u8]) -> bool {
    matches!(dict.get(key), Ok(Object::Name(name)) if name.as_slice() == expected)
}

/// Decode a PDF text string (UTF-16BE with BOM, otherwise bytes)
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf16_uri() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "https://x.example/é".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode_text_string(&bytes), "https://x.example/é");
    }

    #[test]
    fn test_decode_plain_uri() {
        assert_eq!(
            decode_text_string(b"https://www.123rf.com/photo_1.html"),
            "https://www.123rf.com/photo_1.html"
        );
    }

    fn ops(content: &Content) -> Vec<&str> {
        content
            .operations
            .iter()
            .map(|op| op.operator.as_str())
            .collect()
    }

    fn shown(text: &str) -> Operation {
        Operation::new("Tj", vec![Object::string_literal(text)])
    }

    #[test]
    fn test_line_moves_split_text_object() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Td", vec![50i64.into(), 700i64.into()]),
                shown("Photo: https://www.123rf.com/photo_1.html"),
                Operation::new("Td", vec![0i64.into(), (-14i64).into()]),
                shown("Credit line"),
                Operation::new("T*", vec![]),
                shown("Third"),
                Operation::new("ET", vec![]),
            ],
        };

        let (split, changed) = split_text_lines(content);
        assert!(changed);
        assert_eq!(
            ops(&split),
            vec![
                "BT", "Td", "Tj", "ET", "BT", "Td", "Tj", "ET", "BT", "T*", "Tj", "ET"
            ]
        );
    }

    #[test]
    fn test_quote_operators_become_lines() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                shown("first"),
                Operation::new("'", vec![Object::string_literal("second")]),
                Operation::new(
                    "\"",
                    vec![1i64.into(), 0i64.into(), Object::string_literal("third")],
                ),
                Operation::new("ET", vec![]),
            ],
        };

        let (split, _) = split_text_lines(content);
        assert_eq!(
            ops(&split),
            vec!["BT", "Tj", "ET", "BT", "Tj", "ET", "BT", "Tj", "ET"]
        );
        assert!(matches!(
            split.operations[7].operands.as_slice(),
            [Object::String(bytes, _)] if bytes.as_slice() == b"third"
        ));
    }

    #[test]
    fn test_single_line_objects_unchanged() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new(
                    "Tm",
                    vec![1i64.into(), 0i64.into(), 0i64.into(), 1i64.into(), 50i64.into(), 700i64.into()],
                ),
                shown("one line"),
                Operation::new("ET", vec![]),
            ],
        };

        let (split, changed) = split_text_lines(content);
        assert!(!changed);
        assert_eq!(ops(&split), vec!["BT", "Tm", "Tj", "ET"]);
    }

    #[test]
    fn test_open_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"<html>not a pdf</html>").unwrap();

        let err = RenderedDocument::open(&path).err().unwrap();
        assert!(matches!(err, ExtractionError::Open { .. }));
    }
}
