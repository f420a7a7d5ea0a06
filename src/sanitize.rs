//! File name sanitization
//!
//! Labels are usually site URLs. They become the stem of the rendered
//! document's file name and, with `_` turned back into `/`, the display title.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used when a label is absent or sanitizes to nothing
pub const PLACEHOLDER_NAME: &str = "Untitled";

/// Maximum length of a sanitized name, in characters
pub const MAX_NAME_CHARS: usize = 200;

/// Maximum length of a file name on disk, in bytes
pub const MAX_FILE_NAME_BYTES: usize = 255;

const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// A file-system safe name derived from a label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SafeName(String);

impl SafeName {
    /// The sanitized name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title shown to users: every `_` becomes `/`
    pub fn display_title(&self) -> String {
        self.0.replace('_', "/")
    }

    /// `<name>.<ext>`, with the name cut on a char boundary so the whole
    /// file name fits in [`MAX_FILE_NAME_BYTES`]
    pub fn file_name(&self, ext: &str) -> String {
        let budget = MAX_FILE_NAME_BYTES.saturating_sub(ext.len() + 1);
        let mut end = self.0.len().min(budget);
        while !self.0.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}.{}", self.0[..end].trim_end(), ext)
    }
}

impl fmt::Display for SafeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map an arbitrary label onto a bounded, reserved-character-free name
pub fn sanitize_filename(label: Option<&str>) -> SafeName {
    let Some(label) = label else {
        return SafeName(PLACEHOLDER_NAME.to_string());
    };

    let trimmed = label.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .trim();

    let replaced: String = without_scheme
        .chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .take(MAX_NAME_CHARS)
        .collect();

    let name = replaced.trim_end();
    if name.is_empty() {
        SafeName(PLACEHOLDER_NAME.to_string())
    } else {
        SafeName(name.to_string())
    }
}
