//! Document identifier extraction
//!
//! Pulls the document id out of a reference such as
//! `https://docs.google.com/document/d/<id>/edit`.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an externally hosted document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Matches document references against `https://<host>/document/d/<id>`
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    pattern: Regex,
}

impl IdentifierExtractor {
    /// Build an extractor for references hosted on `host`
    pub fn new(host: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"https://{}/document/d/([A-Za-z0-9_-]+)",
            regex::escape(host)
        ))
        .map_err(|e| Error::Config(format!("document host {host:?}: {e}")))?;
        Ok(Self { pattern })
    }

    /// Extract the identifier, or `None` when the reference is absent or does not match
    pub fn extract(&self, reference: Option<&str>) -> Option<DocumentId> {
        let reference = reference?;
        self.pattern
            .captures(reference)
            .and_then(|caps| caps.get(1))
            .map(|m| DocumentId(m.as_str().to_string()))
    }
}
