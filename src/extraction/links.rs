//! Link extraction
//!
//! This module finds candidate links in a rendered document and keeps the
//! ones the classifier confirms as editorial-use only.

use crate::document::{PageContent, RenderedDocument};
use crate::error::ExtractionError;
use crate::extraction::classifier::EditorialClassifier;
use crate::pipeline::PipelineObserver;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Where on the page a link was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkOrigin {
    /// Target of a link annotation
    Embedded,
    /// URL written in the page text
    Text,
}

/// A link discovered in a rendered document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLink {
    /// The URL
    pub url: String,
    /// 1-based page number
    pub page: u32,
    /// How it was found
    pub origin: LinkOrigin,
}

/// Link extraction functionality
pub struct LinkExtractor {
    allowed_host: String,
    url_pattern: Regex,
}

impl LinkExtractor {
    /// Create an extractor keeping text URLs that contain `allowed_host`
    pub fn new<S: Into<String>>(allowed_host: S) -> Result<Self, ExtractionError> {
        Ok(Self {
            allowed_host: allowed_host.into(),
            url_pattern: Regex::new(r"https?://[^\s]+")?,
        })
    }

    /// URLs written in `text` that contain the allowed host substring
    pub fn text_candidates<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.url_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|url| url.contains(self.allowed_host.as_str()))
            .collect()
    }

    /// Candidates of one page: annotation targets first, then text URLs
    pub fn candidates(&self, page: &PageContent) -> Vec<CandidateLink> {
        let embedded = page.links.iter().map(|url| CandidateLink {
            url: url.clone(),
            page: page.number,
            origin: LinkOrigin::Embedded,
        });
        let text = self
            .text_candidates(&page.text)
            .into_iter()
            .map(|url| CandidateLink {
                url: url.to_string(),
                page: page.number,
                origin: LinkOrigin::Text,
            });
        embedded.chain(text).collect()
    }

    /// Classify every candidate of the document, in page then discovery order,
    /// and return the confirmed ones. Duplicates are kept.
    ///
    /// Each confirmed link is reported to `observer` under `title` as soon as
    /// its verdict is known.
    #[instrument(skip(self, classifier, observer))]
    pub async fn extract_confirmed(
        &self,
        path: &Path,
        title: &str,
        classifier: &EditorialClassifier,
        observer: &mut dyn PipelineObserver,
    ) -> Result<Vec<CandidateLink>, ExtractionError> {
        let pages = RenderedDocument::open(path)?.pages()?;
        info!("Scanning {} pages", pages.len());

        let mut confirmed = Vec::new();
        for page in &pages {
            for candidate in self.candidates(page) {
                let verdict = classifier.classify(&candidate.url).await;
                debug!("{} -> {}", candidate.url, verdict.label());
                observer.link_checked(&candidate, &verdict);
                if verdict.is_confirmed() {
                    observer.link_confirmed(title, &candidate.url);
                    confirmed.push(candidate);
                }
            }
        }

        debug!("Confirmed {} links", confirmed.len());
        Ok(confirmed)
    }
}
