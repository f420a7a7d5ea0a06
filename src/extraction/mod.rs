//! Link extraction and classification
//!
//! This module turns a rendered document into the ordered list of links
//! whose target pages are marked for editorial use only.

pub mod classifier;
pub mod content;
pub mod links;

pub use classifier::{EditorialClassifier, Verdict};
pub use content::ContentExtractor;
pub use links::{CandidateLink, LinkExtractor, LinkOrigin};
