//! Rendered document handling
//!
//! This module downloads the exported PDF of a document and reads the
//! links and text out of its pages.

pub mod fetcher;
pub mod pdf;

pub use fetcher::{DocumentFetcher, RenderedFile};
pub use pdf::{PageContent, RenderedDocument};
