//! Editorial Scan - finds editorial-use-only stock image links in documents
//!
//! This crate reads a spreadsheet of document references, downloads each
//! document as a PDF, collects the links on its pages and keeps the ones whose
//! target page is marked "editorial use only".
//!
//! # Architecture
//!
//! ```text
//! Workbook ──▶ RowSource ──▶ Pipeline (one row at a time)
//!                               │
//!            ┌──────────────────┼───────────────────────┐
//!            ▼                  ▼                       ▼
//!     IdentifierExtractor  DocumentFetcher ──▶  LinkExtractor ──▶ EditorialClassifier
//!                               │                       │
//!                               ▼                       ▼
//!                        <name>.pdf (deleted)     ResultRecord ──▶ report / observer
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use editorial_scan::{Pipeline, PipelineConfig, RowSource, TracingObserver};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::default();
//!     let source = RowSource::open(Path::new("input.xlsx"), &config)?;
//!
//!     let pipeline = Pipeline::new(config)?;
//!     let report = pipeline.run(source.rows(), &mut TracingObserver).await;
//!
//!     for record in &report.records {
//!         println!("{}: {:?}", record.title, record.links);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod identifier;
pub mod pipeline;
pub mod report;
pub mod sanitize;
pub mod server;
pub mod source;

// Re-exports for convenience
pub use config::PipelineConfig;
pub use document::{DocumentFetcher, RenderedDocument, RenderedFile};
pub use error::{Error, Result};
pub use extraction::{CandidateLink, EditorialClassifier, LinkExtractor, Verdict};
pub use identifier::{DocumentId, IdentifierExtractor};
pub use pipeline::{
    NoopObserver, Pipeline, PipelineObserver, RecordingObserver, ResultRecord, RowOutcome,
    RunReport, SkipReason, TracingObserver,
};
pub use sanitize::{sanitize_filename, SafeName};
pub use source::{InputRow, RowSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
