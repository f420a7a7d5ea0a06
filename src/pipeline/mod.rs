//! Scan pipeline
//!
//! Drives each input row through identifier extraction, document fetch,
//! link extraction and classification:
//!
//! ```text
//! Start ──▶ IdentifierResolved ──▶ DocumentFetched ──▶ LinksExtracted ──▶ Emitted
//!   │               │                     │                   │
//!   └───────────────┴─────────────────────┴───────────────────┴──────▶ Skipped
//! ```
//!
//! Rows are processed one at a time, in input order. A failing row is
//! skipped and never aborts the run.

mod observer;

pub use observer::{NoopObserver, PipelineObserver, RecordingObserver, TracingObserver};

use crate::config::PipelineConfig;
use crate::document::DocumentFetcher;
use crate::error::Result;
use crate::extraction::{EditorialClassifier, LinkExtractor};
use crate::identifier::IdentifierExtractor;
use crate::sanitize::sanitize_filename;
use crate::source::InputRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Links confirmed for one input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Display title derived from the row label
    pub title: String,
    /// Confirmed links in page then discovery order
    pub links: Vec<String>,
}

/// Why a row produced no record
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Reference or label missing
    #[error("missing document reference or label")]
    MissingField,

    /// Reference present but not a recognised document URL
    #[error("no document identifier in reference")]
    UnparseableIdentifier,

    /// The rendered document could not be downloaded
    #[error("document fetch failed: {0}")]
    FetchFailed(String),

    /// The rendered document could not be read
    #[error("link extraction failed: {0}")]
    ExtractionFailed(String),

    /// Nothing in the document was confirmed
    #[error("no editorial links found")]
    NoEditorialLinks,
}

/// Terminal state of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// The row qualified
    Emitted(ResultRecord),
    /// The row produced no record
    Skipped {
        /// 1-based row number
        index: usize,
        /// Why
        reason: SkipReason,
    },
}

/// A row that produced no record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based row number
    pub index: usize,
    /// Why
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// Everything a run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// One record per qualifying row, in input order
    pub records: Vec<ResultRecord>,
    /// Rows that produced no record, in input order
    pub skipped: Vec<SkippedRow>,
    /// Number of rows processed
    pub rows_total: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
}

/// A configured scan pipeline
pub struct Pipeline {
    config: PipelineConfig,
    identifiers: IdentifierExtractor,
    fetcher: DocumentFetcher,
    links: LinkExtractor,
    classifier: EditorialClassifier,
}

impl Pipeline {
    /// Build the pipeline's components from `config`
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Ok(Self {
            identifiers: IdentifierExtractor::new(&config.document_host)?,
            fetcher: DocumentFetcher::new(&config)?,
            links: LinkExtractor::new(config.allowed_host.clone())?,
            classifier: EditorialClassifier::new(&config)?,
            config,
        })
    }

    /// The configuration this pipeline was built with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process every row in order
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub async fn run(&self, rows: &[InputRow], observer: &mut dyn PipelineObserver) -> RunReport {
        let started_at = Utc::now();
        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for row in rows {
            match self.process_row(row, observer).await {
                RowOutcome::Emitted(record) => records.push(record),
                RowOutcome::Skipped { index, reason } => skipped.push(SkippedRow { index, reason }),
            }
        }

        info!(
            "Processed {} rows: {} with editorial links, {} skipped",
            rows.len(),
            records.len(),
            skipped.len()
        );

        RunReport {
            records,
            skipped,
            rows_total: rows.len(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Process a single row
    #[instrument(skip_all, fields(row = row.index))]
    pub async fn process_row(
        &self,
        row: &InputRow,
        observer: &mut dyn PipelineObserver,
    ) -> RowOutcome {
        let (Some(reference), Some(label)) =
            (row.document_reference.as_deref(), row.label.as_deref())
        else {
            return skip(row, SkipReason::MissingField, observer);
        };

        let Some(id) = self.identifiers.extract(Some(reference)) else {
            return skip(row, SkipReason::UnparseableIdentifier, observer);
        };

        let name = sanitize_filename(Some(label));
        let file = match self.fetcher.fetch(&id, &name).await {
            Ok(file) => file,
            Err(e) => return skip(row, SkipReason::FetchFailed(e.to_string()), observer),
        };

        let title = name.display_title();
        let extracted = self
            .links
            .extract_confirmed(file.path(), &title, &self.classifier, observer)
            .await;
        if let Err(e) = file.remove() {
            warn!("Failed to remove rendered document: {}", e);
        }

        let links = match extracted {
            Ok(links) if !links.is_empty() => links,
            Ok(_) => return skip(row, SkipReason::NoEditorialLinks, observer),
            Err(e) => return skip(row, SkipReason::ExtractionFailed(e.to_string()), observer),
        };

        let record = ResultRecord {
            title,
            links: links.into_iter().map(|link| link.url).collect(),
        };
        observer.row_qualified(&record);

        RowOutcome::Emitted(record)
    }
}

fn skip(row: &InputRow, reason: SkipReason, observer: &mut dyn PipelineObserver) -> RowOutcome {
    match reason {
        SkipReason::NoEditorialLinks => info!("Row {}: {}", row.index, reason),
        _ => warn!("Skipping row {}: {}", row.index, reason),
    }
    observer.row_skipped(row.index, &reason);
    RowOutcome::Skipped {
        index: row.index,
        reason,
    }
}
