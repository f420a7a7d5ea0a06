//! Progress notifications
//!
//! The pipeline reports progress through [`PipelineObserver`] as results
//! become known. Observers are a reporting side channel; the run's
//! [`RunReport`](super::RunReport) is built independently of them.

use super::{ResultRecord, SkipReason};
use crate::extraction::{CandidateLink, Verdict};
use tracing::{debug, info};

/// Receives progress notifications from the pipeline
pub trait PipelineObserver: Send {
    /// A row was skipped
    fn row_skipped(&mut self, _index: usize, _reason: &SkipReason) {}

    /// A candidate link was classified
    fn link_checked(&mut self, _candidate: &CandidateLink, _verdict: &Verdict) {}

    /// A row yielded at least one confirmed link
    fn row_qualified(&mut self, _record: &ResultRecord) {}

    /// A link was confirmed; fires before the row's `row_qualified`
    fn link_confirmed(&mut self, _title: &str, _url: &str) {}
}

/// Ignores every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Logs notifications through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn link_checked(&mut self, candidate: &CandidateLink, verdict: &Verdict) {
        debug!(page = candidate.page, "[{}] {}", verdict.label(), candidate.url);
    }

    fn row_qualified(&mut self, record: &ResultRecord) {
        info!("Title: {} ({} editorial links)", record.title, record.links.len());
    }

    fn link_confirmed(&mut self, title: &str, url: &str) {
        info!(title, "Editorial Image URL: {}", url);
    }
}

/// Records every notification, in order
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    /// Notifications as `kind: detail` strings
    pub events: Vec<String>,
}

impl PipelineObserver for RecordingObserver {
    fn row_skipped(&mut self, index: usize, reason: &SkipReason) {
        self.events.push(format!("skipped: {index} {reason}"));
    }

    fn link_checked(&mut self, candidate: &CandidateLink, verdict: &Verdict) {
        self.events
            .push(format!("checked: {} {}", candidate.url, verdict.label()));
    }

    fn row_qualified(&mut self, record: &ResultRecord) {
        self.events.push(format!("qualified: {}", record.title));
    }

    fn link_confirmed(&mut self, title: &str, url: &str) {
        self.events.push(format!("confirmed: {title} {url}"));
    }
}
