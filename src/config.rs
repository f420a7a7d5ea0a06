//! Pipeline configuration
//!
//! One [`PipelineConfig`] is built per run and handed to the pipeline; no
//! setting lives in process-wide state.

use std::path::PathBuf;
use std::time::Duration;

/// Default host in the document reference grammar
pub const DEFAULT_DOCUMENT_HOST: &str = "docs.google.com";
/// Default base URL of the export endpoint
pub const DEFAULT_EXPORT_BASE_URL: &str = "https://docs.google.com";
/// Default spreadsheet column holding document references
pub const DEFAULT_REFERENCE_COLUMN: &str = "Google Docs URL";
/// Default spreadsheet column holding labels
pub const DEFAULT_LABEL_COLUMN: &str = "Website URL";

/// Configuration for a scan run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Host accepted in `https://<host>/document/d/<id>` (default: docs.google.com)
    pub document_host: String,
    /// Base URL the export request is sent to (default: https://docs.google.com)
    pub export_base_url: String,
    /// Total transport attempts per document fetch (default: 3)
    pub max_retries: u32,
    /// Timeout per document fetch attempt (default: 30s)
    pub fetch_timeout: Duration,
    /// Timeout per classification request (default: 15s)
    pub classify_timeout: Duration,
    /// User-Agent sent with classification requests (default: Mozilla/5.0)
    pub user_agent: String,
    /// Substring a plain-text URL must contain to be checked (default: 123rf)
    pub allowed_host: String,
    /// Marker text searched for, case-insensitively (default: editorial use only)
    pub marker: String,
    /// Directory rendered documents are written to (default: system temp dir)
    pub work_dir: PathBuf,
    /// Column holding document references
    pub reference_column: String,
    /// Column holding labels
    pub label_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            document_host: DEFAULT_DOCUMENT_HOST.to_string(),
            export_base_url: DEFAULT_EXPORT_BASE_URL.to_string(),
            max_retries: 3,
            fetch_timeout: Duration::from_secs(30),
            classify_timeout: Duration::from_secs(15),
            user_agent: "Mozilla/5.0".to_string(),
            allowed_host: "123rf".to_string(),
            marker: "editorial use only".to_string(),
            work_dir: std::env::temp_dir(),
            reference_column: DEFAULT_REFERENCE_COLUMN.to_string(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a new config builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the host accepted in document references
    pub fn document_host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.document_host = host.into();
        self
    }

    /// Set the export endpoint base URL
    pub fn export_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.export_base_url = url.into();
        self
    }

    /// Set the number of fetch attempts
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the per-attempt fetch timeout
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    /// Set the classification timeout
    pub fn classify_timeout(mut self, timeout: Duration) -> Self {
        self.config.classify_timeout = timeout;
        self
    }

    /// Set user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Set the allowed host substring
    pub fn allowed_host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.allowed_host = host.into();
        self
    }

    /// Set the marker text
    pub fn marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.config.marker = marker.into();
        self
    }

    /// Set the directory rendered documents are written to
    pub fn work_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.work_dir = dir.into();
        self
    }

    /// Set the two required column names
    pub fn columns<R: Into<String>, L: Into<String>>(mut self, reference: R, label: L) -> Self {
        self.config.reference_column = reference.into();
        self.config.label_column = label.into();
        self
    }

    /// Build the config
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
        assert_eq!(config.classify_timeout, Duration::from_secs(15));
        assert_eq!(config.user_agent, "Mozilla/5.0");
        assert_eq!(config.allowed_host, "123rf");
        assert_eq!(config.marker, "editorial use only");
        assert_eq!(config.reference_column, "Google Docs URL");
        assert_eq!(config.label_column, "Website URL");
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::builder()
            .document_host("docs.example.com")
            .export_base_url("http://127.0.0.1:9")
            .max_retries(5)
            .classify_timeout(Duration::from_secs(2))
            .allowed_host("stockhost")
            .columns("Doc", "Site")
            .work_dir("/tmp/scan")
            .build();

        assert_eq!(config.document_host, "docs.example.com");
        assert_eq!(config.export_base_url, "http://127.0.0.1:9");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.classify_timeout, Duration::from_secs(2));
        assert_eq!(config.allowed_host, "stockhost");
        assert_eq!(config.reference_column, "Doc");
        assert_eq!(config.label_column, "Site");
        assert_eq!(config.work_dir, PathBuf::from("/tmp/scan"));
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));
    }
}
