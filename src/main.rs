//! Editorial Scan CLI
//!
//! Scans a workbook of document references for editorial-use-only image links,
//! or serves an upload form that does the same.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use editorial_scan::report::{self, ReportFormat};
use editorial_scan::{server, Pipeline, PipelineConfig, RowSource, TracingObserver};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Editorial Scan
#[derive(Parser, Debug)]
#[command(name = "edscan")]
#[command(version)]
#[command(about = "Find editorial-use-only stock image links in exported documents")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a workbook and print the report
    Scan {
        /// Workbook (.xlsx, .xls or .ods)
        input: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ScanOptions,
    },
    /// Serve the upload form
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: IpAddr,

        #[command(flatten)]
        options: ScanOptions,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Json,
    Html,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => ReportFormat::Text,
            Format::Json => ReportFormat::Json,
            Format::Html => ReportFormat::Html,
        }
    }
}

/// Pipeline settings; anything left out keeps its default
#[derive(Args, Debug)]
struct ScanOptions {
    /// Host accepted in document references
    #[arg(long)]
    document_host: Option<String>,

    /// Base URL of the export endpoint
    #[arg(long)]
    export_base_url: Option<String>,

    /// Attempts per document download
    #[arg(long)]
    max_retries: Option<u32>,

    /// Document download timeout in seconds
    #[arg(long)]
    fetch_timeout: Option<u64>,

    /// Link check timeout in seconds
    #[arg(long)]
    classify_timeout: Option<u64>,

    /// Substring a URL in page text must contain to be checked
    #[arg(long)]
    allowed_host: Option<String>,

    /// Marker text searched for on target pages
    #[arg(long)]
    marker: Option<String>,

    /// Directory for downloaded documents
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Column holding document references
    #[arg(long)]
    reference_column: Option<String>,

    /// Column holding labels
    #[arg(long)]
    label_column: Option<String>,
}

impl ScanOptions {
    fn into_config(self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        let mut builder = PipelineConfig::builder().columns(
            self.reference_column.unwrap_or(defaults.reference_column),
            self.label_column.unwrap_or(defaults.label_column),
        );

        if let Some(host) = self.document_host {
            builder = builder.document_host(host);
        }
        if let Some(url) = self.export_base_url {
            builder = builder.export_base_url(url);
        }
        if let Some(retries) = self.max_retries {
            builder = builder.max_retries(retries);
        }
        if let Some(secs) = self.fetch_timeout {
            builder = builder.fetch_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.classify_timeout {
            builder = builder.classify_timeout(Duration::from_secs(secs));
        }
        if let Some(host) = self.allowed_host {
            builder = builder.allowed_host(host);
        }
        if let Some(marker) = self.marker {
            builder = builder.marker(marker);
        }
        if let Some(dir) = self.work_dir {
            builder = builder.work_dir(dir);
        }
        builder.build()
    }
}

/// `--verbose` wins over `RUST_LOG`, which wins over the `info` default
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; the report owns stdout
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Scan {
            input,
            format,
            output,
            options,
        } => {
            let config = options.into_config();
            let source = RowSource::open(&input, &config)?;
            tracing::info!("Scanning {} rows from {}", source.len(), input.display());

            let pipeline = Pipeline::new(config)?;
            let run = pipeline.run(source.rows(), &mut TracingObserver).await;
            let rendered = report::render(&run, format.into())?;

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!("Report written to {}", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Command::Serve {
            port,
            host,
            options,
        } => {
            server::serve(SocketAddr::new(host, port), options.into_config()).await?;
        }
    }

    Ok(())
}
