//! Spreadsheet row source
//!
//! Reads the first worksheet of a workbook into (document reference, label)
//! rows. The header row must name both configured columns; otherwise the
//! whole source is rejected before any row is processed.

use crate::config::PipelineConfig;
use crate::error::SourceError;
use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One input row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    /// 1-based data row number (the header is not counted)
    pub index: usize,
    /// Document reference cell, if present
    pub document_reference: Option<String>,
    /// Label cell, if present
    pub label: Option<String>,
}

/// Ordered rows read from a validated source
#[derive(Debug, Clone, Default)]
pub struct RowSource {
    rows: Vec<InputRow>,
}

impl RowSource {
    /// Read an `.xlsx`, `.xls` or `.ods` workbook
    pub fn open(path: &Path, config: &PipelineConfig) -> Result<Self, SourceError> {
        let open_err = |message: String| SourceError::Open {
            path: path.display().to_string(),
            message,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| open_err(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(SourceError::NoWorksheet)?
            .map_err(|e| open_err(e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|header| header.iter().map(|cell| cell.to_string()).collect())
            .unwrap_or_default();
        let cells: Vec<Vec<Option<String>>> = rows
            .map(|row| row.iter().map(cell_text).collect())
            .collect();

        info!("Read {} rows from {}", cells.len(), path.display());
        Self::from_table(&headers, cells, config)
    }

    /// Build a source from a header row and data rows
    pub fn from_table<H: AsRef<str>>(
        headers: &[H],
        rows: Vec<Vec<Option<String>>>,
        config: &PipelineConfig,
    ) -> Result<Self, SourceError> {
        let position = |name: &str| headers.iter().position(|h| h.as_ref().trim() == name);

        let (Some(reference_col), Some(label_col)) = (
            position(&config.reference_column),
            position(&config.label_column),
        ) else {
            return Err(SourceError::MissingColumns {
                reference: config.reference_column.clone(),
                label: config.label_column.clone(),
            });
        };
        debug!(
            "Reference column {}, label column {}",
            reference_col, label_col
        );

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, mut cells)| {
                let mut take = |col: usize| {
                    cells
                        .get_mut(col)
                        .and_then(Option::take)
                        .filter(|value| !value.is_empty())
                };
                InputRow {
                    index: i + 1,
                    document_reference: take(reference_col),
                    label: take(label_col),
                }
            })
            .collect();

        Ok(Self { rows })
    }

    /// Rows in input order
    pub fn rows(&self) -> &[InputRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Text of a cell; empty and error cells are absent
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_from_table_maps_columns() {
        let headers = ["Website URL", "Notes", "Google Docs URL"];
        let rows = vec![
            vec![cell("https://a.example"), None, cell("https://docs.google.com/document/d/A")],
            vec![None, cell("x"), cell("https://docs.google.com/document/d/B")],
            vec![cell("https://c.example")],
        ];

        let source = RowSource::from_table(&headers, rows, &PipelineConfig::default()).unwrap();
        assert_eq!(source.len(), 3);

        let first = &source.rows()[0];
        assert_eq!(first.index, 1);
        assert_eq!(first.label.as_deref(), Some("https://a.example"));
        assert_eq!(
            first.document_reference.as_deref(),
            Some("https://docs.google.com/document/d/A")
        );

        assert!(source.rows()[1].label.is_none());
        assert!(source.rows()[2].document_reference.is_none());
        assert_eq!(source.rows()[2].index, 3);
    }

    #[test]
    fn test_missing_column_rejects_source() {
        let headers = ["Google Docs URL", "Site"];
        let err = RowSource::from_table(&headers, vec![], &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, SourceError::MissingColumns { .. }));
        assert!(err.to_string().contains("Google Docs URL"));
        assert!(err.to_string().contains("Website URL"));
    }

    #[test]
    fn test_empty_string_is_missing() {
        let headers = ["Google Docs URL", "Website URL"];
        let rows = vec![vec![cell(""), cell("https://a.example")]];
        let source = RowSource::from_table(&headers, rows, &PipelineConfig::default()).unwrap();
        assert!(source.rows()[0].document_reference.is_none());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("x".into())), Some("x".to_string()));
        assert_eq!(cell_text(&Data::Int(7)), Some("7".to_string()));
    }

    #[test]
    fn test_open_missing_workbook() {
        let err = RowSource::open(
            Path::new("/nonexistent/input.xlsx"),
            &PipelineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }
}
