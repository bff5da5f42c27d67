//! Report generation and formatting.
//!
//! Takes a report payload (title, summary map, data rows) and renders it to
//! one of four formats. The rendered file is written to a temp path, handed
//! to [`FileStorage`], and described back to the caller as a URL + metadata
//! descriptor.
//!
//! Format notes:
//! - CSV uses flat field projection: the header is the union of row keys in
//!   first-seen order, missing fields render empty.
//! - Excel writes a fixed layout: title, generated-at, summary rows, then a
//!   data table with auto headers.
//! - PDF emits plain-text rows with a page break every [`PDF_ROWS_PER_PAGE`]
//!   rows and refuses payloads past [`PDF_MAX_ROWS`] rows; callers should
//!   fall back to CSV or Excel for large datasets.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use craftline_core::slugify;

use super::storage::{FileStorage, StorageError};

/// Rows rendered per PDF page.
pub const PDF_ROWS_PER_PAGE: usize = 5;

/// Maximum row count accepted for PDF output.
pub const PDF_MAX_ROWS: usize = 100;

/// Target output format for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Csv,
    Excel,
    Pdf,
}

impl ReportFormat {
    /// File extension for the format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Input to report generation.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportPayload {
    /// Report title, used for the document header and the filename.
    pub title: String,
    /// Summary entries rendered above the data table (key order).
    #[serde(default)]
    pub summary: serde_json::Map<String, Value>,
    /// Data rows; each row is a flat-ish JSON object.
    #[serde(default)]
    pub rows: Vec<serde_json::Map<String, Value>>,
}

/// Descriptor for a generated report file.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDescriptor {
    /// Stored filename.
    pub filename: String,
    /// Public URL of the stored file.
    pub url: String,
    /// Format the report was rendered in.
    pub format: ReportFormat,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Number of data rows in the report.
    pub row_count: usize,
    /// Generation timestamp (stamped into the document).
    pub generated_at: DateTime<Utc>,
}

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// PDF output refused; the dataset is too large for paginated text.
    #[error("report has {rows} rows but PDF output is limited to {max}; use csv or excel")]
    TooManyRowsForPdf { rows: usize, max: usize },

    /// Filesystem operation failed.
    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failed.
    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),

    /// Excel encoding failed.
    #[error("Excel encoding error: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    /// PDF encoding failed.
    #[error("PDF encoding error: {0}")]
    Pdf(String),

    /// JSON encoding failed.
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage handoff failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Report generation service.
#[derive(Debug, Clone)]
pub struct ReportService {
    storage: FileStorage,
}

impl ReportService {
    /// Create a new report service storing files via `storage`.
    #[must_use]
    pub const fn new(storage: FileStorage) -> Self {
        Self { storage }
    }

    /// Render `payload` as `format`, place the file into storage, and return
    /// its descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::TooManyRowsForPdf`] when a PDF is requested for
    /// more than [`PDF_MAX_ROWS`] rows, or an encoding/storage error.
    pub async fn generate(
        &self,
        payload: &ReportPayload,
        format: ReportFormat,
    ) -> Result<ReportDescriptor, ReportError> {
        if format == ReportFormat::Pdf && payload.rows.len() > PDF_MAX_ROWS {
            return Err(ReportError::TooManyRowsForPdf {
                rows: payload.rows.len(),
                max: PDF_MAX_ROWS,
            });
        }

        let generated_at = Utc::now();
        let temp = temp_path(format);

        let rendered = match format {
            ReportFormat::Json => write_json(&temp, payload, generated_at),
            ReportFormat::Csv => write_csv(&temp, payload),
            ReportFormat::Excel => write_excel(&temp, payload, generated_at),
            ReportFormat::Pdf => write_pdf(&temp, payload, generated_at),
        };
        if let Err(e) = rendered {
            // Best effort: don't leave half-written temp files behind.
            let _ = std::fs::remove_file(&temp);
            return Err(e);
        }

        let slug = match slugify(&payload.title) {
            s if s.is_empty() => "report".to_string(),
            s => s,
        };
        let filename = format!(
            "{slug}-{}.{}",
            generated_at.format("%Y%m%d%H%M%S"),
            format.extension()
        );
        let stored = self.storage.store(&temp, &filename).await?;

        tracing::info!(
            filename = %stored.filename,
            format = %format,
            rows = payload.rows.len(),
            size_bytes = stored.size_bytes,
            "Report generated"
        );

        Ok(ReportDescriptor {
            filename: stored.filename,
            url: stored.url,
            format,
            size_bytes: stored.size_bytes,
            row_count: payload.rows.len(),
            generated_at,
        })
    }
}

fn temp_path(format: ReportFormat) -> PathBuf {
    std::env::temp_dir().join(format!(
        "craftline-report-{}.{}",
        uuid::Uuid::new_v4(),
        format.extension()
    ))
}

/// Render a JSON value as CSV/PDF cell text.
///
/// Scalars render bare; composite values render as compact JSON.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        composite => composite.to_string(),
    }
}

/// Union of row keys in first-seen order.
fn collect_headers(rows: &[serde_json::Map<String, Value>]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

// =============================================================================
// Format writers
// =============================================================================

fn write_json(
    path: &PathBuf,
    payload: &ReportPayload,
    generated_at: DateTime<Utc>,
) -> Result<(), ReportError> {
    let document = serde_json::json!({
        "title": payload.title,
        "generated_at": generated_at,
        "summary": payload.summary,
        "rows": payload.rows,
    });
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &document)?;
    Ok(())
}

fn write_csv(path: &PathBuf, payload: &ReportPayload) -> Result<(), ReportError> {
    let headers = collect_headers(&payload.rows);
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(&headers)?;
    for row in &payload.rows {
        let record: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(cell_text).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_excel(
    path: &PathBuf,
    payload: &ReportPayload,
    generated_at: DateTime<Utc>,
) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    worksheet.write_string_with_format(0, 0, payload.title.as_str(), &bold)?;
    worksheet.write_string(1, 0, "Generated at")?;
    worksheet.write_string(1, 1, generated_at.to_rfc3339())?;

    let mut row_idx: u32 = 2;
    for (label, value) in &payload.summary {
        worksheet.write_string(row_idx, 0, label.as_str())?;
        worksheet.write_string(row_idx, 1, cell_text(value))?;
        row_idx += 1;
    }

    // Blank row between the summary block and the data table
    row_idx += 1;

    let headers = collect_headers(&payload.rows);
    for (col, header) in (0u16..).zip(headers.iter()) {
        worksheet.write_string_with_format(row_idx, col, header.as_str(), &bold)?;
    }
    row_idx += 1;

    for row in &payload.rows {
        for (col, header) in (0u16..).zip(headers.iter()) {
            match row.get(header) {
                None | Some(Value::Null) => {}
                Some(Value::Number(n)) => {
                    if let Some(f) = n.as_f64() {
                        worksheet.write_number(row_idx, col, f)?;
                    } else {
                        worksheet.write_string(row_idx, col, n.to_string())?;
                    }
                }
                Some(Value::Bool(b)) => {
                    worksheet.write_boolean(row_idx, col, *b)?;
                }
                Some(other) => {
                    worksheet.write_string(row_idx, col, cell_text(other))?;
                }
            }
        }
        row_idx += 1;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_pdf(
    path: &PathBuf,
    payload: &ReportPayload,
    generated_at: DateTime<Utc>,
) -> Result<(), ReportError> {
    const PAGE_WIDTH_MM: f64 = 210.0;
    const PAGE_HEIGHT_MM: f64 = 297.0;
    const MARGIN_MM: f64 = 20.0;
    const LINE_STEP_MM: f64 = 7.0;
    const MAX_LINE_CHARS: usize = 105;

    let (doc, first_page, first_layer) = PdfDocument::new(
        payload.title.clone(),
        Mm(PAGE_WIDTH_MM as _),
        Mm(PAGE_HEIGHT_MM as _),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    let font_bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    let write_line = |layer: &printpdf::PdfLayerReference,
                      y: &mut f64,
                      text: &str,
                      size: f64,
                      font: &IndirectFontRef| {
        layer.use_text(
            truncate_line(text, MAX_LINE_CHARS),
            size as _,
            Mm(MARGIN_MM as _),
            Mm(*y as _),
            font,
        );
        *y -= LINE_STEP_MM;
    };

    write_line(&layer, &mut y, &payload.title, 16.0, &font_bold);
    write_line(
        &layer,
        &mut y,
        &format!("Generated at {}", generated_at.to_rfc3339()),
        10.0,
        &font,
    );
    for (label, value) in &payload.summary {
        write_line(
            &layer,
            &mut y,
            &format!("{label}: {}", cell_text(value)),
            10.0,
            &font,
        );
    }
    y -= LINE_STEP_MM;

    for (idx, row) in payload.rows.iter().enumerate() {
        if idx > 0 && idx % PDF_ROWS_PER_PAGE == 0 {
            let (page, page_layer) = doc.add_page(
                Mm(PAGE_WIDTH_MM as _),
                Mm(PAGE_HEIGHT_MM as _),
                "Layer 1",
            );
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }

        let fields: Vec<String> = row
            .iter()
            .map(|(key, value)| format!("{key}: {}", cell_text(value)))
            .collect();
        write_line(
            &layer,
            &mut y,
            &format!("{}. {}", idx + 1, fields.join("  ")),
            10.0,
            &font,
        );
    }

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    Ok(())
}

fn truncate_line(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{truncated}\u{2026}")
    }
}
