use std::collections::HashMap;

use crate::domain::{CellValue, Dataset, Row, PLACEHOLDER_COLUMN_MARKER};
use crate::error::AppError;

const UTF8_BOM: char = '\u{feff}';

/// Parse CSV text (first record is the header) into a dataset.
///
/// Short records yield `Null` for missing trailing columns; extra cells get
/// `Unnamed: <index>` headers. Duplicate headers are suffixed `.1`, `.2`, ...
pub fn parse_csv_dataset(name: &str, csv_text: &str) -> Result<Dataset, AppError> {
    let text = csv_text.strip_prefix(UTF8_BOM).unwrap_or(csv_text);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let raw_headers = rdr
        .headers()
        .map_err(|e| {
            AppError::new("DATASET_PARSE_FAILED", "Failed to read dataset headers")
                .with_details(format!("dataset={name}; err={e}"))
        })?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let mut headers = normalize_headers(&raw_headers);

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            AppError::new("DATASET_PARSE_FAILED", "Failed to parse dataset row")
                .with_details(format!("dataset={name}; row={}; err={e}", idx + 1))
        })?;

        while headers.len() < record.len() {
            headers.push(format!("{PLACEHOLDER_COLUMN_MARKER}: {}", headers.len()));
        }

        let mut row = Row::new();
        for (col, header) in headers.iter().enumerate() {
            let value = record
                .get(col)
                .map(CellValue::from_raw)
                .unwrap_or(CellValue::Null);
            row.push(header.clone(), value);
        }
        rows.push(row);
    }

    Ok(Dataset::new(name, rows))
}

fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(raw.len());
    for (idx, h) in raw.iter().enumerate() {
        let base = match h.trim() {
            "" => format!("{PLACEHOLDER_COLUMN_MARKER}: {idx}"),
            t => t.to_string(),
        };
        let n = seen.entry(base.clone()).or_insert(0);
        let name = if *n == 0 { base } else { format!("{base}.{n}") };
        *n += 1;
        out.push(name);
    }
    out
}
