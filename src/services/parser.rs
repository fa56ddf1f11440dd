//! Tabular file ingestion: delimited text and spreadsheets.
//!
//! Both strategies produce the same shape: an ordered sequence of
//! string-keyed records plus the header row, with no schema knowledge.
//! Delimited parsing streams row by row; spreadsheet parsing is whole-file
//! because the workbook document model requires it.

use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::{StagedRecord, StagedRows};

/// The declared kind of an uploaded tabular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// CSV/TSV-style delimited text, parsed streaming.
    Delimited,
    /// XLS/XLSX/ODS workbook, parsed whole-file.
    Spreadsheet,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delimited => "delimited",
            Self::Spreadsheet => "spreadsheet",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "delimited" | "csv" => Some(Self::Delimited),
            "spreadsheet" | "xlsx" | "xls" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Infer the kind from the declared media type, falling back to the
    /// filename extension.
    pub fn detect(media_type: &str, filename: &str) -> Option<Self> {
        let mt = media_type.to_lowercase();
        if mt.contains("csv") || mt.starts_with("text/") {
            return Some(Self::Delimited);
        }
        if mt.contains("excel") || mt.contains("spreadsheet") {
            return Some(Self::Spreadsheet);
        }

        let lower = filename.to_lowercase();
        if lower.ends_with(".csv") || lower.ends_with(".tsv") || lower.ends_with(".txt") {
            Some(Self::Delimited)
        } else if lower.ends_with(".xls") || lower.ends_with(".xlsx") || lower.ends_with(".ods") {
            Some(Self::Spreadsheet)
        } else {
            None
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an uploaded file from disk according to its declared kind.
pub fn parse_file(path: &Path, kind: FileKind) -> AppResult<StagedRows> {
    match kind {
        FileKind::Delimited => {
            let file = std::fs::File::open(path)
                .map_err(|e| AppError::FileSystem(format!("Failed to open upload: {}", e)))?;
            parse_delimited(file)
        }
        FileKind::Spreadsheet => {
            let bytes = std::fs::read(path)
                .map_err(|e| AppError::FileSystem(format!("Failed to read upload: {}", e)))?;
            parse_spreadsheet(&bytes)
        }
    }
}

/// Parse delimited text row by row. The header row defines field names;
/// duplicate headers pass through last-wins. Zero data rows is not an error
/// here, validity is judged later by the resolver.
pub fn parse_delimited<R: Read>(reader: R) -> AppResult<StagedRows> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| AppError::MalformedInput(format!("Unreadable header row: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::MalformedInput(
            "Header row is empty".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            AppError::MalformedInput(format!("Unreadable row {}: {}", line + 2, e))
        })?;

        let mut fields = StagedRecord::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            if header.is_empty() {
                continue;
            }
            fields.insert(header.clone(), value.to_string());
        }

        // Rows with no content at all are not data.
        if fields.values().all(|v| v.is_empty()) {
            continue;
        }

        rows.push(fields);
    }

    Ok(StagedRows {
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        rows,
    })
}

/// Parse the first sheet of a workbook. The workbook format (xls, xlsx,
/// xlsb, ods) is auto-detected from the bytes.
pub fn parse_spreadsheet(bytes: &[u8]) -> AppResult<StagedRows> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| AppError::MalformedInput(format!("Unreadable workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| AppError::MalformedInput("Workbook has no sheets".to_string()))?
        .clone();

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::MalformedInput(format!("Unreadable sheet: {}", e)))?;

    let mut row_iter = range.rows();

    let headers: Vec<String> = row_iter
        .next()
        .ok_or_else(|| AppError::MalformedInput("Sheet has no header row".to_string()))?
        .iter()
        .map(cell_to_string)
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::MalformedInput(
            "Header row is empty".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for row in row_iter {
        let mut fields = StagedRecord::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            fields.insert(header.clone(), cell_to_string(cell));
        }

        if fields.values().all(|v| v.is_empty()) {
            continue;
        }

        rows.push(fields);
    }

    Ok(StagedRows {
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        rows,
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => format!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_detection() {
        assert_eq!(
            FileKind::detect("text/csv", "q1.csv"),
            Some(FileKind::Delimited)
        );
        assert_eq!(
            FileKind::detect("application/vnd.ms-excel", "q1.xls"),
            Some(FileKind::Spreadsheet)
        );
        assert_eq!(
            FileKind::detect("application/octet-stream", "q1.xlsx"),
            Some(FileKind::Spreadsheet)
        );
        assert_eq!(FileKind::detect("application/octet-stream", "q1.bin"), None);
    }

    #[test]
    fn test_parse_delimited_basic() {
        let csv = "station_id,indexName,day1st_result_ppm\n4,SO2,0.02\n5,SO2,0.03\n";
        let parsed = parse_delimited(csv.as_bytes()).unwrap();

        assert_eq!(
            parsed.headers,
            vec!["station_id", "indexName", "day1st_result_ppm"]
        );
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0]["station_id"], "4");
        assert_eq!(parsed.rows[0]["day1st_result_ppm"], "0.02");
        assert_eq!(parsed.rows[1]["station_id"], "5");
    }

    #[test]
    fn test_parse_delimited_preserves_row_order() {
        let csv = "v\n1\n2\n3\n4\n5\n";
        let parsed = parse_delimited(csv.as_bytes()).unwrap();
        let values: Vec<&str> = parsed.rows.iter().map(|r| r["v"].as_str()).collect();
        assert_eq!(values, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_parse_delimited_trims_whitespace() {
        let csv = "a,b\n  4 , SO2 \n";
        let parsed = parse_delimited(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0]["a"], "4");
        assert_eq!(parsed.rows[0]["b"], "SO2");
    }

    #[test]
    fn test_parse_delimited_duplicate_header_last_wins() {
        let csv = "a,a\nfirst,second\n";
        let parsed = parse_delimited(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0]["a"], "second");
    }

    #[test]
    fn test_parse_delimited_short_rows_tolerated() {
        let csv = "a,b,c\n1,2\n";
        let parsed = parse_delimited(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows[0].get("a").map(String::as_str), Some("1"));
        assert_eq!(parsed.rows[0].get("c"), None);
    }

    #[test]
    fn test_parse_delimited_empty_parse_is_not_an_error() {
        let csv = "a,b\n";
        let parsed = parse_delimited(csv.as_bytes()).unwrap();
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.headers, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_delimited_blank_rows_skipped() {
        let csv = "a,b\n1,2\n,\n3,4\n";
        let parsed = parse_delimited(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 2);
    }

    #[test]
    fn test_parse_delimited_rejects_invalid_utf8() {
        let bytes: &[u8] = b"a,b\n\xff\xfe,2\n";
        let err = parse_delimited(bytes).unwrap_err();
        assert!(matches!(err, AppError::MalformedInput(_)));
    }

    #[test]
    fn test_parse_spreadsheet_rejects_garbage() {
        let err = parse_spreadsheet(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, AppError::MalformedInput(_)));
    }
}
