//! Raw sales provider: store CSV extracts to [`RawSalesTable`].
//!
//! Reads one CSV file per store with encoding and delimiter
//! auto-detection. Recognized headers: `Week` (required), `Target`,
//! `Store` (dropped on read), and one `Sales<year>` column per
//! historical year. Headers outside that shape carry nothing the report
//! uses and are ignored. Cell-level surprises never fail the read:
//! unparseable numbers become nulls and unparseable weeks become labels.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::model::{RawSalesTable, RawWeekRow, WeekKey};

/// `Sales2024` style headers; the capture is the calendar year.
static SALES_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Sales(\d{4})$").unwrap());

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);

    // Normalize charset names.
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the detected encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string()),
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.to_string()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    };
    Ok(decoded)
}

/// Detect the delimiter by counting candidates in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Forgiving decimal parse: trims, strips thousands separators, rejects
/// anything alphabetic. Returns `None` for unusable values.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    trimmed.replace(',', "").parse::<Decimal>().ok()
}

/// Load a store extract from a CSV file, auto-detecting its format.
pub fn load_store_csv<P: AsRef<Path>>(path: P) -> SourceResult<RawSalesTable> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_store_bytes(&bytes)
}

/// Parse a store extract from raw CSV bytes.
pub fn parse_store_bytes(bytes: &[u8]) -> SourceResult<RawSalesTable> {
    if bytes.is_empty() {
        return Err(SourceError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| SourceError::parse(1, e.to_string()))?
        .clone();

    let mut week_idx = None;
    let mut target_idx = None;
    let mut year_columns: Vec<(usize, i32)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        let header = header.trim();
        match header {
            "Week" => week_idx = Some(idx),
            "Target" => target_idx = Some(idx),
            // The Store column identifies the extract, not the week; drop it.
            "Store" => {}
            other => {
                if let Some(caps) = SALES_HEADER.captures(other) {
                    if let Ok(year) = caps[1].parse::<i32>() {
                        year_columns.push((idx, year));
                    }
                }
            }
        }
    }
    let week_idx = week_idx.ok_or(SourceError::MissingWeekColumn)?;

    let mut years: Vec<i32> = year_columns.iter().map(|(_, y)| *y).collect();
    years.sort_unstable();
    years.dedup();

    let mut rows = Vec::new();
    for (record_idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| SourceError::parse(record_idx + 2, e.to_string()))?;

        let week = WeekKey::from_raw(record.get(week_idx).unwrap_or(""));
        let target = target_idx
            .and_then(|idx| record.get(idx))
            .and_then(parse_decimal);
        let sales_by_year: BTreeMap<i32, Option<Decimal>> = year_columns
            .iter()
            .map(|(idx, year)| (*year, record.get(*idx).and_then(parse_decimal)))
            .collect();

        rows.push(RawWeekRow {
            week,
            target,
            sales_by_year,
        });
    }

    Ok(RawSalesTable {
        has_target: target_idx.is_some(),
        years,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_simple_extract() {
        let csv = "Week,Target,Sales2023,Sales2024\n1,1000,90,110\n2,1000,95,120\n";
        let table = parse_store_bytes(csv.as_bytes()).unwrap();

        assert!(table.has_target);
        assert_eq!(table.years, vec![2023, 2024]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].week, WeekKey::Number(1));
        assert_eq!(table.rows[0].target, Some(dec("1000")));
        assert_eq!(table.rows[0].sales_by_year[&2024], Some(dec("110")));
    }

    #[test]
    fn test_store_column_is_dropped() {
        let csv = "Store,Week,Target\nBG01,1,500\n";
        let table = parse_store_bytes(csv.as_bytes()).unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].target, Some(dec("500")));
    }

    #[test]
    fn test_semicolon_delimiter_detected() {
        let csv = "Week;Target;Sales2024\n1;1000;110\n";
        let table = parse_store_bytes(csv.as_bytes()).unwrap();

        assert_eq!(table.years, vec![2024]);
        assert_eq!(table.rows[0].sales_by_year[&2024], Some(dec("110")));
    }

    #[test]
    fn test_missing_week_column() {
        let csv = "Target,Sales2024\n1000,110\n";
        let result = parse_store_bytes(csv.as_bytes());
        assert!(matches!(result, Err(SourceError::MissingWeekColumn)));
    }

    #[test]
    fn test_empty_file() {
        let result = parse_store_bytes(b"");
        assert!(matches!(result, Err(SourceError::EmptyFile)));
    }

    #[test]
    fn test_malformed_cells_become_nulls_and_labels() {
        let csv = "Week,Target,Sales2024\nabc,n/a,1,500\n2,,\n";
        let table = parse_store_bytes(csv.as_bytes()).unwrap();

        assert_eq!(table.rows[0].week, WeekKey::Label("abc".into()));
        assert_eq!(table.rows[0].target, None);
        assert_eq!(table.rows[1].week, WeekKey::Number(2));
        assert_eq!(table.rows[1].target, None);
        assert_eq!(table.rows[1].sales_by_year[&2024], None);
    }

    #[test]
    fn test_thousands_separators_stripped() {
        let csv = "Week;Target\n1;\"1,250\"\n";
        let table = parse_store_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].target, Some(dec("1250")));
    }

    #[test]
    fn test_unrecognized_headers_ignored() {
        let csv = "Week,Target,SalesTotal,Notes\n1,100,999,hello\n";
        let table = parse_store_bytes(csv.as_bytes()).unwrap();

        assert!(table.years.is_empty());
        assert_eq!(table.rows[0].target, Some(dec("100")));
    }

    #[test]
    fn test_no_target_column() {
        let csv = "Week,Sales2024\n1,110\n";
        let table = parse_store_bytes(csv.as_bytes()).unwrap();

        assert!(!table.has_target);
        assert_eq!(table.rows[0].target, None);
    }

    #[test]
    fn test_detect_delimiter_variants() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
    }

    #[test]
    fn test_parse_decimal_rejects_text() {
        assert_eq!(parse_decimal("12.5"), Some(dec("12.5")));
        assert_eq!(parse_decimal(" 1,234.50 "), Some(dec("1234.50")));
        assert_eq!(parse_decimal("n/a"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg01.csv");
        std::fs::write(&path, "Week,Target\n1,100\n").unwrap();

        let table = load_store_csv(&path).unwrap();
        assert_eq!(table.rows.len(), 1);
    }
}
