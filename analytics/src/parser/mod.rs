//! CSV reader for sales transaction exports.
//!
//! Decodes the raw bytes (encoding auto-detection), picks the delimiter from
//! the header line, checks the required columns and deserializes every record
//! into a [`RawTransactionRow`]. Neither bad cells nor short rows fail the
//! load; the cleaning filters drop such rows later.

use std::path::Path;

use crate::error::{CsvError, CsvResult, DataError, DataResult, PipelineResult};
use crate::models::RawTransactionRow;

/// Columns every input must provide. Order in the file is free.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "TransactionNo",
    "ProductName",
    "CustomerNo",
    "Quantity",
    "Price",
    "Date",
    "Country",
];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed line items, in file order
    pub rows: Vec<RawTransactionRow>,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
    /// Column headers as found in the file
    pub headers: Vec<String>,
}

/// Header and first rows of a file, without any typing or cleaning.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CsvPreview {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    /// Number of data rows (header excluded)
    pub row_count: usize,
    pub sample: Vec<Vec<String>>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let codec = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => encoding_rs::UTF_8,
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15,
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252,
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(codec) => codec,
            None => return Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    };

    let (text, _, had_errors) = codec.decode(bytes);
    if had_errors && codec != encoding_rs::UTF_8 {
        return Err(CsvError::EncodingError(format!(
            "invalid byte sequence for {}",
            codec.name()
        )));
    }
    Ok(text.into_owned())
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Falls back to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
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

/// Fail with [`DataError::MissingColumn`] for the first required column
/// absent from `headers`.
pub fn check_required_columns(headers: &[String]) -> DataResult<()> {
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(DataError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

/// Short and long rows are accepted; missing trailing cells read as empty.
/// Only header names are trimmed, so data cells such as ` C581484` keep
/// their leading space.
fn reader_for(content: &str, delimiter: char) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes())
}

fn parse_error(err: csv::Error) -> CsvError {
    let line = err
        .position()
        .map(|p| p.line() as usize)
        .unwrap_or(0);
    CsvError::ParseError {
        line,
        message: err.to_string(),
    }
}

fn read_headers(reader: &mut csv::Reader<&[u8]>) -> CsvResult<Vec<String>> {
    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }
    Ok(headers)
}

/// Parse decoded CSV text with an explicit delimiter.
pub fn parse_transactions(
    content: &str,
    delimiter: char,
    encoding: String,
) -> PipelineResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile.into());
    }

    let mut reader = reader_for(content, delimiter);
    let headers = read_headers(&mut reader)?;
    check_required_columns(&headers)?;

    let header_record = csv::StringRecord::from(headers.clone());
    let extra_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !REQUIRED_COLUMNS.contains(&h.as_str()))
        .map(|(i, _)| i)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let mut record = record.map_err(parse_error)?;
        while record.len() < header_record.len() {
            record.push_field("");
        }
        let mut row: RawTransactionRow = record
            .deserialize(Some(&header_record))
            .map_err(parse_error)?;
        row.extra_cells = extra_columns
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect();
        rows.push(row);
    }

    Ok(ParseResult {
        rows,
        encoding,
        delimiter,
        headers,
    })
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> PipelineResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    parse_transactions(&content, delimiter, encoding)
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> PipelineResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref()).map_err(CsvError::from)?;
    parse_bytes_auto(&bytes)
}

/// Read the header, the row count and the first `sample_rows` rows of a
/// file. No column is required and nothing is typed.
pub fn preview_csv_file<P: AsRef<Path>>(path: P, sample_rows: usize) -> CsvResult<CsvPreview> {
    let bytes = std::fs::read(path.as_ref())?;
    preview_bytes(&bytes, sample_rows)
}

/// Same as [`preview_csv_file`] for in-memory bytes.
pub fn preview_bytes(bytes: &[u8], sample_rows: usize) -> CsvResult<CsvPreview> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    let delimiter = detect_delimiter(&content);

    let mut reader = reader_for(&content, delimiter);
    let headers = read_headers(&mut reader)?;

    let mut row_count = 0;
    let mut sample = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        if sample.len() < sample_rows {
            sample.push(record.iter().map(String::from).collect());
        }
        row_count += 1;
    }

    Ok(CsvPreview {
        encoding,
        delimiter,
        headers,
        row_count,
        sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    const HEADER: &str = "TransactionNo,Date,ProductNo,ProductName,Price,Quantity,CustomerNo,Country";

    fn parse(csv: &str) -> PipelineResult<ParseResult> {
        parse_bytes_auto(csv.as_bytes())
    }

    #[test]
    fn test_parse_typed_rows() {
        let csv = format!(
            "{}\n581482,12/9/2019,22485,Set Of 2 Wooden Market Crates,21.47,12,17490,United Kingdom",
            HEADER
        );
        let result = parse(&csv).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.rows.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row.transaction_no.as_deref(), Some("581482"));
        assert_eq!(row.product_name, "Set Of 2 Wooden Market Crates");
        assert_eq!(row.quantity, Some(12));
        assert_eq!(row.price, Some(21.47));
        assert_eq!(row.customer_no.as_deref(), Some("17490"));
        assert_eq!(row.date.as_deref(), Some("12/9/2019"));
        assert_eq!(row.country, "United Kingdom");
    }

    #[test]
    fn test_bad_cells_become_none() {
        let csv = format!("{}\nT1,2020-01-05,P1,Widget,abc,,,France", HEADER);
        let result = parse(&csv).unwrap();

        let row = &result.rows[0];
        assert_eq!(row.price, None);
        assert_eq!(row.quantity, None);
        assert_eq!(row.customer_no, None);
    }

    #[test]
    fn test_quoted_values() {
        let csv = format!("{}\nT1,2020-01-05,P1,\"Mug, Red\",2.5,1,C1,France", HEADER);
        let result = parse(&csv).unwrap();
        assert_eq!(result.rows[0].product_name, "Mug, Red");
    }

    #[test]
    fn test_missing_column() {
        let csv = "TransactionNo,ProductName,CustomerNo,Quantity,Date,Country\nT1,W,C1,1,2020-01-01,UK";
        let err = parse(csv).unwrap_err();
        match err {
            PipelineError::Data(DataError::MissingColumn(col)) => assert_eq!(col, "Price"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_gives_no_rows() {
        let result = parse(HEADER).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.headers.len(), 8);
    }

    #[test]
    fn test_empty_csv_error() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, PipelineError::Csv(CsvError::EmptyFile)));
    }

    #[test]
    fn test_short_row_reads_missing_cells_as_empty() {
        let csv = format!(
            "{}\nT1,2020-01-05,P1,Widget,10.0,3,C1,UK\nT2,2020-01-06,P1",
            HEADER
        );
        let result = parse(&csv).unwrap();

        assert_eq!(result.rows.len(), 2);
        let short = &result.rows[1];
        assert_eq!(short.transaction_no.as_deref(), Some("T2"));
        assert_eq!(short.date.as_deref(), Some("2020-01-06"));
        assert_eq!(short.quantity, None);
        assert_eq!(short.price, None);
        assert_eq!(short.extra_cells, vec!["P1"]);
    }

    #[test]
    fn test_untyped_columns_are_kept() {
        let csv = format!("Note,{}\nfragile,T1,2020-01-05,P1,Widget,10.0,3,C1,UK", HEADER);
        let result = parse(&csv).unwrap();
        assert_eq!(result.rows[0].extra_cells, vec!["fragile", "P1"]);
        assert_eq!(result.rows[0].product_name, "Widget");
    }

    #[test]
    fn test_text_cells_are_not_trimmed() {
        let csv = format!("{}\n C581484,2020-01-05,P1,Widget, 10.0 , 3 ,C1,UK", HEADER);
        let result = parse(&csv).unwrap();

        let row = &result.rows[0];
        assert_eq!(row.transaction_no.as_deref(), Some(" C581484"));
        assert!(!row.is_cancellation());
        assert_eq!(row.quantity, Some(3));
        assert_eq!(row.price, Some(10.0));
    }

    #[test]
    fn test_semicolon_export() {
        let csv = HEADER.replace(',', ";") + "\nT1;2020-01-05;P1;Widget;2,5;1;C1;France";
        let result = parse(&csv).unwrap();
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.rows[0].product_name, "Widget");
        // decimal comma is not a number
        assert_eq!(result.rows[0].price, None);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c"), ';');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Café" in ISO-8859-1
        let bytes: &[u8] = &[0x43, 0x61, 0x66, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Café");
    }

    #[test]
    fn test_preview_counts_rows() {
        let csv = format!(
            "{}\nT1,2020-01-05,P1,A,1,1,C1,UK\nT2,2020-01-06,P2,B,1,1,C1,UK\nT3,2020-01-07,P3,C,1,1,C1,UK",
            HEADER
        );
        let preview = preview_bytes(csv.as_bytes(), 2).unwrap();
        assert_eq!(preview.row_count, 3);
        assert_eq!(preview.sample.len(), 2);
        assert_eq!(preview.sample[1][0], "T2");
        assert_eq!(preview.headers[0], "TransactionNo");
    }
}
