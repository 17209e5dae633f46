use std::io::ErrorKind;
use std::path::Path;

use super::model::{Delimiter, SampleSeries};
use crate::error::{Result, SparkError};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a two-column table. The delimiter is picked from the extension.
///
/// Supported layouts:
/// * `.asc` – columns separated by runs of whitespace
/// * anything else – comma-separated
///
/// The first row may be a text header; it is dropped only when the table
/// does not parse as numbers with it.
pub fn load_file(path: &Path) -> Result<SampleSeries> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::InvalidData {
            SparkError::MalformedTable(format!("{} is not UTF-8 text", path.display()))
        } else {
            SparkError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let delimiter = Delimiter::from_path(path);
    let series = parse_table(&text, delimiter)?;
    log::debug!(
        "Loaded {} rows from {} ({delimiter}-delimited)",
        series.len(),
        path.display()
    );
    Ok(series)
}

/// Parse table text that has already been read into memory.
pub fn parse_table(text: &str, delimiter: Delimiter) -> Result<SampleSeries> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rows = match delimiter {
        Delimiter::Whitespace => split_whitespace_rows(text),
        Delimiter::Comma => split_comma_rows(text)?,
    };

    let n_columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if n_columns < 2 {
        return Err(SparkError::MalformedTable(format!(
            "file must have at least 2 columns, found {n_columns}"
        )));
    }

    // The header decision only looks at whether the fields parse as floats;
    // `inf` / `nan` parse, so a row holding them is data, not a header.
    let (skip, (x, y)) = match parse_columns(&rows, 0) {
        Ok(columns) => (0, columns),
        Err(first_err) => {
            log::debug!("First row is not numeric ({first_err}), treating it as a header");
            (1, parse_columns(&rows, 1)?)
        }
    };

    ensure_finite(&x, 0, skip)?;
    ensure_finite(&y, 1, skip)?;
    SampleSeries::new(x, y)
}

// ---------------------------------------------------------------------------
// Row splitting
// ---------------------------------------------------------------------------

fn split_whitespace_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .filter(|fields| !fields.is_empty())
        .collect()
}

fn split_comma_rows(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| SparkError::MalformedTable(format!("CSV row {row_no}: {e}")))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Numeric conversion
// ---------------------------------------------------------------------------

/// Parse the first two columns of `rows[skip..]`.
fn parse_columns(rows: &[Vec<String>], skip: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    let data = rows.get(skip..).unwrap_or(&[]);
    let mut x = Vec::with_capacity(data.len());
    let mut y = Vec::with_capacity(data.len());

    for (offset, row) in data.iter().enumerate() {
        let row_no = skip + offset;
        x.push(parse_field(row, 0, row_no)?);
        y.push(parse_field(row, 1, row_no)?);
    }

    Ok((x, y))
}

fn parse_field(row: &[String], col: usize, row_no: usize) -> Result<f64> {
    let tok = row.get(col).ok_or_else(|| {
        SparkError::MalformedTable(format!("row {row_no} has no column {}", col + 1))
    })?;
    tok.parse::<f64>().map_err(|_| {
        SparkError::MalformedTable(format!(
            "row {row_no}, column {}: '{tok}' is not a number",
            col + 1
        ))
    })
}

/// Reject `inf` / `nan`; `skip` maps positions back to file rows.
fn ensure_finite(values: &[f64], col: usize, skip: usize) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(SparkError::MalformedTable(format!(
            "row {}, column {}: '{}' is not a finite number",
            i + skip,
            col + 1,
            values[i]
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_table_without_header() {
        let s = parse_table("1.0,10\n2.0,20\n3.0,30\n", Delimiter::Comma).unwrap();
        assert_eq!(s.x, vec![1.0, 2.0, 3.0]);
        assert_eq!(s.y, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_header_row_is_dropped() {
        let with = parse_table("wavelength,intensity\n1.0,10\n2.0,20\n", Delimiter::Comma).unwrap();
        let without = parse_table("1.0,10\n2.0,20\n", Delimiter::Comma).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_whitespace_table_with_mixed_runs() {
        let text = "  500.0\t 1.5\n501.0    2.5   \n\n502.0 \t3.5\n";
        let s = parse_table(text, Delimiter::Whitespace).unwrap();
        assert_eq!(s.x, vec![500.0, 501.0, 502.0]);
        assert_eq!(s.y, vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let s = parse_table("1,2,3\n4,5,6\n", Delimiter::Comma).unwrap();
        assert_eq!(s.x, vec![1.0, 4.0]);
        assert_eq!(s.y, vec![2.0, 5.0]);
    }

    #[test]
    fn test_single_column_is_rejected() {
        let err = parse_table("1\n2\n3\n", Delimiter::Comma).unwrap_err();
        assert!(matches!(err, SparkError::MalformedTable(_)));
    }

    #[test]
    fn test_only_first_row_may_be_header() {
        let err = parse_table("a,b\nc,d\n1,2\n", Delimiter::Comma).unwrap_err();
        match err {
            SparkError::MalformedTable(msg) => assert!(msg.contains("row 1"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_is_rejected() {
        assert!(parse_table("wavelength,intensity\n", Delimiter::Comma).is_err());
        assert!(parse_table("", Delimiter::Comma).is_err());
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        assert!(parse_table("1,2\n2,nan\n", Delimiter::Comma).is_err());
        assert!(parse_table("1,inf\n2,3\n", Delimiter::Comma).is_err());
    }

    #[test]
    fn test_non_finite_first_row_is_data_not_header() {
        for text in ["1,inf\n2,3\n", "nan,1\n2,3\n", "1 -inf\n2 3\n"] {
            let delimiter = if text.contains(',') {
                Delimiter::Comma
            } else {
                Delimiter::Whitespace
            };
            match parse_table(text, delimiter) {
                Err(SparkError::MalformedTable(msg)) => {
                    assert!(msg.contains("row 0") && msg.contains("finite"), "{msg}")
                }
                other => panic!("{text:?} gave {other:?}"),
            }
        }
    }

    #[test]
    fn test_bad_row_after_numeric_first_row_is_named() {
        let err = parse_table("1,2\n3,4\n5,oops\n7,8\n", Delimiter::Comma).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 2, column 2: 'oops'"), "{msg}");
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let asc = parse_table("\u{feff}500.0 1.5\n501.0 2.5\n502.0 3.5\n", Delimiter::Whitespace)
            .unwrap();
        assert_eq!(asc.x, vec![500.0, 501.0, 502.0]);
        assert_eq!(asc.y, vec![1.5, 2.5, 3.5]);

        let csv = parse_table("\u{feff}500.0,1.5\n501.0,2.5\n", Delimiter::Comma).unwrap();
        assert_eq!(csv.x, vec![500.0, 501.0]);
    }

    #[test]
    fn test_byte_order_mark_asc_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.asc");
        std::fs::write(&path, "\u{feff}2800.0\t10.0\n2801.0\t11.0\n").unwrap();
        let s = load_file(&path).unwrap();
        assert_eq!(s.x, vec![2800.0, 2801.0]);
        assert_eq!(s.y, vec![10.0, 11.0]);
    }

    #[test]
    fn test_short_row_is_rejected() {
        let err = parse_table("1,2\n3\n", Delimiter::Comma).unwrap_err();
        assert!(err.to_string().contains("no column 2"), "{err}");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, SparkError::FileRead { .. }));
    }
}
