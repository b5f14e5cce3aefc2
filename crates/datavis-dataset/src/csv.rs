//! Minimal CSV codec
//!
//! Mirrors what the chart renderer does with a dataset URL: split on newlines,
//! take the first line as column headers and zip every later line onto them.
//! Separators are a comma plus any following whitespace.
//!
//! Quoted fields are NOT supported. A comma inside a value always starts a
//! new column.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*").expect("invalid separator regex"));

/// One parsed CSV line, keyed by column header in header order
pub type Row = IndexMap<String, String>;

/// Parse CSV text into row objects
///
/// The first line is the header. Each later line is zipped positionally onto
/// the headers: surplus values are dropped, missing values are absent from the
/// row. Trailing blank lines are ignored; an interior blank line yields a row
/// binding the first column to `""`.
#[must_use]
pub fn parse(text: &str) -> Vec<Row> {
    let mut lines = significant_lines(text).into_iter();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns = split_line(header);

    lines
        .map(|line| {
            columns
                .iter()
                .zip(split_line(line))
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect()
        })
        .collect()
}

/// Serialize rows back into CSV text
///
/// The header is the union of all keys in first-seen order. Missing values are
/// written as empty strings. Output ends with a newline; no rows gives `""`.
#[must_use]
pub fn serialize(rows: &[Row]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut columns: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut out = columns.join(",");
    out.push('\n');
    for row in rows {
        let line: Vec<&str> = columns
            .iter()
            .map(|column| row.get(*column).map_or("", String::as_str))
            .collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Number of data rows in CSV text, excluding the header
///
/// Trailing blank lines do not count, so `"a\n1\n"` and `"a\n1"` both
/// report one row.
#[must_use]
pub fn row_count(text: &str) -> usize {
    significant_lines(text).len().saturating_sub(1)
}

/// Header names of CSV text
#[must_use]
pub fn columns(text: &str) -> Vec<String> {
    significant_lines(text)
        .first()
        .map(|header| split_line(header).into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

fn significant_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines
}

fn split_line(line: &str) -> Vec<&str> {
    SEPARATOR.split(line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn csv_parse_basic() {
        let rows = parse("month,total\nJan,100\nFeb,150");
        assert_eq!(
            rows,
            vec![
                row(&[("month", "Jan"), ("total", "100")]),
                row(&[("month", "Feb"), ("total", "150")]),
            ]
        );
    }

    #[test]
    fn csv_parse_eats_whitespace_after_comma() {
        let rows = parse("a, b\n1,   2");
        assert_eq!(rows, vec![row(&[("a", "1"), ("b", "2")])]);
    }

    #[test]
    fn csv_parse_empty_and_header_only() {
        assert!(parse("").is_empty());
        assert!(parse("a,b").is_empty());
        assert!(parse("a,b\n").is_empty());
    }

    #[test]
    fn csv_parse_ragged_lines() {
        let rows = parse("a,b,c\n1\n1,2,3,4");
        assert_eq!(rows[0], row(&[("a", "1")]));
        assert_eq!(rows[1], row(&[("a", "1"), ("b", "2"), ("c", "3")]));
    }

    #[test]
    fn csv_parse_interior_blank_line() {
        let rows = parse("a,b\n1,2\n\n3,4\n");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], row(&[("a", "")]));
    }

    #[test]
    fn csv_parse_crlf() {
        let rows = parse("a,b\r\n1,2\r\n");
        assert_eq!(rows, vec![row(&[("a", "1"), ("b", "2")])]);
    }

    #[test]
    fn csv_embedded_comma_splits_value() {
        // Documented limitation: quoting is not understood.
        let rows = parse("name,city\n\"Doe, Jane\",Paris");
        assert_eq!(rows[0].get("name").map(String::as_str), Some("\"Doe"));
        assert_eq!(rows[0].get("city").map(String::as_str), Some("Jane\""));
    }

    #[test]
    fn csv_row_count_with_and_without_trailing_newline() {
        assert_eq!(row_count("a,b\n1,2\n3,4\n"), 2);
        assert_eq!(row_count("a,b\n1,2\n3,4"), 2);
        assert_eq!(row_count("a,b\n1,2\n3,4\n\n"), 2);
        assert_eq!(row_count("a,b"), 0);
        assert_eq!(row_count(""), 0);
    }

    #[test]
    fn csv_serialize_union_header() {
        let rows = vec![row(&[("a", "1")]), row(&[("b", "2"), ("a", "3")])];
        assert_eq!(serialize(&rows), "a,b\n1,\n3,2\n");
    }

    #[test]
    fn csv_serialize_empty() {
        assert_eq!(serialize(&[]), "");
    }

    #[test]
    fn csv_columns() {
        assert_eq!(columns("x, y\n1,2"), vec!["x".to_string(), "y".to_string()]);
        assert!(columns("").is_empty());
    }
}
