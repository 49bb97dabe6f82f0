//! CSV reader.
//!
//! Pipeline:
//!   raw &str
//!     └─ read_records()   → Vec<Vec<String>> (quote-aware field splitting)
//!          └─ parse_rows() → header binding + fully-empty-record skip → Vec<Row>
//!
//! Accepts CRLF or bare LF line endings and a leading UTF-8 BOM. Quoted
//! fields may contain commas, doubled `""` escapes, and line breaks.

use crate::error::{Error, Result};

// ─── Row ─────────────────────────────────────────────────────────────────────

/// One data record, with each cell keyed by its header.
#[derive(Debug, Clone)]
pub struct Row {
  /// 1-based ordinal of this record among the file's data rows (the header
  /// row is not counted). Used in import rejection reports.
  pub record: usize,
  cells:      Vec<(String, String)>,
}

impl Row {
  /// The cell under `column`, or `None` if the file has no such header or
  /// the record is shorter than the header row.
  pub fn get(&self, column: &str) -> Option<&str> {
    self
      .cells
      .iter()
      .find(|(header, _)| header == column)
      .map(|(_, value)| value.as_str())
  }
}

// ─── Public entry ────────────────────────────────────────────────────────────

/// Parse CSV text into header-keyed rows.
///
/// The first non-empty record is the header row. Records whose every cell is
/// blank are skipped. Cells beyond the header width are discarded. An empty
/// result (no data rows) is not an error here; the import pipeline decides
/// what zero rows mean.
pub fn parse_rows(input: &str) -> Result<Vec<Row>> {
  let input = input.strip_prefix('\u{feff}').unwrap_or(input);

  let mut records = read_records(input)?;
  records.retain(|cells| !cells.iter().all(|c| c.trim().is_empty()));

  if records.is_empty() {
    return Err(Error::MissingHeader);
  }

  let headers: Vec<String> = records
    .remove(0)
    .into_iter()
    .map(|h| h.trim().to_string())
    .collect();

  let rows = records
    .into_iter()
    .enumerate()
    .map(|(i, cells)| Row {
      record: i + 1,
      cells:  headers
        .iter()
        .cloned()
        .zip(cells)
        .collect(),
    })
    .collect();

  Ok(rows)
}

// ─── Record scanner ──────────────────────────────────────────────────────────

/// Split `input` into records of raw fields, honouring quoting.
fn read_records(input: &str) -> Result<Vec<Vec<String>>> {
  let mut records: Vec<Vec<String>> = Vec::new();
  let mut record: Vec<String> = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;
  let mut line = 1usize;
  let mut quote_opened_on = 1usize;

  let mut chars = input.chars().peekable();
  while let Some(c) = chars.next() {
    if in_quotes {
      match c {
        '"' => {
          if chars.peek() == Some(&'"') {
            chars.next();
            field.push('"');
          } else {
            in_quotes = false;
          }
        }
        '\n' => {
          line += 1;
          field.push('\n');
        }
        _ => field.push(c),
      }
      continue;
    }

    match c {
      '"' => {
        in_quotes = true;
        quote_opened_on = line;
      }
      ',' => record.push(std::mem::take(&mut field)),
      '\r' => {
        if chars.peek() == Some(&'\n') {
          chars.next();
        }
        line += 1;
        record.push(std::mem::take(&mut field));
        records.push(std::mem::take(&mut record));
      }
      '\n' => {
        line += 1;
        record.push(std::mem::take(&mut field));
        records.push(std::mem::take(&mut record));
      }
      _ => field.push(c),
    }
  }

  if in_quotes {
    return Err(Error::UnclosedQuote {
      line: quote_opened_on,
    });
  }

  // Final record when the file does not end with a line break.
  if !field.is_empty() || !record.is_empty() {
    record.push(field);
    records.push(record);
  }

  Ok(records)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plain_rows() {
    let rows =
      parse_rows("a,b,c\n1,2,3\n4,5,6\n").expect("parse failed");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].record, 1);
    assert_eq!(rows[0].get("a"), Some("1"));
    assert_eq!(rows[1].get("c"), Some("6"));
  }

  #[test]
  fn crlf_and_missing_trailing_newline() {
    let rows = parse_rows("a,b\r\n1,2\r\n3,4").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("b"), Some("4"));
  }

  #[test]
  fn bom_is_stripped() {
    let rows = parse_rows("\u{feff}a,b\n1,2\n").unwrap();
    assert_eq!(rows[0].get("a"), Some("1"));
  }

  #[test]
  fn quoted_fields() {
    let rows =
      parse_rows("a,b\n\"x, y\",\"say \"\"hi\"\"\"\n").unwrap();
    assert_eq!(rows[0].get("a"), Some("x, y"));
    assert_eq!(rows[0].get("b"), Some("say \"hi\""));
  }

  #[test]
  fn newline_inside_quotes() {
    let rows = parse_rows("a,b\n\"line1\nline2\",v\n").unwrap();
    assert_eq!(rows[0].get("a"), Some("line1\nline2"));
    assert_eq!(rows[0].get("b"), Some("v"));
  }

  #[test]
  fn empty_records_are_skipped() {
    let rows = parse_rows("a,b\n\n1,2\n\n\n3,4\n").unwrap();
    assert_eq!(rows.len(), 2);
    // Record ordinals count surviving data rows.
    assert_eq!(rows[0].record, 1);
    assert_eq!(rows[1].record, 2);
  }

  #[test]
  fn short_record_yields_absent_cells() {
    let rows = parse_rows("a,b,c\n1,2\n").unwrap();
    assert_eq!(rows[0].get("b"), Some("2"));
    assert_eq!(rows[0].get("c"), None);
  }

  #[test]
  fn extra_cells_are_discarded() {
    let rows = parse_rows("a,b\n1,2,3,4\n").unwrap();
    assert_eq!(rows[0].get("a"), Some("1"));
    assert_eq!(rows[0].get("b"), Some("2"));
  }

  #[test]
  fn unclosed_quote_errors_with_line() {
    let err = parse_rows("a,b\n1,\"oops\n").unwrap_err();
    assert!(matches!(err, Error::UnclosedQuote { line: 2 }));
  }

  #[test]
  fn blank_input_is_missing_header() {
    assert!(matches!(parse_rows(""), Err(Error::MissingHeader)));
    assert!(matches!(parse_rows("\n\n"), Err(Error::MissingHeader)));
  }
}
