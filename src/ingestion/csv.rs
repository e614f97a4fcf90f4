//! CSV parsing of pasted text.

use crate::error::{ImportError, ImportResult};
use crate::types::ParsedRow;

/// Key under which surplus fields of an over-long row are stored (comma-joined).
pub const EXTRA_FIELDS_KEY: &str = "__parsed_extra";

/// Parse pasted CSV text into rows.
///
/// Rules:
///
/// - The first non-blank line is the header; header names are trimmed and must be unique and
///   non-empty.
/// - Blank lines are skipped.
/// - A row shorter than the header omits the trailing keys; surplus fields of a longer row are
///   kept under [`EXTRA_FIELDS_KEY`]. Shape checks belong to the validator.
/// - Values are kept verbatim (no trimming, no type coercion).
pub fn parse_csv_text(text: &str) -> ImportResult<Vec<ParsedRow>> {
    parse_csv_with_headers(text).map(|(_, rows)| rows)
}

/// [`parse_csv_text`], also returning the header names in column order.
pub fn parse_csv_with_headers(text: &str) -> ImportResult<(Vec<String>, Vec<ParsedRow>)> {
    let mut records = rows_from_text(text)?;
    let rows = records.by_ref().collect::<ImportResult<Vec<_>>>()?;
    if rows.is_empty() {
        return Err(ImportError::EmptyResult);
    }
    Ok((records.headers, rows))
}

/// Lazily decode pasted text; syntax and header problems are reported up front.
pub fn rows_from_text(text: &str) -> ImportResult<CsvRows<'_>> {
    if text.trim().is_empty() {
        return Err(ImportError::Parse {
            line: 0,
            message: "input is empty".to_string(),
        });
    }
    check_quoting(text)?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let header_record = rdr.headers()?.clone();
    let mut lines = LineCounter::new(text);
    let header_line = lines.line_of(header_record.position());
    let mut headers: Vec<String> = Vec::with_capacity(header_record.len());
    for (idx, name) in header_record.iter().enumerate() {
        if name.is_empty() {
            return Err(ImportError::Parse {
                line: header_line,
                message: format!("header column {} has an empty name", idx + 1),
            });
        }
        if headers.iter().any(|h| h == name) {
            return Err(ImportError::Parse {
                line: header_line,
                message: format!("duplicate header '{name}'"),
            });
        }
        headers.push(name.to_owned());
    }

    Ok(CsvRows {
        headers,
        records: rdr.into_records(),
        lines,
    })
}

/// Iterator over the data rows of pasted text. Created by [`rows_from_text`].
pub struct CsvRows<'a> {
    headers: Vec<String>,
    records: csv::StringRecordsIntoIter<&'a [u8]>,
    lines: LineCounter<'a>,
}

impl CsvRows<'_> {
    /// Header names in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for CsvRows<'_> {
    type Item = ImportResult<ParsedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(r) => r,
                Err(e) => return Some(Err(e.into())),
            };
            if is_blank(&record) {
                continue;
            }
            let line = self.lines.line_of(record.position());
            return Some(Ok(ParsedRow::new(line, self.pair_fields(&record))));
        }
    }
}

impl CsvRows<'_> {
    fn pair_fields(&self, record: &csv::StringRecord) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_owned()))
            .collect();
        if record.len() > self.headers.len() {
            let extra = record
                .iter()
                .skip(self.headers.len())
                .collect::<Vec<_>>()
                .join(",");
            fields.push((EXTRA_FIELDS_KEY.to_string(), extra));
        }
        fields
    }
}

/// Maps record byte offsets to 1-based line numbers.
///
/// The reader positions a record at the start of any empty lines it skipped before it, so the
/// line is taken from the first byte that is not a line terminator. Offsets must be
/// non-decreasing.
struct LineCounter<'a> {
    text: &'a [u8],
    offset: usize,
    line: u64,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_of(&mut self, position: Option<&csv::Position>) -> u64 {
        let Some(position) = position else {
            return self.line;
        };
        let mut start = usize::try_from(position.byte()).unwrap_or(self.text.len());
        while matches!(self.text.get(start), Some(b'\n' | b'\r')) {
            start += 1;
        }
        let end = start.min(self.text.len());
        if end > self.offset {
            let newlines = self.text[self.offset..end].iter().filter(|b| **b == b'\n').count();
            self.line += newlines as u64;
            self.offset = end;
        }
        self.line
    }
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() == 0 || (record.len() == 1 && record[0].trim().is_empty())
}

/// Reject quoting the csv reader would silently accept: an unterminated quoted field, or
/// characters between a closing quote and the next delimiter.
fn check_quoting(text: &str) -> ImportResult<()> {
    let mut line: u64 = 1;
    let mut quote_opened_at: u64 = 0;
    let mut in_quotes = false;
    let mut after_close = false;
    let mut field_start = true;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => {
                    in_quotes = false;
                    after_close = true;
                }
                '\n' => line += 1,
                _ => {}
            }
            continue;
        }

        if after_close {
            match c {
                ',' => {
                    after_close = false;
                    field_start = true;
                }
                '\n' => {
                    after_close = false;
                    field_start = true;
                    line += 1;
                }
                '\r' => {}
                other => {
                    return Err(ImportError::Parse {
                        line,
                        message: format!("unexpected character '{other}' after closing quote"),
                    });
                }
            }
            continue;
        }

        match c {
            '"' if field_start => {
                in_quotes = true;
                quote_opened_at = line;
                field_start = false;
            }
            ',' => field_start = true,
            '\n' => {
                field_start = true;
                line += 1;
            }
            _ => field_start = false,
        }
    }

    if in_quotes {
        return Err(ImportError::Parse {
            line: quote_opened_at,
            message: "unterminated quoted field".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_csv_text, rows_from_text, EXTRA_FIELDS_KEY};
    use crate::error::ImportError;

    #[test]
    fn parses_header_and_rows_in_column_order() {
        let rows = parse_csv_text("name,email\nAda,ada@x.com\nGrace,grace@x.com").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["name", "email"]);
        assert_eq!(rows[1].get("email"), Some("grace@x.com"));
        assert_eq!(rows[0].line(), 2);
        assert_eq!(rows[1].line(), 3);
    }

    #[test]
    fn rows_after_blank_lines_keep_their_line_numbers() {
        let rows = parse_csv_text("\n\nname\nAda\n\n\nGrace\r\n\r\n\"Alan\nTuring\"\nEdsger").unwrap();
        let lines: Vec<u64> = rows.iter().map(|r| r.line()).collect();
        assert_eq!(lines, vec![4, 7, 9, 11]);
    }

    #[test]
    fn blank_line_before_header_shifts_header_errors() {
        let err = parse_csv_text("\n\nname,name\na,b").unwrap_err();
        assert!(matches!(err, ImportError::Parse { line: 3, .. }));
    }

    #[test]
    fn skips_blank_lines() {
        let rows = parse_csv_text("name\n\nAda\n   \nGrace\n\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("name"), Some("Grace"));
    }

    #[test]
    fn quoted_fields_keep_commas_newlines_and_escaped_quotes() {
        let text = "name,description\n\"Lamp, desk\",\"says \"\"hi\"\"\nthen stops\"\n";
        let rows = parse_csv_text(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some("Lamp, desk"));
        assert_eq!(rows[0].get("description"), Some("says \"hi\"\nthen stops"));
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let rows = parse_csv_text("name,type_id\r\n\"Ada\",1\r\nGrace,2\r\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some("Ada"));
        assert_eq!(rows[1].get("type_id"), Some("2"));
    }

    #[test]
    fn headers_are_trimmed_values_are_not() {
        let rows = parse_csv_text(" name , email\n Ada ,a@x.com").unwrap();
        assert_eq!(rows[0].get("name"), Some(" Ada "));
        assert!(rows[0].contains_key("email"));
    }

    #[test]
    fn short_and_long_rows_change_the_key_set() {
        let rows = parse_csv_text("a,b\n1\n1,2,3,4").unwrap();
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(rows[1].get(EXTRA_FIELDS_KEY), Some("3,4"));
    }

    #[test]
    fn empty_input_is_a_parse_error() {
        let err = parse_csv_text("  \n\t ").unwrap_err();
        assert!(matches!(err, ImportError::Parse { line: 0, .. }));
    }

    #[test]
    fn header_only_is_an_empty_result() {
        let err = parse_csv_text("name,email\n").unwrap_err();
        assert!(matches!(err, ImportError::EmptyResult));
    }

    #[test]
    fn unterminated_quote_reports_opening_line() {
        let err = parse_csv_text("name\nAda\n\"Grace\nHopper").unwrap_err();
        match err {
            ImportError::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("unterminated"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn text_after_closing_quote_is_rejected() {
        let err = parse_csv_text("name,email\n\"Ada\"x,a@x.com").unwrap_err();
        assert!(matches!(err, ImportError::Parse { line: 2, .. }));
    }

    #[test]
    fn duplicate_header_is_rejected() {
        let err = parse_csv_text("name,name\na,b").unwrap_err();
        assert!(err.to_string().contains("duplicate header 'name'"));
    }

    #[test]
    fn rows_iterator_is_lazy_and_exposes_headers() {
        let mut rows = rows_from_text("x,y\n1,2\n3,4").unwrap();
        assert_eq!(rows.headers(), &["x".to_string(), "y".to_string()]);
        let first = rows.next().unwrap().unwrap();
        assert_eq!(first.get("x"), Some("1"));
        assert_eq!(rows.count(), 1);
    }
}
