//! Comma-delimited text: record parsing for imports, field escaping for exports.
//!
//! Quoting follows the usual spreadsheet dialect: a field wrapped in `"` may
//! contain commas, line breaks and doubled quotes (`""`). CRLF and LF are both
//! accepted as record terminators; a leading UTF-8 BOM is ignored.

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Split delimited text into records of unescaped fields.
///
/// A blank line yields an empty record, so callers can count it. A trailing
/// line break does not produce an extra record.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Distinguishes `""` (one empty field) from a truly blank line.
    let mut record_started = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    field.push(QUOTE);
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            QUOTE => {
                in_quotes = true;
                record_started = true;
            }
            DELIMITER => {
                record.push(std::mem::take(&mut field));
                record_started = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if record_started || !field.is_empty() {
                    record.push(std::mem::take(&mut field));
                }
                records.push(std::mem::take(&mut record));
                record_started = false;
            }
            _ => {
                field.push(c);
                record_started = true;
            }
        }
    }

    if record_started || !field.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

/// Quote a field when it contains a delimiter, quote or line break.
pub fn escape_field(s: &str) -> String {
    if s.contains(DELIMITER) || s.contains(QUOTE) || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Join fields into one delimited line (without terminator).
pub fn format_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}
