//! Codec for Postgres's `COPY ... TEXT` format: tab-separated fields, `\N`
//! for null, and a fixed escape set (`\b \f \n \r \t \v \\`). Used directly
//! for pass-through segments and by the transform pipeline when a row needs
//! to be parsed, rewritten, and re-serialized.

use slicedb_errors::{ObjectId, SliceError};

/// A single field: `None` is SQL null (`\N` on the wire).
pub type Field = Option<String>;

/// Parses one already-newline-stripped COPY line into its tab-separated
/// fields, unescaping each.
pub fn parse_row(line: &str, table: &str) -> Result<Vec<Field>, SliceError> {
    line.split('\t').map(|raw| parse_field(raw, table)).collect()
}

/// Unescapes a single raw (still tab-delimited-aware) field.
pub fn parse_field(raw: &str, table: &str) -> Result<Field, SliceError> {
    if raw == "\\N" {
        return Ok(None);
    }
    if !raw.contains('\\') {
        return Ok(Some(raw.to_string()));
    }

    let bytes = raw.as_bytes();
    let mut result = String::with_capacity(raw.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let escaped = bytes.get(i + 1).copied().ok_or_else(|| {
                    SliceError::data(
                        ObjectId::Table(table.to_string()),
                        "trailing backslash in copy field".to_string(),
                    )
                })?;
                let unescaped = match escaped {
                    b'\\' => '\\',
                    b'b' => '\u{8}',
                    b'f' => '\u{c}',
                    b'n' => '\n',
                    b'r' => '\r',
                    b't' => '\t',
                    b'v' => '\u{b}',
                    other => {
                        return Err(SliceError::data(
                            ObjectId::Table(table.to_string()),
                            format!("unrecognised copy escape \\{}", other as char),
                        ))
                    }
                };
                result.push(unescaped);
                i += 2;
            }
            _ => {
                // Safe: we only special-case single ASCII bytes above, so
                // advancing one UTF-8 char at a time from this byte offset
                // is sound as long as `raw` is valid UTF-8 (copy text is).
                let ch_len = utf8_char_len(bytes[i]);
                result.push_str(&raw[i..i + ch_len]);
                i += ch_len;
            }
        }
    }
    Ok(Some(result))
}

fn utf8_char_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

/// Re-serializes a field for the wire: `\N` for null, with the fixed escape
/// set applied in the order the core defines it.
pub fn serialize_field(field: &Field) -> String {
    match field {
        None => "\\N".to_string(),
        Some(text) => {
            let mut out = String::with_capacity(text.len());
            for c in text.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '\u{8}' => out.push_str("\\b"),
                    '\u{c}' => out.push_str("\\f"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    '\u{b}' => out.push_str("\\v"),
                    other => out.push(other),
                }
            }
            out
        }
    }
}

/// Re-serializes a full row as a tab-separated, newline-terminated line
/// (the newline is appended by the caller/writer, not here).
pub fn serialize_row(fields: &[Field]) -> String {
    fields
        .iter()
        .map(serialize_field)
        .collect::<Vec<_>>()
        .join("\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_null_and_plain_fields() {
        let row = parse_row("\\N\tplain\t", "t").unwrap();
        assert_eq!(row, vec![None, Some("plain".to_string()), Some(String::new())]);
    }

    #[test]
    fn parses_all_escape_sequences() {
        let row = parse_row("a\\tb\\nc\\rd\\\\e\\bf\\vg", "t").unwrap();
        assert_eq!(
            row,
            vec![Some("a\tb\nc\rd\\e\u{8}f\u{b}g".to_string())]
        );
    }

    #[test]
    fn rejects_unknown_escape() {
        assert!(parse_field("a\\qb", "t").is_err());
    }

    #[test]
    fn rejects_trailing_backslash() {
        assert!(parse_field("abc\\", "t").is_err());
    }

    #[test]
    fn round_trips_through_parse_and_serialize() {
        let original = vec![
            None,
            Some("tab\there".to_string()),
            Some("new\nline".to_string()),
            Some("back\\slash".to_string()),
        ];
        let line = serialize_row(&original);
        let parsed = parse_row(&line, "t").unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn preserves_multibyte_utf8() {
        let row = parse_row("caf\u{e9}\t\u{1f600}", "t").unwrap();
        assert_eq!(
            row,
            vec![Some("caf\u{e9}".to_string()), Some("\u{1f600}".to_string())]
        );
    }
}
