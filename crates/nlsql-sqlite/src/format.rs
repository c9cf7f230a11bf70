//! Text rendering of SQLite values and rows

use rusqlite::types::ValueRef;

/// Column separator used in query results
pub const COLUMN_SEPARATOR: &str = " | ";

/// Longest text value shown in schema sample rows
pub const SAMPLE_VALUE_MAX_CHARS: usize = 100;

/// Render a single column value
pub fn format_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.1}", f),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        ValueRef::Blob(bytes) => format!("<blob {} bytes>", bytes.len()),
    }
}

/// Render a value for a schema sample row, truncating long text
pub fn format_sample_value(value: ValueRef<'_>) -> String {
    let text = format_value(value);
    if text.chars().count() > SAMPLE_VALUE_MAX_CHARS {
        text.chars().take(SAMPLE_VALUE_MAX_CHARS).collect()
    } else {
        text
    }
}

/// Quote an identifier for use in generated SQL
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(ValueRef::Null), "NULL");
        assert_eq!(format_value(ValueRef::Integer(42)), "42");
        assert_eq!(format_value(ValueRef::Real(9.99)), "9.99");
        assert_eq!(format_value(ValueRef::Real(1250.0)), "1250.0");
        assert_eq!(format_value(ValueRef::Text(b"Ada")), "Ada");
        assert_eq!(format_value(ValueRef::Blob(&[0, 1, 2])), "<blob 3 bytes>");
    }

    #[test]
    fn test_sample_values_truncated() {
        let long = "x".repeat(250);
        let sample = format_sample_value(ValueRef::Text(long.as_bytes()));
        assert_eq!(sample.len(), SAMPLE_VALUE_MAX_CHARS);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("orders"), "\"orders\"");
        assert_eq!(quote_identifier("odd\"name"), "\"odd\"\"name\"");
    }
}
