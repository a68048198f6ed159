//! Records produced by a line cursor.

use serde::Serialize;

/// UTF-8 byte-order mark as it appears in decoded text
pub const BOM: char = '\u{feff}';

/// Decoded JSON object produced by JSON record validation
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// One logical unit read at a cursor position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// Raw line text (plain mode)
    Line(String),
    /// Tokenized fields (CSV mode)
    Fields(Vec<String>),
}

impl Record {
    /// Zero-length line, or CSV row whose fields are all empty
    pub fn is_empty(&self) -> bool {
        match self {
            Record::Line(line) => line.is_empty(),
            Record::Fields(fields) => fields.iter().all(String::is_empty),
        }
    }

    /// Strip a leading BOM; in CSV mode only the first field is touched
    pub(crate) fn strip_bom(&mut self) {
        let target = match self {
            Record::Line(line) => Some(line),
            Record::Fields(fields) => fields.first_mut(),
        };

        if let Some(text) = target {
            if let Some(stripped) = text.strip_prefix(BOM) {
                *text = stripped.to_string();
            }
        }
    }

    pub fn as_line(&self) -> Option<&str> {
        match self {
            Record::Line(line) => Some(line),
            Record::Fields(_) => None,
        }
    }

    pub fn into_fields(self) -> Option<Vec<String>> {
        match self {
            Record::Line(_) => None,
            Record::Fields(fields) => Some(fields),
        }
    }
}
