//! Form submission protocol types.

use crate::events::AnyEvent;
use serde::{Deserialize, Serialize};

/// One segment of an error location, `["user", "emails", 0]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocSegment {
    Index(i64),
    Key(String),
}

impl From<&str> for LocSegment {
    fn from(s: &str) -> Self {
        LocSegment::Key(s.to_string())
    }
}

impl From<i64> for LocSegment {
    fn from(i: i64) -> Self {
        LocSegment::Index(i)
    }
}

/// Field level error from a 422 response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub loc: Vec<LocSegment>,
    pub msg: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<Vec<FieldError>>,
}

/// Body of a 422 response: `{"detail": {"form": [...]}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub detail: ValidationDetail,
}

/// Successful submit response: `{"type": "FormResponse", "event": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponse {
    pub event: AnyEvent,
}

pub const FORM_RESPONSE_TYPE: &str = "FormResponse";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectGroup {
    pub label: String,
    pub options: Vec<SelectOption>,
}

/// Entry of a select's option list, either an option or a labelled group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectItem {
    Group(SelectGroup),
    Option(SelectOption),
}

/// Response of a select search endpoint: `{"options": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectSearchResponse {
    pub options: Vec<SelectItem>,
}

/// Convert an error location to the flat field name the backend gave the input.
///
/// Joined with `.` unless a segment contains a `.` or the first segment looks
/// like a JSON array, in which case the JSON encoding of the whole location is
/// used (the backend's `json.dumps` layout, `", "` between items).
pub fn loc_to_name(loc: &[LocSegment]) -> String {
    let needs_json = loc
        .iter()
        .any(|seg| matches!(seg, LocSegment::Key(k) if k.contains('.')))
        || matches!(loc.first(), Some(LocSegment::Key(k)) if k.starts_with('['));

    if needs_json {
        let items: Vec<String> = loc
            .iter()
            .map(|seg| match seg {
                LocSegment::Index(i) => i.to_string(),
                LocSegment::Key(k) => json_string_ascii(k),
            })
            .collect();
        format!("[{}]", items.join(", "))
    } else {
        loc.iter()
            .map(|seg| match seg {
                LocSegment::Index(i) => i.to_string(),
                LocSegment::Key(k) => k.clone(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// JSON string literal with non-ASCII characters escaped as `\uXXXX`.
fn json_string_ascii(s: &str) -> String {
    let encoded = serde_json::Value::String(s.to_string()).to_string();
    let mut out = String::with_capacity(encoded.len());
    for ch in encoded.chars() {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
