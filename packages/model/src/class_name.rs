//! Class name values as sent by the backend.
//!
//! A class name is a string, a (possibly nested) list of class names, or a map
//! of class token to a truthy/falsy toggle. A `+` marker (`"+ "` string prefix,
//! a `"+"` list element or a `"+"` map key) asks for the value to be merged
//! with the generated default instead of replacing it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token marking a class name that should be merged with the generated default
pub const MERGE_MARKER: &str = "+";

const MERGE_PREFIX: &str = "+ ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassName {
    Str(String),
    List(Vec<ClassName>),
    Toggles(Map<String, Value>),
}

impl ClassName {
    /// Render to a single space-joined string, removing merge markers.
    pub fn render(&self) -> String {
        match self {
            ClassName::Str(s) => s.strip_prefix(MERGE_PREFIX).unwrap_or(s).to_string(),
            ClassName::List(items) => items
                .iter()
                .filter(|c| !matches!(c, ClassName::Str(s) if s == MERGE_MARKER))
                .map(ClassName::render)
                .collect::<Vec<_>>()
                .join(" "),
            ClassName::Toggles(map) => map
                .iter()
                .filter(|(key, value)| key.as_str() != MERGE_MARKER && is_truthy(value))
                .map(|(key, _)| key.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Whether this value carries the merge marker
    pub fn has_merge_marker(&self) -> bool {
        match self {
            ClassName::Str(s) => s.starts_with(MERGE_PREFIX),
            ClassName::List(items) => items
                .iter()
                .any(|c| matches!(c, ClassName::Str(s) if s == MERGE_MARKER)),
            ClassName::Toggles(map) => map.contains_key(MERGE_MARKER),
        }
    }

    /// Empty strings count as "no class name".
    pub fn is_blank(&self) -> bool {
        matches!(self, ClassName::Str(s) if s.is_empty())
    }
}

impl From<&str> for ClassName {
    fn from(s: &str) -> Self {
        ClassName::Str(s.to_string())
    }
}

impl From<String> for ClassName {
    fn from(s: String) -> Self {
        ClassName::Str(s)
    }
}

impl From<Vec<&str>> for ClassName {
    fn from(items: Vec<&str>) -> Self {
        ClassName::List(items.into_iter().map(ClassName::from).collect())
    }
}

/// Render an optional class name; absent renders as the empty string.
pub fn render_class_name(class_name: Option<&ClassName>) -> String {
    class_name.map(ClassName::render).unwrap_or_default()
}

/// Decide whether a node's own class name should be merged with the generated
/// default. An absent class name always takes the generated default.
pub fn wants_merge(class_name: Option<&ClassName>) -> bool {
    class_name.map_or(true, ClassName::has_merge_marker)
}

/// Merge the generated (or default) class name with the node's own value,
/// generated output first.
pub fn combine(generated: Option<&ClassName>, own: Option<&ClassName>) -> String {
    let generated = generated.filter(|c| !c.is_blank());
    let own = own.filter(|c| !c.is_blank());
    match (generated, own) {
        (None, own) => render_class_name(own),
        (generated, None) => render_class_name(generated),
        (Some(generated), Some(own)) => format!("{} {}", generated.render(), own.render()),
    }
}

/// Loose truthiness used by class toggles and display values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ClassName {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_render_string_strips_marker() {
        assert_eq!(parse(json!("+ foo bar")).render(), "foo bar");
        assert_eq!(parse(json!("foo")).render(), "foo");
        assert_eq!(parse(json!("+foo")).render(), "+foo");
    }

    #[test]
    fn test_render_list_is_recursive() {
        let cn = parse(json!(["+", "a", ["b", "+ c"]]));
        assert_eq!(cn.render(), "a b c");
        assert!(cn.has_merge_marker());
    }

    #[test]
    fn test_render_toggles_keeps_key_order() {
        let cn = parse(json!({"foo": true, "+": true, "bar": false, "baz": null, "qux": true}));
        assert_eq!(cn.render(), "foo qux");
        assert!(cn.has_merge_marker());
    }

    #[test]
    fn test_render_is_idempotent_once_marker_stripped() {
        for value in [json!("+ foo"), json!(["+", "foo", "baz"]), json!({"a": true, "+": true})] {
            let once = parse(value).render();
            let twice = ClassName::from(once.clone()).render();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_wants_merge() {
        assert!(wants_merge(None));
        assert!(wants_merge(Some(&"+ x".into())));
        assert!(!wants_merge(Some(&"x".into())));
        assert!(!wants_merge(Some(&parse(json!(["x"])))));
    }

    #[test]
    fn test_combine() {
        let generated = ClassName::from("bar");
        assert_eq!(combine(Some(&generated), Some(&"+ foo".into())), "bar foo");
        assert_eq!(combine(None, Some(&"+ foo".into())), "foo");
        assert_eq!(combine(Some(&generated), None), "bar");
        assert_eq!(combine(Some(&"".into()), Some(&"foo".into())), "foo");
        assert_eq!(combine(None, None), "");
    }
}
