//! Template substitution of `{key}` placeholders.
//!
//! Row data (tables, details) and fired event payloads parameterize urls and
//! events through the same `{key}` syntax.

use crate::events::AnyEvent;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

/// Key/value payload carried by page events
pub type EventContext = Map<String, Value>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubstitutionError {
    #[error("field \"{key}\" not found in {data}")]
    MissingKey { key: String, data: String },
}

pub type SubstitutionResult<T> = Result<T, SubstitutionError>;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(.+?)\}").expect("placeholder pattern is valid"))
}

/// Substitute `{key}` placeholders with values from `data`.
///
/// Returns `Ok(None)` when any referenced value is `null`, telling the caller to
/// drop whatever the template was for. A key absent from `data` is an error.
pub fn sub_keys(template: &str, data: &Map<String, Value>) -> SubstitutionResult<Option<String>> {
    let mut saw_null = false;
    let mut missing = None;

    let result = placeholder().replace_all(template, |caps: &Captures| {
        let key = &caps[1];
        match data.get(key) {
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
            Some(Value::Null) => {
                saw_null = true;
                "null".to_string()
            }
            Some(value) => value_to_string(value),
        }
    });

    if let Some(key) = missing {
        return Err(SubstitutionError::MissingKey {
            key,
            data: Value::Object(data.clone()).to_string(),
        });
    }
    if saw_null {
        Ok(None)
    } else {
        Ok(Some(result.into_owned()))
    }
}

/// Substitute an event context into a template. Without a context the
/// template is returned untouched.
pub fn apply_context(template: &str, context: Option<&EventContext>) -> SubstitutionResult<String> {
    let Some(context) = context else {
        return Ok(template.to_string());
    };

    let mut missing = None;
    let result = placeholder().replace_all(template, |caps: &Captures| {
        let key = &caps[1];
        match context.get(key) {
            Some(value) => value_to_string(value),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(key) => Err(SubstitutionError::MissingKey {
            key,
            data: Value::Object(context.clone()).to_string(),
        }),
        None => Ok(result.into_owned()),
    }
}

/// Fill a `go-to` event's url with row data. `Ok(None)` means the event is
/// suppressed (a referenced value was null).
pub fn render_event(
    event: Option<&AnyEvent>,
    data: &Map<String, Value>,
) -> SubstitutionResult<Option<AnyEvent>> {
    let Some(event) = event else {
        return Ok(None);
    };

    match event {
        AnyEvent::GoTo(go_to) => match &go_to.url {
            Some(url) => Ok(sub_keys(url, data)?.map(|url| {
                let mut go_to = go_to.clone();
                go_to.url = Some(url);
                AnyEvent::GoTo(go_to)
            })),
            None => Ok(Some(event.clone())),
        },
        other => Ok(Some(other.clone())),
    }
}

/// String form of a JSON value, as used in urls and plain display.
///
/// Whole floats drop their fractional part (`2.0` -> `2`).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_sub_keys_substitutes_values() {
        let data = map(json!({"id": 42, "slug": "abc"}));
        assert_eq!(sub_keys("/item/{id}", &data).unwrap(), Some("/item/42".to_string()));
        assert_eq!(
            sub_keys("/item/{id}/{slug}", &data).unwrap(),
            Some("/item/42/abc".to_string())
        );
        assert_eq!(sub_keys("/static", &data).unwrap(), Some("/static".to_string()));
    }

    #[test]
    fn test_sub_keys_null_suppresses() {
        let data = map(json!({"id": null}));
        assert_eq!(sub_keys("/item/{id}", &data).unwrap(), None);
    }

    #[test]
    fn test_sub_keys_missing_key_errors() {
        let err = sub_keys("/item/{missing}", &Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "field \"missing\" not found in {}");
    }

    #[test]
    fn test_apply_context() {
        let ctx = map(json!({"id": 7}));
        assert_eq!(apply_context("/modal/{id}", Some(&ctx)).unwrap(), "/modal/7");
        assert_eq!(apply_context("/modal/{id}", None).unwrap(), "/modal/{id}");
        assert!(apply_context("/modal/{other}", Some(&ctx)).is_err());
    }

    #[test]
    fn test_render_event_go_to_url() {
        let event = AnyEvent::go_to("/users/{id}/");
        let rendered = render_event(Some(&event), &map(json!({"id": 3}))).unwrap();
        assert_eq!(rendered, Some(AnyEvent::go_to("/users/3/")));

        let suppressed = render_event(Some(&event), &map(json!({"id": null}))).unwrap();
        assert_eq!(suppressed, None);

        let back = render_event(Some(&AnyEvent::Back), &Map::new()).unwrap();
        assert_eq!(back, Some(AnyEvent::Back));
    }

    #[test]
    fn test_value_to_string_whole_float() {
        assert_eq!(value_to_string(&json!(2.0)), "2");
        assert_eq!(value_to_string(&json!(2.5)), "2.5");
        assert_eq!(value_to_string(&json!(true)), "true");
    }
}
