use crate::context::EventContext;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Any event a component can carry (`onClick`, `loadTrigger`, form responses, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnyEvent {
    /// Fire a named client-side event
    #[serde(rename = "page")]
    Page(PageEvent),

    /// Navigate by url or by patching the query string
    #[serde(rename = "go-to")]
    GoTo(GoToEvent),

    /// History back
    #[serde(rename = "back")]
    Back,

    /// Set or clear the auth token
    #[serde(rename = "auth")]
    Auth(AuthEvent),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEvent {
    pub name: String,
    /// Cosmetic path change, the url changes but nothing is reloaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<EventContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear: Option<bool>,
}

impl PageEvent {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name of the broadcast signal this event is delivered on
    pub fn signal_name(&self) -> String {
        format!("app:{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoToEvent {
    /// A path or a full URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Query patch, a `null` value removes the key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthEvent {
    /// `None` clears the stored token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl AnyEvent {
    pub fn go_to(url: impl Into<String>) -> Self {
        AnyEvent::GoTo(GoToEvent {
            url: Some(url.into()),
            query: None,
        })
    }

    pub fn go_to_query(query: Map<String, Value>) -> Self {
        AnyEvent::GoTo(GoToEvent {
            url: None,
            query: Some(query),
        })
    }

    pub fn page(name: impl Into<String>) -> Self {
        AnyEvent::Page(PageEvent::named(name))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnyEvent::Page(_) => "page",
            AnyEvent::GoTo(_) => "go-to",
            AnyEvent::Back => "back",
            AnyEvent::Auth(_) => "auth",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_event_variants() {
        let page: AnyEvent =
            serde_json::from_value(json!({"type": "page", "name": "open", "pushPath": "/x"})).unwrap();
        match page {
            AnyEvent::Page(ref e) => {
                assert_eq!(e.name, "open");
                assert_eq!(e.push_path.as_deref(), Some("/x"));
                assert_eq!(e.signal_name(), "app:open");
            }
            other => panic!("unexpected {:?}", other),
        }

        let go_to: AnyEvent =
            serde_json::from_value(json!({"type": "go-to", "query": {"page": 2, "q": null}})).unwrap();
        match go_to {
            AnyEvent::GoTo(e) => {
                let query = e.query.unwrap();
                assert_eq!(query["page"], json!(2));
                assert!(query["q"].is_null());
            }
            other => panic!("unexpected {:?}", other),
        }

        let back: AnyEvent = serde_json::from_value(json!({"type": "back"})).unwrap();
        assert_eq!(back, AnyEvent::Back);

        let auth: AnyEvent = serde_json::from_value(json!({"type": "auth", "token": "abc"})).unwrap();
        assert_eq!(auth.kind(), "auth");
    }

    #[test]
    fn test_serialize_back_event() {
        assert_eq!(serde_json::to_value(AnyEvent::Back).unwrap(), json!({"type": "back"}));
    }
}
