//! The component tree sent by the backend.
//!
//! `ComponentNode` is a tagged union keyed by the `type` field. Decoding never
//! fails because of one bad node: an unrecognised tag becomes
//! [`ComponentNode::Unknown`] and a recognised tag with a bad shape becomes
//! [`ComponentNode::Invalid`], both carrying the raw JSON. Siblings and parents
//! decode normally, so the renderer can show the problem in place.

use crate::class_name::ClassName;
use crate::context::EventContext;
use crate::events::{AnyEvent, PageEvent};
use crate::error::{ModelError, ModelResult};
use crate::forms::{SelectItem, SelectOption};
use serde::de::Deserializer;
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

macro_rules! component_nodes {
    ($($tag:literal => $variant:ident($ty:ty)),* $(,)?) => {
        /// One typed element of the UI tree
        #[derive(Debug, Clone, PartialEq)]
        pub enum ComponentNode {
            $($variant($ty),)*
            /// A `type` tag no renderer knows about
            Unknown(UnknownNode),
            /// A known `type` tag whose payload did not match its shape
            Invalid(InvalidNode),
        }

        impl ComponentNode {
            /// Every tag with a built-in shape
            pub const KNOWN_TAGS: &'static [&'static str] = &[$($tag),*];

            /// The wire `type` tag of this node
            pub fn tag(&self) -> &str {
                match self {
                    $(ComponentNode::$variant(_) => $tag,)*
                    ComponentNode::Unknown(node) => &node.tag,
                    ComponentNode::Invalid(node) => &node.tag,
                }
            }

            fn decode_known(tag: &str, value: Value) -> Option<Result<Self, serde_json::Error>> {
                match tag {
                    $($tag => Some(serde_json::from_value::<$ty>(value).map(ComponentNode::$variant)),)*
                    _ => None,
                }
            }

            fn encode(&self) -> Result<Value, serde_json::Error> {
                let (tag, body) = match self {
                    $(ComponentNode::$variant(node) => ($tag, serde_json::to_value(node)?),)*
                    ComponentNode::Unknown(node) => return Ok(node.raw.clone()),
                    ComponentNode::Invalid(node) => return Ok(node.raw.clone()),
                };
                let mut map = match body {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                map.insert("type".to_string(), Value::String(tag.to_string()));
                Ok(Value::Object(map))
            }
        }
    };
}

component_nodes! {
    "Text" => Text(Text),
    "Paragraph" => Paragraph(Paragraph),
    "PageTitle" => PageTitle(PageTitle),
    "Div" => Div(Container),
    "Page" => Page(Container),
    "Heading" => Heading(Heading),
    "Markdown" => Markdown(Markdown),
    "Code" => Code(Code),
    "JSON" => Json(Json),
    "Button" => Button(Button),
    "Link" => Link(Link),
    "LinkList" => LinkList(LinkList),
    "Navbar" => Navbar(Navbar),
    "Footer" => Footer(Footer),
    "Modal" => Modal(Modal),
    "Toast" => Toast(Toast),
    "ServerLoad" => ServerLoad(ServerLoad),
    "Image" => Image(Image),
    "Iframe" => Iframe(Iframe),
    "Video" => Video(Video),
    "FireEvent" => FireEvent(FireEvent),
    "Error" => Error(ErrorNode),
    "Spinner" => Spinner(Spinner),
    "Custom" => Custom(Custom),
    "Table" => Table(Table),
    "Pagination" => Pagination(Pagination),
    "Display" => Display(Display),
    "Details" => Details(Details),
    "Form" => Form(Form),
    "ModelForm" => ModelForm(Form),
    "FormFieldInput" => FormFieldInput(FormFieldInput),
    "FormFieldBoolean" => FormFieldBoolean(FormFieldBoolean),
    "FormFieldFile" => FormFieldFile(FormFieldFile),
    "FormFieldSelect" => FormFieldSelect(FormFieldSelect),
    "FormFieldSelectSearch" => FormFieldSelectSearch(FormFieldSelectSearch),
}

impl ComponentNode {
    /// Decode a node from raw JSON, recovering from unknown or malformed payloads.
    pub fn from_value(value: Value) -> Self {
        let tag = match value.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        match Self::decode_known(&tag, value.clone()) {
            Some(Ok(node)) => node,
            Some(Err(err)) => {
                warn!(tag = %tag, error = %err, "Malformed component payload");
                ComponentNode::Invalid(InvalidNode {
                    tag,
                    message: err.to_string(),
                    raw: value,
                })
            }
            None => ComponentNode::Unknown(UnknownNode { tag, raw: value }),
        }
    }

    /// Decode a response body. Anything but a JSON array is an error.
    pub fn list_from_value(value: Value) -> ModelResult<Vec<ComponentNode>> {
        match value {
            Value::Array(items) => Ok(items.into_iter().map(ComponentNode::from_value).collect()),
            other => Err(ModelError::NotAList(json_kind(&other))),
        }
    }

    pub fn list_from_str(body: &str) -> ModelResult<Vec<ComponentNode>> {
        ComponentNode::list_from_value(serde_json::from_str(body)?)
    }

    /// Whether the node takes part in class name generation.
    ///
    /// Everything except bare text, display leaves, server load placeholders,
    /// page titles, fired events and the recovery variants.
    pub fn takes_class_name(&self) -> bool {
        !matches!(
            self,
            ComponentNode::Text(_)
                | ComponentNode::Display(_)
                | ComponentNode::ServerLoad(_)
                | ComponentNode::PageTitle(_)
                | ComponentNode::FireEvent(_)
                | ComponentNode::Unknown(_)
                | ComponentNode::Invalid(_)
        )
    }

    /// The node's own `className` field, if it has one
    pub fn class_name(&self) -> Option<&ClassName> {
        match self {
            ComponentNode::Paragraph(n) => n.class_name.as_ref(),
            ComponentNode::Div(n) | ComponentNode::Page(n) => n.class_name.as_ref(),
            ComponentNode::Heading(n) => n.class_name.as_ref(),
            ComponentNode::Markdown(n) => n.class_name.as_ref(),
            ComponentNode::Code(n) => n.class_name.as_ref(),
            ComponentNode::Json(n) => n.class_name.as_ref(),
            ComponentNode::Button(n) => n.class_name.as_ref(),
            ComponentNode::Link(n) => n.class_name.as_ref(),
            ComponentNode::LinkList(n) => n.class_name.as_ref(),
            ComponentNode::Navbar(n) => n.class_name.as_ref(),
            ComponentNode::Footer(n) => n.class_name.as_ref(),
            ComponentNode::Modal(n) => n.class_name.as_ref(),
            ComponentNode::Toast(n) => n.class_name.as_ref(),
            ComponentNode::Image(n) => n.class_name.as_ref(),
            ComponentNode::Iframe(n) => n.class_name.as_ref(),
            ComponentNode::Video(n) => n.class_name.as_ref(),
            ComponentNode::Error(n) => n.class_name.as_ref(),
            ComponentNode::Spinner(n) => n.class_name.as_ref(),
            ComponentNode::Custom(n) => n.class_name.as_ref(),
            ComponentNode::Table(n) => n.class_name.as_ref(),
            ComponentNode::Pagination(n) => n.class_name.as_ref(),
            ComponentNode::Details(n) => n.class_name.as_ref(),
            ComponentNode::Form(n) | ComponentNode::ModelForm(n) => n.class_name.as_ref(),
            ComponentNode::FormFieldInput(n) => n.field.class_name.as_ref(),
            ComponentNode::FormFieldBoolean(n) => n.field.class_name.as_ref(),
            ComponentNode::FormFieldFile(n) => n.field.class_name.as_ref(),
            ComponentNode::FormFieldSelect(n) => n.field.class_name.as_ref(),
            ComponentNode::FormFieldSelectSearch(n) => n.field.class_name.as_ref(),
            ComponentNode::Text(_)
            | ComponentNode::PageTitle(_)
            | ComponentNode::ServerLoad(_)
            | ComponentNode::FireEvent(_)
            | ComponentNode::Display(_)
            | ComponentNode::Unknown(_)
            | ComponentNode::Invalid(_) => None,
        }
    }

    /// Shared form field properties, for the form field variants
    pub fn form_field(&self) -> Option<&FieldBase> {
        match self {
            ComponentNode::FormFieldInput(n) => Some(&n.field),
            ComponentNode::FormFieldBoolean(n) => Some(&n.field),
            ComponentNode::FormFieldFile(n) => Some(&n.field),
            ComponentNode::FormFieldSelect(n) => Some(&n.field),
            ComponentNode::FormFieldSelectSearch(n) => Some(&n.field),
            _ => None,
        }
    }

    pub fn form_field_mut(&mut self) -> Option<&mut FieldBase> {
        match self {
            ComponentNode::FormFieldInput(n) => Some(&mut n.field),
            ComponentNode::FormFieldBoolean(n) => Some(&mut n.field),
            ComponentNode::FormFieldFile(n) => Some(&mut n.field),
            ComponentNode::FormFieldSelect(n) => Some(&mut n.field),
            ComponentNode::FormFieldSelectSearch(n) => Some(&mut n.field),
            _ => None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ComponentNode::Text(Text { text: text.into() })
    }

    pub fn div(components: Vec<ComponentNode>) -> Self {
        ComponentNode::Div(Container {
            components,
            class_name: None,
        })
    }

    pub fn page(components: Vec<ComponentNode>) -> Self {
        ComponentNode::Page(Container {
            components,
            class_name: None,
        })
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        ComponentNode::Error(ErrorNode {
            title: title.into(),
            description: description.into(),
            status_code: None,
            class_name: None,
        })
    }
}

impl<'de> Deserialize<'de> for ComponentNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(ComponentNode::from_value(value))
    }
}

impl Serialize for ComponentNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().map_err(S::Error::custom)?.serialize(serializer)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnknownNode {
    pub tag: String,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvalidNode {
    pub tag: String,
    pub message: String,
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTitle {
    pub text: String,
}

/// Body of `Div` and `Page`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub components: Vec<ComponentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    pub text: String,
    #[serde(default = "default_heading_level")]
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

fn default_heading_level() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Markdown {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Json {
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonType {
    Button,
    Reset,
    Submit,
}

impl ButtonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonType::Button => "button",
            ButtonType::Reset => "reset",
            ButtonType::Submit => "submit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<AnyEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_type: Option<ButtonType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub named_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkMode {
    Navbar,
    Footer,
    Tabs,
    Vertical,
    Pagination,
}

/// `Link.active`: a path pattern or a fixed flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActiveMatch {
    Flag(bool),
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub components: Vec<ComponentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<AnyEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<LinkMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkList {
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<LinkMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navbar {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_event: Option<AnyEvent>,
    #[serde(default, alias = "links")]
    pub start_links: Vec<Link>,
    #[serde(default)]
    pub end_links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modal {
    pub title: String,
    pub body: Vec<ComponentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Vec<ComponentNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_trigger: Option<PageEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_context: Option<EventContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub title: String,
    pub body: Vec<ComponentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_trigger: Option<PageEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_context: Option<EventContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerLoad {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_trigger: Option<PageEvent>,
    /// Placeholder tree rendered until `load_trigger` fires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ComponentNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse: Option<bool>,
    /// Base delay in milliseconds before reconnecting a dropped stream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse_retry: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// Width/height given either as a number of pixels or a CSS string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(i64),
    Css(String),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Pixels(px) => write!(f, "{}", px),
            Dimension::Css(css) => f.write_str(css),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<AnyEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Iframe {
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcdoc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<bool>,
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub loop_: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<Dimension>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireEvent {
    pub event: AnyEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of the `Error` component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNode {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spinner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Custom {
    #[serde(default)]
    pub data: Value,
    pub sub_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    Auto,
    Plain,
    Datetime,
    Date,
    Duration,
    AsTitle,
    Markdown,
    Json,
    InlineCode,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DisplayMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<AnyEvent>,
}

/// Column of a `Table` or row of a `Details`, looked up by `field`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayLookup {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_width_percent: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DisplayMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<AnyEvent>,
}

impl DisplayLookup {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: None,
            table_width_percent: None,
            mode: None,
            on_click: None,
        }
    }
}

/// Row data of a table or details view
pub type DataModel = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub data: Vec<DataModel>,
    /// Defaults to the keys of the first row
    #[serde(default)]
    pub columns: Vec<DisplayLookup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_data_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

impl Pagination {
    pub fn page_count(&self) -> u64 {
        self.page_count.unwrap_or_else(|| {
            if self.page_size == 0 {
                1
            } else {
                self.total.div_ceil(self.page_size).max(1)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    pub data: DataModel,
    #[serde(default)]
    pub fields: Vec<DisplayLookup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormMethod {
    #[default]
    Post,
    Get,
    Goto,
}

/// `footer: false` hides the submit button, a list replaces it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormFooter {
    Show(bool),
    Components(Vec<ComponentNode>),
}

/// Body of `Form` and `ModelForm`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub form_fields: Vec<ComponentNode>,
    pub submit_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Map<String, Value>>,
    #[serde(default)]
    pub method: FormMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<FormFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_on_change: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_trigger: Option<PageEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading: Option<Vec<ComponentNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

/// Field title, a string or a path of strings joined for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldTitle {
    Text(String),
    Path(Vec<String>),
}

impl FieldTitle {
    pub fn display(&self) -> String {
        match self {
            FieldTitle::Text(text) => text.clone(),
            FieldTitle::Path(parts) => parts.join(" › "),
        }
    }
}

/// Properties shared by every form field variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBase {
    pub name: String,
    pub title: FieldTitle,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<ClassName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldInput {
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(default = "default_input_type")]
    pub html_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

fn default_input_type() -> String {
    "text".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldBoolean {
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<bool>,
    /// `checkbox` or `switch`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldFile {
    #[serde(flatten)]
    pub field: FieldBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldSelect {
    #[serde(flatten)]
    pub field: FieldBase,
    pub options: Vec<SelectItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vanilla: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldSelectSearch {
    #[serde(flatten)]
    pub field: FieldBase,
    pub search_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<SelectOption>,
    /// Debounce in milliseconds before a search request is sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debounce: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_nested_tree() {
        let nodes: Vec<ComponentNode> = serde_json::from_value(json!([
            {"type": "Page", "components": [
                {"type": "Heading", "text": "Users", "level": 2},
                {"type": "Text", "text": "hi", "extra": "ignored"}
            ]}
        ]))
        .unwrap();

        match &nodes[0] {
            ComponentNode::Page(page) => {
                assert_eq!(page.components.len(), 2);
                assert_eq!(page.components[1], ComponentNode::text("hi"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_recovers() {
        let nodes: Vec<ComponentNode> = serde_json::from_value(json!([
            {"type": "Sparkline", "points": [1, 2]},
            {"type": "Text", "text": "still here"}
        ]))
        .unwrap();

        assert_eq!(nodes[0].tag(), "Sparkline");
        assert!(matches!(nodes[0], ComponentNode::Unknown(_)));
        assert_eq!(nodes[1], ComponentNode::text("still here"));
    }

    #[test]
    fn test_missing_field_is_invalid_not_fatal() {
        let node: ComponentNode = serde_json::from_value(json!({
            "type": "Div",
            "components": [{"type": "Heading"}, {"type": "Text", "text": "ok"}]
        }))
        .unwrap();

        let ComponentNode::Div(div) = node else {
            panic!("expected div");
        };
        match &div.components[0] {
            ComponentNode::Invalid(invalid) => {
                assert_eq!(invalid.tag, "Heading");
                assert!(invalid.message.contains("text"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_serialize_restores_type_tag() {
        let node = ComponentNode::text("hi");
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({"type": "Text", "text": "hi"}));

        let unknown = ComponentNode::from_value(json!({"type": "Nope", "x": 1}));
        assert_eq!(serde_json::to_value(&unknown).unwrap(), json!({"type": "Nope", "x": 1}));
    }

    #[test]
    fn test_form_field_flatten() {
        let node = ComponentNode::from_value(json!({
            "type": "FormFieldInput",
            "name": "email",
            "title": ["User", "Email"],
            "required": true,
            "htmlType": "email"
        }));
        let field = node.form_field().unwrap();
        assert_eq!(field.name, "email");
        assert_eq!(field.title.display(), "User › Email");
        assert!(field.required);
    }

    #[test]
    fn test_class_name_participation() {
        assert!(!ComponentNode::text("x").takes_class_name());
        assert!(ComponentNode::div(vec![]).takes_class_name());
    }

    #[test]
    fn test_pagination_page_count() {
        let p: Pagination =
            serde_json::from_value(json!({"page": 1, "pageSize": 10, "total": 21})).unwrap();
        assert_eq!(p.page_count(), 3);
    }
}
