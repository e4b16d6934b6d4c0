use sdui_model::AnyEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a host shim should do when a DOM event fires on an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Handler {
    /// Pass the event to the event dispatcher
    Fire { event: AnyEvent },

    /// Submit the form registered under `form`
    SubmitForm { form: String },

    /// A field of `form` changed (only emitted for `submitOnChange` forms)
    ChangeForm { form: String },

    /// Look up options for a select-search field
    Search {
        url: String,
        debounce_ms: u64,
    },
}

/// Virtual DOM node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    /// HTML element
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<VNode>,
        /// DOM event name (`click`, `submit`, ...) to handler
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        handlers: BTreeMap<String, Handler>,
    },

    /// Text node
    Text { content: String },

    /// Comment node, used as a marker by components that render nothing visible
    Comment { content: String },

    /// Ordered children without a wrapping element
    Fragment { children: Vec<VNode> },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            handlers: BTreeMap::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn comment(content: impl Into<String>) -> Self {
        VNode::Comment {
            content: content.into(),
        }
    }

    pub fn fragment(children: Vec<VNode>) -> Self {
        VNode::Fragment { children }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Set an attribute only when there is a value
    pub fn with_opt_attr<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with_attr(key, value.to_string()),
            None => self,
        }
    }

    /// Set a boolean attribute (`disabled`, `required`, ...) when `on` is true
    pub fn with_flag(self, key: impl Into<String>, on: bool) -> Self {
        if on {
            self.with_attr(key, "")
        } else {
            self
        }
    }

    /// Set `class`, skipping empty class lists
    pub fn with_class(self, class: impl Into<String>) -> Self {
        let class = class.into();
        if class.is_empty() {
            self
        } else {
            self.with_attr("class", class)
        }
    }

    pub fn with_handler(mut self, event: impl Into<String>, handler: Handler) -> Self {
        if let VNode::Element {
            ref mut handlers, ..
        } = self
        {
            handlers.insert(event.into(), handler);
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        match self {
            VNode::Element {
                ref mut children, ..
            }
            | VNode::Fragment {
                ref mut children, ..
            } => children.push(child),
            _ => {}
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        match self {
            VNode::Element {
                ref mut children, ..
            }
            | VNode::Fragment {
                ref mut children, ..
            } => children.extend(new_children),
            _ => {}
        }
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            VNode::Element { attributes, .. } => attributes.get(key).map(String::as_str),
            _ => None,
        }
    }

    pub fn handler(&self, event: &str) -> Option<&Handler> {
        match self {
            VNode::Element { handlers, .. } => handlers.get(event),
            _ => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } | VNode::Fragment { children } => children,
            _ => &[],
        }
    }

    /// All text content below this node, in document order
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            VNode::Text { content } => out.push_str(content),
            VNode::Comment { .. } => {}
            VNode::Element { children, .. } | VNode::Fragment { children } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth-first search for the first node matching `predicate`
    pub fn find(&self, predicate: &dyn Fn(&VNode) -> bool) -> Option<&VNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(predicate))
    }

    /// First element with the given tag
    pub fn find_tag(&self, tag: &str) -> Option<&VNode> {
        self.find(&|node| matches!(node, VNode::Element { tag: t, .. } if t == tag))
    }
}

/// Search a list of roots
pub fn find_in<'a>(nodes: &'a [VNode], predicate: &dyn Fn(&VNode) -> bool) -> Option<&'a VNode> {
    nodes.iter().find_map(|node| node.find(predicate))
}

/// Concatenated text content of a list of roots
pub fn text_of(nodes: &[VNode]) -> String {
    nodes.iter().map(VNode::text_content).collect()
}
