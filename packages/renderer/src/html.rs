//! Serialize virtual DOM to HTML.
//!
//! Event handlers have no HTML form; each one becomes a
//! `data-sdui-on<event>` attribute holding the handler as JSON, for a host
//! shim to pick up.

use crate::renderer::RenderOutput;
use crate::vdom::{Handler, VNode};
use std::collections::BTreeMap;

/// Options for HTML output
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

impl HtmlOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent: String::new(),
        }
    }
}

struct Context {
    options: HtmlOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: HtmlOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        self.newline();
    }

    fn newline(&mut self) {
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Serialize a list of nodes
pub fn to_html(nodes: &[VNode], options: HtmlOptions) -> String {
    let mut ctx = Context::new(options);
    for node in nodes {
        write_node(node, &mut ctx);
    }
    ctx.get_output()
}

/// Serialize a full document around a render pass output
pub fn to_document(output: &RenderOutput, options: HtmlOptions) -> String {
    let mut ctx = Context::new(options);
    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.indent();

    ctx.add_line("<head>");
    ctx.indent();
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    if let Some(ref title) = output.title {
        ctx.add_line(&format!("<title>{}</title>", escape_html(title)));
    }
    ctx.dedent();
    ctx.add_line("</head>");

    ctx.add_line("<body>");
    ctx.indent();
    for node in &output.nodes {
        write_node(node, &mut ctx);
    }
    ctx.dedent();
    ctx.add_line("</body>");

    ctx.dedent();
    ctx.add_line("</html>");
    ctx.get_output()
}

fn write_node(node: &VNode, ctx: &mut Context) {
    match node {
        VNode::Element {
            tag,
            attributes,
            children,
            handlers,
        } => write_element(tag, attributes, handlers, children, ctx),
        VNode::Text { content } => {
            if ctx.options.pretty {
                ctx.add_indent();
            }
            ctx.add(&escape_html(content));
            ctx.newline();
        }
        VNode::Comment { content } => {
            ctx.add_line(&format!("<!-- {} -->", content.replace("--", "- -")));
        }
        VNode::Fragment { children } => {
            for child in children {
                write_node(child, ctx);
            }
        }
    }
}

fn write_element(
    tag: &str,
    attributes: &BTreeMap<String, String>,
    handlers: &BTreeMap<String, Handler>,
    children: &[VNode],
    ctx: &mut Context,
) {
    if ctx.options.pretty {
        ctx.add_indent();
    }
    ctx.add(&format!("<{}", tag));

    for (name, value) in attributes {
        ctx.add(" ");
        write_attribute(name, value, ctx);
    }
    for (event, handler) in handlers {
        let json = serde_json::to_string(handler).unwrap_or_default();
        ctx.add(" ");
        write_attribute(&format!("data-sdui-on{}", event), &json, ctx);
    }

    if children.is_empty() && is_self_closing(tag) {
        ctx.add(" />");
        ctx.newline();
        return;
    }

    ctx.add(">");

    // Text-only elements stay on one line
    let inline = children.iter().all(|child| matches!(child, VNode::Text { .. }));
    if inline {
        for child in children {
            if let VNode::Text { content } = child {
                ctx.add(&escape_html(content));
            }
        }
    } else {
        ctx.newline();
        ctx.indent();
        for child in children {
            write_node(child, ctx);
        }
        ctx.dedent();
        if ctx.options.pretty {
            ctx.add_indent();
        }
    }

    ctx.add(&format!("</{}>", tag));
    ctx.newline();
}

fn write_attribute(name: &str, value: &str, ctx: &mut Context) {
    ctx.add(name);
    if value.is_empty() {
        return;
    }
    ctx.add("=\"");
    ctx.add(&escape_html(value));
    ctx.add("\"");
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn is_self_closing(tag: &str) -> bool {
    matches!(
        tag,
        "img" | "input" | "br" | "hr" | "meta" | "link" | "area" | "base" | "col" | "embed" | "param" | "source"
            | "track" | "wbr"
    )
}
