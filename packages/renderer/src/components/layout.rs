//! Text and container components.

use super::slugify;
use crate::renderer::RenderPass;
use crate::vdom::{Handler, VNode};
use sdui_model::component::{Button, Code, Container, Heading, Json, Markdown, PageTitle, Paragraph};
use sdui_model::ComponentNode;
use serde_json::Value;
use tracing::trace;

pub(crate) fn paragraph(paragraph: &Paragraph, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    VNode::element("p")
        .with_class(pass.class_name(node))
        .with_child(VNode::text(&paragraph.text))
}

pub(crate) fn page_title(title: &PageTitle, pass: &mut RenderPass<'_>) -> VNode {
    pass.set_title(&title.text);
    VNode::comment(format!("title: {}", title.text))
}

/// `Div` and `Page`
pub(crate) fn container(container: &Container, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let class = pass.class_name(node);
    let children = pass.render_children("components", &container.components);
    VNode::element("div").with_class(class).with_children(children)
}

pub(crate) fn heading(heading: &Heading, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let level = heading.level.clamp(1, 6);
    let id = match heading.html_id {
        Some(ref id) if !id.is_empty() => id.clone(),
        _ => slugify(&heading.text),
    };
    VNode::element(format!("h{}", level))
        .with_attr("id", id)
        .with_class(pass.class_name(node))
        .with_child(VNode::text(&heading.text))
}

/// Markdown source is handed to the host as is; a host wanting rendered
/// markdown plugs in a custom renderer.
pub(crate) fn markdown(markdown: &Markdown, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    VNode::element("div")
        .with_class(pass.class_name(node))
        .with_attr("data-markdown", "true")
        .with_opt_attr("data-code-style", markdown.code_style.as_ref())
        .with_child(VNode::text(&markdown.text))
}

pub(crate) fn code(code: &Code, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    code_block(
        &code.text,
        code.language.as_deref(),
        code.code_style.as_deref(),
        pass.class_name(node),
    )
}

/// Pretty printed through the `Code` block. A string holding JSON is decoded
/// first so it is not shown as one escaped line.
pub(crate) fn json(json: &Json, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    code_block(&pretty_json(&json.value), Some("json"), None, pass.class_name(node))
}

pub(crate) fn pretty_json(value: &Value) -> String {
    let reparsed;
    let value = match value {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed) => {
                reparsed = parsed;
                &reparsed
            }
            Err(_) => value,
        },
        _ => value,
    };
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn code_block(text: &str, language: Option<&str>, code_style: Option<&str>, class: String) -> VNode {
    let code = VNode::element("code")
        .with_opt_attr("class", language.map(|language| format!("language-{}", language)))
        .with_child(VNode::text(text));
    VNode::element("pre")
        .with_class(class)
        .with_opt_attr("data-code-style", code_style)
        .with_child(code)
}

pub(crate) fn button(button: &Button, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let mut element = VNode::element("button")
        .with_class(pass.class_name(node))
        .with_opt_attr("type", button.html_type.map(|kind| kind.as_str()))
        .with_child(VNode::text(&button.text));
    if let Some(ref event) = button.on_click {
        trace!(kind = event.kind(), "Button click handler");
        element = element.with_handler(
            "click",
            Handler::Fire {
                event: event.clone(),
            },
        );
    }
    element
}
