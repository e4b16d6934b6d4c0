//! Built-in renderers, one per component type.

pub(crate) mod display;
pub(crate) mod form;
pub(crate) mod layout;
pub(crate) mod links;
pub(crate) mod media;
pub(crate) mod overlay;
pub(crate) mod server_load;

use crate::error::{RenderError, RenderResult};
use crate::renderer::RenderPass;
use crate::vdom::VNode;
use sdui_model::ComponentNode;

/// Render `node` with its built-in renderer, skipping the custom hook.
///
/// Custom renderers can call this to decorate the default output.
pub fn render_builtin(node: &ComponentNode, pass: &mut RenderPass<'_>) -> RenderResult<VNode> {
    match node {
        ComponentNode::Text(text) => Ok(VNode::text(&text.text)),
        ComponentNode::Paragraph(paragraph) => Ok(layout::paragraph(paragraph, node, pass)),
        ComponentNode::PageTitle(title) => Ok(layout::page_title(title, pass)),
        ComponentNode::Div(container) | ComponentNode::Page(container) => {
            Ok(layout::container(container, node, pass))
        }
        ComponentNode::Heading(heading) => Ok(layout::heading(heading, node, pass)),
        ComponentNode::Markdown(markdown) => Ok(layout::markdown(markdown, node, pass)),
        ComponentNode::Code(code) => Ok(layout::code(code, node, pass)),
        ComponentNode::Json(json) => Ok(layout::json(json, node, pass)),
        ComponentNode::Button(button) => Ok(layout::button(button, node, pass)),
        ComponentNode::Link(link) => links::link(link, node, pass),
        ComponentNode::LinkList(list) => Ok(links::link_list(list, node, pass)),
        ComponentNode::Navbar(navbar) => Ok(links::navbar(navbar, node, pass)),
        ComponentNode::Footer(footer) => Ok(links::footer(footer, node, pass)),
        ComponentNode::Pagination(pagination) => Ok(links::pagination(pagination, node, pass)),
        ComponentNode::Modal(modal) => Ok(overlay::modal(modal, node, pass)),
        ComponentNode::Toast(toast) => Ok(overlay::toast(toast, node, pass)),
        ComponentNode::FireEvent(fire) => Ok(overlay::fire_event(fire, pass)),
        ComponentNode::Error(error) => Ok(overlay::error_panel(error, node, pass)),
        ComponentNode::Spinner(spinner) => Ok(overlay::spinner(spinner, node, pass)),
        ComponentNode::Custom(custom) => Ok(overlay::custom(custom, pass)),
        ComponentNode::ServerLoad(load) => server_load::server_load(load, pass),
        ComponentNode::Image(image) => Ok(media::image(image, node, pass)),
        ComponentNode::Iframe(iframe) => Ok(media::iframe(iframe, node, pass)),
        ComponentNode::Video(video) => Ok(media::video(video, node, pass)),
        ComponentNode::Display(display) => display::display(display, pass),
        ComponentNode::Table(table) => display::table(table, node, pass),
        ComponentNode::Details(details) => display::details(details, node, pass),
        ComponentNode::Form(form) | ComponentNode::ModelForm(form) => Ok(form::form(form, node, pass)),
        ComponentNode::FormFieldInput(field) => Ok(form::input(field, node, pass)),
        ComponentNode::FormFieldBoolean(field) => Ok(form::boolean(field, node, pass)),
        ComponentNode::FormFieldFile(field) => Ok(form::file(field, node, pass)),
        ComponentNode::FormFieldSelect(field) => Ok(form::select(field, node, pass)),
        ComponentNode::FormFieldSelectSearch(field) => Ok(form::select_search(field, node, pass)),
        ComponentNode::Unknown(unknown) => Ok(pass.display_error(
            "Invalid Server Response",
            format!("Unknown component type: \"{}\"", unknown.tag),
            None,
        )),
        ComponentNode::Invalid(invalid) => Err(RenderError::InvalidNode {
            tag: invalid.tag.clone(),
            message: invalid.message.clone(),
        }),
    }
}

/// `"user_name"` -> `"User Name"`
pub fn as_title(s: &str) -> String {
    let spaced: String = s
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();

    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        let is_word = c.is_alphanumeric();
        if is_word && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !is_word;
    }
    out
}

/// Lowercase, dash separated, word characters only
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_dash = false;
    for c in s.to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            pending_dash = true;
        } else if c.is_alphanumeric() || c == '_' {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        }
    }
    out
}

/// Insert `,` thousands separators into the integer part of a number
pub fn group_thousands(number: &str) -> String {
    let (sign, rest) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (rest, None),
    };
    if !int_part.chars().all(|c| c.is_ascii_digit()) {
        return number.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
