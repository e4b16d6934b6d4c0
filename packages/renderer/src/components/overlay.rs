//! Event driven overlays, mount effects and status panels.

use crate::renderer::RenderPass;
use crate::vdom::{Handler, VNode};
use sdui_model::component::{Custom, ErrorNode, FireEvent, Json, Modal, Spinner, Toast};
use sdui_model::{AnyEvent, ClassName, ComponentNode, EventContext, PageEvent};

/// What `Modal` and `Toast` have in common
struct Overlay<'n> {
    role: &'static str,
    title: &'n str,
    body: &'n [ComponentNode],
    footer: Option<&'n [ComponentNode]>,
    open_trigger: Option<&'n PageEvent>,
    open_context: Option<&'n EventContext>,
}

pub(crate) fn modal(modal: &Modal, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let overlay = Overlay {
        role: "dialog",
        title: &modal.title,
        body: &modal.body,
        footer: modal.footer.as_deref(),
        open_trigger: modal.open_trigger.as_ref(),
        open_context: modal.open_context.as_ref(),
    };
    render_overlay(&overlay, node, pass).map_or_else(
        || VNode::comment("modal"),
        |element| element.with_attr("aria-modal", "true"),
    )
}

pub(crate) fn toast(toast: &Toast, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let overlay = Overlay {
        role: "status",
        title: &toast.title,
        body: &toast.body,
        footer: None,
        open_trigger: toast.open_trigger.as_ref(),
        open_context: toast.open_context.as_ref(),
    };
    render_overlay(&overlay, node, pass).map_or_else(
        || VNode::comment("toast"),
        |element| {
            element
                .with_attr("aria-live", "polite")
                .with_opt_attr("data-position", toast.position.as_ref())
        },
    )
}

/// `None` while the open trigger has not fired (or was cleared)
fn render_overlay(overlay: &Overlay<'_>, node: &ComponentNode, pass: &mut RenderPass<'_>) -> Option<VNode> {
    let trigger = overlay.open_trigger?;
    let state = pass.state().events.current(trigger);
    if !state.is_active() {
        return None;
    }

    let context = state
        .context
        .filter(|context| !context.is_empty())
        .or_else(|| overlay.open_context.cloned());

    let close = AnyEvent::Page(PageEvent {
        name: trigger.name.clone(),
        clear: Some(true),
        ..PageEvent::default()
    });
    let header = VNode::element("div")
        .with_class(pass.sub_class(node, "header"))
        .with_child(
            VNode::element("h5")
                .with_class(pass.sub_class(node, "title"))
                .with_child(VNode::text(overlay.title)),
        )
        .with_child(
            VNode::element("button")
                .with_class(pass.sub_class(node, "close"))
                .with_attr("type", "button")
                .with_attr("aria-label", "Close")
                .with_handler("click", Handler::Fire { event: close }),
        );

    let class = pass.class_name(node);
    let body_class = pass.sub_class(node, "body");
    let footer_class = pass.sub_class(node, "footer");

    let element = pass.with_event_context(context, |pass| {
        let body = pass.render_children("body", overlay.body);
        let mut element = VNode::element("div")
            .with_class(class)
            .with_attr("role", overlay.role)
            .with_child(header)
            .with_child(VNode::element("div").with_class(body_class).with_children(body));
        if let Some(footer) = overlay.footer {
            let footer = pass.render_children("footer", footer);
            element = element.with_child(VNode::element("div").with_class(footer_class).with_children(footer));
        }
        element
    });
    Some(element)
}

/// Fires its event once after mounting
pub(crate) fn fire_event(fire: &FireEvent, pass: &mut RenderPass<'_>) -> VNode {
    let key = pass.mark_mounted();
    if pass.state().mounts.first_mount(&key) {
        pass.schedule_effect(fire.event.clone());
    }
    match fire.message {
        Some(ref message) => VNode::text(message),
        None => VNode::comment("fire event"),
    }
}

/// The built-in error panel
pub(crate) fn error_panel(error: &ErrorNode, node: &ComponentNode, pass: &RenderPass<'_>) -> VNode {
    let panel = VNode::element("div")
        .with_class(pass.class_name(node))
        .with_attr("role", "alert");
    if error.status_code == Some(502) {
        panel.with_child(VNode::text("Backend server down."))
    } else {
        panel
            .with_child(VNode::element("h4").with_child(VNode::text(&error.title)))
            .with_child(VNode::text(&error.description))
    }
}

pub(crate) fn spinner(spinner: &Spinner, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let default_class = ClassName::from("fastui-spinner");
    let text = VNode::element("div")
        .with_class(pass.sub_class(node, "text"))
        .with_children(spinner.text.iter().map(VNode::text).collect());
    let animation = VNode::element("div")
        .with_class(pass.sub_class(node, "animation"))
        .with_child(
            VNode::element("div")
                .with_class("fastui-spinner-animation")
                .with_child(VNode::text("loading...")),
        );
    VNode::element("div")
        .with_class(pass.class_name_or(node, &default_class))
        .with_child(text)
        .with_child(animation)
}

/// `Custom` has no built-in implementation: explain that and show its data.
pub(crate) fn custom(custom: &Custom, pass: &mut RenderPass<'_>) -> VNode {
    let mut description = format!("The custom component \"{}\"", custom.sub_type);
    if let Some(ref library) = custom.library {
        description.push_str(&format!(" from library \"{}\"", library));
    }
    description.push_str(" has no implementation with this frontend app.");

    let panel = pass.display_error("Custom component without implementation", description, None);
    let data = ComponentNode::Json(Json {
        value: custom.data.clone(),
        class_name: None,
    });
    let data = pass.with_key("data", |pass| pass.render_node(&data));
    VNode::fragment(vec![panel, VNode::text("Custom component data:"), data])
}
