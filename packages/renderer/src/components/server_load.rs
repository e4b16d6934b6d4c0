//! Server loaded subtrees, including the page itself.

use crate::error::RenderResult;
use crate::renderer::RenderPass;
use crate::slots::{LoadMode, SlotView};
use crate::vdom::VNode;
use sdui_model::component::ServerLoad;
use sdui_model::apply_context;
use tracing::trace;

/// Key segment under which loaded components are rendered
const LOADED: &str = ">";

/// The page: a fetch of `path`, restarted whenever the load signal changes
pub(crate) fn render_page(pass: &mut RenderPass<'_>, path: &str, seq: u64) -> VNode {
    let view = pass.request_load(path, seq, LoadMode::Fetch);
    render_slot(pass, view)
}

/// A `ServerLoad` node.
///
/// With placeholder `components` and a load trigger that has not fired, the
/// placeholders are rendered and nothing is fetched. Once the trigger fires,
/// its context fills `{key}`s in the path and every new fire reloads.
pub(crate) fn server_load(load: &ServerLoad, pass: &mut RenderPass<'_>) -> RenderResult<VNode> {
    let fired = load
        .load_trigger
        .as_ref()
        .map(|trigger| pass.state().events.current(trigger))
        .filter(|state| state.is_active());

    let (context, reload) = match fired {
        Some(state) => (state.context, state.fire_id.unwrap_or(0)),
        None => {
            if let Some(ref components) = load.components {
                trace!(path = %load.path, "Rendering placeholder components");
                return Ok(VNode::fragment(pass.render_children("components", components)));
            }
            (pass.event_context().cloned(), 0)
        }
    };

    let path = apply_context(&load.path, context.as_ref())?;
    let mode = if load.sse.unwrap_or(false) {
        LoadMode::Stream {
            retry_ms: load.sse_retry,
        }
    } else {
        LoadMode::Fetch
    };

    Ok(pass.with_event_context(context, |pass| {
        let view = pass.request_load(&path, reload, mode);
        render_slot(pass, view)
    }))
}

fn render_slot(pass: &mut RenderPass<'_>, view: SlotView) -> VNode {
    if let Some(ref url) = view.not_found {
        return pass.presentation().not_found(url);
    }
    match view.components {
        Some(components) => {
            let children = pass.with_key(LOADED, |pass| pass.render_list(&components));
            pass.presentation().transition(children, view.transitioning)
        }
        // the error panel already explains why nothing is here
        None if pass.state().errors.is_set() => VNode::fragment(Vec::new()),
        None => pass.presentation().spinner(),
    }
}
