use crate::renderer::RenderPass;
use crate::vdom::{Handler, VNode};
use sdui_model::component::{Iframe, Image, Video};
use sdui_model::ComponentNode;

pub(crate) fn image(image: &Image, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let element = VNode::element("img")
        .with_class(pass.class_name(node))
        .with_attr("src", &image.src)
        .with_opt_attr("alt", image.alt.as_ref())
        .with_opt_attr("width", image.width.as_ref())
        .with_opt_attr("height", image.height.as_ref())
        .with_opt_attr("referrerpolicy", image.referrer_policy.as_ref())
        .with_opt_attr("loading", image.loading.as_ref());
    match image.on_click {
        Some(ref event) => element.with_handler(
            "click",
            Handler::Fire {
                event: event.clone(),
            },
        ),
        None => element,
    }
}

pub(crate) fn iframe(iframe: &Iframe, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    VNode::element("iframe")
        .with_class(pass.class_name(node))
        .with_attr("src", &iframe.src)
        .with_opt_attr("title", iframe.title.as_ref())
        .with_opt_attr("width", iframe.width.as_ref())
        .with_opt_attr("height", iframe.height.as_ref())
        .with_opt_attr("srcdoc", iframe.srcdoc.as_ref())
        .with_opt_attr("sandbox", iframe.sandbox.as_ref())
}

pub(crate) fn video(video: &Video, node: &ComponentNode, pass: &mut RenderPass<'_>) -> VNode {
    let sources = video
        .sources
        .iter()
        .map(|src| VNode::element("source").with_attr("src", src))
        .collect();
    VNode::element("video")
        .with_class(pass.class_name(node))
        .with_flag("autoplay", video.autoplay.unwrap_or(false))
        .with_flag("controls", video.controls.unwrap_or(false))
        .with_flag("loop", video.loop_.unwrap_or(false))
        .with_flag("muted", video.muted.unwrap_or(false))
        .with_opt_attr("poster", video.poster.as_ref())
        .with_opt_attr("width", video.width.as_ref())
        .with_opt_attr("height", video.height.as_ref())
        .with_children(sources)
}
