//! Host supplied placeholders shown around server loaded content.

use crate::vdom::VNode;

pub trait Presentation: Send + Sync {
    /// Shown while the first response for a mount is pending
    fn spinner(&self) -> VNode {
        VNode::element("div")
            .with_class("sdui-spinner")
            .with_child(
                VNode::element("div")
                    .with_class("sdui-spinner-animation")
                    .with_child(VNode::text("loading...")),
            )
    }

    /// Shown when the backend answered 404
    fn not_found(&self, url: &str) -> VNode {
        VNode::element("div").with_child(VNode::text(format!("Page not found: {}", url)))
    }

    /// Wraps loaded content; `transitioning` is true while a newer load is pending
    fn transition(&self, children: Vec<VNode>, transitioning: bool) -> VNode {
        let wrapper = VNode::element("div").with_children(children);
        if transitioning {
            wrapper.with_attr("aria-busy", "true")
        } else {
            wrapper
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPresentation;

impl Presentation for DefaultPresentation {}
