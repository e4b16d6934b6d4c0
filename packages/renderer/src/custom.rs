//! Hooks a host application uses to replace or add component renderers.

use crate::error::RenderResult;
use crate::renderer::RenderPass;
use crate::vdom::VNode;
use sdui_model::ComponentNode;
use std::sync::Arc;

/// Renders one node. Children are rendered through the pass so they get the
/// same dispatch, error isolation and class name resolution as built-ins.
pub trait NodeRenderer: Send + Sync {
    fn render(&self, node: &ComponentNode, pass: &mut RenderPass<'_>) -> RenderResult<VNode>;
}

impl<F> NodeRenderer for F
where
    F: Fn(&ComponentNode, &mut RenderPass<'_>) -> RenderResult<VNode> + Send + Sync,
{
    fn render(&self, node: &ComponentNode, pass: &mut RenderPass<'_>) -> RenderResult<VNode> {
        self(node, pass)
    }
}

/// Consulted before built-in dispatch for every node. Returning a renderer
/// replaces the built-in one for that node entirely.
pub trait CustomRender: Send + Sync {
    fn resolve(&self, node: &ComponentNode) -> Option<Arc<dyn NodeRenderer>>;
}

impl<F> CustomRender for F
where
    F: Fn(&ComponentNode) -> Option<Arc<dyn NodeRenderer>> + Send + Sync,
{
    fn resolve(&self, node: &ComponentNode) -> Option<Arc<dyn NodeRenderer>> {
        self(node)
    }
}

/// Custom render keyed by component tag, the common case
#[derive(Default, Clone)]
pub struct CustomRenderers {
    by_tag: Vec<(String, Arc<dyn NodeRenderer>)>,
}

impl CustomRenderers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: impl Into<String>, renderer: impl NodeRenderer + 'static) -> Self {
        self.by_tag.push((tag.into(), Arc::new(renderer)));
        self
    }
}

impl CustomRender for CustomRenderers {
    fn resolve(&self, node: &ComponentNode) -> Option<Arc<dyn NodeRenderer>> {
        let tag = node.tag();
        self.by_tag
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, renderer)| Arc::clone(renderer))
    }
}
