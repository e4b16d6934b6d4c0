//! Turns the component tree into virtual DOM.
//!
//! A [`Renderer`] holds the host configuration; every call to
//! [`Renderer::render`] runs a [`RenderPass`] which walks the tree, collects
//! the loads that need starting and the mount effects that need firing, and
//! unmounts whatever it did not visit.

use crate::class_names::{resolve_class_name, ClassNameGenerator, ResolveOptions};
use crate::components;
use crate::custom::CustomRender;
use crate::presentation::{DefaultPresentation, Presentation};
use crate::slots::{Endpoint, LoadMode, LoadTicket, SlotView};
use crate::state::UiState;
use crate::vdom::{find_in, text_of, VNode};
use sdui_model::component::ErrorNode;
use sdui_model::{AnyEvent, ClassName, ComponentNode, EventContext};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Mount key of the page level server load
pub const ROOT_KEY: &str = "root";

#[derive(Clone)]
pub struct Renderer {
    endpoint: Endpoint,
    custom: Option<Arc<dyn CustomRender>>,
    class_names: Option<Arc<dyn ClassNameGenerator>>,
    presentation: Arc<dyn Presentation>,
}

impl Renderer {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            custom: None,
            class_names: None,
            presentation: Arc::new(DefaultPresentation),
        }
    }

    pub fn with_custom_render(mut self, custom: impl CustomRender + 'static) -> Self {
        self.custom = Some(Arc::new(custom));
        self
    }

    pub fn with_class_names(mut self, generator: impl ClassNameGenerator + 'static) -> Self {
        self.class_names = Some(Arc::new(generator));
        self
    }

    pub fn with_presentation(mut self, presentation: impl Presentation + 'static) -> Self {
        self.presentation = Arc::new(presentation);
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Render the whole application: the error panel when the error slot is
    /// set, then the page loaded from the current path.
    #[instrument(skip_all, fields(path = %state.navigation.full_path()))]
    pub fn render(&self, state: &UiState) -> RenderOutput {
        let load = state.navigation.current_load();
        let mut pass = RenderPass::new(self, state);
        let page_path = load.path.clone().unwrap_or_else(|| pass.full_path.clone());

        let page = pass.with_key(ROOT_KEY, |pass| {
            components::server_load::render_page(pass, &page_path, load.seq)
        });
        pass.finish(vec![page])
    }

    /// Render a component list that is already in hand, without loading a page.
    pub fn render_nodes(&self, state: &UiState, nodes: &[ComponentNode]) -> RenderOutput {
        let mut pass = RenderPass::new(self, state);
        let rendered = pass.with_key(ROOT_KEY, |pass| pass.render_list(nodes));
        pass.finish(rendered)
    }
}

/// Result of one render pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutput {
    pub nodes: Vec<VNode>,
    /// Document title set by a `PageTitle`
    pub title: Option<String>,
    /// Element id to scroll to after this render
    pub scroll_to: Option<String>,
    /// Loads the caller must start
    pub pending: Vec<LoadTicket>,
    /// Events to fire now that their components are mounted
    pub effects: Vec<AnyEvent>,
}

impl RenderOutput {
    /// Concatenated text content
    pub fn text(&self) -> String {
        text_of(&self.nodes)
    }

    pub fn find(&self, predicate: &dyn Fn(&VNode) -> bool) -> Option<&VNode> {
        find_in(&self.nodes, predicate)
    }
}

/// State of one walk over the component tree.
///
/// Renderers (built-in or custom) receive the pass and use it to render
/// children, resolve class names and register side effects.
pub struct RenderPass<'a> {
    renderer: &'a Renderer,
    state: &'a UiState,
    full_path: String,
    key: Vec<String>,
    event_context: Option<EventContext>,
    visited: HashSet<String>,
    pending: Vec<LoadTicket>,
    effects: Vec<AnyEvent>,
    title: Option<String>,
    scroll_to: Option<String>,
}

impl<'a> RenderPass<'a> {
    fn new(renderer: &'a Renderer, state: &'a UiState) -> Self {
        Self {
            renderer,
            state,
            full_path: state.navigation.full_path(),
            key: Vec::new(),
            event_context: None,
            visited: HashSet::new(),
            pending: Vec::new(),
            effects: Vec::new(),
            title: None,
            scroll_to: None,
        }
    }

    fn finish(mut self, page: Vec<VNode>) -> RenderOutput {
        let mut nodes = Vec::with_capacity(page.len() + 1);
        if let Some(error) = self.state.errors.get() {
            nodes.push(self.display_error(error.title, error.description, error.status_code));
        }
        nodes.extend(page);

        self.state.sweep(&self.visited);
        debug!(
            mounts = self.visited.len(),
            pending = self.pending.len(),
            effects = self.effects.len(),
            "Render pass finished"
        );
        RenderOutput {
            nodes,
            title: self.title,
            scroll_to: self.scroll_to,
            pending: self.pending,
            effects: self.effects,
        }
    }

    pub fn state(&self) -> &UiState {
        self.state
    }

    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.renderer.endpoint
    }

    pub fn presentation(&self) -> &dyn Presentation {
        self.renderer.presentation.as_ref()
    }

    /// Position of the node being rendered, stable across passes
    pub fn mount_key(&self) -> String {
        self.key.join("/")
    }

    /// Mark the current position as mounted and return its key
    pub fn mark_mounted(&mut self) -> String {
        let key = self.mount_key();
        self.visited.insert(key.clone());
        key
    }

    /// Run `f` one level deeper in the tree
    pub fn with_key<R>(&mut self, segment: impl Into<String>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.key.push(segment.into());
        let result = f(self);
        self.key.pop();
        result
    }

    pub fn event_context(&self) -> Option<&EventContext> {
        self.event_context.as_ref()
    }

    /// Run `f` with `context` as the current event context
    pub fn with_event_context<R>(
        &mut self,
        context: Option<EventContext>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let previous = std::mem::replace(&mut self.event_context, context);
        let result = f(self);
        self.event_context = previous;
        result
    }

    /// Render a single node: custom renderer first, then the built-in one.
    /// Any failure is contained to this node and shown as an error panel.
    pub fn render_node(&mut self, node: &ComponentNode) -> VNode {
        let custom = self.renderer.custom.as_ref().and_then(|custom| custom.resolve(node));
        let result = match custom {
            Some(renderer) => {
                trace!(tag = node.tag(), "Custom renderer");
                renderer.render(node, self)
            }
            None => components::render_builtin(node, self),
        };

        match result {
            Ok(vnode) => vnode,
            Err(err) => {
                warn!(tag = node.tag(), key = %self.mount_key(), error = %err, "Render error");
                self.display_error("Render Error", err.to_string(), None)
            }
        }
    }

    pub fn render_list(&mut self, nodes: &[ComponentNode]) -> Vec<VNode> {
        nodes
            .iter()
            .enumerate()
            .map(|(index, node)| self.with_key(index.to_string(), |pass| pass.render_node(node)))
            .collect()
    }

    /// Render a named child list of the current node
    pub fn render_children(&mut self, field: &str, nodes: &[ComponentNode]) -> Vec<VNode> {
        self.with_key(field, |pass| pass.render_list(nodes))
    }

    /// Render an error panel, through a custom `Error` renderer when the host
    /// registered one.
    pub fn display_error(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        status_code: Option<u16>,
    ) -> VNode {
        let error = ErrorNode {
            title: title.into(),
            description: description.into(),
            status_code,
            class_name: None,
        };
        let node = ComponentNode::Error(error.clone());

        if let Some(renderer) = self.renderer.custom.as_ref().and_then(|custom| custom.resolve(&node)) {
            match renderer.render(&node, self) {
                Ok(vnode) => return vnode,
                Err(err) => warn!(error = %err, "Custom error renderer failed"),
            }
        }
        components::overlay::error_panel(&error, &node, self)
    }

    fn generator(&self) -> Option<&dyn ClassNameGenerator> {
        self.renderer.class_names.as_deref()
    }

    /// Class of a node's root element
    pub fn class_name(&self, node: &ComponentNode) -> String {
        resolve_class_name(self.generator(), &self.full_path, node, ResolveOptions::default())
    }

    /// Class of a node's root element with a built-in default
    pub fn class_name_or(&self, node: &ComponentNode, fallback: &ClassName) -> String {
        resolve_class_name(self.generator(), &self.full_path, node, ResolveOptions::fallback(fallback))
    }

    /// Class of a named sub-element
    pub fn sub_class(&self, node: &ComponentNode, sub_element: &str) -> String {
        resolve_class_name(
            self.generator(),
            &self.full_path,
            node,
            ResolveOptions::sub_element(sub_element),
        )
    }

    pub fn sub_class_or(&self, node: &ComponentNode, sub_element: &str, fallback: &ClassName) -> String {
        resolve_class_name(
            self.generator(),
            &self.full_path,
            node,
            ResolveOptions::sub_element(sub_element).with_fallback(fallback),
        )
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn set_scroll_to(&mut self, id: impl Into<String>) {
        self.scroll_to = Some(id.into());
    }

    /// Queue an event to fire after this pass
    pub fn schedule_effect(&mut self, event: AnyEvent) {
        self.effects.push(event);
    }

    /// Look up (and if needed start) the server load mounted at the current key
    pub fn request_load(&mut self, path: &str, reload: u64, mode: LoadMode) -> SlotView {
        let key = self.mark_mounted();
        let url = self.renderer.endpoint.url_for(path);
        let (view, ticket) = self.state.slots.request(&key, path, &url, reload, mode);
        if let Some(ticket) = ticket {
            self.pending.push(ticket);
        }
        if let Some(ref id) = view.scroll_to {
            self.scroll_to = Some(id.clone());
        }
        view
    }
}
