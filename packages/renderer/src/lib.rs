//! Server-driven UI render core.
//!
//! [`Renderer`] walks a [`ComponentNode`](sdui_model::ComponentNode) tree and
//! produces [`VNode`]s. Long-lived UI state (navigation, page events, the
//! error slot, server load slots, form state) lives in [`UiState`] and is
//! shared with whatever drives the network side.

pub mod auth;
pub mod class_names;
pub mod components;
pub mod custom;
pub mod error;
pub mod errors;
pub mod events;
pub mod forms;
pub mod html;
pub mod navigation;
pub mod presentation;
pub mod renderer;
pub mod slots;
pub mod state;
pub mod vdom;

pub use class_names::{resolve_class_name, ClassNameGenerator, GeneratorArgs, ResolveOptions, ThemeClassNames};
pub use components::render_builtin;
pub use custom::{CustomRender, CustomRenderers, NodeRenderer};
pub use error::{RenderError, RenderResult};
pub use errors::{ErrorDetails, ErrorSlot};
pub use events::{EventDispatcher, PageEventBus, PageEventState};
pub use forms::{FormState, FormStore, FormTarget, SubmitGuard};
pub use html::{to_document, to_html, HtmlOptions};
pub use navigation::{LoadSignal, Navigation};
pub use presentation::{DefaultPresentation, Presentation};
pub use renderer::{RenderOutput, RenderPass, Renderer, ROOT_KEY};
pub use slots::{CommitResult, Endpoint, LoadMode, LoadOutcome, LoadSlots, LoadTicket, PathSendMode, SlotView};
pub use state::UiState;
pub use vdom::{Handler, VNode};
