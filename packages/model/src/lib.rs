//! Wire types for server-driven UI.
//!
//! The backend answers every page request with a JSON array of components.
//! This crate decodes that tree, the events components carry and the form
//! protocol, without any rendering concerns.

pub mod class_name;
pub mod component;
pub mod context;
pub mod error;
pub mod events;
pub mod forms;

pub use class_name::{combine, render_class_name, wants_merge, ClassName};
pub use component::{ComponentNode, DisplayMode, FieldBase, LinkMode};
pub use context::{apply_context, render_event, sub_keys, EventContext, SubstitutionError};
pub use error::{ModelError, ModelResult};
pub use events::{AnyEvent, AuthEvent, GoToEvent, PageEvent};
pub use forms::{loc_to_name, FieldError, FormResponse, LocSegment, SelectItem, SelectOption};
