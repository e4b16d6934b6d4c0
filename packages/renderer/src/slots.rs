//! Per-mount server load state.
//!
//! Each mounted `ServerLoad` owns a slot keyed by its position in the tree.
//! Starting a load hands out a [`LoadTicket`] carrying a fresh generation;
//! committing a result with an old generation (the slot moved on to another
//! url, or was unmounted) is rejected, so the last requested path wins no
//! matter in which order responses arrive.

use crate::navigation::fragment;
use crate::state::lock;
use sdui_model::ComponentNode;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::{debug, trace};

/// How page paths are sent to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathSendMode {
    /// `<rootUrl><path>`
    #[default]
    Append,
    /// `<rootUrl>?path=<encoded path>`
    Query,
}

/// Where component trees are loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub root_url: String,
    pub path_send_mode: PathSendMode,
}

impl Endpoint {
    pub fn new(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            path_send_mode: PathSendMode::Append,
        }
    }

    pub fn with_mode(mut self, mode: PathSendMode) -> Self {
        self.path_send_mode = mode;
        self
    }

    /// Request url for a page path. The fragment never reaches the server.
    pub fn url_for(&self, path: &str) -> String {
        let path = path.split_once('#').map_or(path, |(path, _)| path);
        match self.path_send_mode {
            PathSendMode::Append => format!("{}{}", self.root_url, path),
            PathSendMode::Query => {
                let encoded: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
                format!("{}?path={}", self.root_url, encoded)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// One-shot request expecting 200 or 404
    Fetch,
    /// Server-sent events, each message replaces the tree
    Stream {
        /// Base reconnect delay in milliseconds, when the node set one
        retry_ms: Option<u64>,
    },
}

/// Permission to deliver results for one load of one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub key: String,
    pub url: String,
    pub path: String,
    pub generation: u64,
    pub mode: LoadMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(Vec<ComponentNode>),
    NotFound,
    /// The request failed; the error itself goes to the error slot
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitResult {
    Applied,
    /// The ticket no longer matches its slot; the result was dropped
    Stale,
}

/// What a render pass needs to draw a slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotView {
    pub components: Option<Vec<ComponentNode>>,
    pub transitioning: bool,
    pub not_found: Option<String>,
    /// Set once after a load of a path with a fragment
    pub scroll_to: Option<String>,
}

#[derive(Debug)]
struct Slot {
    url: String,
    path: String,
    reload: u64,
    generation: u64,
    loading: bool,
    components: Option<Vec<ComponentNode>>,
    not_found: Option<String>,
    scroll_to: Option<String>,
}

#[derive(Debug, Default)]
struct Slots {
    by_key: HashMap<String, Slot>,
    next_generation: u64,
}

#[derive(Debug, Default)]
pub struct LoadSlots {
    inner: Mutex<Slots>,
}

impl LoadSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the slot for a mount, starting a load when it has none yet or
    /// its url / reload counter changed. The returned ticket is `Some` only
    /// when a new load must be started.
    pub fn request(
        &self,
        key: &str,
        path: &str,
        url: &str,
        reload: u64,
        mode: LoadMode,
    ) -> (SlotView, Option<LoadTicket>) {
        let mut slots = lock(&self.inner);
        let current = slots
            .by_key
            .get(key)
            .map_or(false, |slot| slot.url == url && slot.reload == reload);

        let ticket = if current {
            None
        } else {
            slots.next_generation += 1;
            let generation = slots.next_generation;
            let slot = slots.by_key.entry(key.to_string()).or_insert_with(|| Slot {
                url: String::new(),
                path: String::new(),
                reload,
                generation,
                loading: true,
                components: None,
                not_found: None,
                scroll_to: None,
            });
            slot.url = url.to_string();
            slot.path = path.to_string();
            slot.reload = reload;
            slot.generation = generation;
            slot.loading = true;
            slot.not_found = None;
            debug!(key, url, generation, "Starting load");
            Some(LoadTicket {
                key: key.to_string(),
                url: url.to_string(),
                path: path.to_string(),
                generation,
                mode,
            })
        };

        let view = match slots.by_key.get_mut(key) {
            Some(slot) => SlotView {
                components: slot.components.clone(),
                transitioning: slot.loading,
                not_found: slot.not_found.clone(),
                scroll_to: slot.scroll_to.take(),
            },
            None => SlotView::default(),
        };
        (view, ticket)
    }

    /// Apply a result. Results for superseded or unmounted loads are dropped.
    pub fn commit(&self, ticket: &LoadTicket, outcome: LoadOutcome) -> CommitResult {
        let mut slots = lock(&self.inner);
        let Some(slot) = slots
            .by_key
            .get_mut(&ticket.key)
            .filter(|slot| slot.generation == ticket.generation)
        else {
            debug!(key = %ticket.key, url = %ticket.url, generation = ticket.generation, "Dropping stale result");
            return CommitResult::Stale;
        };

        slot.loading = false;
        match outcome {
            LoadOutcome::Loaded(components) => {
                trace!(key = %ticket.key, count = components.len(), "Committing components");
                slot.components = Some(components);
                slot.not_found = None;
                slot.scroll_to = fragment(&slot.path).map(str::to_string);
            }
            LoadOutcome::NotFound => {
                slot.not_found = Some(ticket.url.clone());
            }
            LoadOutcome::Failed => {}
        }
        CommitResult::Applied
    }

    /// Whether results for this ticket would still be applied
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        lock(&self.inner)
            .by_key
            .get(&ticket.key)
            .map_or(false, |slot| slot.generation == ticket.generation)
    }

    /// Whether any mounted slot is waiting for a result
    pub fn any_loading(&self) -> bool {
        lock(&self.inner).by_key.values().any(|slot| slot.loading)
    }

    pub fn retain(&self, visited: &HashSet<String>) {
        lock(&self.inner).by_key.retain(|key, _| {
            let keep = visited.contains(key);
            if !keep {
                debug!(key, "Unmounting server load");
            }
            keep
        });
    }

    pub fn clear(&self) {
        lock(&self.inner).by_key.clear();
    }
}
