//! Page event broadcast and the event dispatcher.

use crate::auth::AuthSlot;
use crate::navigation::Navigation;
use crate::state::lock;
use sdui_model::{AnyEvent, EventContext, PageEvent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, instrument};

/// What listeners of one named page event see.
///
/// `fire_id` changes on every fire, even with an identical payload, and is
/// `None` when the event never fired or was cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEventState {
    pub context: Option<EventContext>,
    pub fire_id: Option<u64>,
}

impl PageEventState {
    pub fn is_active(&self) -> bool {
        self.fire_id.is_some()
    }
}

/// Broadcasts named page events (`app:<name>`) to any number of listeners.
#[derive(Debug, Default)]
pub struct PageEventBus {
    channels: Mutex<HashMap<String, watch::Sender<PageEventState>>>,
    next_fire_id: AtomicU64,
}

impl PageEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self, event: &PageEvent) {
        let state = if event.clear.unwrap_or(false) {
            PageEventState::default()
        } else {
            PageEventState {
                context: Some(event.context.clone().unwrap_or_default()),
                fire_id: Some(self.next_fire_id.fetch_add(1, Ordering::Relaxed) + 1),
            }
        };
        debug!(signal = %event.signal_name(), fire_id = ?state.fire_id, "Page event");
        self.with_sender(&event.signal_name(), |sender| {
            sender.send_replace(state);
        });
    }

    /// Reset a named event, as if it had never fired
    pub fn clear(&self, name: &str) {
        self.fire(&PageEvent {
            name: name.to_string(),
            clear: Some(true),
            ..Default::default()
        });
    }

    /// Register interest in a named event
    pub fn listen(&self, event: &PageEvent) -> watch::Receiver<PageEventState> {
        self.with_sender(&event.signal_name(), watch::Sender::subscribe)
    }

    /// Latest state of a named event
    pub fn current(&self, event: &PageEvent) -> PageEventState {
        lock(&self.channels)
            .get(&event.signal_name())
            .map(|sender| sender.borrow().clone())
            .unwrap_or_default()
    }

    fn with_sender<R>(&self, signal: &str, f: impl FnOnce(&watch::Sender<PageEventState>) -> R) -> R {
        let mut channels = lock(&self.channels);
        let sender = channels
            .entry(signal.to_string())
            .or_insert_with(|| watch::channel(PageEventState::default()).0);
        f(sender)
    }
}

/// Interprets an [`AnyEvent`] and performs its side effect.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    navigation: Arc<Navigation>,
    bus: Arc<PageEventBus>,
    auth: Arc<AuthSlot>,
}

impl EventDispatcher {
    pub fn new(navigation: Arc<Navigation>, bus: Arc<PageEventBus>, auth: Arc<AuthSlot>) -> Self {
        Self {
            navigation,
            bus,
            auth,
        }
    }

    /// Fire an event. Absent events are a no-op.
    #[instrument(skip_all, fields(kind = ?event.map(AnyEvent::kind)))]
    pub fn fire(&self, event: Option<&AnyEvent>) {
        let Some(event) = event else {
            return;
        };
        debug!(?event, "Firing event");

        match event {
            AnyEvent::Page(page) => {
                if let Some(ref push_path) = page.push_path {
                    self.navigation.goto_cosmetic(push_path);
                }
                self.bus.fire(page);
            }
            AnyEvent::GoTo(go_to) => {
                self.navigation
                    .navigate(go_to.url.as_deref(), go_to.query.as_ref());
            }
            AnyEvent::Auth(auth) => {
                self.auth.set(auth.token.clone());
                if let Some(ref url) = auth.url {
                    self.navigation.goto(url);
                }
            }
            AnyEvent::Back => {
                self.navigation.back();
            }
        }
    }
}
