//! Long-lived UI state shared by render passes and the async client.

use crate::auth::AuthSlot;
use crate::errors::ErrorSlot;
use crate::events::{EventDispatcher, PageEventBus};
use crate::forms::FormStore;
use crate::navigation::Navigation;
use crate::slots::LoadSlots;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything a render pass reads and the client mutates.
///
/// The error and auth slots are the only process-wide values; both have
/// explicit reset so a test (or a logout) starts from a clean slate.
pub struct UiState {
    pub errors: Arc<ErrorSlot>,
    pub auth: Arc<AuthSlot>,
    pub navigation: Arc<Navigation>,
    pub events: Arc<PageEventBus>,
    pub slots: Arc<LoadSlots>,
    pub forms: Arc<FormStore>,
    pub mounts: Arc<Mounts>,
}

impl UiState {
    pub fn new(initial_path: impl Into<String>) -> Self {
        let errors = Arc::new(ErrorSlot::new());
        let navigation = Arc::new(Navigation::new(initial_path, Arc::clone(&errors)));
        Self {
            errors,
            auth: Arc::new(AuthSlot::new()),
            navigation,
            events: Arc::new(PageEventBus::new()),
            slots: Arc::new(LoadSlots::new()),
            forms: Arc::new(FormStore::new()),
            mounts: Arc::new(Mounts::default()),
        }
    }

    pub fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher::new(
            Arc::clone(&self.navigation),
            Arc::clone(&self.events),
            Arc::clone(&self.auth),
        )
    }

    /// Drop everything a pass did not visit: the components are unmounted.
    pub(crate) fn sweep(&self, visited: &HashSet<String>) {
        self.slots.retain(visited);
        self.forms.retain(visited);
        self.mounts.retain(visited);
    }

    pub fn reset(&self) {
        self.errors.clear();
        self.auth.reset();
        self.slots.clear();
        self.forms.clear();
        self.mounts.clear();
    }
}

/// Tracks one-shot mount effects (`FireEvent`) so they run once per mount.
#[derive(Debug, Default)]
pub struct Mounts {
    mounted: Mutex<HashSet<String>>,
}

impl Mounts {
    /// True the first time `key` is seen since it was last unmounted.
    pub fn first_mount(&self, key: &str) -> bool {
        lock(&self.mounted).insert(key.to_string())
    }

    pub fn retain(&self, visited: &HashSet<String>) {
        lock(&self.mounted).retain(|key| visited.contains(key));
    }

    pub fn clear(&self) {
        lock(&self.mounted).clear();
    }
}
