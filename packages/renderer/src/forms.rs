//! Client-side form state layered over the wire shape: lock, field errors and
//! the form level error message.

use crate::state::lock;
use sdui_model::component::FormMethod;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Where and how a mounted form submits
#[derive(Debug, Clone, PartialEq)]
pub struct FormTarget {
    pub submit_url: String,
    pub method: FormMethod,
    pub submit_on_change: bool,
    /// Declared field names, in order
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub locked: bool,
    pub field_errors: HashMap<String, String>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct FormEntry {
    target: FormTarget,
    state: FormState,
}

#[derive(Debug, Default)]
pub struct FormStore {
    forms: Mutex<HashMap<String, FormEntry>>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mounted form. State survives re-renders of the same mount.
    pub fn register(&self, key: &str, target: FormTarget) {
        let mut forms = lock(&self.forms);
        match forms.get_mut(key) {
            Some(entry) => entry.target = target,
            None => {
                forms.insert(
                    key.to_string(),
                    FormEntry {
                        target,
                        state: FormState::default(),
                    },
                );
            }
        }
    }

    pub fn target(&self, key: &str) -> Option<FormTarget> {
        lock(&self.forms).get(key).map(|entry| entry.target.clone())
    }

    pub fn state(&self, key: &str) -> FormState {
        lock(&self.forms)
            .get(key)
            .map(|entry| entry.state.clone())
            .unwrap_or_default()
    }

    /// Lock the form and clear previous errors. The lock is released when the
    /// returned guard drops, whatever the outcome of the submission.
    ///
    /// `None` when the form is unknown or already submitting.
    pub fn begin_submit(self: &Arc<Self>, key: &str) -> Option<SubmitGuard> {
        let mut forms = lock(&self.forms);
        let entry = forms.get_mut(key)?;
        if entry.state.locked {
            debug!(form = key, "Submit already in progress");
            return None;
        }
        entry.state = FormState {
            locked: true,
            ..FormState::default()
        };
        debug!(form = key, url = %entry.target.submit_url, "Form locked for submit");
        Some(SubmitGuard {
            store: Arc::clone(self),
            key: key.to_string(),
        })
    }

    pub fn set_field_errors(&self, key: &str, errors: HashMap<String, String>) {
        if let Some(entry) = lock(&self.forms).get_mut(key) {
            entry.state.field_errors = errors;
        }
    }

    pub fn set_error(&self, key: &str, error: Option<String>) {
        if let Some(entry) = lock(&self.forms).get_mut(key) {
            entry.state.error = error;
        }
    }

    fn unlock(&self, key: &str) {
        if let Some(entry) = lock(&self.forms).get_mut(key) {
            entry.state.locked = false;
        }
    }

    pub fn retain(&self, visited: &HashSet<String>) {
        lock(&self.forms).retain(|key, _| visited.contains(key));
    }

    pub fn clear(&self) {
        lock(&self.forms).clear();
    }
}

/// Held for the duration of a submission
#[derive(Debug)]
pub struct SubmitGuard {
    store: Arc<FormStore>,
    key: String,
}

impl SubmitGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.store.unlock(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> FormTarget {
        FormTarget {
            submit_url: "/api/form".to_string(),
            method: FormMethod::Post,
            submit_on_change: false,
            fields: vec!["name".to_string()],
        }
    }

    #[test]
    fn test_lock_released_on_drop() {
        let store = Arc::new(FormStore::new());
        store.register("f", target());
        {
            let _guard = store.begin_submit("f").unwrap();
            assert!(store.state("f").locked);
            store.set_field_errors("f", HashMap::from([("name".to_string(), "required".to_string())]));
        }
        let state = store.state("f");
        assert!(!state.locked);
        assert_eq!(state.field_errors["name"], "required");
    }

    #[test]
    fn test_begin_submit_clears_errors() {
        let store = Arc::new(FormStore::new());
        store.register("f", target());
        store.set_error("f", Some("Error submitting form".to_string()));
        let _guard = store.begin_submit("f").unwrap();
        assert_eq!(store.state("f").error, None);
        assert!(store.begin_submit("f").is_none());
        assert!(store.begin_submit("missing").is_none());
    }
}
