use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::warn;

/// An error shown as a page level panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ErrorDetails {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status_code: None,
        }
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

/// Process-wide error state. Holds at most one error; setting replaces.
#[derive(Debug)]
pub struct ErrorSlot {
    current: watch::Sender<Option<ErrorDetails>>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    pub fn set(&self, error: Option<ErrorDetails>) {
        if let Some(ref error) = error {
            warn!(title = %error.title, description = %error.description, "Setting error");
        }
        self.current.send_replace(error);
    }

    pub fn clear(&self) {
        self.current.send_if_modified(|current| current.take().is_some());
    }

    pub fn get(&self) -> Option<ErrorDetails> {
        self.current.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ErrorDetails>> {
        self.current.subscribe()
    }
}

impl Default for ErrorSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_and_clear_empties() {
        let slot = ErrorSlot::new();
        slot.set(Some(ErrorDetails::new("First", "a")));
        slot.set(Some(ErrorDetails::new("Second", "b")));
        assert_eq!(slot.get().unwrap().title, "Second");

        slot.clear();
        assert!(!slot.is_set());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let slot = ErrorSlot::new();
        let mut rx = slot.subscribe();
        slot.set(Some(ErrorDetails::new("Oops", "x").with_status(502)));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().status_code, Some(502));
    }
}
