use crate::state::lock;
use std::sync::Mutex;
use tracing::debug;

/// Session auth token. `auth` events are the only writer.
#[derive(Debug, Default)]
pub struct AuthSlot {
    token: Mutex<Option<String>>,
}

impl AuthSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: Option<String>) {
        debug!(present = token.is_some(), "Auth token updated");
        *lock(&self.token) = token;
    }

    pub fn token(&self) -> Option<String> {
        lock(&self.token).clone()
    }

    /// Value for the `Authorization` header, using the `Token` scheme
    pub fn authorization(&self) -> Option<String> {
        self.token().map(|token| format!("Token {}", token))
    }

    pub fn reset(&self) {
        self.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header() {
        let auth = AuthSlot::new();
        assert_eq!(auth.authorization(), None);
        auth.set(Some("abc".to_string()));
        assert_eq!(auth.authorization().as_deref(), Some("Token abc"));
        auth.reset();
        assert_eq!(auth.token(), None);
    }
}
