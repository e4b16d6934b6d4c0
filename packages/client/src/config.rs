use sdui_renderer::{Endpoint, PathSendMode};
use serde::{Deserialize, Serialize};

/// Settings of the network side of an app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Scheme and host relative urls are resolved against, e.g. `http://localhost:8000`
    pub origin: Option<String>,
    /// Prefix of page requests
    pub root_url: String,
    pub path_send_mode: PathSendMode,
    /// Poll the dev reload endpoint
    pub dev_mode: bool,
    pub dev_reload_path: String,
    /// Reconnect attempts of a dropped stream before it gives up
    pub stream_retries: u32,
    /// First reconnect delay, doubled on each attempt
    pub stream_retry_base_ms: u64,
    /// Render/load rounds `App::settle` runs before returning anyway
    pub max_settle_rounds: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: None,
            root_url: "/api".to_string(),
            path_send_mode: PathSendMode::Append,
            dev_mode: false,
            dev_reload_path: "/api/__dev__/reload".to_string(),
            stream_retries: 5,
            stream_retry_base_ms: 1000,
            max_settle_rounds: 16,
        }
    }
}

impl ClientConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.root_url.clone()).with_mode(self.path_send_mode)
    }
}
