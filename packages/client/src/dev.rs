//! Dev reload: poll the backend for a token that changes whenever the
//! server's content changes, and reload the page when it does.

use crate::transport::{HttpRequest, Transport};
use sdui_renderer::{ErrorSlot, Navigation};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

/// Wait before the first poll
const INITIAL_DELAY: Duration = Duration::from_millis(100);
/// Wait after a changed token, for the server to be back up
const RELOAD_DELAY: Duration = Duration::from_millis(300);
/// Wait after a failed poll
const FAILURE_BACKOFF: Duration = Duration::from_millis(2000);
const MAX_FAILURES: u32 = 5;

pub struct DevReload {
    transport: Arc<dyn Transport>,
    url: String,
    navigation: Arc<Navigation>,
    errors: Arc<ErrorSlot>,
}

impl DevReload {
    pub fn new(
        transport: Arc<dyn Transport>,
        url: impl Into<String>,
        navigation: Arc<Navigation>,
        errors: Arc<ErrorSlot>,
    ) -> Self {
        Self {
            transport,
            url: url.into(),
            navigation,
            errors,
        }
    }

    /// Poll until the endpoint 404s or fails `MAX_FAILURES` times in a row.
    /// Returns the number of responses received.
    #[instrument(skip_all, fields(url = %self.url))]
    pub async fn run(&self) -> usize {
        let mut count = 0;
        let mut failures = 0;
        let mut last_value = 0;
        sleep(INITIAL_DELAY).await;

        while failures < MAX_FAILURES {
            let response = match self.transport.send(HttpRequest::get(&self.url)).await {
                Ok(response) => response,
                Err(err) => {
                    debug!(error = %err, "Dev reload poll failed");
                    failures += 1;
                    sleep(FAILURE_BACKOFF).await;
                    continue;
                }
            };
            count += 1;
            debug!(count, "Dev reload connected");

            if response.is_ok() && failures > 0 {
                self.errors.clear();
            }

            if response.status == 404 {
                info!("Dev reload endpoint not found, disabling dev reload");
                break;
            } else if response.is_ok() {
                failures = 0;
                let value = parse_token(&response.body);
                if value != last_value {
                    last_value = value;
                    sleep(RELOAD_DELAY).await;
                    debug!(value, "Dev reloading");
                    self.navigation.fire_load(None, Some(value));
                    self.errors.clear();
                }
            } else {
                failures += 1;
                sleep(FAILURE_BACKOFF).await;
            }
        }

        if count > 0 {
            debug!("Dev reload disconnected");
        }
        count
    }
}

/// Leading integer of the body with dots removed, 0 when there is none
fn parse_token(body: &str) -> u64 {
    let digits: String = body
        .replace('.', "")
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("1712.345"), 1712345);
        assert_eq!(parse_token(" 42\n"), 42);
        assert_eq!(parse_token("12abc"), 12);
        assert_eq!(parse_token("abc"), 0);
        assert_eq!(parse_token(""), 0);
    }
}
