//! Debounced select search.

use crate::error::{ClientError, ClientResult};
use crate::request::{RequestArgs, Requester};
use sdui_model::forms::SelectSearchResponse;
use sdui_model::SelectItem;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::trace;

/// Runs searches for select fields, one generation counter per search url.
///
/// Each call waits out the debounce first; if another query for the same url
/// arrived in the meantime, or arrives before the response, the call yields
/// `None` so only the latest query's options are delivered.
#[derive(Debug, Default)]
pub struct SearchDebouncer {
    generations: Mutex<HashMap<String, u64>>,
}

impl SearchDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&self, url: &str) -> u64 {
        let mut generations = self.generations.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let generation = generations.entry(url.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }

    fn is_latest(&self, url: &str, generation: u64) -> bool {
        let generations = self.generations.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        generations.get(url) == Some(&generation)
    }

    pub async fn search(
        &self,
        requester: &Requester,
        url: &str,
        debounce_ms: u64,
        query: &str,
    ) -> ClientResult<Option<Vec<SelectItem>>> {
        let generation = self.bump(url);
        sleep(Duration::from_millis(debounce_ms)).await;
        if !self.is_latest(url, generation) {
            trace!(url, query, "Search superseded during debounce");
            return Ok(None);
        }

        let args = RequestArgs::get(url).with_query(vec![("q".to_string(), query.to_string())]);
        let (_, data) = requester.request(args).await?;
        if !self.is_latest(url, generation) {
            trace!(url, query, "Search superseded while in flight");
            return Ok(None);
        }

        let response: SelectSearchResponse = serde_json::from_value(data.clone())
            .map_err(|err| ClientError::Protocol(format!("Invalid search response {}: {}", data, err)))?;
        Ok(Some(response.options))
    }
}
