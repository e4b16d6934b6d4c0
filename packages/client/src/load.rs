//! Filling server load slots: one-shot fetches and event streams.

use crate::error::RequestError;
use crate::request::{RequestArgs, Requester};
use futures::StreamExt;
use sdui_model::ComponentNode;
use sdui_renderer::{CommitResult, ErrorDetails, LoadOutcome, LoadSlots, LoadTicket};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Upper bound of the stream reconnect delay
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;

/// A result delivered to a slot
#[derive(Debug, Clone, PartialEq)]
pub struct LoadUpdate {
    pub ticket: LoadTicket,
    pub result: CommitResult,
}

pub type UpdateSender = mpsc::UnboundedSender<LoadUpdate>;

/// Reconnect schedule of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_ms: u64,
}

impl RetryPolicy {
    /// Delay before reconnect number `attempt` (starting at 1)
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.base_ms.saturating_mul(factor).min(MAX_RETRY_DELAY_MS))
    }
}

fn deliver(updates: &UpdateSender, ticket: &LoadTicket, result: CommitResult) {
    // the receiver only goes away with the app
    let _ = updates.send(LoadUpdate {
        ticket: ticket.clone(),
        result,
    });
}

/// Fetch a component list once, expecting 200 or 404, and commit it.
///
/// Errors are only shown when the commit is applied, so a failure of a
/// superseded load leaves the error slot alone.
#[instrument(skip_all, fields(url = %ticket.url, key = %ticket.key))]
pub async fn fetch(requester: Requester, slots: Arc<LoadSlots>, ticket: LoadTicket, updates: UpdateSender) {
    let mut error = None;
    let outcome = match requester.send(RequestArgs::get(&ticket.url).expect(&[200, 404])).await {
        Ok((404, _)) => LoadOutcome::NotFound,
        Ok((_, data)) => match ComponentNode::list_from_value(data) {
            Ok(components) => LoadOutcome::Loaded(components),
            Err(err) => {
                warn!(error = %err, "Page response is not a component list");
                error = Some(FetchError::Invalid(err.to_string()));
                LoadOutcome::Failed
            }
        },
        Err(err) => {
            error = Some(FetchError::Request(err));
            LoadOutcome::Failed
        }
    };

    let result = slots.commit(&ticket, outcome);
    match (result, error) {
        (CommitResult::Applied, Some(FetchError::Request(err))) => requester.report(&err),
        (CommitResult::Applied, Some(FetchError::Invalid(reason))) => requester
            .errors()
            .set(Some(ErrorDetails::new("Invalid Server Response", reason))),
        (CommitResult::Stale, Some(_)) => debug!("Dropping error of a superseded load"),
        _ => {}
    }
    deliver(&updates, &ticket, result);
}

enum FetchError {
    Request(RequestError),
    Invalid(String),
}

/// Follow an event stream, replacing the slot's tree with every message.
///
/// Dropped connections are retried with a doubling delay; after
/// `max_retries` consecutive failures the stream stops without reporting an
/// error. The loop also ends as soon as the slot moves on to another load.
#[instrument(skip_all, fields(url = %ticket.url, key = %ticket.key))]
pub async fn stream(
    requester: Requester,
    slots: Arc<LoadSlots>,
    ticket: LoadTicket,
    retry: RetryPolicy,
    updates: UpdateSender,
) {
    let mut failures = 0;
    loop {
        if !slots.is_current(&ticket) {
            debug!("Stream no longer mounted");
            return;
        }

        match requester.open_stream(&ticket.url).await {
            Ok(mut events) => {
                while let Some(event) = events.next().await {
                    let data = match event {
                        Ok(data) => data,
                        Err(err) => {
                            debug!(error = %err, "Stream dropped");
                            break;
                        }
                    };
                    let components = match ComponentNode::list_from_str(&data) {
                        Ok(components) => components,
                        Err(err) => {
                            warn!(error = %err, "Ignoring invalid stream message");
                            continue;
                        }
                    };
                    let result = slots.commit(&ticket, LoadOutcome::Loaded(components));
                    deliver(&updates, &ticket, result);
                    if result == CommitResult::Stale {
                        return;
                    }
                    failures = 0;
                }
            }
            Err(err) => debug!(error = %err, "Stream connection failed"),
        }

        failures += 1;
        if failures > retry.max_retries {
            debug!(failures, "Giving up on stream");
            let result = slots.commit(&ticket, LoadOutcome::Failed);
            deliver(&updates, &ticket, result);
            return;
        }
        let delay = retry.delay(failures);
        debug!(attempt = failures, delay_ms = delay.as_millis() as u64, "Reconnecting stream");
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_ms: 1000,
        };
        assert_eq!(policy.delay(1), Duration::from_millis(1000));
        assert_eq!(policy.delay(2), Duration::from_millis(2000));
        assert_eq!(policy.delay(4), Duration::from_millis(8000));
        assert_eq!(policy.delay(6), Duration::from_millis(MAX_RETRY_DELAY_MS));
        assert_eq!(policy.delay(40), Duration::from_millis(MAX_RETRY_DELAY_MS));
    }
}
