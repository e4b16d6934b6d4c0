//! The driver tying rendering to the network.
//!
//! Every render pass may hand out load tickets; the app starts one task per
//! ticket and the tasks report back through a channel. Callers either step
//! through updates themselves (`render` / `changed`) or let `settle` run
//! passes until nothing is loading.

use crate::config::ClientConfig;
use crate::dev::DevReload;
use crate::error::ClientResult;
use crate::forms::{self, FormValues};
use crate::load::{self, LoadUpdate, RetryPolicy, UpdateSender};
use crate::request::Requester;
use crate::search::SearchDebouncer;
use crate::transport::{FilePart, Transport};
use sdui_model::{AnyEvent, SelectItem};
use sdui_renderer::{LoadMode, LoadSignal, LoadTicket, RenderOutput, Renderer, UiState};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};
use url::Url;

pub struct App {
    renderer: Renderer,
    state: Arc<UiState>,
    requester: Requester,
    config: ClientConfig,
    search: SearchDebouncer,
    updates_tx: UpdateSender,
    updates_rx: mpsc::UnboundedReceiver<LoadUpdate>,
    load_rx: watch::Receiver<LoadSignal>,
}

impl App {
    pub fn new(
        renderer: Renderer,
        transport: Arc<dyn Transport>,
        config: ClientConfig,
        initial_path: impl Into<String>,
    ) -> Self {
        let state = Arc::new(UiState::new(initial_path));
        match config.origin.as_deref().map(Url::parse) {
            Some(Ok(origin)) => state.navigation.set_origin(Some(origin)),
            Some(Err(err)) => warn!(error = %err, "Ignoring invalid origin"),
            None => {}
        }
        let requester = Requester::new(transport, Arc::clone(&state.auth), Arc::clone(&state.errors));
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let load_rx = state.navigation.subscribe_load();
        Self {
            renderer,
            state,
            requester,
            config,
            search: SearchDebouncer::new(),
            updates_tx,
            updates_rx,
            load_rx,
        }
    }

    pub fn state(&self) -> &Arc<UiState> {
        &self.state
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run one render pass, start the loads it asked for and fire the events
    /// of components that just mounted.
    pub fn render(&mut self) -> RenderOutput {
        // this pass sees the current load signal
        self.load_rx.borrow_and_update();
        let output = self.renderer.render(&self.state);
        for ticket in &output.pending {
            self.spawn_load(ticket.clone());
        }
        let dispatcher = self.state.dispatcher();
        for event in &output.effects {
            dispatcher.fire(Some(event));
        }
        output
    }

    fn spawn_load(&self, ticket: LoadTicket) {
        let requester = self.requester.clone();
        let slots = Arc::clone(&self.state.slots);
        let updates = self.updates_tx.clone();
        debug!(key = %ticket.key, url = %ticket.url, "Starting load task");
        let mode = ticket.mode;
        match mode {
            LoadMode::Fetch => {
                tokio::spawn(load::fetch(requester, slots, ticket, updates));
            }
            LoadMode::Stream { retry_ms } => {
                let retry = RetryPolicy {
                    max_retries: self.config.stream_retries,
                    base_ms: retry_ms.unwrap_or(self.config.stream_retry_base_ms),
                };
                tokio::spawn(load::stream(requester, slots, ticket, retry, updates));
            }
        }
    }

    /// Wait for the next load result
    pub async fn next_update(&mut self) -> Option<LoadUpdate> {
        self.updates_rx.recv().await
    }

    /// Wait until something may render differently: a load result arrived or
    /// a reload was requested (navigation, dev reload).
    pub async fn changed(&mut self) {
        tokio::select! {
            _ = self.updates_rx.recv() => {}
            _ = self.load_rx.changed() => {}
        }
    }

    /// Render until no load is pending and no mount effects remain.
    ///
    /// Gives up after `max_settle_rounds` passes and returns the last output.
    #[instrument(skip_all, fields(path = %self.state.navigation.full_path()))]
    pub async fn settle(&mut self) -> RenderOutput {
        let mut output = self.render();
        for _ in 0..self.config.max_settle_rounds {
            let loading = self.state.slots.any_loading();
            if !loading && output.effects.is_empty() {
                return output;
            }
            if loading && self.next_update().await.is_none() {
                break;
            }
            output = self.render();
        }
        warn!(rounds = self.config.max_settle_rounds, "Render did not settle");
        output
    }

    pub fn fire_event(&self, event: Option<&AnyEvent>) {
        self.state.dispatcher().fire(event);
    }

    pub async fn submit_form(&self, key: &str, values: FormValues) -> ClientResult<()> {
        forms::submit(&self.requester, &self.state, key, values).await
    }

    /// Submit a form with file fields, sent as a multipart body
    pub async fn submit_form_with_files(&self, key: &str, values: FormValues, files: Vec<FilePart>) -> ClientResult<()> {
        forms::submit_with_files(&self.requester, &self.state, key, values, files).await
    }

    /// A field of a `submitOnChange` form changed
    pub async fn change_form(&self, key: &str, values: FormValues) -> ClientResult<()> {
        match self.state.forms.target(key) {
            Some(target) if target.submit_on_change => self.submit_form(key, values).await,
            _ => Ok(()),
        }
    }

    /// Options for a select search field; `None` when a newer query superseded this one
    pub async fn search(&self, url: &str, debounce_ms: u64, query: &str) -> ClientResult<Option<Vec<SelectItem>>> {
        self.search.search(&self.requester, url, debounce_ms, query).await
    }

    /// Start polling the dev reload endpoint when dev mode is on
    pub fn start_dev_reload(&self) -> Option<JoinHandle<usize>> {
        if !self.config.dev_mode {
            return None;
        }
        let dev = DevReload::new(
            Arc::clone(self.requester.transport()),
            self.config.dev_reload_path.clone(),
            Arc::clone(&self.state.navigation),
            Arc::clone(&self.state.errors),
        );
        Some(tokio::spawn(async move { dev.run().await }))
    }
}
