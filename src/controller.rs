//! Query controller: the state machine coordinating debounce, cancellation,
//! pagination, and favorite annotation.
//!
//! One owner task per controller holds all mutable session state. Callers
//! talk to it through a cheap command handle; it publishes state snapshots
//! over a watch channel. Fetches run on spawned tasks and report back over
//! an internal event channel tagged with the generation they were issued
//! under, so a superseded fetch can never corrupt the accumulated list.

use crate::client::SearchClient;
use crate::debounce::QueryDebouncer;
use crate::error::SearchError;
use crate::merger;
use crate::projection;
use crate::store::FavoritesStore;
use crate::types::{ControllerConfig, Item, SortDirection};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Snapshot of everything a presenter needs to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Query of the current session (trimmed)
    pub query: String,
    /// Accumulated items in fetch-arrival order
    pub items: Vec<Item>,
    /// First-page fetch in flight
    pub is_loading: bool,
    /// Continuation-page fetch in flight
    pub is_loading_next_page: bool,
    /// Whether the server has more matches than we accumulated
    pub can_load_more: bool,
    /// Whether the latest fetch attempt has finished (success or failure)
    pub completed: bool,
    /// The single user-visible message slot; replaced by newer outcomes
    pub alert_message: Option<String>,
    /// Current display ordering
    pub sort_direction: SortDirection,
}

impl ControllerState {
    fn new(sort_direction: SortDirection) -> Self {
        Self {
            query: String::new(),
            items: Vec::new(),
            is_loading: false,
            is_loading_next_page: false,
            can_load_more: true,
            completed: false,
            alert_message: None,
            sort_direction,
        }
    }

    /// View-ready ordering of the accumulated items.
    pub fn displayed(&self) -> Vec<Item> {
        projection::project(&self.items, self.sort_direction)
    }
}

/// Mutation entry points, delivered to the owner task.
enum Command {
    QueryChanged(String),
    StartSearch(String),
    LoadMoreIfNeeded { anchor_id: u64 },
    ToggleLike { item_id: u64 },
    SetSortDirection(SortDirection),
    Shutdown,
}

/// Completions coming home from spawned tasks.
enum Event {
    FetchDone {
        generation: u64,
        outcome: Result<MergedPage, SearchError>,
    },
    LikePersisted {
        item_id: u64,
        ok: bool,
    },
}

/// A fetched page already annotated with the favorites snapshot.
struct MergedPage {
    items: Vec<Item>,
    total_count: u64,
}

/// Handle to a running query controller.
///
/// Command methods are non-blocking; they enqueue work for the owner task.
/// Dropping the handle shuts the controller down.
pub struct QueryController {
    command_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ControllerState>,
    task: Option<JoinHandle<()>>,
}

impl QueryController {
    /// Spawn a controller over the given collaborators.
    ///
    /// Loads the persisted sort direction before the first render; a store
    /// failure falls back to the default and is logged.
    pub async fn new(
        client: Arc<dyn SearchClient>,
        store: Arc<dyn FavoritesStore>,
        config: ControllerConfig,
    ) -> Self {
        let sort_direction = match store.load_sort_direction().await {
            Ok(direction) => direction,
            Err(error) => {
                log::warn!("failed to load sort direction, using default: {error:#}");
                SortDirection::default()
            }
        };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ControllerState::new(sort_direction));

        let task = ControllerTask {
            client,
            store,
            debouncer: QueryDebouncer::new(config.debounce),
            config,
            state: ControllerState::new(sort_direction),
            page_cursor: 1,
            generation: 0,
            inflight: None,
            event_tx,
            state_tx,
        };
        let task = tokio::spawn(task.run(command_rx, event_rx));

        Self {
            command_tx,
            state_rx,
            task: Some(task),
        }
    }

    /// Record a keystroke-level query edit; fetches after the quiet period.
    pub fn on_query_changed(&self, text: impl Into<String>) {
        let _ = self.command_tx.send(Command::QueryChanged(text.into()));
    }

    /// Start a search immediately, bypassing the debounce window.
    pub fn start_search(&self, query: impl Into<String>) {
        let _ = self.command_tx.send(Command::StartSearch(query.into()));
    }

    /// Request the next page when `anchor_id` is the last displayed item.
    pub fn load_more_if_needed(&self, anchor_id: u64) {
        let _ = self.command_tx.send(Command::LoadMoreIfNeeded { anchor_id });
    }

    /// Optimistically flip an item's liked flag and persist the toggle.
    pub fn toggle_like(&self, item_id: u64) {
        let _ = self.command_tx.send(Command::ToggleLike { item_id });
    }

    /// Change the display ordering and persist it. Never re-fetches.
    pub fn set_sort_direction(&self, direction: SortDirection) {
        let _ = self.command_tx.send(Command::SetSortDirection(direction));
    }

    /// Latest published state.
    pub fn state(&self) -> ControllerState {
        self.state_rx.borrow().clone()
    }

    /// Receiver for state updates, for presenters and tests.
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state_rx.clone()
    }

    /// Stop the owner task and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for QueryController {
    fn drop(&mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
    }
}

/// State owned by the controller task. All mutation happens here.
struct ControllerTask {
    client: Arc<dyn SearchClient>,
    store: Arc<dyn FavoritesStore>,
    config: ControllerConfig,
    debouncer: QueryDebouncer,
    state: ControllerState,
    /// Next page to request, 1-based
    page_cursor: u32,
    /// Generation of the newest issued fetch; older completions are stale
    generation: u64,
    /// Cancellation token of the in-flight fetch, if any
    inflight: Option<CancellationToken>,
    event_tx: mpsc::UnboundedSender<Event>,
    state_tx: watch::Sender<ControllerState>,
}

impl ControllerTask {
    async fn run(
        mut self,
        mut command_rx: mpsc::UnboundedReceiver<Command>,
        mut event_rx: mpsc::UnboundedReceiver<Event>,
    ) {
        log::debug!("query controller started");
        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                command = command_rx.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }
                Some(event) = event_rx.recv() => self.handle_event(event),
                _ = sleep_until_deadline(deadline), if deadline.is_some() => {
                    if let Some(query) = self.debouncer.fire() {
                        self.start_search(query);
                    }
                }
            }
            self.publish();
        }

        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
        log::debug!("query controller stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::QueryChanged(text) => self.debouncer.note_input(&text),
            Command::StartSearch(query) => {
                let query = query.trim().to_string();
                self.debouncer.record_fired(&query);
                self.start_search(query);
            }
            Command::LoadMoreIfNeeded { anchor_id } => self.load_more_if_needed(anchor_id),
            Command::ToggleLike { item_id } => self.toggle_like(item_id),
            Command::SetSortDirection(direction) => self.set_sort_direction(direction),
            Command::Shutdown => unreachable!("handled in run loop"),
        }
    }

    /// Replace the session with a fresh one for `query`.
    ///
    /// The in-flight fetch of the old session is cancelled, not awaited.
    fn start_search(&mut self, query: String) {
        log::debug!("starting search for {:?}", query);
        self.cancel_inflight();
        self.state.is_loading = false;
        self.state.is_loading_next_page = false;
        self.state.alert_message = None;
        self.state.items.clear();
        self.page_cursor = 1;
        self.state.query = query;

        if self.state.query.is_empty() {
            // Empty query is an empty result, not an error and not a fetch
            self.state.can_load_more = false;
            self.state.completed = true;
            return;
        }

        self.state.can_load_more = true;
        self.state.completed = false;
        self.fetch_current_page();
    }

    /// Issue a fetch for the current page unless one is already in flight
    /// or the session is exhausted.
    fn fetch_current_page(&mut self) {
        if self.state.is_loading || self.state.is_loading_next_page {
            log::debug!("fetch skipped: request already in flight");
            return;
        }
        if !self.state.can_load_more {
            log::debug!("fetch skipped: no more pages");
            return;
        }

        // At most one outstanding call per controller
        self.cancel_inflight();
        let generation = self.generation;
        let token = CancellationToken::new();
        self.inflight = Some(token.clone());

        if self.page_cursor == 1 {
            self.state.is_loading = true;
        } else {
            self.state.is_loading_next_page = true;
        }

        let client = Arc::clone(&self.client);
        let store = Arc::clone(&self.store);
        let event_tx = self.event_tx.clone();
        let query = self.state.query.clone();
        let page = self.page_cursor;
        let page_size = self.config.page_size;

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    log::debug!("fetch for {:?} page {} superseded", query, page);
                    return;
                }
                outcome = fetch_and_merge(client, store, query.clone(), page, page_size) => outcome,
            };
            let _ = event_tx.send(Event::FetchDone {
                generation,
                outcome,
            });
        });
    }

    fn load_more_if_needed(&mut self, anchor_id: u64) {
        // Only the last item of the displayed (sorted) order triggers a
        // continuation; anything else is a re-render, not a scroll-to-end.
        match self.state.displayed().last() {
            Some(last) if last.id == anchor_id => self.fetch_current_page(),
            _ => {}
        }
    }

    fn toggle_like(&mut self, item_id: u64) {
        let Some(item) = self.state.items.iter_mut().find(|i| i.id == item_id) else {
            log::debug!("toggle ignored for unknown item {item_id}");
            return;
        };
        item.liked = !item.liked;
        let snapshot = item.clone();

        let store = Arc::clone(&self.store);
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            let ok = match store.toggle(&snapshot).await {
                Ok(()) => true,
                Err(error) => {
                    log::warn!(
                        "failed to persist favorite toggle for {}: {error:#}",
                        snapshot.id
                    );
                    false
                }
            };
            let _ = event_tx.send(Event::LikePersisted { item_id, ok });
        });
    }

    fn set_sort_direction(&mut self, direction: SortDirection) {
        self.state.sort_direction = direction;
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            if let Err(error) = store.save_sort_direction(direction).await {
                log::warn!("failed to persist sort direction: {error:#}");
            }
        });
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::FetchDone {
                generation,
                outcome,
            } => self.apply_fetch_outcome(generation, outcome),
            Event::LikePersisted { item_id, ok } => {
                if !ok && self.config.rollback_on_persist_failure {
                    if let Some(item) = self.state.items.iter_mut().find(|i| i.id == item_id) {
                        item.liked = !item.liked;
                    }
                }
            }
        }
    }

    fn apply_fetch_outcome(
        &mut self,
        generation: u64,
        outcome: Result<MergedPage, SearchError>,
    ) {
        if generation != self.generation {
            log::debug!(
                "discarding stale fetch result (generation {generation}, current {})",
                self.generation
            );
            return;
        }

        self.inflight = None;
        self.state.is_loading = false;
        self.state.is_loading_next_page = false;
        self.state.completed = true;

        match outcome {
            Ok(page) => {
                self.state.items.extend(page.items);
                self.page_cursor += 1;
                self.state.can_load_more = (self.state.items.len() as u64) < page.total_count;
                self.state.alert_message = None;
                log::debug!(
                    "accumulated {} of {} items for {:?}",
                    self.state.items.len(),
                    page.total_count,
                    self.state.query
                );
            }
            Err(error) => {
                log::warn!("search fetch failed: {error}");
                self.state.alert_message = Some(error.user_message());
            }
        }
    }

    /// Cancel the in-flight fetch and invalidate its eventual completion.
    fn cancel_inflight(&mut self) {
        if let Some(token) = self.inflight.take() {
            token.cancel();
        }
        self.generation += 1;
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

/// Fetch one page and annotate it with a fresh favorites snapshot.
async fn fetch_and_merge(
    client: Arc<dyn SearchClient>,
    store: Arc<dyn FavoritesStore>,
    query: String,
    page: u32,
    page_size: u32,
) -> Result<MergedPage, SearchError> {
    let result_page = client.fetch_page(&query, page, page_size).await?;

    let favorite_ids: HashSet<u64> = match store.load_all_ids().await {
        Ok(ids) => ids,
        Err(error) => {
            // Annotation degrades gracefully; the fetch itself succeeded
            log::warn!("favorites snapshot unavailable: {error:#}");
            HashSet::new()
        }
    };

    let items = merger::merge(&result_page, &favorite_ids);
    Ok(MergedPage {
        items,
        total_count: result_page.total_count,
    })
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
