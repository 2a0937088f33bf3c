//! Interactive search session
//!
//! A [`SearchSession`] holds the current [`SearchParams`] and publishes a
//! [`SearchState`] through a `watch` channel. Parameter changes are debounced:
//! a background task waits for a quiet period and then runs only the last
//! settled params of a burst. Every dispatch takes a generation number and only
//! the newest one may write results, so slow responses never overwrite newer ones.

pub mod loaders;
pub mod state;

pub use loaders::{PrescriptionLookup, RecentPrescriptions};
pub use state::{FetchState, SearchState};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::params::{SearchParams, SearchParamsPatch};
use crate::results::SearchResults;
use crate::service::PrescriptionSearchService;
use crate::suggest::is_suggestable;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchKind {
    Standard,
    Admin,
}

struct Shared {
    service: Arc<PrescriptionSearchService>,
    state: watch::Sender<SearchState>,
    generation: AtomicU64,
    suggestion_generation: AtomicU64,
}

impl Shared {
    /// Run a search and publish its outcome if no newer dispatch exists.
    async fn dispatch(&self, params: SearchParams, kind: SearchKind) -> SearchResults {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let outcome: Result<SearchResults> = match kind {
            SearchKind::Standard => self.service.try_search_prescriptions(&params).await,
            SearchKind::Admin => self.service.try_admin_search(&params).await,
        };
        let results = match &outcome {
            Ok(results) => results.clone(),
            Err(_) => SearchResults::empty(params.page_size_or_default()),
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, ?kind, "Discarding stale search response");
            return results;
        }

        self.state.send_modify(|state| {
            state.loading = false;
            state.results = results.clone();
            state.error = outcome.err().map(|e| e.to_string());
        });
        results
    }
}

/// Debounced, observable prescription search
pub struct SearchSession {
    shared: Arc<Shared>,
    params: watch::Sender<SearchParams>,
    initial: SearchParams,
    debounce_task: JoinHandle<()>,
}

impl SearchSession {
    /// Start a session with the default debounce. Requires a Tokio runtime.
    ///
    /// The initial params are searched once the first quiet period elapses.
    pub fn new(service: Arc<PrescriptionSearchService>, initial: SearchParams) -> Self {
        Self::with_debounce(service, initial, DEFAULT_DEBOUNCE)
    }

    /// Start a session using the search settings from configuration.
    ///
    /// `default_page_size` applies when `initial` has no page size.
    pub fn from_config(
        service: Arc<PrescriptionSearchService>,
        config: &SearchConfig,
        mut initial: SearchParams,
    ) -> Self {
        if initial.page_size.is_none() {
            initial.page_size = Some(config.default_page_size);
        }
        Self::with_debounce(service, initial, config.debounce())
    }

    pub fn with_debounce(
        service: Arc<PrescriptionSearchService>,
        initial: SearchParams,
        debounce: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SearchState::new(initial.clone()));
        let shared = Arc::new(Shared {
            service,
            state,
            generation: AtomicU64::new(0),
            suggestion_generation: AtomicU64::new(0),
        });

        let (params, params_rx) = watch::channel(initial.clone());
        let debounce_task = tokio::spawn(debounce_loop(Arc::clone(&shared), params_rx, debounce));

        Self {
            shared,
            params,
            initial,
            debounce_task,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    pub fn params(&self) -> SearchParams {
        self.params.borrow().clone()
    }

    /// Merge `patch` into the current params and return to page 1.
    pub fn update_search_params(&self, patch: SearchParamsPatch) {
        let next = self.params.borrow().merged(patch);
        self.set_params(next);
    }

    /// Move to `page`, keeping every filter.
    pub fn go_to_page(&self, page: u32) {
        let mut next = self.params.borrow().clone();
        next.page = Some(page.max(1));
        self.set_params(next);
    }

    /// Restore the params the session started with.
    pub fn reset_search(&self) {
        self.set_params(self.initial.clone());
    }

    fn set_params(&self, next: SearchParams) {
        self.shared
            .state
            .send_modify(|state| state.params = next.clone());
        self.params.send_replace(next);
    }

    /// Refresh suggestions immediately. Short queries clear them.
    ///
    /// Only the latest call publishes; an older lookup that answers late is
    /// returned to its caller but leaves the state alone.
    pub async fn get_suggestions(&self, query: &str) -> Vec<String> {
        let generation = self
            .shared
            .suggestion_generation
            .fetch_add(1, Ordering::SeqCst)
            + 1;
        let suggestions = if is_suggestable(query) {
            self.shared.service.get_search_suggestions(query).await
        } else {
            Vec::new()
        };

        if self.shared.suggestion_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, query, "Discarding stale suggestions");
            return suggestions;
        }
        self.shared
            .state
            .send_modify(|state| state.suggestions = suggestions.clone());
        suggestions
    }

    /// Search with explicit params right away, bypassing the debounce.
    pub async fn perform_search(&self, params: SearchParams) -> SearchResults {
        self.shared.dispatch(params, SearchKind::Standard).await
    }

    /// Admin search with explicit params right away. Errors surface in the state.
    pub async fn admin_search(&self, params: SearchParams) -> SearchResults {
        self.shared.dispatch(params, SearchKind::Admin).await
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.debounce_task.abort();
    }
}

async fn debounce_loop(
    shared: Arc<Shared>,
    mut params: watch::Receiver<SearchParams>,
    quiet: Duration,
) {
    // The initial params count as a change.
    let mut pending = true;
    loop {
        if !pending && params.changed().await.is_err() {
            return;
        }
        pending = false;

        loop {
            tokio::select! {
                changed = params.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(quiet) => break,
            }
        }

        let settled = params.borrow_and_update().clone();
        let shared = Arc::clone(&shared);
        tokio::spawn(async move {
            shared.dispatch(settled, SearchKind::Standard).await;
        });
    }
}
