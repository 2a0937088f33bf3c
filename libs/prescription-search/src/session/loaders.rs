//! One-shot loaders for the "recent" list and the detail view
//!
//! Each loader publishes its own [`FetchState`] and fetches immediately on
//! spawn and again whenever its input changes. There is no debounce.

use super::state::FetchState;
use crate::error::Result;
use crate::models::Prescription;
use crate::service::PrescriptionSearchService;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Shared fetch machinery: a state channel plus a generation counter so that
/// only the newest fetch may publish.
struct Loader<T> {
    state: Arc<watch::Sender<FetchState<T>>>,
    generation: Arc<AtomicU64>,
}

impl<T> Loader<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn new() -> Self {
        let (state, _) = watch::channel(FetchState::default());
        Self {
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn load<F>(&self, fetch: F)
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let state = Arc::clone(&self.state);
        let latest = Arc::clone(&self.generation);
        tokio::spawn(async move {
            let outcome = fetch.await;
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "Discarding stale fetch result");
                return;
            }
            state.send_modify(|state| {
                state.loading = false;
                match outcome {
                    Ok(data) => state.data = data,
                    Err(e) => {
                        state.data = T::default();
                        state.error = Some(e.to_string());
                    }
                }
            });
        });
    }

    /// Publish a value without fetching; in-flight fetches become stale.
    fn settle(&self, data: T) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(FetchState {
            data,
            loading: false,
            error: None,
        });
    }

    fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.state.subscribe()
    }

    fn snapshot(&self) -> FetchState<T> {
        self.state.borrow().clone()
    }
}

/// Most recently created prescriptions
pub struct RecentPrescriptions {
    service: Arc<PrescriptionSearchService>,
    loader: Loader<Vec<Prescription>>,
}

impl RecentPrescriptions {
    /// Start loading the newest `limit` prescriptions. Requires a Tokio runtime.
    pub fn spawn(service: Arc<PrescriptionSearchService>, limit: usize) -> Self {
        let this = Self {
            service,
            loader: Loader::new(),
        };
        this.set_limit(limit);
        this
    }

    pub fn set_limit(&self, limit: usize) {
        let service = Arc::clone(&self.service);
        self.loader
            .load(async move { service.try_get_recent_prescriptions(limit).await });
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Vec<Prescription>>> {
        self.loader.subscribe()
    }

    pub fn snapshot(&self) -> FetchState<Vec<Prescription>> {
        self.loader.snapshot()
    }
}

/// A single prescription by id
pub struct PrescriptionLookup {
    service: Arc<PrescriptionSearchService>,
    loader: Loader<Option<Prescription>>,
}

impl PrescriptionLookup {
    /// Start loading `id`. `None` settles immediately with no data.
    pub fn spawn(service: Arc<PrescriptionSearchService>, id: Option<String>) -> Self {
        let this = Self {
            service,
            loader: Loader::new(),
        };
        this.set_id(id);
        this
    }

    pub fn set_id(&self, id: Option<String>) {
        match id {
            Some(id) => {
                let service = Arc::clone(&self.service);
                self.loader
                    .load(async move { service.try_get_prescription_by_id(&id).await });
            }
            None => self.loader.settle(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState<Option<Prescription>>> {
        self.loader.subscribe()
    }

    pub fn snapshot(&self) -> FetchState<Option<Prescription>> {
        self.loader.snapshot()
    }
}
