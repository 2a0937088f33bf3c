//! Prescription search service
//!
//! Single entry point for reads. The service decides once, at construction,
//! which store serves ordinary reads and which serves admin search, and it owns
//! every recovery rule:
//!
//! - ordinary reads try the primary store, then the local store
//! - admin search never falls back; a failure yields an empty page
//! - every store call is bounded by the request timeout

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::Prescription;
use crate::params::SearchParams;
use crate::query_builder::SearchPlan;
use crate::results::SearchResults;
use crate::store::{LocalStore, PrescriptionStore, RemoteStore, StorePage};
use crate::suggest::is_suggestable;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only access to prescriptions with fallback to local data
#[derive(Clone)]
pub struct PrescriptionSearchService {
    primary: Option<Arc<dyn PrescriptionStore>>,
    admin: Option<Arc<dyn PrescriptionStore>>,
    fallback: Arc<dyn PrescriptionStore>,
    request_timeout: Duration,
}

impl std::fmt::Debug for PrescriptionSearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrescriptionSearchService")
            .field("primary", &self.primary.as_ref().map(|s| s.name()))
            .field("admin", &self.admin.as_ref().map(|s| s.name()))
            .field("fallback", &self.fallback.name())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl PrescriptionSearchService {
    /// Service with only a fallback store; every call is served locally.
    pub fn new(fallback: Arc<dyn PrescriptionStore>) -> Self {
        Self {
            primary: None,
            admin: None,
            fallback,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Service over the bundled sample data.
    pub fn local() -> Result<Self> {
        Ok(Self::new(Arc::new(LocalStore::sample()?)))
    }

    /// Build from configuration. Missing backend settings select local data.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut service = Self::local()?.with_request_timeout(config.backend.request_timeout());

        if let Some(options) = config.backend.public_options() {
            service = service.with_primary(Arc::new(RemoteStore::new(options)?));
        } else {
            tracing::info!("No backend configured, serving bundled sample data");
        }
        if let Some(options) = config.backend.admin_options() {
            service = service.with_admin(Arc::new(RemoteStore::elevated(options)?));
        }

        Ok(service)
    }

    pub fn with_primary(mut self, store: Arc<dyn PrescriptionStore>) -> Self {
        self.primary = Some(store);
        self
    }

    pub fn with_admin(mut self, store: Arc<dyn PrescriptionStore>) -> Self {
        self.admin = Some(store);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Whether ordinary reads go to a remote backend.
    pub fn is_remote(&self) -> bool {
        self.primary.is_some()
    }

    /// Search with fallback. Never fails; a double failure yields an empty page.
    pub async fn search_prescriptions(&self, params: &SearchParams) -> SearchResults {
        match self.try_search_prescriptions(params).await {
            Ok(results) => results,
            Err(_) => SearchResults::empty(params.page_size_or_default()),
        }
    }

    /// Search with fallback, returning the error when no store could answer.
    pub async fn try_search_prescriptions(&self, params: &SearchParams) -> Result<SearchResults> {
        let plan = SearchPlan::from_params(params);
        let page = self
            .with_fallback("search", |store| {
                let plan = &plan;
                async move { store.search(plan).await }
            })
            .await?;
        Ok(into_results(page, &plan))
    }

    /// Load one prescription. `None` when not found or no store could answer.
    pub async fn get_prescription_by_id(&self, id: &str) -> Option<Prescription> {
        self.try_get_prescription_by_id(id).await.ok().flatten()
    }

    pub async fn try_get_prescription_by_id(&self, id: &str) -> Result<Option<Prescription>> {
        self.with_fallback("find_by_id", |store| async move { store.find_by_id(id).await })
            .await
    }

    /// Autocomplete values; queries under two characters never reach a store.
    pub async fn get_search_suggestions(&self, query: &str) -> Vec<String> {
        if !is_suggestable(query) {
            return Vec::new();
        }
        self.with_fallback("suggest", |store| async move { store.suggest(query).await })
            .await
            .unwrap_or_default()
    }

    /// Most recently created prescriptions, newest first.
    pub async fn get_recent_prescriptions(&self, limit: usize) -> Vec<Prescription> {
        self.try_get_recent_prescriptions(limit).await.unwrap_or_default()
    }

    pub async fn try_get_recent_prescriptions(&self, limit: usize) -> Result<Vec<Prescription>> {
        self.with_fallback("recent", |store| async move { store.recent(limit).await })
            .await
    }

    /// Search with elevated access. Never fails; errors yield an empty page.
    pub async fn admin_search(&self, params: &SearchParams) -> SearchResults {
        match self.try_admin_search(params).await {
            Ok(results) => results,
            Err(_) => SearchResults::empty(params.page_size_or_default()),
        }
    }

    /// Search with elevated access and no fallback.
    ///
    /// Without an admin store the local store answers.
    pub async fn try_admin_search(&self, params: &SearchParams) -> Result<SearchResults> {
        let plan = SearchPlan::from_params(params);
        let store = self.admin.as_ref().unwrap_or(&self.fallback);

        match self.bounded(store.search(&plan)).await {
            Ok(page) => Ok(into_results(page, &plan)),
            Err(e) => {
                tracing::error!(store = store.name(), error = %e, "Admin search failed");
                Err(e)
            }
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.request_timeout, call)
            .await
            .map_err(|_| Error::Timeout(self.request_timeout))?
    }

    /// Run `op` on the primary store, then on the fallback store if the
    /// primary is absent or fails.
    async fn with_fallback<'a, T, F, Fut>(&'a self, operation: &'static str, op: F) -> Result<T>
    where
        F: Fn(&'a dyn PrescriptionStore) -> Fut,
        Fut: Future<Output = Result<T>> + 'a,
    {
        if let Some(primary) = &self.primary {
            match self.bounded(op(primary.as_ref())).await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        operation,
                        store = primary.name(),
                        error = %e,
                        "Primary store failed, falling back to local data"
                    );
                }
            }
        }

        self.bounded(op(self.fallback.as_ref())).await.map_err(|e| {
            tracing::error!(
                operation,
                store = self.fallback.name(),
                error = %e,
                "Fallback store failed"
            );
            e
        })
    }
}

fn into_results(page: StorePage, plan: &SearchPlan) -> SearchResults {
    SearchResults::new(page.rows, page.count, plan.window.page, plan.window.page_size)
}
