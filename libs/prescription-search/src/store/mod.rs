//! Storage backends for prescription search
//!
//! A [`PrescriptionStore`] answers search plans, single lookups, suggestions and
//! "recent" listings. Two implementations exist:
//! - [`RemoteStore`]: PostgREST backend over HTTP
//! - [`LocalStore`]: compiled-in sample dataset for offline/demo use

pub mod local;
pub mod remote;
pub mod sample;

use crate::{models::Prescription, query_builder::SearchPlan, Result};
use async_trait::async_trait;

pub use local::LocalStore;
pub use remote::{RemoteStore, RemoteStoreOptions};

/// Rows of one page plus the total number of matches
#[derive(Debug, Clone, PartialEq)]
pub struct StorePage {
    pub rows: Vec<Prescription>,
    pub count: u64,
}

/// Read-only prescription storage.
///
/// Any backend (HTTP API, in-memory fixture, test double) can implement this
/// trait; the search service decides which one serves each call.
#[async_trait]
pub trait PrescriptionStore: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Run a filtered, sorted, paginated search
    async fn search(&self, plan: &SearchPlan) -> Result<StorePage>;

    /// Load one prescription with its medications
    ///
    /// # Returns
    /// * `Ok(Some(prescription))` - found
    /// * `Ok(None)` - no prescription with this id
    async fn find_by_id(&self, id: &str) -> Result<Option<Prescription>>;

    /// Autocomplete values for `query` (id, patient names, doctor names)
    ///
    /// Callers guarantee `query` is long enough to be suggestable.
    async fn suggest(&self, query: &str) -> Result<Vec<String>>;

    /// Most recently created prescriptions, newest first
    async fn recent(&self, limit: usize) -> Result<Vec<Prescription>>;
}
