//! Prescription search
//!
//! Filtered, sorted and paginated search over prescriptions and their
//! medications, backed by a PostgREST API with an offline fallback to a bundled
//! sample dataset.
//!
//! # Examples
//!
//! ## One-off search (async)
//!
//! ```rust,no_run
//! use receita_search::{PrescriptionSearchService, PrescriptionStatus, SearchParams};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = PrescriptionSearchService::local()?;
//! let params = SearchParams::new()
//!     .patient_name("silva")
//!     .status([PrescriptionStatus::Pending]);
//! let results = service.search_prescriptions(&params).await;
//! println!("{} of {}", results.data.len(), results.count);
//! # Ok(())
//! # }
//! ```
//!
//! ## Debounced session
//!
//! ```rust,no_run
//! use receita_search::{PrescriptionSearchService, SearchParams, SearchParamsPatch, SearchSession};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Arc::new(PrescriptionSearchService::local()?);
//! let session = SearchSession::new(service, SearchParams::new());
//! session.update_search_params(SearchParamsPatch::new().query("RX-2024"));
//! let mut state = session.subscribe();
//! state.changed().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod params;
pub mod query_builder;
pub mod results;
pub mod service;
pub mod session;
pub mod store;
pub mod suggest;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{Medication, Prescription, PrescriptionStatus};
pub use params::{SearchParams, SearchParamsPatch, SortField, SortOrder};
pub use results::SearchResults;
pub use service::PrescriptionSearchService;
pub use session::{FetchState, PrescriptionLookup, RecentPrescriptions, SearchSession, SearchState};
pub use store::{LocalStore, PrescriptionStore, RemoteStore, RemoteStoreOptions};
