//! Observable session state

use crate::params::SearchParams;
use crate::results::SearchResults;

/// Snapshot published by a [`SearchSession`](super::SearchSession)
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    /// Params that drive the debounced search
    pub params: SearchParams,
    pub results: SearchResults,
    pub loading: bool,
    /// Message of the last failed search, cleared by the next dispatch
    pub error: Option<String>,
    pub suggestions: Vec<String>,
}

impl SearchState {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            results: SearchResults::default(),
            loading: false,
            error: None,
            suggestions: Vec::new(),
        }
    }
}

/// State of a one-shot fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T: Default> Default for FetchState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            loading: false,
            error: None,
        }
    }
}
