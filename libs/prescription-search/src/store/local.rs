//! In-memory store over the sample dataset
//!
//! Mirrors the remote search contract exactly so callers cannot tell which
//! backend answered: same predicates, same ordering, same paging.

use super::sample::{self, SampleRecord};
use super::{PrescriptionStore, StorePage};
use crate::models::Prescription;
use crate::params::SearchParams;
use crate::query_builder::{contains_ci, SearchPlan, SortSpec};
use crate::results::SearchResults;
use crate::suggest::{is_suggestable, merge_suggestions};
use crate::{params::SortField, Result};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;

/// Read-only store backed by an immutable list of prescriptions
#[derive(Debug, Clone)]
pub struct LocalStore {
    rows: Arc<Vec<Prescription>>,
}

impl LocalStore {
    /// Store over the bundled sample dataset.
    pub fn sample() -> Result<Self> {
        Self::from_records(sample::bundled_records()?)
    }

    /// Store over records in the sample (front-end) shape.
    pub fn from_records(records: Vec<SampleRecord>) -> Result<Self> {
        let rows = records
            .into_iter()
            .map(SampleRecord::into_prescription)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_prescriptions(rows))
    }

    /// Store over rows already in the canonical shape.
    pub fn from_prescriptions(rows: Vec<Prescription>) -> Self {
        Self {
            rows: Arc::new(rows),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Evaluate a plan: filter, sort, then slice the requested page.
    pub fn execute(&self, plan: &SearchPlan) -> StorePage {
        let mut matched: Vec<&Prescription> = self.rows.iter().collect();
        for predicate in &plan.predicates {
            matched.retain(|p| predicate.matches(p));
        }

        // Stable sort; equal keys keep dataset order.
        matched.sort_by(|a, b| compare(a, b, &plan.sort));

        let count = matched.len() as u64;
        let offset = usize::try_from(plan.window.offset()).unwrap_or(usize::MAX);
        let rows = matched
            .into_iter()
            .skip(offset)
            .take(plan.window.page_size as usize)
            .cloned()
            .collect();

        StorePage { rows, count }
    }

    /// Search with the same semantics as the remote backend.
    pub fn search_prescriptions(&self, params: &SearchParams) -> SearchResults {
        let plan = SearchPlan::from_params(params);
        let page = self.execute(&plan);
        SearchResults::new(page.rows, page.count, plan.window.page, plan.window.page_size)
    }

    /// The sample data has no elevated access level; this is a plain search.
    pub fn admin_search(&self, params: &SearchParams) -> SearchResults {
        self.search_prescriptions(params)
    }

    /// Ids, then patient names, then doctor names containing `query`.
    pub fn get_search_suggestions(&self, query: &str) -> Vec<String> {
        if !is_suggestable(query) {
            return Vec::new();
        }
        let column = |field: fn(&Prescription) -> &String| -> Vec<String> {
            self.rows
                .iter()
                .map(field)
                .filter(|value| contains_ci(value, query))
                .cloned()
                .collect()
        };
        merge_suggestions([
            column(|p| &p.id),
            column(|p| &p.patient_name),
            column(|p| &p.doctor_name),
        ])
    }

    pub fn get_prescription_by_id(&self, id: &str) -> Option<Prescription> {
        self.rows.iter().find(|p| p.id == id).cloned()
    }

    /// Newest `created_at` first; ties keep dataset order.
    pub fn get_recent_prescriptions(&self, limit: usize) -> Vec<Prescription> {
        let mut rows: Vec<&Prescription> = self.rows.iter().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.into_iter().take(limit).cloned().collect()
    }
}

fn compare(a: &Prescription, b: &Prescription, sort: &SortSpec) -> Ordering {
    let ordering = match sort.field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::PatientName => a.patient_name.cmp(&b.patient_name),
        SortField::DoctorName => a.doctor_name.cmp(&b.doctor_name),
        SortField::DoctorCrm => a.doctor_crm.cmp(&b.doctor_crm),
        SortField::Date => a.date.cmp(&b.date),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    if sort.ascending {
        ordering
    } else {
        ordering.reverse()
    }
}

#[async_trait]
impl PrescriptionStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn search(&self, plan: &SearchPlan) -> Result<StorePage> {
        Ok(self.execute(plan))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Prescription>> {
        Ok(self.get_prescription_by_id(id))
    }

    async fn suggest(&self, query: &str) -> Result<Vec<String>> {
        Ok(self.get_search_suggestions(query))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Prescription>> {
        Ok(self.get_recent_prescriptions(limit))
    }
}
