//! Search plan construction
//!
//! Turns [`SearchParams`] into an explicit list of predicates plus sort and page
//! window. Both stores consume the same plan: the local store evaluates the
//! predicates in memory, the remote store renders them as PostgREST filters.

pub mod escape;
pub mod postgrest;

use crate::models::{Prescription, PrescriptionStatus};
use crate::params::{SearchParams, SortField, SortOrder};
use chrono::NaiveDate;

/// A single filter condition. All predicates of a plan are combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring of id OR patient name OR doctor name
    Text(String),
    /// Case-insensitive substring of the patient name
    PatientName(String),
    /// Case-insensitive substring of the doctor name
    DoctorName(String),
    /// Status is one of the given values (never empty)
    StatusIn(Vec<PrescriptionStatus>),
    /// Issue date on or after
    DateFrom(NaiveDate),
    /// Issue date on or before
    DateTo(NaiveDate),
}

impl Predicate {
    pub fn matches(&self, prescription: &Prescription) -> bool {
        match self {
            Predicate::Text(text) => {
                contains_ci(&prescription.id, text)
                    || contains_ci(&prescription.patient_name, text)
                    || contains_ci(&prescription.doctor_name, text)
            }
            Predicate::PatientName(name) => contains_ci(&prescription.patient_name, name),
            Predicate::DoctorName(name) => contains_ci(&prescription.doctor_name, name),
            Predicate::StatusIn(statuses) => statuses.contains(&prescription.status),
            Predicate::DateFrom(from) => prescription.date >= *from,
            Predicate::DateTo(to) => prescription.date <= *to,
        }
    }
}

/// Requested ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub ascending: bool,
}

/// Page position; `offset` is zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
}

impl PageWindow {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Inclusive index of the last row of the page.
    pub fn last_index(&self) -> u64 {
        self.offset() + u64::from(self.page_size) - 1
    }
}

/// Fully resolved search: predicates, ordering and page window
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub predicates: Vec<Predicate>,
    pub sort: SortSpec,
    pub window: PageWindow,
}

impl SearchPlan {
    pub fn from_params(params: &SearchParams) -> Self {
        let mut predicates = Vec::new();

        if let Some(text) = non_blank(&params.query) {
            predicates.push(Predicate::Text(text));
        }
        if let Some(name) = non_blank(&params.patient_name) {
            predicates.push(Predicate::PatientName(name));
        }
        if let Some(name) = non_blank(&params.doctor_name) {
            predicates.push(Predicate::DoctorName(name));
        }
        if !params.status.is_empty() {
            let mut statuses = params.status.clone();
            statuses.sort();
            statuses.dedup();
            predicates.push(Predicate::StatusIn(statuses));
        }
        if let Some(from) = params.date_from {
            predicates.push(Predicate::DateFrom(from));
        }
        if let Some(to) = params.date_to {
            predicates.push(Predicate::DateTo(to));
        }
        // medication_name is intentionally not turned into a predicate.

        Self {
            predicates,
            sort: SortSpec {
                field: params.sort_field(),
                ascending: params.sort_direction() == SortOrder::Asc,
            },
            window: PageWindow {
                page: params.page_or_default(),
                page_size: params.page_size_or_default(),
            },
        }
    }

    pub fn matches(&self, prescription: &Prescription) -> bool {
        self.predicates.iter().all(|p| p.matches(prescription))
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// Case-insensitive substring test.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
