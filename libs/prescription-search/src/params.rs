//! Search parameters
//!
//! Every field is optional; the accessors resolve the defaults (page 1, page size
//! 10, newest issue date first). Empty strings count as "no filter".

use crate::models::PrescriptionStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sortable prescription columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    PatientName,
    DoctorName,
    DoctorCrm,
    #[default]
    Date,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::PatientName => "patient_name",
            Self::DoctorName => "doctor_name",
            Self::DoctorCrm => "doctor_crm",
            Self::Date => "date",
            Self::Status => "status",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "patient_name" | "patientName" => Ok(Self::PatientName),
            "doctor_name" | "doctorName" => Ok(Self::DoctorName),
            "doctor_crm" | "doctorCRM" => Ok(Self::DoctorCrm),
            "date" | "issueDate" => Ok(Self::Date),
            "status" => Ok(Self::Status),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            other => Err(format!("unsupported sort field: {other}")),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unsupported sort order: {other}")),
        }
    }
}

/// Structured prescription search request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Free text matched against id, patient name and doctor name
    pub query: Option<String>,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    /// Accepted statuses; empty means any status
    pub status: Vec<PrescriptionStatus>,
    /// Inclusive lower bound on the issue date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the issue date
    pub date_to: Option<NaiveDate>,
    /// Accepted for compatibility with existing callers. Not applied by any store.
    pub medication_name: Option<String>,
    /// 1-based page number
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn patient_name(mut self, name: impl Into<String>) -> Self {
        self.patient_name = Some(name.into());
        self
    }

    pub fn doctor_name(mut self, name: impl Into<String>) -> Self {
        self.doctor_name = Some(name.into());
        self
    }

    pub fn status(mut self, statuses: impl IntoIterator<Item = PrescriptionStatus>) -> Self {
        self.status = statuses.into_iter().collect();
        self
    }

    pub fn date_from(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn date_to(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = Some(field);
        self.sort_order = Some(order);
        self
    }

    /// Requested page, at least 1.
    pub fn page_or_default(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE).max(1)
    }

    /// Requested page size, at least 1.
    pub fn page_size_or_default(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    pub fn sort_field(&self) -> SortField {
        self.sort_by.unwrap_or_default()
    }

    pub fn sort_direction(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }

    /// Merge a partial update and go back to the first page.
    pub fn merged(&self, patch: SearchParamsPatch) -> Self {
        let mut next = self.clone();
        patch.apply_to(&mut next);
        next.page = Some(DEFAULT_PAGE);
        next
    }
}

/// Partial update of [`SearchParams`]. `None` keeps the current value.
///
/// Optional params use a nested option so a patch can also clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParamsPatch {
    pub query: Option<Option<String>>,
    pub patient_name: Option<Option<String>>,
    pub doctor_name: Option<Option<String>>,
    pub status: Option<Vec<PrescriptionStatus>>,
    pub date_from: Option<Option<NaiveDate>>,
    pub date_to: Option<Option<NaiveDate>>,
    pub medication_name: Option<Option<String>>,
    pub page_size: Option<u32>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl SearchParamsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(Some(query.into()));
        self
    }

    pub fn patient_name(mut self, name: impl Into<String>) -> Self {
        self.patient_name = Some(Some(name.into()));
        self
    }

    pub fn doctor_name(mut self, name: impl Into<String>) -> Self {
        self.doctor_name = Some(Some(name.into()));
        self
    }

    pub fn status(mut self, statuses: impl IntoIterator<Item = PrescriptionStatus>) -> Self {
        self.status = Some(statuses.into_iter().collect());
        self
    }

    pub fn date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = Some(field);
        self.sort_order = Some(order);
        self
    }

    fn apply_to(self, params: &mut SearchParams) {
        if let Some(query) = self.query {
            params.query = query;
        }
        if let Some(name) = self.patient_name {
            params.patient_name = name;
        }
        if let Some(name) = self.doctor_name {
            params.doctor_name = name;
        }
        if let Some(status) = self.status {
            params.status = status;
        }
        if let Some(date) = self.date_from {
            params.date_from = date;
        }
        if let Some(date) = self.date_to {
            params.date_to = date;
        }
        if let Some(name) = self.medication_name {
            params.medication_name = name;
        }
        if let Some(page_size) = self.page_size {
            params.page_size = Some(page_size);
        }
        if let Some(field) = self.sort_by {
            params.sort_by = Some(field);
        }
        if let Some(order) = self.sort_order {
            params.sort_order = Some(order);
        }
    }
}
