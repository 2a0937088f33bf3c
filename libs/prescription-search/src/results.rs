//! Paginated search results

use crate::models::{Prescription, PrescriptionStatus};
use crate::params::DEFAULT_PAGE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One page of matching prescriptions plus paging totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub data: Vec<Prescription>,
    /// Total matches across all pages
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl SearchResults {
    pub fn new(data: Vec<Prescription>, count: u64, page: u32, page_size: u32) -> Self {
        Self {
            data,
            count,
            page,
            page_size,
            total_pages: total_pages(count, page_size),
        }
    }

    /// Empty first page, used when nothing could be fetched.
    pub fn empty(page_size: u32) -> Self {
        Self::new(Vec::new(), 0, DEFAULT_PAGE, page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// Number of medications across the prescriptions of this page.
    pub fn medication_count(&self) -> usize {
        self.data.iter().map(|p| p.medications.len()).sum()
    }

    /// Prescriptions on this page grouped by status.
    pub fn status_counts(&self) -> BTreeMap<PrescriptionStatus, usize> {
        let mut counts = BTreeMap::new();
        for prescription in &self.data {
            *counts.entry(prescription.status).or_insert(0) += 1;
        }
        counts
    }
}

impl Default for SearchResults {
    fn default() -> Self {
        Self::empty(crate::params::DEFAULT_PAGE_SIZE)
    }
}

/// `ceil(count / page_size)`, or 0 when there is nothing to page through.
pub fn total_pages(count: u64, page_size: u32) -> u32 {
    if count == 0 || page_size == 0 {
        return 0;
    }
    let pages = count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
