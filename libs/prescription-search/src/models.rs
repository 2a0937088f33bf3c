//! Prescription and medication models
//!
//! These are the canonical row shapes returned by every store. Field names follow
//! the backend columns (`patient_name`, `doctor_crm`, ...) so rows deserialize
//! straight from the PostgREST response.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fulfillment lifecycle of a prescription on the patient side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Pending,
    Partial,
    Completed,
}

impl PrescriptionStatus {
    pub const ALL: [PrescriptionStatus; 3] = [Self::Pending, Self::Partial, Self::Completed];

    /// Column value used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Completed => "completed",
        }
    }

    /// Display label shown to patients (pt-BR).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::Partial => "Parcial",
            Self::Completed => "Completa",
        }
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrescriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "partial" => Ok(Self::Partial),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown prescription status: {other}")),
        }
    }
}

/// A medication line of a prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub price: Decimal,
    pub in_stock: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A prescription together with its medications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub doctor_crm: String,
    /// Issue date
    pub date: NaiveDate,
    pub status: PrescriptionStatus,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "medications_or_empty")]
    pub medications: Vec<Medication>,
}

impl Prescription {
    /// Sum of the prices of the selected medications.
    ///
    /// Unknown ids are ignored.
    pub fn selection_total<S: AsRef<str>>(&self, selected: &[S]) -> Decimal {
        self.medications
            .iter()
            .filter(|med| selected.iter().any(|id| id.as_ref() == med.id))
            .map(|med| med.price)
            .sum()
    }

    pub fn in_stock_medications(&self) -> impl Iterator<Item = &Medication> {
        self.medications.iter().filter(|med| med.in_stock)
    }
}

// PostgREST returns `null` for an embedded relation the caller cannot see.
fn medications_or_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Medication>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Medication>>::deserialize(deserializer)?.unwrap_or_default())
}
