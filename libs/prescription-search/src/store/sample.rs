//! Compiled-in sample prescriptions
//!
//! The dataset keeps the field names used by the demo front end (`code`,
//! `patientName`, `doctorCRM`, `issueDate`, `inStock`, `imageUrl`). Records are
//! mapped to the canonical [`Prescription`] shape before any store sees them.

use crate::error::{Error, Result};
use crate::models::{Medication, Prescription, PrescriptionStatus};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

const SAMPLE_JSON: &str = include_str!("../../data/sample_prescriptions.json");

/// Owner assigned to every sample prescription
pub const SAMPLE_USER_ID: &str = "mock-user-id";

/// Prescription as stored in the sample dataset
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRecord {
    pub code: String,
    pub patient_name: String,
    pub doctor_name: String,
    #[serde(rename = "doctorCRM")]
    pub doctor_crm: String,
    pub issue_date: NaiveDate,
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub medications: Vec<SampleMedication>,
}

/// Medication as stored in the sample dataset
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleMedication {
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

impl SampleRecord {
    /// Map to the canonical shape.
    ///
    /// Timestamps are pinned to noon UTC of the issue date so repeated loads
    /// produce identical rows.
    pub fn into_prescription(self) -> Result<Prescription> {
        let stamp: DateTime<Utc> = self
            .issue_date
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default())
            .and_utc();

        let medications = self
            .medications
            .into_iter()
            .map(|med| {
                if med.price.is_sign_negative() {
                    return Err(Error::Sample(format!(
                        "medication {} of {} has a negative price",
                        med.id, self.code
                    )));
                }
                Ok(Medication {
                    id: med.id,
                    name: med.name,
                    dosage: med.dosage,
                    frequency: med.frequency,
                    duration: med.duration,
                    price: med.price,
                    in_stock: med.in_stock,
                    image_url: med.image_url,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Prescription {
            id: self.code,
            patient_name: self.patient_name,
            doctor_name: self.doctor_name,
            doctor_crm: self.doctor_crm,
            date: self.issue_date,
            status: self.status,
            user_id: SAMPLE_USER_ID.to_string(),
            created_at: stamp,
            updated_at: stamp,
            medications,
        })
    }
}

/// Parse sample records from JSON in the demo front-end shape.
pub fn parse_records(json: &str) -> Result<Vec<SampleRecord>> {
    serde_json::from_str(json).map_err(|e| Error::Sample(e.to_string()))
}

/// The bundled sample dataset.
pub fn bundled_records() -> Result<Vec<SampleRecord>> {
    parse_records(SAMPLE_JSON)
}
