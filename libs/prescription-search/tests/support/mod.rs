#![allow(dead_code)]

pub mod backend;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use receita_search::query_builder::SearchPlan;
use receita_search::store::StorePage;
use receita_search::{
    Error, LocalStore, Medication, Prescription, PrescriptionStatus, PrescriptionStore, Result,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub use backend::{FakeBackend, Reply};

/// Build a prescription with one medication.
pub fn prescription(
    id: &str,
    patient: &str,
    doctor: &str,
    date: (i32, u32, u32),
    status: PrescriptionStatus,
) -> Prescription {
    let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
    let stamp = Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap());
    Prescription {
        id: id.to_string(),
        patient_name: patient.to_string(),
        doctor_name: doctor.to_string(),
        doctor_crm: "CRM/SP 000001".to_string(),
        date,
        status,
        user_id: "user-1".to_string(),
        created_at: stamp,
        updated_at: stamp,
        medications: vec![Medication {
            id: format!("{id}-MED"),
            name: "Dipirona 500mg".to_string(),
            dosage: "1 comprimido".to_string(),
            frequency: "6/6h".to_string(),
            duration: "3 dias".to_string(),
            price: Decimal::new(1290, 2),
            in_stock: true,
            image_url: None,
        }],
    }
}

/// Three prescriptions, one per status, issued on consecutive days.
pub fn three_status_fixture() -> Vec<Prescription> {
    vec![
        prescription(
            "RX-A",
            "Paula Lima",
            "Dr. Jorge Reis",
            (2024, 2, 1),
            PrescriptionStatus::Pending,
        ),
        prescription(
            "RX-B",
            "Marcos Dias",
            "Dra. Helena Prado",
            (2024, 2, 2),
            PrescriptionStatus::Partial,
        ),
        prescription(
            "RX-C",
            "Rita Nunes",
            "Dr. Jorge Reis",
            (2024, 2, 3),
            PrescriptionStatus::Completed,
        ),
    ]
}

/// How a [`ScriptedStore`] answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Answer from the wrapped local store
    Serve,
    /// Fail every call with a backend error
    Fail,
    /// Never answer
    Hang,
}

/// Test double that counts calls, records search plans, and can fail, hang or
/// delay on demand.
pub struct ScriptedStore {
    inner: LocalStore,
    behavior: Mutex<Behavior>,
    delays: Mutex<Vec<Duration>>,
    calls: AtomicUsize,
    plans: Mutex<Vec<SearchPlan>>,
}

impl ScriptedStore {
    pub fn new(inner: LocalStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            behavior: Mutex::new(Behavior::Serve),
            delays: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            plans: Mutex::new(Vec::new()),
        })
    }

    pub fn sample() -> Arc<Self> {
        Self::new(LocalStore::sample().unwrap())
    }

    pub fn failing() -> Arc<Self> {
        let store = Self::sample();
        store.set_behavior(Behavior::Fail);
        store
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Delay the next calls, one entry per call, in order.
    pub fn push_delays(&self, delays: impl IntoIterator<Item = Duration>) {
        self.delays.lock().unwrap().extend(delays);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn plans(&self) -> Vec<SearchPlan> {
        self.plans.lock().unwrap().clone()
    }

    async fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = {
            let mut delays = self.delays.lock().unwrap();
            if delays.is_empty() {
                None
            } else {
                Some(delays.remove(0))
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            Behavior::Serve => Ok(()),
            Behavior::Fail => Err(Error::Backend {
                status: 503,
                message: "service unavailable".to_string(),
            }),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl PrescriptionStore for ScriptedStore {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn search(&self, plan: &SearchPlan) -> Result<StorePage> {
        self.plans.lock().unwrap().push(plan.clone());
        self.enter().await?;
        Ok(self.inner.execute(plan))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Prescription>> {
        self.enter().await?;
        Ok(self.inner.get_prescription_by_id(id))
    }

    async fn suggest(&self, query: &str) -> Result<Vec<String>> {
        self.enter().await?;
        Ok(self.inner.get_search_suggestions(query))
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Prescription>> {
        self.enter().await?;
        Ok(self.inner.get_recent_prescriptions(limit))
    }
}
