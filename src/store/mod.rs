//! Collaborators the attendance engine reads from and writes through.

pub mod mysql;

#[cfg(test)]
pub mod memory;

use crate::model::attendance::AttendanceRecord;
use crate::model::member::Member;
use crate::model::policy::RawSettings;
use async_trait::async_trait;
use chrono::NaiveDate;
use derive_more::Display;
use std::sync::Arc;

/// Failure reported by a backing store.
#[derive(Debug, Display)]
#[display(fmt = "store error: {}", _0)]
pub struct StoreError(pub String);

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError(e.to_string())
    }
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn list(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Insert or update each record, keyed by (date, member_id).
    async fn save(&self, records: &[AttendanceRecord]) -> Result<(), StoreError>;

    async fn delete(&self, date: NaiveDate, member_id: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn members(&self) -> Result<Vec<Member>, StoreError>;
}

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn settings(&self) -> Result<RawSettings, StoreError>;
}

/// Handles to the three collaborators, usually the same backend.
#[derive(Clone)]
pub struct Backend {
    pub attendance: Arc<dyn AttendanceStore>,
    pub members: Arc<dyn MemberDirectory>,
    pub settings: Arc<dyn SettingsProvider>,
}

impl Backend {
    pub fn from_shared<S>(store: Arc<S>) -> Self
    where
        S: AttendanceStore + MemberDirectory + SettingsProvider + 'static,
    {
        Backend {
            attendance: store.clone(),
            members: store.clone(),
            settings: store,
        }
    }
}
