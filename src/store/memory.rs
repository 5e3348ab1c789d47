use crate::model::attendance::AttendanceRecord;
use crate::model::member::Member;
use crate::model::policy::RawSettings;
use crate::store::{AttendanceStore, MemberDirectory, SettingsProvider, StoreError};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-process backend for tests, with switchable write failures.
#[derive(Default)]
pub struct MemoryStore {
    pub roster: Vec<Member>,
    pub raw_settings: RawSettings,
    records: Mutex<Vec<AttendanceRecord>>,
    fail_writes: AtomicBool,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new(roster: Vec<Member>, raw_settings: RawSettings) -> Self {
        Self {
            roster,
            raw_settings,
            ..Default::default()
        }
    }

    pub fn with_records(self, records: Vec<AttendanceRecord>) -> Self {
        *self.records.lock().unwrap() = records;
        self
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self, date: NaiveDate) -> Vec<AttendanceRecord> {
        let records = self.records.lock().unwrap();
        records.iter().filter(|r| r.date == date).cloned().collect()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError("sheet unavailable".to_string()));
        }
        Ok(())
    }
}

pub fn member(id: &str, name: &str, department: &str) -> Member {
    Member {
        member_id: id.to_string(),
        name: name.to_string(),
        department: department.to_string(),
        status: "Active".to_string(),
        photo_url: None,
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn list(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(self.stored(date))
    }

    async fn save(&self, records: &[AttendanceRecord]) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut stored = self.records.lock().unwrap();
        for record in records {
            stored.retain(|r| !(r.date == record.date && r.member_id == record.member_id));
            stored.push(record.clone());
        }
        Ok(())
    }

    async fn delete(&self, date: NaiveDate, member_id: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.records
            .lock()
            .unwrap()
            .retain(|r| !(r.date == date && r.member_id == member_id));
        Ok(())
    }
}

#[async_trait]
impl MemberDirectory for MemoryStore {
    async fn members(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self.roster.clone())
    }
}

#[async_trait]
impl SettingsProvider for MemoryStore {
    async fn settings(&self) -> Result<RawSettings, StoreError> {
        Ok(self.raw_settings.clone())
    }
}
