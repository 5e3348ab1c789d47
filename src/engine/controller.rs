use crate::engine::calendar::{CalendarDay, is_selectable, is_working_day, month_view};
use crate::engine::duration;
use crate::engine::error::AttendanceError;
use crate::engine::time::{normalize_in, to_display};
use crate::model::attendance::{AttendanceEntry, AttendanceRecord};
use crate::model::member::Member;
use crate::model::policy::Policy;
use crate::model::status::StatusCode;
use crate::store::AttendanceStore;
use chrono::{Datelike, FixedOffset, NaiveDate};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of one member's entry within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryState {
    NotEntered,
    Entered,
    Edited,
    Deleted,
}

/// Read-only inputs owned by the directory and settings collaborators.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub roster: Vec<Member>,
    pub policy: Policy,
    pub today: NaiveDate,
    pub zone: FixedOffset,
}

#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    pub department: Option<String>,
    pub status: Option<StatusCode>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    #[schema(example = 5)]
    pub total: usize,
    #[schema(example = 1)]
    pub present: usize,
    #[schema(example = 1)]
    pub late: usize,
    /// Active members not present, late or on leave, recorded or not
    #[schema(example = 3)]
    pub absent: usize,
    #[schema(example = 0)]
    pub on_leave: usize,
    #[schema(example = 0)]
    pub half_day: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceRowView {
    #[schema(example = "M-001")]
    pub member_id: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(nullable = true)]
    pub photo_url: Option<String>,
    #[schema(example = "9:05 AM")]
    pub punch_in: String,
    #[schema(example = "5:30 PM")]
    pub punch_out: String,
    #[schema(example = "On Time", value_type = String)]
    pub status: StatusCode,
    pub overridden: bool,
    #[schema(example = "8:25")]
    pub hours_worked: String,
    #[schema(example = "8.4", nullable = true)]
    pub hours_decimal: Option<String>,
    pub comments: String,
}

/// Per-date attendance session: the roster and policy snapshots plus the
/// records stored for the date. All writes go through the store first and
/// are applied here only once the store accepted them.
pub struct AttendanceViewController {
    store: Arc<dyn AttendanceStore>,
    session_id: Uuid,
    date: NaiveDate,
    snapshot: SessionSnapshot,
    records: Vec<AttendanceRecord>,
    states: HashMap<String, EntryState>,
}

impl AttendanceViewController {
    pub async fn open(
        store: Arc<dyn AttendanceStore>,
        snapshot: SessionSnapshot,
        date: NaiveDate,
    ) -> Result<Self, AttendanceError> {
        let session_id = Uuid::new_v4();

        let mut records = store.list(date).await.map_err(|e| {
            warn!(%session_id, %date, error = %e, "Failed to load attendance");
            AttendanceError::Persistence(e)
        })?;
        for record in &mut records {
            record.rederive_status(&snapshot.policy);
        }

        debug!(%session_id, %date, records = records.len(), members = snapshot.roster.len(), "Attendance session opened");

        Ok(Self {
            store,
            session_id,
            date,
            snapshot,
            records,
            states: HashMap::new(),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn record(&self, member_id: &str) -> Option<&AttendanceRecord> {
        self.records.iter().find(|r| r.member_id == member_id)
    }

    pub fn is_working_day(&self) -> bool {
        is_working_day(self.date, self.snapshot.policy.working_days)
    }

    pub fn date_selectable(&self) -> bool {
        is_selectable(self.date, self.snapshot.today, self.snapshot.policy.working_days)
    }

    /// Date picker cells for the session's month.
    pub fn month_view(&self) -> Vec<CalendarDay> {
        month_view(
            self.date.year(),
            self.date.month(),
            self.snapshot.today,
            self.snapshot.policy.working_days,
        )
    }

    /// Counts over active members only; records of inactive or unknown
    /// members are left out of every figure.
    pub fn summary(&self) -> AttendanceSummary {
        let active: HashSet<&str> = self
            .snapshot
            .roster
            .iter()
            .filter(|m| m.is_active())
            .map(|m| m.member_id.as_str())
            .collect();
        let count = |status: StatusCode| {
            self.records
                .iter()
                .filter(|r| r.status == status && active.contains(r.member_id.as_str()))
                .count()
        };

        let total = active.len();
        let present = count(StatusCode::OnTime);
        let late = count(StatusCode::Late);
        let on_leave = count(StatusCode::OnLeave);

        AttendanceSummary {
            total,
            present,
            late,
            absent: total.saturating_sub(present + late + on_leave),
            on_leave,
            half_day: count(StatusCode::HalfDay),
        }
    }

    /// Display rows after department, status and name filters, sorted by name.
    pub fn rows(&self, filter: &RowFilter) -> Vec<AttendanceRowView> {
        let members: HashMap<&str, &Member> = self
            .snapshot
            .roster
            .iter()
            .map(|m| (m.member_id.as_str(), m))
            .collect();

        let department = filter.department.as_deref().map(str::trim).filter(|d| !d.is_empty());
        let search = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut rows: Vec<AttendanceRowView> = self
            .records
            .iter()
            .map(|record| {
                let member = members.get(record.member_id.as_str());
                row_view(record, member.copied())
            })
            .filter(|row| department.is_none_or(|d| row.department.eq_ignore_ascii_case(d)))
            .filter(|row| filter.status.is_none_or(|s| row.status == s))
            .filter(|row| {
                search
                    .as_deref()
                    .is_none_or(|q| row.name.to_lowercase().contains(q))
            })
            .collect();

        rows.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.member_id.cmp(&b.member_id))
        });
        rows
    }

    /// Active members without a record on the date, offered by the add pickers.
    pub fn eligible_members(&self) -> Vec<&Member> {
        self.snapshot
            .roster
            .iter()
            .filter(|m| m.is_active() && self.record(&m.member_id).is_none())
            .collect()
    }

    pub fn entry_state(&self, member_id: &str) -> EntryState {
        match self.states.get(member_id) {
            Some(state) => *state,
            None if self.record(member_id).is_some() => EntryState::Entered,
            None => EntryState::NotEntered,
        }
    }

    /// Add one (single) or many (bulk) entries for the session date.
    ///
    /// The whole batch is validated before the store is called, and is saved
    /// with a single upsert.
    pub async fn add(&mut self, entries: &[AttendanceEntry]) -> Result<usize, AttendanceError> {
        if !self.date_selectable() {
            let reason = if self.date > self.snapshot.today {
                format!("Cannot record attendance for future date {}", self.date)
            } else {
                format!("{} is not a working day", self.date)
            };
            return Err(AttendanceError::PolicyViolation(reason));
        }
        if entries.is_empty() {
            return Err(AttendanceError::Validation(
                "No attendance entries provided".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let member_id = entry.member_id.trim();
            let member = self
                .snapshot
                .roster
                .iter()
                .find(|m| m.member_id == member_id)
                .ok_or_else(|| AttendanceError::Validation(format!("Unknown member {}", member_id)))?;
            if !member.is_active() {
                return Err(AttendanceError::Validation(format!(
                    "Member {} is not active",
                    member_id
                )));
            }
            if !seen.insert(member_id) {
                return Err(AttendanceError::Validation(format!(
                    "Member {} appears more than once",
                    member_id
                )));
            }
            if self.record(member_id).is_some() {
                return Err(AttendanceError::Validation(format!(
                    "Member {} already has attendance on {}",
                    member_id, self.date
                )));
            }
            records.push(self.build_record(member_id, entry)?);
        }

        self.persist(&records).await?;

        let saved = records.len();
        for record in records {
            self.states.insert(record.member_id.clone(), EntryState::Entered);
            self.records.push(record);
        }
        info!(session_id = %self.session_id, date = %self.date, saved, "Attendance added");
        Ok(saved)
    }

    /// Replace the punches, override and comments of an existing record.
    pub async fn edit(&mut self, member_id: &str, entry: &AttendanceEntry) -> Result<&AttendanceRecord, AttendanceError> {
        let index = self.index_of(member_id)?;
        let record = self.build_record(member_id, entry)?;

        self.persist(std::slice::from_ref(&record)).await?;

        info!(session_id = %self.session_id, date = %self.date, member_id, status = %record.status, "Attendance edited");
        self.records[index] = record;
        self.states.insert(member_id.to_string(), EntryState::Edited);
        Ok(&self.records[index])
    }

    pub async fn delete(&mut self, member_id: &str) -> Result<(), AttendanceError> {
        let index = self.index_of(member_id)?;

        self.store.delete(self.date, member_id).await.map_err(|e| {
            warn!(session_id = %self.session_id, date = %self.date, member_id, error = %e, "Attendance delete failed");
            AttendanceError::Persistence(e)
        })?;

        self.records.remove(index);
        self.states.insert(member_id.to_string(), EntryState::Deleted);
        info!(session_id = %self.session_id, date = %self.date, member_id, "Attendance deleted");
        Ok(())
    }

    fn index_of(&self, member_id: &str) -> Result<usize, AttendanceError> {
        self.records
            .iter()
            .position(|r| r.member_id == member_id)
            .ok_or_else(|| {
                AttendanceError::NotFound(format!(
                    "No attendance for member {} on {}",
                    member_id, self.date
                ))
            })
    }

    fn build_record(&self, member_id: &str, entry: &AttendanceEntry) -> Result<AttendanceRecord, AttendanceError> {
        let status_override = StatusCode::parse(entry.status_override.as_deref()).map_err(|_| {
            AttendanceError::Validation(format!(
                "Unknown status `{}` for member {}",
                entry.status_override.as_deref().unwrap_or_default(),
                member_id
            ))
        })?;

        let zone = &self.snapshot.zone;
        Ok(AttendanceRecord::derive(
            self.date,
            member_id.to_string(),
            normalize_in(entry.punch_in.as_deref(), zone),
            normalize_in(entry.punch_out.as_deref(), zone),
            status_override,
            entry.comments.as_deref().unwrap_or_default().trim().to_string(),
            &self.snapshot.policy,
        ))
    }

    async fn persist(&self, records: &[AttendanceRecord]) -> Result<(), AttendanceError> {
        self.store.save(records).await.map_err(|e| {
            warn!(session_id = %self.session_id, date = %self.date, records = records.len(), error = %e, "Attendance save failed");
            AttendanceError::Persistence(e)
        })
    }
}

fn row_view(record: &AttendanceRecord, member: Option<&Member>) -> AttendanceRowView {
    AttendanceRowView {
        member_id: record.member_id.clone(),
        name: member.map_or_else(|| record.member_id.clone(), |m| m.name.clone()),
        department: member.map(|m| m.department.clone()).unwrap_or_default(),
        photo_url: member.and_then(|m| m.photo_url.clone()),
        punch_in: to_display(record.punch_in),
        punch_out: to_display(record.punch_out),
        status: record.status,
        overridden: record.status_override.is_some(),
        hours_worked: duration::display(record.hours_worked),
        hours_decimal: record.hours_worked.map(|h| h.to_decimal_string()),
        comments: record.comments.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryStore, member};
    use crate::engine::time::TimeOfDay;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monday() -> NaiveDate {
        date(2025, 1, 6)
    }

    fn roster() -> Vec<Member> {
        let mut inactive = member("M-006", "Former Hire", "Sales");
        inactive.status = "Inactive".to_string();
        vec![
            member("M-001", "Alice Smith", "Engineering"),
            member("M-002", "bob Jones", "Engineering"),
            member("M-003", "Carol White", "Sales"),
            member("M-004", "Dan Brown", "Sales"),
            member("M-005", "Eve Black", "Support"),
            inactive,
        ]
    }

    fn policy() -> Policy {
        Policy {
            start_time: TimeOfDay::from_hm(9, 0).unwrap(),
            late_grace_period_minutes: 10,
            ..Policy::default()
        }
    }

    fn snapshot(today: NaiveDate) -> SessionSnapshot {
        SessionSnapshot {
            roster: roster(),
            policy: policy(),
            today,
            zone: FixedOffset::east_opt(0).unwrap(),
        }
    }

    fn entry(member_id: &str, punch_in: Option<&str>, punch_out: Option<&str>) -> AttendanceEntry {
        AttendanceEntry {
            member_id: member_id.to_string(),
            punch_in: punch_in.map(Into::into),
            punch_out: punch_out.map(Into::into),
            ..Default::default()
        }
    }

    async fn open(store: &Arc<MemoryStore>, day: NaiveDate) -> AttendanceViewController {
        AttendanceViewController::open(store.clone(), snapshot(date(2025, 1, 31)), day)
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn unrecorded_members_count_as_absent() {
        let store = Arc::new(MemoryStore::default());
        let mut session = open(&store, monday()).await;

        session
            .add(&[
                entry("M-001", Some("09:08"), Some("17:00")),
                entry("M-002", Some("09:11"), Some("17:00")),
            ])
            .await
            .unwrap();

        let summary = session.summary();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.present, 1);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.on_leave, 0);
        assert_eq!(summary.absent, 3);
    }

    #[actix_web::test]
    async fn records_of_inactive_or_unknown_members_stay_out_of_the_summary() {
        let record = |member_id: &str, punch_in: Option<TimeOfDay>| {
            AttendanceRecord::derive(
                monday(),
                member_id.into(),
                punch_in,
                TimeOfDay::from_hm(17, 0),
                None,
                String::new(),
                &policy(),
            )
        };
        let store = Arc::new(MemoryStore::default().with_records(vec![
            record("M-006", TimeOfDay::from_hm(9, 0)),
            record("M-404", TimeOfDay::from_hm(9, 45)),
        ]));
        let session = open(&store, monday()).await;

        let summary = session.summary();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.present, 0);
        assert_eq!(summary.late, 0);
        assert_eq!(summary.absent, 5);
    }

    #[actix_web::test]
    async fn add_derives_status_and_hours() {
        let store = Arc::new(MemoryStore::default());
        let mut session = open(&store, monday()).await;

        session
            .add(&[entry("M-003", Some("22:00"), Some("06:00"))])
            .await
            .unwrap();

        let stored = store.stored(monday());
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].status, StatusCode::Late);
        assert_eq!(stored[0].hours_worked.map(|h| h.to_clock()), Some("8:00".to_string()));
        assert_eq!(session.entry_state("M-003"), EntryState::Entered);
    }

    #[actix_web::test]
    async fn rejects_non_working_and_future_dates_before_saving() {
        let store = Arc::new(MemoryStore::default());

        let mut saturday = open(&store, date(2025, 1, 11)).await;
        let err = saturday.add(&[entry("M-001", Some("09:00"), None)]).await.unwrap_err();
        assert!(matches!(err, AttendanceError::PolicyViolation(_)));

        let mut future = open(&store, date(2025, 2, 3)).await;
        let err = future.add(&[entry("M-001", Some("09:00"), None)]).await.unwrap_err();
        assert!(matches!(err, AttendanceError::PolicyViolation(_)));

        assert_eq!(store.writes.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn rejects_existing_duplicate_unknown_and_inactive_members() {
        let store = Arc::new(MemoryStore::default());
        let mut session = open(&store, monday()).await;
        session.add(&[entry("M-001", Some("09:00"), None)]).await.unwrap();

        for batch in [
            vec![entry("M-001", Some("09:00"), None)],
            vec![entry("M-002", None, None), entry("M-002", None, None)],
            vec![entry("M-999", None, None)],
            vec![entry("M-006", None, None)],
            vec![],
        ] {
            let err = session.add(&batch).await.unwrap_err();
            assert!(matches!(err, AttendanceError::Validation(_)), "{err}");
        }
        assert_eq!(store.stored(monday()).len(), 1);
    }

    #[actix_web::test]
    async fn failed_save_leaves_view_unchanged() {
        let store = Arc::new(MemoryStore::default());
        let mut session = open(&store, monday()).await;
        session.add(&[entry("M-001", Some("09:00"), None)]).await.unwrap();
        let before = session.summary();

        store.fail_writes(true);
        let err = session
            .add(&[entry("M-002", Some("09:00"), None)])
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::Persistence(_)));

        let edit = AttendanceEntry {
            status_override: Some("On Leave".into()),
            ..entry("M-001", None, None)
        };
        assert!(session.edit("M-001", &edit).await.is_err());
        assert!(session.delete("M-001").await.is_err());

        assert_eq!(session.summary(), before);
        assert_eq!(session.records().len(), 1);
        assert_eq!(session.record("M-001").unwrap().status, StatusCode::OnTime);
        assert_eq!(session.entry_state("M-002"), EntryState::NotEntered);
        assert_eq!(session.entry_state("M-001"), EntryState::Entered);
    }

    #[actix_web::test]
    async fn edit_then_delete_walks_the_entry_lifecycle() {
        let store = Arc::new(MemoryStore::default());
        let mut session = open(&store, monday()).await;
        assert_eq!(session.entry_state("M-004"), EntryState::NotEntered);

        session.add(&[entry("M-004", Some("09:30"), None)]).await.unwrap();
        assert_eq!(session.record("M-004").unwrap().status, StatusCode::Late);

        let edit = AttendanceEntry {
            status_override: Some("Half Day".into()),
            ..entry("M-004", Some("09:30"), Some("13:00"))
        };
        let edited = session.edit("M-004", &edit).await.unwrap();
        assert_eq!(edited.status, StatusCode::HalfDay);
        assert_eq!(session.entry_state("M-004"), EntryState::Edited);
        assert_eq!(store.stored(monday())[0].status_override, Some(StatusCode::HalfDay));

        session.delete("M-004").await.unwrap();
        assert_eq!(session.entry_state("M-004"), EntryState::Deleted);
        assert!(store.stored(monday()).is_empty());
        assert!(session.eligible_members().iter().any(|m| m.member_id == "M-004"));

        let err = session.delete("M-004").await.unwrap_err();
        assert!(matches!(err, AttendanceError::NotFound(_)));
    }

    #[actix_web::test]
    async fn edit_rejects_unknown_status() {
        let store = Arc::new(MemoryStore::default());
        let mut session = open(&store, monday()).await;
        session.add(&[entry("M-001", Some("09:00"), None)]).await.unwrap();

        let edit = AttendanceEntry {
            status_override: Some("Vacation".into()),
            ..entry("M-001", None, None)
        };
        let err = session.edit("M-001", &edit).await.unwrap_err();
        assert!(matches!(err, AttendanceError::Validation(_)));
    }

    #[actix_web::test]
    async fn eligibility_excludes_recorded_and_inactive_members() {
        let store = Arc::new(MemoryStore::default());
        let mut session = open(&store, monday()).await;
        session
            .add(&[entry("M-001", Some("09:00"), None), entry("M-005", None, None)])
            .await
            .unwrap();

        let eligible: Vec<&str> = session
            .eligible_members()
            .iter()
            .map(|m| m.member_id.as_str())
            .collect();
        assert_eq!(eligible, vec!["M-002", "M-003", "M-004"]);
    }

    #[actix_web::test]
    async fn filters_compose_and_rows_sort_by_name() {
        let store = Arc::new(MemoryStore::default());
        let mut session = open(&store, monday()).await;
        session
            .add(&[
                entry("M-003", Some("09:20"), Some("17:00")),
                entry("M-002", Some("08:50"), Some("17:20")),
                entry("M-001", Some("09:05"), None),
                entry("M-004", None, None),
            ])
            .await
            .unwrap();

        let all = session.rows(&RowFilter::default());
        let names: Vec<&str> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alice Smith", "bob Jones", "Carol White", "Dan Brown"]);
        assert_eq!(all[1].punch_in, "8:50 AM");
        assert_eq!(all[1].hours_worked, "8:30");
        assert_eq!(all[1].hours_decimal.as_deref(), Some("8.5"));
        assert_eq!(all[0].punch_out, "—");

        let engineering_on_time = session.rows(&RowFilter {
            department: Some("engineering".into()),
            status: Some(StatusCode::OnTime),
            search: None,
        });
        assert_eq!(engineering_on_time.len(), 2);

        let searched = session.rows(&RowFilter {
            department: Some("Engineering".into()),
            status: Some(StatusCode::OnTime),
            search: Some("BOB".into()),
        });
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].member_id, "M-002");

        let sales_absent = session.rows(&RowFilter {
            department: Some("Sales".into()),
            status: Some(StatusCode::Absent),
            search: Some("  ".into()),
        });
        assert_eq!(sales_absent.len(), 1);
        assert_eq!(sales_absent[0].member_id, "M-004");
    }

    #[actix_web::test]
    async fn loaded_records_are_reclassified_with_the_current_policy() {
        let stale = AttendanceRecord {
            status: StatusCode::OnTime,
            ..AttendanceRecord::derive(
                monday(),
                "M-001".into(),
                TimeOfDay::from_hm(9, 30),
                None,
                None,
                String::new(),
                &policy(),
            )
        };
        let store = Arc::new(MemoryStore::default().with_records(vec![stale]));
        let session = open(&store, monday()).await;

        assert_eq!(session.record("M-001").unwrap().status, StatusCode::Late);
        assert_eq!(session.entry_state("M-001"), EntryState::Entered);
    }

    #[actix_web::test]
    async fn month_view_follows_policy_working_days() {
        let store = Arc::new(MemoryStore::default());
        let session = open(&store, monday()).await;
        assert!(session.is_working_day());
        assert!(session.date_selectable());

        let view = session.month_view();
        assert_eq!(view.len(), 31);
        assert!(view.iter().filter(|d| d.weekday == "Sat").all(|d| !d.selectable));
    }
}
