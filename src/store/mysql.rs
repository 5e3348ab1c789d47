use crate::model::attendance::{AttendanceRecord, AttendanceRow};
use crate::model::member::Member;
use crate::model::policy::RawSettings;
use crate::store::{AttendanceStore, MemberDirectory, SettingsProvider, StoreError};
use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate};
use sqlx::MySqlPool;
use tracing::{debug, error};

/// Sheet-backed tables living in MySQL. Time columns hold whatever the sheet
/// exported, so rows are normalized on the way out.
pub struct MySqlStore {
    pool: MySqlPool,
    zone: FixedOffset,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool, zone: FixedOffset) -> Self {
        Self { pool, zone }
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn list(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT date, member_id, punch_in, punch_out, status,
                   status_override, hours_worked, comments
            FROM attendance
            WHERE date = ?
            ORDER BY member_id
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, %date, "Failed to list attendance");
            StoreError::from(e)
        })?;

        debug!(%date, rows = rows.len(), "Loaded attendance rows");
        Ok(rows.into_iter().map(|row| row.into_record(&self.zone)).collect())
    }

    async fn save(&self, records: &[AttendanceRecord]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO attendance
                    (date, member_id, punch_in, punch_out, status,
                     status_override, hours_worked, comments)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    punch_in = VALUES(punch_in),
                    punch_out = VALUES(punch_out),
                    status = VALUES(status),
                    status_override = VALUES(status_override),
                    hours_worked = VALUES(hours_worked),
                    comments = VALUES(comments)
                "#,
            )
            .bind(record.date)
            .bind(&record.member_id)
            .bind(record.punch_in.map(|t| t.to_string()))
            .bind(record.punch_out.map(|t| t.to_string()))
            .bind(record.status.to_string())
            .bind(record.status_override.map(|s| s.to_string()))
            .bind(record.hours_worked.map(|h| h.to_clock()))
            .bind(&record.comments)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, member_id = %record.member_id, date = %record.date, "Failed to save attendance");
                StoreError::from(e)
            })?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, date: NaiveDate, member_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM attendance WHERE date = ? AND member_id = ?")
            .bind(date)
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, %date, member_id, "Failed to delete attendance");
                StoreError::from(e)
            })?;
        Ok(())
    }
}

#[async_trait]
impl MemberDirectory for MySqlStore {
    async fn members(&self) -> Result<Vec<Member>, StoreError> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT member_id,
                   name,
                   COALESCE(department, '') AS department,
                   COALESCE(status, '') AS status,
                   photo_url
            FROM members
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }
}

#[async_trait]
impl SettingsProvider for MySqlStore {
    async fn settings(&self) -> Result<RawSettings, StoreError> {
        let rows = sqlx::query_as::<_, (String, Option<String>)>(
            r#"
            SELECT setting_key, setting_value
            FROM settings
            WHERE setting_key IN ('StartTime', 'LateGracePeriod', 'WorkingDays')
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut settings = RawSettings::default();
        for (key, value) in rows {
            match key.as_str() {
                "StartTime" => settings.start_time = value,
                "LateGracePeriod" => settings.late_grace_period = value,
                "WorkingDays" => settings.working_days = value,
                _ => {}
            }
        }
        Ok(settings)
    }
}
