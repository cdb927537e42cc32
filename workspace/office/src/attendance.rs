use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use common::DateRange;
use model::entities::attendance_record::{self, AttendanceStatus};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{OfficeError, Result, is_unique_violation};
use crate::identity::Caller;

/// Daily check-in/check-out bookkeeping.
#[derive(Debug, Clone)]
pub struct AttendanceTracker {
    /// Latest check-in time that still counts as on time.
    work_start: NaiveTime,
    /// Length of the history window when no start date is given.
    history_days: i64,
}

impl Default for AttendanceTracker {
    fn default() -> Self {
        Self {
            work_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            history_days: 30,
        }
    }
}

impl AttendanceTracker {
    pub fn new(work_start: NaiveTime, history_days: i64) -> Self {
        Self {
            work_start,
            history_days,
        }
    }

    pub fn work_start(&self) -> NaiveTime {
        self.work_start
    }

    /// NORMAL up to and including the work start, LATE strictly after it.
    pub fn status_for(&self, check_in: NaiveTime) -> AttendanceStatus {
        if check_in > self.work_start {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Normal
        }
    }

    /// Records the first check-in of the day at `now`.
    #[instrument(skip(self, db, caller), fields(user_id = caller.user_id))]
    pub async fn check_in(
        &self,
        db: &DatabaseConnection,
        caller: &Caller,
        now: NaiveDateTime,
    ) -> Result<attendance_record::Model> {
        let today = now.date();
        let time = now.time();
        let status = self.status_for(time);

        let txn = db.begin().await?;
        let record = match find_day(&txn, caller.user_id, today).await? {
            Some(existing) if existing.check_in_time.is_some() => {
                warn!("User {} already checked in on {}", caller.user_id, today);
                return Err(OfficeError::conflict("Already checked in today"));
            }
            Some(existing) => {
                debug!("Reusing attendance record {} for check-in", existing.id);
                let mut active: attendance_record::ActiveModel = existing.into();
                active.check_in_time = Set(Some(time));
                active.status = Set(status);
                active.update(&txn).await?
            }
            None => {
                insert_day(
                    &txn,
                    attendance_record::ActiveModel {
                        user_id: Set(caller.user_id),
                        date: Set(today),
                        check_in_time: Set(Some(time)),
                        check_out_time: Set(None),
                        status: Set(status),
                        remark: Set(None),
                        ..Default::default()
                    },
                )
                .await?
            }
        };
        txn.commit().await?;

        info!(
            "User {} checked in at {} ({})",
            caller.user_id,
            time,
            record.status.as_str()
        );
        Ok(record)
    }

    /// Records the check-out of the day at `now`.
    ///
    /// Checking out without a check-in leaves the day ABNORMAL.
    #[instrument(skip(self, db, caller), fields(user_id = caller.user_id))]
    pub async fn check_out(
        &self,
        db: &DatabaseConnection,
        caller: &Caller,
        now: NaiveDateTime,
    ) -> Result<attendance_record::Model> {
        let today = now.date();
        let time = now.time();

        let txn = db.begin().await?;
        let record = match find_day(&txn, caller.user_id, today).await? {
            Some(existing) if existing.check_out_time.is_some() => {
                warn!("User {} already checked out on {}", caller.user_id, today);
                return Err(OfficeError::conflict("Already checked out today"));
            }
            Some(existing) => {
                let missing_check_in = existing.check_in_time.is_none();
                let mut active: attendance_record::ActiveModel = existing.into();
                active.check_out_time = Set(Some(time));
                if missing_check_in {
                    active.status = Set(AttendanceStatus::Abnormal);
                }
                active.update(&txn).await?
            }
            None => {
                debug!("No check-in for user {} on {}", caller.user_id, today);
                insert_day(
                    &txn,
                    attendance_record::ActiveModel {
                        user_id: Set(caller.user_id),
                        date: Set(today),
                        check_in_time: Set(None),
                        check_out_time: Set(Some(time)),
                        status: Set(AttendanceStatus::Abnormal),
                        remark: Set(None),
                        ..Default::default()
                    },
                )
                .await?
            }
        };
        txn.commit().await?;

        info!(
            "User {} checked out at {} ({})",
            caller.user_id,
            time,
            record.status.as_str()
        );
        Ok(record)
    }

    /// The caller's records in `from..=to`, newest day first.
    ///
    /// `to` defaults to `today`, `from` to `today` minus the configured window.
    pub async fn history(
        &self,
        db: &DatabaseConnection,
        caller: &Caller,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<Vec<attendance_record::Model>> {
        let range = DateRange::resolve(from, to, today, self.history_days);
        if range.is_empty() {
            return Err(OfficeError::validation(format!(
                "Start date {} is after end date {}",
                range.start, range.end
            )));
        }

        let records = attendance_record::Entity::find()
            .filter(attendance_record::Column::UserId.eq(caller.user_id))
            .filter(attendance_record::Column::Date.between(range.start, range.end))
            .order_by_desc(attendance_record::Column::Date)
            .all(db)
            .await?;
        debug!(
            "Found {} attendance records for user {} in {}..={}",
            records.len(),
            caller.user_id,
            range.start,
            range.end
        );
        Ok(records)
    }
}

async fn find_day<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    date: NaiveDate,
) -> Result<Option<attendance_record::Model>> {
    Ok(attendance_record::Entity::find()
        .filter(attendance_record::Column::UserId.eq(user_id))
        .filter(attendance_record::Column::Date.eq(date))
        .one(db)
        .await?)
}

async fn insert_day<C: ConnectionTrait>(
    db: &C,
    record: attendance_record::ActiveModel,
) -> Result<attendance_record::Model> {
    record.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            OfficeError::conflict("Attendance for today was recorded concurrently")
        } else {
            OfficeError::from(e)
        }
    })
}
