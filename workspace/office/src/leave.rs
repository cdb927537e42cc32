use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use common::SubmitLeaveRequest;
use model::entities::leave_request::{self, LeaveStatus};
use model::entities::user;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, warn};

use crate::directory::UserDirectory;
use crate::error::{OfficeError, Result};
use crate::identity::Caller;

const MAX_TYPE_LEN: usize = 50;
const MAX_REASON_LEN: usize = 500;

/// A leave application as submitted by the requester.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

impl From<SubmitLeaveRequest> for NewLeave {
    fn from(request: SubmitLeaveRequest) -> Self {
        Self {
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
        }
    }
}

/// On whose behalf a decision is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    /// The caller must be the approver assigned to the request.
    Approver,
    /// The caller must be an administrator; the assigned approver is not checked.
    AdminOverride,
}

/// Identity fields of a requester or approver shown next to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRef {
    pub id: i32,
    pub username: String,
    pub real_name: Option<String>,
}

impl From<&user::Model> for PersonRef {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            real_name: user.real_name.clone(),
        }
    }
}

/// A leave request with its requester and approver resolved.
#[derive(Debug, Clone)]
pub struct LeaveView {
    pub request: leave_request::Model,
    pub requester: Option<PersonRef>,
    pub approver: Option<PersonRef>,
}

/// Submission and approval of leave requests.
#[derive(Debug, Default)]
pub struct LeaveWorkflow {
    directory: UserDirectory,
}

impl LeaveWorkflow {
    pub fn new() -> Self {
        Self {
            directory: UserDirectory::new(),
        }
    }

    /// Files a PENDING request; the approver is the caller's manager right now.
    #[instrument(skip(self, db, leave), fields(user_id = caller.user_id))]
    pub async fn submit(
        &self,
        db: &DatabaseConnection,
        caller: &Caller,
        leave: NewLeave,
    ) -> Result<leave_request::Model> {
        let leave_type = leave.leave_type.trim();
        if leave_type.is_empty() {
            return Err(OfficeError::validation("Leave type must not be blank"));
        }
        if leave_type.chars().count() > MAX_TYPE_LEN {
            return Err(OfficeError::validation(format!(
                "Leave type must be at most {} characters",
                MAX_TYPE_LEN
            )));
        }
        if leave.reason.as_ref().is_some_and(|r| r.chars().count() > MAX_REASON_LEN) {
            return Err(OfficeError::validation(format!(
                "Reason must be at most {} characters",
                MAX_REASON_LEN
            )));
        }
        if leave.start_date > leave.end_date {
            warn!(
                "Rejecting leave with start {} after end {}",
                leave.start_date, leave.end_date
            );
            return Err(OfficeError::validation(
                "Start date must not be after end date",
            ));
        }

        let approver = self.directory.manager_of(db, caller.user_id).await?;
        if approver.is_none() {
            debug!("User {} has no manager, request stays unassigned", caller.user_id);
        }

        let saved = leave_request::ActiveModel {
            employee_id: Set(caller.user_id),
            approver_id: Set(approver.as_ref().map(|m| m.id)),
            leave_type: Set(leave_type.to_string()),
            start_date: Set(leave.start_date),
            end_date: Set(leave.end_date),
            reason: Set(leave.reason),
            status: Set(LeaveStatus::Pending),
            ..Default::default()
        }
        .insert(db)
        .await?;

        info!(
            "Leave request {} submitted by user {} (approver: {:?})",
            saved.id, caller.user_id, saved.approver_id
        );
        Ok(saved)
    }

    /// The caller's own requests, latest start date first.
    pub async fn list_mine(&self, db: &DatabaseConnection, caller: &Caller) -> Result<Vec<LeaveView>> {
        let requests = leave_request::Entity::find()
            .filter(leave_request::Column::EmployeeId.eq(caller.user_id))
            .order_by_desc(leave_request::Column::StartDate)
            .order_by_desc(leave_request::Column::Id)
            .all(db)
            .await?;
        debug!("Found {} leave requests for user {}", requests.len(), caller.user_id);
        self.with_people(db, requests).await
    }

    /// PENDING requests assigned to the caller.
    pub async fn list_pending_for_approver(
        &self,
        db: &DatabaseConnection,
        caller: &Caller,
    ) -> Result<Vec<LeaveView>> {
        let requests = leave_request::Entity::find()
            .filter(leave_request::Column::Status.eq(LeaveStatus::Pending))
            .filter(leave_request::Column::ApproverId.eq(caller.user_id))
            .order_by_asc(leave_request::Column::StartDate)
            .order_by_asc(leave_request::Column::Id)
            .all(db)
            .await?;
        self.with_people(db, requests).await
    }

    /// Every PENDING request, assigned or not.
    pub async fn list_all_pending(&self, db: &DatabaseConnection) -> Result<Vec<LeaveView>> {
        let requests = leave_request::Entity::find()
            .filter(leave_request::Column::Status.eq(LeaveStatus::Pending))
            .order_by_asc(leave_request::Column::StartDate)
            .order_by_asc(leave_request::Column::Id)
            .all(db)
            .await?;
        self.with_people(db, requests).await
    }

    pub async fn approve(
        &self,
        db: &DatabaseConnection,
        request_id: i32,
        caller: &Caller,
        authority: Authority,
    ) -> Result<leave_request::Model> {
        self.decide(db, request_id, caller, authority, LeaveStatus::Approved)
            .await
    }

    pub async fn reject(
        &self,
        db: &DatabaseConnection,
        request_id: i32,
        caller: &Caller,
        authority: Authority,
    ) -> Result<leave_request::Model> {
        self.decide(db, request_id, caller, authority, LeaveStatus::Rejected)
            .await
    }

    #[instrument(skip(self, db, caller), fields(user_id = caller.user_id))]
    async fn decide(
        &self,
        db: &DatabaseConnection,
        request_id: i32,
        caller: &Caller,
        authority: Authority,
        outcome: LeaveStatus,
    ) -> Result<leave_request::Model> {
        let request = leave_request::Entity::find_by_id(request_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                OfficeError::not_found(format!("Leave request with ID {} not found", request_id))
            })?;

        match authority {
            Authority::Approver if request.approver_id != Some(caller.user_id) => {
                warn!(
                    "User {} is not the approver of leave request {}",
                    caller.user_id, request_id
                );
                return Err(OfficeError::forbidden(
                    "Only the assigned approver may decide this request",
                ));
            }
            Authority::AdminOverride if !caller.is_admin() => {
                return Err(OfficeError::forbidden(
                    "Administrator role required to decide this request",
                ));
            }
            _ => {}
        }

        if request.status.is_terminal() {
            return Err(already_decided(request_id, request.status));
        }

        // Only one decider can move the row out of PENDING.
        let result = leave_request::Entity::update_many()
            .col_expr(leave_request::Column::Status, Expr::value(outcome.as_str()))
            .filter(leave_request::Column::Id.eq(request_id))
            .filter(leave_request::Column::Status.eq(LeaveStatus::Pending))
            .exec(db)
            .await?;

        let current = leave_request::Entity::find_by_id(request_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                OfficeError::not_found(format!("Leave request with ID {} not found", request_id))
            })?;
        if result.rows_affected == 0 {
            return Err(already_decided(request_id, current.status));
        }

        info!(
            "Leave request {} {} by user {} ({:?})",
            request_id,
            outcome.as_str(),
            caller.user_id,
            authority
        );
        Ok(current)
    }

    async fn with_people(
        &self,
        db: &DatabaseConnection,
        requests: Vec<leave_request::Model>,
    ) -> Result<Vec<LeaveView>> {
        let ids: HashSet<i32> = requests
            .iter()
            .flat_map(|r| std::iter::once(r.employee_id).chain(r.approver_id))
            .collect();
        let people: HashMap<i32, PersonRef> = if ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(ids))
                .all(db)
                .await?
                .iter()
                .map(|u| (u.id, PersonRef::from(u)))
                .collect()
        };

        Ok(requests
            .into_iter()
            .map(|request| LeaveView {
                requester: people.get(&request.employee_id).cloned(),
                approver: request.approver_id.and_then(|id| people.get(&id).cloned()),
                request,
            })
            .collect())
    }
}

fn already_decided(request_id: i32, status: LeaveStatus) -> OfficeError {
    OfficeError::conflict(format!(
        "Leave request {} is already {}",
        request_id,
        status.as_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::RoleName;
    use crate::testing::{caller_for, create_user, setup_db};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sick_leave() -> NewLeave {
        NewLeave {
            leave_type: "SICK".to_string(),
            start_date: date(2024, 1, 10),
            end_date: date(2024, 1, 12),
            reason: Some("flu".to_string()),
        }
    }

    #[tokio::test]
    async fn test_manager_approves_request() {
        let db = setup_db().await;
        let workflow = LeaveWorkflow::new();
        let manager = create_user(&db, "manager", None).await;
        let alice = create_user(&db, "alice", Some(manager.id)).await;
        let alice = caller_for(&alice, &[RoleName::Emp]);
        let manager_caller = caller_for(&manager, &[RoleName::Emp]);

        let submitted = workflow.submit(&db, &alice, sick_leave()).await.unwrap();
        assert_eq!(submitted.status, LeaveStatus::Pending);
        assert_eq!(submitted.approver_id, Some(manager.id));

        let mine = workflow.list_mine(&db, &alice).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].request.status, LeaveStatus::Pending);
        assert_eq!(mine[0].approver.as_ref().map(|a| a.id), Some(manager.id));
        assert_eq!(mine[0].requester.as_ref().map(|r| r.username.as_str()), Some("alice"));

        let pending = workflow
            .list_pending_for_approver(&db, &manager_caller)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        workflow
            .approve(&db, submitted.id, &manager_caller, Authority::Approver)
            .await
            .unwrap();

        let mine = workflow.list_mine(&db, &alice).await.unwrap();
        assert_eq!(mine[0].request.status, LeaveStatus::Approved);
        assert!(workflow
            .list_pending_for_approver(&db, &manager_caller)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_request_without_manager_is_unassigned() {
        let db = setup_db().await;
        let workflow = LeaveWorkflow::new();
        let loner = create_user(&db, "loner", None).await;
        let other = create_user(&db, "other", None).await;
        let loner_caller = caller_for(&loner, &[RoleName::Emp]);

        let submitted = workflow.submit(&db, &loner_caller, sick_leave()).await.unwrap();
        assert_eq!(submitted.approver_id, None);

        for user in [&loner, &other] {
            let pending = workflow
                .list_pending_for_approver(&db, &caller_for(user, &[RoleName::Emp]))
                .await
                .unwrap();
            assert!(pending.is_empty());
        }
        assert_eq!(workflow.list_all_pending(&db).await.unwrap().len(), 1);

        // Nobody can decide it on the approver path
        let result = workflow
            .approve(&db, submitted.id, &loner_caller, Authority::Approver)
            .await;
        assert!(matches!(result, Err(OfficeError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_submit_validation() {
        let db = setup_db().await;
        let workflow = LeaveWorkflow::new();
        let alice = create_user(&db, "alice", None).await;
        let alice = caller_for(&alice, &[RoleName::Emp]);

        let backwards = NewLeave {
            start_date: date(2024, 1, 12),
            end_date: date(2024, 1, 10),
            ..sick_leave()
        };
        assert!(matches!(
            workflow.submit(&db, &alice, backwards).await,
            Err(OfficeError::Validation(_))
        ));

        let blank_type = NewLeave {
            leave_type: "   ".to_string(),
            ..sick_leave()
        };
        assert!(matches!(
            workflow.submit(&db, &alice, blank_type).await,
            Err(OfficeError::Validation(_))
        ));

        let single_day = NewLeave {
            start_date: date(2024, 1, 10),
            end_date: date(2024, 1, 10),
            ..sick_leave()
        };
        assert!(workflow.submit(&db, &alice, single_day).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_mine_sorted_by_start_date_desc() {
        let db = setup_db().await;
        let workflow = LeaveWorkflow::new();
        let alice = create_user(&db, "alice", None).await;
        let alice = caller_for(&alice, &[RoleName::Emp]);

        for day in [5, 20, 12] {
            let leave = NewLeave {
                start_date: date(2024, 3, day),
                end_date: date(2024, 3, day),
                ..sick_leave()
            };
            workflow.submit(&db, &alice, leave).await.unwrap();
        }

        let starts: Vec<u32> = workflow
            .list_mine(&db, &alice)
            .await
            .unwrap()
            .iter()
            .map(|v| chrono::Datelike::day(&v.request.start_date))
            .collect();
        assert_eq!(starts, vec![20, 12, 5]);
    }

    #[tokio::test]
    async fn test_only_assigned_approver_may_decide() {
        let db = setup_db().await;
        let workflow = LeaveWorkflow::new();
        let manager = create_user(&db, "manager", None).await;
        let stranger = create_user(&db, "stranger", None).await;
        let alice = create_user(&db, "alice", Some(manager.id)).await;

        let submitted = workflow
            .submit(&db, &caller_for(&alice, &[RoleName::Emp]), sick_leave())
            .await
            .unwrap();

        let result = workflow
            .reject(
                &db,
                submitted.id,
                &caller_for(&stranger, &[RoleName::Emp]),
                Authority::Approver,
            )
            .await;
        assert!(matches!(result, Err(OfficeError::Forbidden(_))));

        let missing = workflow
            .approve(&db, 9999, &caller_for(&manager, &[RoleName::Emp]), Authority::Approver)
            .await;
        assert!(matches!(missing, Err(OfficeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_decided_request_is_final() {
        let db = setup_db().await;
        let workflow = LeaveWorkflow::new();
        let manager = create_user(&db, "manager", None).await;
        let alice = create_user(&db, "alice", Some(manager.id)).await;
        let manager = caller_for(&manager, &[RoleName::Emp]);

        let submitted = workflow
            .submit(&db, &caller_for(&alice, &[RoleName::Emp]), sick_leave())
            .await
            .unwrap();
        let rejected = workflow
            .reject(&db, submitted.id, &manager, Authority::Approver)
            .await
            .unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);

        let again = workflow
            .approve(&db, submitted.id, &manager, Authority::Approver)
            .await;
        assert!(matches!(again, Err(OfficeError::Conflict(_))));
        let twice = workflow
            .reject(&db, submitted.id, &manager, Authority::Approver)
            .await;
        assert!(matches!(twice, Err(OfficeError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_admin_override() {
        let db = setup_db().await;
        let workflow = LeaveWorkflow::new();
        let admin = create_user(&db, "boss", None).await;
        let manager = create_user(&db, "manager", None).await;
        let alice = create_user(&db, "alice", Some(manager.id)).await;
        let alice = caller_for(&alice, &[RoleName::Emp]);

        let submitted = workflow.submit(&db, &alice, sick_leave()).await.unwrap();

        // A plain employee cannot use the override
        let result = workflow
            .approve(&db, submitted.id, &alice, Authority::AdminOverride)
            .await;
        assert!(matches!(result, Err(OfficeError::Forbidden(_))));

        let approved = workflow
            .approve(
                &db,
                submitted.id,
                &caller_for(&admin, &[RoleName::Admin]),
                Authority::AdminOverride,
            )
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.approver_id, Some(manager.id));
    }

    #[tokio::test]
    async fn test_approver_fixed_at_submission() {
        let db = setup_db().await;
        let workflow = LeaveWorkflow::new();
        let directory = UserDirectory::new();
        let first = create_user(&db, "first", None).await;
        let second = create_user(&db, "second", None).await;
        let alice = create_user(&db, "alice", Some(first.id)).await;

        let submitted = workflow
            .submit(&db, &caller_for(&alice, &[RoleName::Emp]), sick_leave())
            .await
            .unwrap();

        directory
            .update_user(
                &db,
                alice.id,
                crate::directory::UserChanges {
                    manager: crate::directory::ManagerChange::Set(second.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let pending_first = workflow
            .list_pending_for_approver(&db, &caller_for(&first, &[RoleName::Emp]))
            .await
            .unwrap();
        assert_eq!(pending_first.len(), 1);
        assert_eq!(pending_first[0].request.id, submitted.id);
        assert!(workflow
            .list_pending_for_approver(&db, &caller_for(&second, &[RoleName::Emp]))
            .await
            .unwrap()
            .is_empty());
    }
}
