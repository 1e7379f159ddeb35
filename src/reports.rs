//! User reports against listings.

use crate::db::Database;
use crate::error::ApiError;
use crate::models::report::{ReportRequest, StatusUpdateRequest};
use crate::models::{AuthenticatedUser, Report};
use tracing::{error, info, warn};

pub async fn create(
    db: &Database,
    caller: &AuthenticatedUser,
    request: ReportRequest,
) -> Result<Report, ApiError> {
    let new = request.validate()?;
    let report = db.insert_report(caller.id, &new).await.map_err(|e| {
        error!(
            "[REPORTS] create(user {}, type {}) failed: {:?}",
            caller.id,
            new.target_type.as_str(),
            e
        );
        ApiError::from(e)
    })?;
    info!("[REPORTS] User {} filed report {}", caller.id, report.id);
    Ok(report)
}

pub async fn list_mine(db: &Database, caller: &AuthenticatedUser) -> Result<Vec<Report>, ApiError> {
    db.reports_for_user(caller.id).await.map_err(|e| {
        error!("[REPORTS] list_mine(user {}) failed: {:?}", caller.id, e);
        ApiError::from(e)
    })
}

/// Only the reporter or an admin may move a report along.
pub async fn update_status(
    db: &Database,
    caller: &AuthenticatedUser,
    report_id: i64,
    request: StatusUpdateRequest,
) -> Result<Report, ApiError> {
    let existing = db.get_report(report_id).await.map_err(|e| {
        error!("[REPORTS] get_report({}) failed: {:?}", report_id, e);
        ApiError::from(e)
    })?;
    let existing = existing.ok_or_else(|| ApiError::NotFound(format!("Report {report_id}")))?;

    if existing.reported_by != caller.id && !caller.is_admin() {
        warn!(
            "[REPORTS] User {} tried to update report {} owned by {}",
            caller.id, report_id, existing.reported_by
        );
        return Err(ApiError::Authorization);
    }

    let status = request.validate()?;
    let updated = db
        .update_report_status(report_id, status)
        .await
        .map_err(|e| {
            error!(
                "[REPORTS] update_status({}, {}) failed: {:?}",
                report_id,
                status.as_str(),
                e
            );
            ApiError::from(e)
        })?;
    updated.ok_or_else(|| ApiError::NotFound(format!("Report {report_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportStatus, ReportTargetType, Role};

    async fn user(db: &Database, email: &str, role: Role) -> AuthenticatedUser {
        let id = db.insert_user("R", "Porter", email, None, role).await.unwrap();
        AuthenticatedUser { id, role }
    }

    fn restaurant_report() -> ReportRequest {
        ReportRequest {
            target_type: Some("Restaurant".into()),
            target_name: Some("Mama's Kitchen".into()),
            issue: Some("Customer Experience".into()),
            details: Some("Waited an hour for a cold meal".into()),
        }
    }

    #[tokio::test]
    async fn create_maps_category_and_starts_under_review() {
        let db = Database::new(":memory:").unwrap();
        db.create_schema().await.unwrap();
        let me = user(&db, "me@example.com", Role::User).await;

        let report = create(&db, &me, restaurant_report()).await.unwrap();
        assert_eq!(report.target_type, ReportTargetType::Business);
        assert_eq!(report.status, ReportStatus::UnderReview);
        assert_eq!(report.reported_by, me.id);
        assert_eq!(list_mine(&db, &me).await.unwrap(), vec![report]);
    }

    #[tokio::test]
    async fn only_owner_or_admin_may_update() {
        let db = Database::new(":memory:").unwrap();
        db.create_schema().await.unwrap();
        let owner = user(&db, "owner@example.com", Role::User).await;
        let stranger = user(&db, "stranger@example.com", Role::User).await;
        let admin = user(&db, "admin@example.com", Role::Admin).await;
        let report = create(&db, &owner, restaurant_report()).await.unwrap();

        let denied = update_status(
            &db,
            &stranger,
            report.id,
            StatusUpdateRequest { status: Some("Resolved".into()) },
        )
        .await
        .unwrap_err();
        assert!(matches!(denied, ApiError::Authorization));

        let by_owner = update_status(
            &db,
            &owner,
            report.id,
            StatusUpdateRequest { status: Some("In Progress".into()) },
        )
        .await
        .unwrap();
        assert_eq!(by_owner.status, ReportStatus::InProgress);

        let by_admin = update_status(
            &db,
            &admin,
            report.id,
            StatusUpdateRequest { status: Some("Resolved".into()) },
        )
        .await
        .unwrap();
        assert_eq!(by_admin.status, ReportStatus::Resolved);

        let missing = update_status(
            &db,
            &admin,
            report.id + 100,
            StatusUpdateRequest { status: Some("Resolved".into()) },
        )
        .await
        .unwrap_err();
        assert!(matches!(missing, ApiError::NotFound(_)));
    }
}
