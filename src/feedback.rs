//! Reading and writing reviews, and the per-listing summary.
//!
//! Every operation takes the database and, where it acts for someone, the
//! caller as plain arguments.

use crate::db::Database;
use crate::error::ApiError;
use crate::models::review::ReviewRequest;
use crate::models::{AuthenticatedUser, FeedbackWithReviewer, FeedbackWithTarget, Summary, TargetRef};
use tracing::{error, info};

/// Reviews of one listing in insertion order. An unknown listing simply
/// has no reviews.
pub async fn list_for_target(
    db: &Database,
    target: TargetRef,
) -> Result<Vec<FeedbackWithReviewer>, ApiError> {
    db.feedback_for_target(target).await.map_err(|e| {
        error!("[FEEDBACK] list_for_target({}) failed: {:?}", target, e);
        ApiError::from(e)
    })
}

pub async fn list_for_reviewer(
    db: &Database,
    caller: &AuthenticatedUser,
) -> Result<Vec<FeedbackWithTarget>, ApiError> {
    db.feedback_by_reviewer(caller.id).await.map_err(|e| {
        error!("[FEEDBACK] list_for_reviewer(user {}) failed: {:?}", caller.id, e);
        ApiError::from(e)
    })
}

pub async fn create(
    db: &Database,
    caller: &AuthenticatedUser,
    request: ReviewRequest,
) -> Result<FeedbackWithReviewer, ApiError> {
    let new = request.validate()?;

    match db.insert_feedback(caller.id, &new).await {
        Ok(Some(created)) => {
            info!(
                "[FEEDBACK] User {} reviewed {} ({} stars), feedback {}",
                caller.id,
                new.target,
                new.rating.value(),
                created.feedback.id
            );
            Ok(created)
        }
        Ok(None) => Err(ApiError::NotFound(new.target.to_string())),
        Err(e) => {
            error!(
                "[FEEDBACK] create(user {}, {}, rating {}) failed: {:?}",
                caller.id,
                new.target,
                new.rating.value(),
                e
            );
            Err(e.into())
        }
    }
}

/// Count and average for one listing, recomputed from the stored rows.
pub async fn summary(db: &Database, target: TargetRef) -> Result<Summary, ApiError> {
    let ratings = db.ratings_for_target(target).await.map_err(|e| {
        error!("[FEEDBACK] summary({}) failed: {:?}", target, e);
        ApiError::from(e)
    })?;
    Ok(Summary::from_ratings(ratings))
}
