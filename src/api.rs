use crate::db::Database;
use crate::error::ApiError;
use crate::models::report::{ReportRequest, StatusUpdateRequest};
use crate::models::review::ReviewRequest;
use crate::models::{AuthenticatedUser, TargetKind, TargetRef};
use crate::{feedback, reports};
use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::debug;

/// Registers every route; shared by the server binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, req| {
        debug!("[API] Rejected body on {}: {}", req.path(), err);
        match err {
            JsonPayloadError::Deserialize(e) => {
                ApiError::validation("body", format!("The request body is invalid: {e}")).into()
            }
            // content type, size limits and transport errors keep their own status
            other => other.into(),
        }
    }))
    .app_data(web::PathConfig::default().error_handler(|err, req| {
        debug!("[API] Bad path {}: {}", req.path(), err);
        ApiError::NotFound("Resource".into()).into()
    }))
    .route("/ping", web::get().to(ping))
    .route("/reviews", web::post().to(create_review))
    .route("/reviews/user", web::get().to(my_reviews))
    .route("/reports", web::get().to(my_reports))
    .route("/reports", web::post().to(create_report))
    .route("/reports/{id}", web::patch().to(update_report))
    .route("/{collection}/{id}/reviews", web::get().to(target_reviews))
    .route("/{collection}/{id}/reviews/summary", web::get().to(target_summary));
}

async fn ping() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "pong" }))
}

// `/services/{id}`, `/events/{id}` or `/businesses/{id}`
fn target_from_path(path: web::Path<(String, i64)>) -> Result<TargetRef, ApiError> {
    let (collection, id) = path.into_inner();
    TargetKind::from_collection(&collection)
        .map(|kind| kind.with_id(id))
        .ok_or_else(|| ApiError::NotFound(format!("Collection {collection}")))
}

pub async fn target_reviews(
    db: web::Data<Database>,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse, ApiError> {
    let target = target_from_path(path)?;
    let reviews = feedback::list_for_target(&db, target).await?;
    debug!("[API] Returning {} reviews for {}", reviews.len(), target);
    Ok(HttpResponse::Ok().json(reviews))
}

pub async fn target_summary(
    db: web::Data<Database>,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse, ApiError> {
    let target = target_from_path(path)?;
    let summary = feedback::summary(&db, target).await?;
    Ok(HttpResponse::Ok().json(json!({
        "type": target.kind(),
        "id": target.id(),
        "count": summary.count,
        "averageRating": summary.average_rating,
        "display": summary.display_rating(),
    })))
}

pub async fn create_review(
    db: web::Data<Database>,
    caller: AuthenticatedUser,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, ApiError> {
    let created = feedback::create(&db, &caller, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn my_reviews(
    db: web::Data<Database>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let reviews = feedback::list_for_reviewer(&db, &caller).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

pub async fn my_reports(
    db: web::Data<Database>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let list = reports::list_mine(&db, &caller).await?;
    Ok(HttpResponse::Ok().json(list))
}

pub async fn create_report(
    db: web::Data<Database>,
    caller: AuthenticatedUser,
    body: web::Json<ReportRequest>,
) -> Result<HttpResponse, ApiError> {
    let report = reports::create(&db, &caller, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(report))
}

pub async fn update_report(
    db: web::Data<Database>,
    caller: AuthenticatedUser,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, ApiError> {
    let report_id = path.into_inner();
    debug!("[API] {} {} by user {}", req.method(), req.path(), caller.id);
    let report = reports::update_status(&db, &caller, report_id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}
