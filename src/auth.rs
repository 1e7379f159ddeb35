use crate::db::Database;
use crate::error::ApiError;
use crate::models::AuthenticatedUser;
use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use tracing::{debug, error};

/// Pulls the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let db = req.app_data::<web::Data<Database>>().cloned();
        let token = bearer_token(req);
        let path = req.path().to_string();

        Box::pin(async move {
            let Some(db) = db else {
                error!("[AUTH] Database missing from app data on {}", path);
                return Err(ApiError::Internal("database not configured".into()));
            };
            let Some(token) = token else {
                debug!("[AUTH] No bearer token on {}", path);
                return Err(ApiError::Authentication);
            };
            match db.user_for_token(&token).await {
                Ok(Some(user)) => Ok(user),
                Ok(None) => {
                    debug!("[AUTH] Unknown token on {}", path);
                    Err(ApiError::Authentication)
                }
                Err(e) => {
                    error!("[AUTH] Token lookup failed on {}: {:?}", path, e);
                    Err(ApiError::Storage(e))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn reads_bearer_tokens_only() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc123"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc123"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "bearer   xyz "))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("xyz"));

        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);

        let req = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&req), None);
    }

    #[actix_web::test]
    async fn missing_database_is_a_server_error() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc123"))
            .to_http_request();
        let result = AuthenticatedUser::from_request(&req, &mut Payload::None).await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }

    #[actix_web::test]
    async fn missing_token_is_unauthenticated() {
        let db = Database::new(":memory:").unwrap();
        db.create_schema().await.unwrap();
        let req = TestRequest::default()
            .app_data(web::Data::new(db))
            .to_http_request();
        let result = AuthenticatedUser::from_request(&req, &mut Payload::None).await;
        assert!(matches!(result, Err(ApiError::Authentication)));
    }
}
