//! Actix-web extractor for API key authentication.
//!
//! # Security
//! - The API key header is wrapped in `SecretString` immediately
//! - Secret values are never logged or exposed in debug output
//! - Only the SHA-256 hash is ever compared against storage

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use secrecy::{ExposeSecret, SecretString};

use crate::config::API_KEY_HEADER;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::AuthenticatedCaller;
use crate::services::api_key;

/// Extract a secret header value, wrapping it in SecretString.
/// Returns None if the header is missing or invalid UTF-8.
fn extract_secret_header(req: &HttpRequest, header_name: &str) -> Option<SecretString> {
    req.headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(|s| SecretString::from(s.to_string()))
}

/// Extractor that requires a valid API key.
///
/// Use this in handlers that require authentication:
/// ```ignore
/// async fn protected_handler(auth: ApiKeyAuth) -> impl Responder {
///     // auth.caller contains the authenticated caller info
/// }
/// ```
pub struct ApiKeyAuth {
    pub caller: AuthenticatedCaller,
}

impl FromRequest for ApiKeyAuth {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let pool = req
                .app_data::<web::Data<DbPool>>()
                .cloned()
                .ok_or_else(|| AppError::Database("Database pool not configured".to_string()))?;

            let provided_key = extract_secret_header(&req, API_KEY_HEADER).ok_or_else(|| {
                AppError::Unauthorized(format!(
                    "Missing API key. Provide the {} header.",
                    API_KEY_HEADER
                ))
            })?;

            let caller = api_key::verify_key(&pool, provided_key.expose_secret()).await?;

            Ok(ApiKeyAuth { caller })
        })
    }
}
