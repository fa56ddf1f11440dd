//! Upload staging endpoint.
//!
//! `POST /api/v1/uploads/{kind}/{category_id}` accepts one tabular file as
//! multipart form data, parses it, resolves the category, derives relational
//! keys, and stages the result as a pending artifact. The uploaded bytes are
//! read once and the scratch file is deleted after parsing.

use std::path::PathBuf;
use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::catalog::CategoryCatalog;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{ArtifactStatus, CategoryKind, StageResponse, UploadMeta};
use crate::services::{parser, staging, FileKind};

/// Query parameters accepted alongside the multipart body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StageQuery {
    /// Reporting period (required for monitoring/enhancement uploads).
    #[serde(default)]
    pub period_id: Option<i32>,
    /// Explicit file kind override (`delimited` or `spreadsheet`).
    #[serde(default)]
    pub file_kind: Option<String>,
}

/// The uploaded file streamed to scratch storage.
struct StreamedUpload {
    original_filename: String,
    media_type: String,
    temp_path: PathBuf,
    byte_size: usize,
}

/// Stage a monitoring, enhancement, or reference upload.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{kind}/{category_id}",
    tag = "Uploads",
    params(
        ("kind" = String, Path, description = "Category kind: monitoring, enhancement, or reference"),
        ("category_id" = String, Path, description = "Category identifier within the kind"),
        ("period_id" = Option<i32>, Query, description = "Reporting period id (monitoring/enhancement)"),
        ("file_kind" = Option<String>, Query, description = "File kind override: delimited or spreadsheet"),
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "One tabular file"),
    responses(
        (status = 201, description = "Upload staged", body = StageResponse),
        (status = 400, description = "Malformed input or unknown category", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 422, description = "Unresolved foreign key", body = crate::error::ErrorResponse),
    ),
    security(("api_key" = []))
)]
#[post("/uploads/{kind}/{category_id}")]
pub async fn stage_upload(
    auth: ApiKeyAuth,
    path: web::Path<(String, String)>,
    query: web::Query<StageQuery>,
    mut payload: Multipart,
    pool: web::Data<DbPool>,
    catalog: web::Data<CategoryCatalog>,
    config: web::Data<Config>,
    upload_semaphore: web::Data<Arc<Semaphore>>,
) -> AppResult<HttpResponse> {
    if !auth.caller.can_stage() {
        return Err(AppError::Unauthorized(
            "Viewer keys cannot stage uploads. Operator role or above required.".to_string(),
        ));
    }

    let (kind_str, category_id) = path.into_inner();
    let kind = CategoryKind::parse(&kind_str).ok_or_else(|| {
        AppError::InvalidInput(format!(
            "Unknown category kind '{}'. Expected monitoring, enhancement, or reference.",
            kind_str
        ))
    })?;

    // Limit concurrent staging requests to bound parse memory.
    let _permit = upload_semaphore.try_acquire().map_err(|_| {
        warn!("Upload rejected for {}/{}: too many concurrent uploads", kind, category_id);
        AppError::ServiceUnavailable(
            "Too many concurrent uploads. Please try again later.".to_string(),
        )
    })?;

    let upload = stream_to_scratch(&mut payload, &config.upload_dir, config.max_upload_size)
        .await?
        .ok_or_else(|| AppError::InvalidInput("No file field in the request".to_string()))?;

    let file_kind = match query.file_kind.as_deref() {
        Some(s) => FileKind::parse(s).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Unknown file kind '{}'. Expected delimited or spreadsheet.",
                s
            ))
        })?,
        None => {
            FileKind::detect(&upload.media_type, &upload.original_filename).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "Cannot infer the file kind of '{}'; pass ?file_kind=",
                    upload.original_filename
                ))
            })?
        }
    };

    // Parse, then discard the scratch file either way.
    let parsed = parser::parse_file(&upload.temp_path, file_kind);
    if let Err(e) = tokio::fs::remove_file(&upload.temp_path).await {
        warn!("Failed to remove scratch file {:?}: {}", upload.temp_path, e);
    }
    let parsed = parsed?;

    let meta = UploadMeta {
        original_filename: upload.original_filename,
        storage_filename: upload
            .temp_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        byte_size: upload.byte_size as i64,
        media_type: upload.media_type,
        uploaded_by: auth.caller.name.clone(),
        period_id: query.period_id,
    };

    let artifact = staging::stage(&pool, &catalog, meta, kind, &category_id, parsed).await?;

    Ok(HttpResponse::Created().json(StageResponse {
        artifact_id: artifact.id,
        target_table: artifact.target_table,
        row_count: artifact.row_count as usize,
        status: ArtifactStatus::Pending,
        created_at: artifact.created_at,
    }))
}

/// Stream the first file field of a multipart payload to scratch storage.
///
/// Only metadata is kept in memory, not file contents. Returns `None` when
/// the payload carries no file field.
async fn stream_to_scratch(
    payload: &mut Multipart,
    upload_dir: &std::path::Path,
    max_upload_size: usize,
) -> AppResult<Option<StreamedUpload>> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::FileSystem(format!("Failed to create upload directory: {}", e)))?;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let filename = match field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
        {
            Some(name) => name.replace('\\', "/"),
            None => {
                drain_field(&mut field).await;
                continue;
            }
        };

        if filename.contains("..") || filename.starts_with('/') {
            drain_field(&mut field).await;
            return Err(AppError::InvalidInput("Invalid filename".to_string()));
        }

        let media_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let temp_path = upload_dir.join(format!("upload_{}", Uuid::new_v4()));
        let mut temp_file = tokio::fs::File::create(&temp_path)
            .await
            .map_err(|e| AppError::FileSystem(format!("Failed to create scratch file: {}", e)))?;

        let mut size: usize = 0;
        while let Some(chunk) = field.next().await {
            let chunk_data =
                chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            size += chunk_data.len();

            if size > max_upload_size {
                drop(temp_file);
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(AppError::InvalidInput(format!(
                    "'{}' exceeds the upload size limit of {} bytes",
                    filename, max_upload_size
                )));
            }

            temp_file
                .write_all(&chunk_data)
                .await
                .map_err(|e| AppError::FileSystem(format!("Failed to write scratch file: {}", e)))?;
        }
        temp_file.flush().await.ok();

        return Ok(Some(StreamedUpload {
            original_filename: filename,
            media_type,
            temp_path,
            byte_size: size,
        }));
    }

    Ok(None)
}

/// Drain a multipart field without saving.
async fn drain_field(field: &mut actix_multipart::Field) {
    while let Some(chunk) = field.next().await {
        let _ = chunk;
    }
}

/// Configure upload routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(stage_upload);
}
