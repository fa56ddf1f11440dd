//! Artifact review endpoints: list, preview, approve, reject, delete.

use actix_web::{delete, get, post, web, HttpResponse};
use uuid::Uuid;

use crate::auth::ApiKeyAuth;
use crate::catalog::CategoryCatalog;
use crate::config::Config;
use crate::db::DbPool;
use crate::entity::upload_artifact;
use crate::error::{AppError, AppResult};
use crate::models::{
    ArtifactListResponse, ArtifactStatus, ArtifactSummary, CategoryKind, DecisionResponse,
    ListArtifactsQuery, PreviewQuery, RejectRequest,
};
use crate::services::{approval, preview};

fn summarize(model: upload_artifact::Model) -> AppResult<ArtifactSummary> {
    let status = ArtifactStatus::parse(&model.status)
        .ok_or_else(|| AppError::Database(format!("Corrupt status '{}'", model.status)))?;
    let kind = CategoryKind::parse(&model.category_kind).ok_or_else(|| {
        AppError::Database(format!("Corrupt category kind '{}'", model.category_kind))
    })?;

    Ok(ArtifactSummary {
        id: model.id,
        status,
        category_kind: kind,
        category_id: model.category_id,
        target_table: model.target_table,
        original_filename: model.original_filename,
        row_count: model.row_count,
        uploaded_by: model.uploaded_by,
        period_id: model.period_id,
        created_at: model.created_at,
        decided_by: model.decided_by,
        decided_at: model.decided_at,
    })
}

/// List artifacts, pending first by default.
#[utoipa::path(
    get,
    path = "/api/v1/artifacts",
    tag = "Artifacts",
    params(
        ("kind" = Option<String>, Query, description = "Filter by category kind"),
        ("status" = Option<String>, Query, description = "Filter by status (default pending)"),
        ("limit" = Option<u64>, Query, description = "Page size (max 200)"),
        ("offset" = Option<u64>, Query, description = "Pagination offset"),
    ),
    responses(
        (status = 200, description = "Artifact list", body = ArtifactListResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("api_key" = []))
)]
#[get("/artifacts")]
pub async fn list_artifacts(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    query: web::Query<ListArtifactsQuery>,
) -> AppResult<HttpResponse> {
    let (models, total) = pool.list_artifacts(&query).await?;

    let artifacts = models
        .into_iter()
        .map(summarize)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(HttpResponse::Ok().json(ArtifactListResponse {
        artifacts,
        total,
        limit: query.limit.clamp(1, 200),
        offset: query.offset,
    }))
}

/// Preview the staged rows of an artifact.
///
/// Read-only: serves the staged payload, never the target table.
#[utoipa::path(
    get,
    path = "/api/v1/artifacts/{id}/preview",
    tag = "Artifacts",
    params(
        ("id" = Uuid, Path, description = "Artifact id"),
        ("page" = Option<usize>, Query, description = "1-based page number"),
        ("page_size" = Option<usize>, Query, description = "Rows per page (max 500)"),
    ),
    responses(
        (status = 200, description = "Preview page", body = crate::models::PreviewPage),
        (status = 404, description = "Artifact not found", body = crate::error::ErrorResponse),
    ),
    security(("api_key" = []))
)]
#[get("/artifacts/{id}/preview")]
pub async fn preview_artifact(
    _auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    path: web::Path<Uuid>,
    query: web::Query<PreviewQuery>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let artifact = pool
        .get_artifact(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Artifact {}", id)))?;

    let page = preview::preview_page(
        &artifact,
        query.page,
        query.page_size,
        config.preview_page_size,
    )?;

    Ok(HttpResponse::Ok().json(page))
}

/// Approve a pending artifact, committing its rows to the target table.
#[utoipa::path(
    post,
    path = "/api/v1/artifacts/{id}/approve",
    tag = "Artifacts",
    params(("id" = Uuid, Path, description = "Artifact id")),
    responses(
        (status = 200, description = "Artifact approved", body = DecisionResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Artifact not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already decided or schema vanished", body = crate::error::ErrorResponse),
        (status = 422, description = "Insert failed, artifact stays pending", body = crate::error::ErrorResponse),
    ),
    security(("api_key" = []))
)]
#[post("/artifacts/{id}/approve")]
pub async fn approve_artifact(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    catalog: web::Data<CategoryCatalog>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    if !auth.caller.can_decide() {
        return Err(AppError::Unauthorized(
            "Reviewer role or above required to decide approvals.".to_string(),
        ));
    }

    let id = path.into_inner();
    let outcome = approval::approve(&pool, &catalog, id, &auth.caller.name).await?;

    Ok(HttpResponse::Ok().json(DecisionResponse {
        artifact_id: id,
        status: ArtifactStatus::Approved,
        decided_by: auth.caller.name.clone(),
        outcome: Some(outcome),
    }))
}

/// Reject a pending artifact. No data movement.
#[utoipa::path(
    post,
    path = "/api/v1/artifacts/{id}/reject",
    tag = "Artifacts",
    params(("id" = Uuid, Path, description = "Artifact id")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Artifact rejected", body = DecisionResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Artifact not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already decided", body = crate::error::ErrorResponse),
    ),
    security(("api_key" = []))
)]
#[post("/artifacts/{id}/reject")]
pub async fn reject_artifact(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: Option<web::Json<RejectRequest>>,
) -> AppResult<HttpResponse> {
    if !auth.caller.can_decide() {
        return Err(AppError::Unauthorized(
            "Reviewer role or above required to decide approvals.".to_string(),
        ));
    }

    let id = path.into_inner();
    let reason = body.and_then(|b| b.into_inner().reason);

    approval::reject(&pool, id, &auth.caller.name, reason.as_deref()).await?;

    Ok(HttpResponse::Ok().json(DecisionResponse {
        artifact_id: id,
        status: ArtifactStatus::Rejected,
        decided_by: auth.caller.name.clone(),
        outcome: None,
    }))
}

/// Delete an artifact record (administrative, independent of the approval
/// flow).
#[utoipa::path(
    delete,
    path = "/api/v1/artifacts/{id}",
    tag = "Artifacts",
    params(("id" = Uuid, Path, description = "Artifact id")),
    responses(
        (status = 204, description = "Artifact deleted"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Artifact not found", body = crate::error::ErrorResponse),
    ),
    security(("api_key" = []))
)]
#[delete("/artifacts/{id}")]
pub async fn delete_artifact(
    auth: ApiKeyAuth,
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    if !auth.caller.is_admin() {
        return Err(AppError::Unauthorized(
            "Admin role required to delete artifacts.".to_string(),
        ));
    }

    let id = path.into_inner();
    if pool.delete_artifact(id).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(AppError::NotFound(format!("Artifact {}", id)))
    }
}

/// Configure artifact routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_artifacts)
        .service(preview_artifact)
        .service(approve_artifact)
        .service(reject_artifact)
        .service(delete_artifact);
}
