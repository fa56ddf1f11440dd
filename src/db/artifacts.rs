//! Database queries for upload artifacts.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entity::upload_artifact::{self as artifact, ActiveModel, Entity as Artifact};
use crate::error::{AppError, AppResult};
use crate::models::{ArtifactStatus, CategoryKind, DerivedKeys, ListArtifactsQuery, UploadMeta};

use super::DbPool;

impl DbPool {
    /// Insert a new pending artifact.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_artifact(
        &self,
        id: Uuid,
        meta: &UploadMeta,
        kind: CategoryKind,
        category_id: &str,
        target_table: &str,
        column_mapping: serde_json::Value,
        rows: serde_json::Value,
        row_count: i32,
        keys: DerivedKeys,
    ) -> AppResult<artifact::Model> {
        let model = ActiveModel {
            id: Set(id),
            original_filename: Set(meta.original_filename.clone()),
            storage_filename: Set(meta.storage_filename.clone()),
            byte_size: Set(meta.byte_size),
            media_type: Set(meta.media_type.clone()),
            uploaded_by: Set(meta.uploaded_by.clone()),
            status: Set(ArtifactStatus::Pending.as_str().to_string()),
            category_kind: Set(kind.as_str().to_string()),
            category_id: Set(category_id.to_string()),
            target_table: Set(target_table.to_string()),
            column_mapping: Set(column_mapping),
            rows: Set(rows),
            row_count: Set(row_count),
            period_id: Set(keys.period_id),
            year_id: Set(keys.year_id),
            main_category_id: Set(keys.main_category_id),
            sub_category_id: Set(keys.sub_category_id),
            decided_by: Set(None),
            decided_at: Set(None),
            decision_reason: Set(None),
            created_at: Set(Utc::now()),
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert artifact: {}", e)))?;

        Ok(result)
    }

    /// Get an artifact by ID.
    pub async fn get_artifact(&self, id: Uuid) -> AppResult<Option<artifact::Model>> {
        let result = Artifact::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get artifact: {}", e)))?;

        Ok(result)
    }

    /// List artifacts with optional filtering, newest first.
    pub async fn list_artifacts(
        &self,
        query: &ListArtifactsQuery,
    ) -> AppResult<(Vec<artifact::Model>, u64)> {
        let mut select = Artifact::find();

        if let Some(kind) = query.kind {
            select = select.filter(artifact::Column::CategoryKind.eq(kind.as_str()));
        }

        let status = query.status.unwrap_or(ArtifactStatus::Pending);
        select = select.filter(artifact::Column::Status.eq(status.as_str()));

        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count artifacts: {}", e)))?;

        let limit = query.limit.clamp(1, 200);
        let offset = query.offset;

        let artifacts = select
            .order_by_desc(artifact::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list artifacts: {}", e)))?;

        Ok((artifacts, total))
    }

    /// Delete an artifact record (administrative, independent of the
    /// approval flow).
    pub async fn delete_artifact(&self, id: Uuid) -> AppResult<bool> {
        let result = Artifact::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete artifact: {}", e)))?;

        Ok(result.rows_affected == 1)
    }
}

/// Conditionally transition an artifact out of `pending`.
///
/// The `WHERE status = 'pending'` filter makes the transition itself the
/// source of truth against concurrent decisions: whichever caller flips the
/// row first wins, every other caller sees zero rows affected. Runs on any
/// connection so the approval path can call it inside its transaction.
pub async fn transition_status<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    to: ArtifactStatus,
    actor: &str,
    reason: Option<&str>,
) -> AppResult<bool> {
    debug_assert!(to.is_terminal());

    let result = Artifact::update_many()
        .col_expr(artifact::Column::Status, Expr::value(to.as_str()))
        .col_expr(artifact::Column::DecidedBy, Expr::value(actor))
        .col_expr(artifact::Column::DecidedAt, Expr::value(Utc::now()))
        .col_expr(
            artifact::Column::DecisionReason,
            Expr::value(reason.map(str::to_string)),
        )
        .filter(artifact::Column::Id.eq(id))
        .filter(artifact::Column::Status.eq(ArtifactStatus::Pending.as_str()))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to transition artifact: {}", e)))?;

    Ok(result.rows_affected == 1)
}
