//! Staging: resolve an upload against the catalog, derive its relational
//! keys, and persist the parsed rows as a pending artifact.
//!
//! Resolution and key derivation happen eagerly here so approval does not
//! need to re-derive business keys. Nothing is written to any target table.

use tracing::info;
use uuid::Uuid;

use crate::catalog::CategoryCatalog;
use crate::db::{keys, DbPool};
use crate::entity::upload_artifact;
use crate::error::{AppError, AppResult};
use crate::models::{CategoryKind, DerivedKeys, StagedRows, UploadMeta};

/// Stage a parsed upload. On success the artifact is pending and no rows
/// are visible in any target table.
pub async fn stage(
    pool: &DbPool,
    catalog: &CategoryCatalog,
    meta: UploadMeta,
    kind: CategoryKind,
    category_id: &str,
    parsed: StagedRows,
) -> AppResult<upload_artifact::Model> {
    if parsed.is_empty() {
        return Err(AppError::EmptyPayload(format!(
            "'{}' contains no data rows",
            meta.original_filename
        )));
    }

    let schema = catalog.resolve(kind, category_id).ok_or_else(|| {
        AppError::UnknownCategory(format!(
            "'{}' is not a known {} category (known: {})",
            category_id,
            kind,
            catalog.known_ids(kind).join(", ")
        ))
    })?;

    let derived = if kind.requires_period() {
        let period_id = meta.period_id.ok_or_else(|| {
            AppError::InvalidInput(format!("{} uploads require a period_id", kind))
        })?;
        keys::derive_relational_keys(pool.connection(), period_id, category_id).await?
    } else {
        DerivedKeys::default()
    };

    let row_count = parsed.len();
    let artifact_id = Uuid::now_v7();

    let artifact = pool
        .insert_artifact(
            artifact_id,
            &meta,
            kind,
            category_id,
            &schema.target_table,
            serde_json::to_value(&schema.mapping)?,
            serde_json::to_value(&parsed)?,
            row_count as i32,
            derived,
        )
        .await?;

    info!(
        "Artifact {} staged: kind={}, category={}, table={}, rows={}, uploader={}",
        artifact_id, kind, category_id, schema.target_table, row_count, meta.uploaded_by
    );

    Ok(artifact)
}
