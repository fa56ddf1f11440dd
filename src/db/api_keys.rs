//! Database operations for API keys.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::api_key;
use crate::error::{AppError, AppResult};
use crate::models::ApiKey;

fn model_to_api_key(m: api_key::Model) -> ApiKey {
    ApiKey {
        id: m.id.to_string(),
        key_hash: m.key_hash,
        key_prefix: m.key_prefix,
        name: m.name,
        role: m.role,
        expires_at: m.expires_at,
        last_used_at: m.last_used_at,
        created_at: m.created_at,
        deleted_at: m.deleted_at,
    }
}

/// Find an API key by its SHA-256 hash.
pub async fn find_by_hash(db: &DatabaseConnection, key_hash: &str) -> AppResult<Option<ApiKey>> {
    let result = api_key::Entity::find()
        .filter(api_key::Column::KeyHash.eq(key_hash))
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to look up API key: {}", e)))?;

    Ok(result.map(model_to_api_key))
}

/// Insert a new API key.
pub async fn insert_api_key(db: &DatabaseConnection, key: &ApiKey) -> AppResult<()> {
    let id = Uuid::parse_str(&key.id)
        .map_err(|e| AppError::InvalidInput(format!("Invalid API key id: {}", e)))?;

    let model = api_key::ActiveModel {
        id: Set(id),
        key_hash: Set(key.key_hash.clone()),
        key_prefix: Set(key.key_prefix.clone()),
        name: Set(key.name.clone()),
        role: Set(key.role.clone()),
        expires_at: Set(key.expires_at),
        last_used_at: Set(None),
        created_at: Set(key.created_at),
        deleted_at: Set(None),
    };

    model
        .insert(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to insert API key: {}", e)))?;

    Ok(())
}

/// Update the last-used timestamp. Best effort; callers may ignore failures.
pub async fn update_last_used(db: &DatabaseConnection, id: &str) -> AppResult<()> {
    let uuid = Uuid::parse_str(id)
        .map_err(|e| AppError::InvalidInput(format!("Invalid API key id: {}", e)))?;

    let existing = api_key::Entity::find_by_id(uuid)
        .one(db)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load API key: {}", e)))?;

    if let Some(m) = existing {
        let mut active: api_key::ActiveModel = m.into();
        active.last_used_at = Set(Some(Utc::now()));
        active
            .update(db)
            .await
            .map_err(|e| AppError::Database(format!("Failed to update API key: {}", e)))?;
    }

    Ok(())
}
