//! Upload artifact entity: one staged upload awaiting or having received an
//! approval decision.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "upload_artifacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub original_filename: String,
    pub storage_filename: String,
    pub byte_size: i64,
    pub media_type: String,
    pub uploaded_by: String,
    pub status: String,
    pub category_kind: String,
    pub category_id: String,
    pub target_table: String,
    /// External field -> target column. Empty object for reference uploads
    /// until approval resolves the live schema.
    #[sea_orm(column_type = "JsonBinary")]
    pub column_mapping: JsonValue,
    /// `{headers: [...], rows: [{field: value, ...}, ...]}` as parsed.
    #[sea_orm(column_type = "JsonBinary")]
    pub rows: JsonValue,
    pub row_count: i32,
    pub period_id: Option<i32>,
    pub year_id: Option<i32>,
    pub main_category_id: Option<i32>,
    pub sub_category_id: Option<i32>,
    pub decided_by: Option<String>,
    pub decided_at: Option<DateTimeUtc>,
    pub decision_reason: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
