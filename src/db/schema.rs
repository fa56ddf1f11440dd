//! Live column-catalog introspection for reference tables.
//!
//! Reference tables are simple lookup tables whose shape can safely be read
//! from `information_schema`, unlike the measurement tables whose semantics
//! require the hand-curated catalog.

use std::collections::BTreeMap;

use sea_orm::{ConnectionTrait, DbBackend, Statement};

use crate::error::{AppError, AppResult};

/// Resolve the insertable columns of a live table: column name -> SQL data
/// type, excluding identity and serial columns.
///
/// The returned names are the only identifiers the approval path will ever
/// interpolate into SQL for reference uploads; caller-supplied field names
/// are intersected against this set, never used directly.
pub async fn resolve_columns<C: ConnectionTrait>(
    conn: &C,
    table: &str,
) -> AppResult<BTreeMap<String, String>> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        r#"
        SELECT column_name, data_type
        FROM information_schema.columns
        WHERE table_schema = current_schema()
          AND table_name = $1
          AND is_identity = 'NO'
          AND (column_default IS NULL OR column_default NOT LIKE 'nextval(%')
        ORDER BY ordinal_position
        "#,
        [table.into()],
    );

    let rows = conn
        .query_all_raw(stmt)
        .await
        .map_err(|e| AppError::Database(format!("Failed to introspect table {}: {}", table, e)))?;

    let mut columns = BTreeMap::new();
    for row in rows {
        let name: String = row
            .try_get("", "column_name")
            .map_err(|e| AppError::Database(format!("Bad introspection row: {}", e)))?;
        let data_type: String = row
            .try_get("", "data_type")
            .map_err(|e| AppError::Database(format!("Bad introspection row: {}", e)))?;
        columns.insert(name, data_type);
    }

    Ok(columns)
}
