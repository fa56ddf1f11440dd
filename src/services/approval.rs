//! Approval engine: the artifact state machine and transactional committer.
//!
//! `approve` re-resolves the column mapping, then inserts every staged row
//! inside one transaction. Rows with no mapped columns are skipped and
//! tallied, never failed. The status flip runs inside the same transaction
//! as a conditional update, so a concurrent decision on the same artifact
//! loses cleanly instead of double-inserting.
//!
//! Commit policy is deliberate per category kind: monitoring/enhancement
//! aborts the whole transaction on the first insert failure;
//! reference-kind inserts tolerate natural-key conflicts row by row via
//! `ON CONFLICT DO NOTHING` (tallied as skipped) but still abort on real
//! contract violations such as type mismatches.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use sea_orm::{ConnectionTrait, DbBackend, Statement, TransactionTrait, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::{CategoryCatalog, PERIOD_REFERENCE_TABLE, PERIOD_START_DATE_FIELD};
use crate::db::{artifacts, keys, schema, DbPool};
use crate::entity::upload_artifact;
use crate::error::{AppError, AppResult};
use crate::models::{
    ArtifactStatus, CategoryKind, DecisionOutcome, StagedRecord, StagedRows,
};

/// How the column mapping was re-resolved at approval time.
enum CommitPlan {
    /// Fixed dictionary from the catalog (monitoring/enhancement).
    Dictionary {
        table: String,
        mapping: BTreeMap<String, String>,
    },
    /// Live schema intersection (reference): column name -> SQL data type.
    Introspected {
        table: String,
        columns: BTreeMap<String, String>,
    },
}

/// Approve a pending artifact: commit every staged row or none.
pub async fn approve(
    pool: &DbPool,
    catalog: &CategoryCatalog,
    artifact_id: Uuid,
    actor: &str,
) -> AppResult<DecisionOutcome> {
    let artifact = pool
        .get_artifact(artifact_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Artifact {}", artifact_id)))?;

    let status = ArtifactStatus::parse(&artifact.status)
        .ok_or_else(|| AppError::Database(format!("Corrupt status '{}'", artifact.status)))?;
    if status != ArtifactStatus::Pending {
        return Err(AppError::AlreadyDecided(artifact_id));
    }

    let kind = CategoryKind::parse(&artifact.category_kind).ok_or_else(|| {
        AppError::Database(format!("Corrupt category kind '{}'", artifact.category_kind))
    })?;

    // The mapping that existed at staging time may have vanished since.
    // Resolve it fresh before any row is touched.
    let plan = resolve_commit_plan(pool, catalog, kind, &artifact).await?;

    let staged: StagedRows = serde_json::from_value(artifact.rows.clone())
        .map_err(|e| AppError::Database(format!("Corrupt staged payload: {}", e)))?;

    let txn = pool.connection().begin().await.map_err(|e| {
        AppError::Database(format!("Failed to open approval transaction: {}", e))
    })?;

    let outcome = match commit_rows(&txn, &artifact, &plan, &staged.rows).await {
        Ok(outcome) => outcome,
        Err(e) => {
            txn.rollback().await.ok();
            return Err(e);
        }
    };

    // Final race guard: only the caller that actually flips pending ->
    // approved may keep its inserts.
    let flipped =
        artifacts::transition_status(&txn, artifact_id, ArtifactStatus::Approved, actor, None)
            .await?;
    if !flipped {
        txn.rollback().await.ok();
        warn!(
            "Artifact {} was decided concurrently; rolled back {} inserts",
            artifact_id, outcome.inserted
        );
        return Err(AppError::AlreadyDecided(artifact_id));
    }

    txn.commit()
        .await
        .map_err(|e| AppError::Database(format!("Failed to commit approval: {}", e)))?;

    info!(
        "Artifact {} approved by {}: {} inserted, {} skipped",
        artifact_id, actor, outcome.inserted, outcome.skipped
    );

    Ok(outcome)
}

/// Reject a pending artifact. No target-table writes.
pub async fn reject(
    pool: &DbPool,
    artifact_id: Uuid,
    actor: &str,
    reason: Option<&str>,
) -> AppResult<()> {
    let flipped = artifacts::transition_status(
        pool.connection(),
        artifact_id,
        ArtifactStatus::Rejected,
        actor,
        reason,
    )
    .await?;

    if flipped {
        info!("Artifact {} rejected by {}", artifact_id, actor);
        return Ok(());
    }

    // Distinguish an unknown artifact from one already decided.
    match pool.get_artifact(artifact_id).await? {
        None => Err(AppError::NotFound(format!("Artifact {}", artifact_id))),
        Some(_) => Err(AppError::AlreadyDecided(artifact_id)),
    }
}

async fn resolve_commit_plan(
    pool: &DbPool,
    catalog: &CategoryCatalog,
    kind: CategoryKind,
    artifact: &upload_artifact::Model,
) -> AppResult<CommitPlan> {
    match kind {
        CategoryKind::Monitoring | CategoryKind::Enhancement => {
            let schema = catalog.resolve(kind, &artifact.category_id).ok_or_else(|| {
                AppError::UnresolvedSchema(format!(
                    "{} category '{}' is no longer in the catalog",
                    kind, artifact.category_id
                ))
            })?;
            Ok(CommitPlan::Dictionary {
                table: schema.target_table.clone(),
                mapping: schema.mapping.clone(),
            })
        }
        CategoryKind::Reference => {
            let columns = schema::resolve_columns(pool.connection(), &artifact.target_table)
                .await?;
            if columns.is_empty() {
                return Err(AppError::UnresolvedSchema(format!(
                    "Reference table '{}' has no insertable columns (dropped or renamed?)",
                    artifact.target_table
                )));
            }
            Ok(CommitPlan::Introspected {
                table: artifact.target_table.clone(),
                columns,
            })
        }
    }
}

async fn commit_rows<C: ConnectionTrait>(
    txn: &C,
    artifact: &upload_artifact::Model,
    plan: &CommitPlan,
    records: &[StagedRecord],
) -> AppResult<DecisionOutcome> {
    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for (idx, record) in records.iter().enumerate() {
        match plan {
            CommitPlan::Dictionary { table, mapping } => {
                let mapped = dictionary_columns(record, mapping);
                if mapped.is_empty() {
                    skipped += 1;
                    continue;
                }

                let mut columns = declared_keys(artifact);
                columns.extend(mapped);

                let (sql, values) = build_insert(table, &columns, false);
                txn.execute_raw(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    &sql,
                    values,
                ))
                .await
                .map_err(|e| {
                    AppError::InsertFailed(format!("row {} of {}: {}", idx + 1, table, e))
                })?;
                inserted += 1;
            }
            CommitPlan::Introspected { table, columns } => {
                let mut matched = introspected_columns(record, columns);
                if matched.is_empty() {
                    skipped += 1;
                    continue;
                }

                if table.as_str() == PERIOD_REFERENCE_TABLE {
                    // A period row needs its year; derive it from the
                    // submitted start date, creating the year row on miss.
                    let year = record
                        .get(PERIOD_START_DATE_FIELD)
                        .and_then(|raw| parse_submitted_date(raw));
                    match year {
                        Some(date) => {
                            let year_id = keys::ensure_year(txn, date.year()).await?;
                            if columns.contains_key("year_id")
                                && !matched.iter().any(|c| c.name == "year_id")
                            {
                                matched.push(ColumnValue {
                                    name: "year_id".to_string(),
                                    cast: None,
                                    value: Value::from(year_id),
                                });
                            }
                        }
                        None => {
                            skipped += 1;
                            continue;
                        }
                    }
                }

                let (sql, values) = build_insert(table, &matched, true);
                let result = txn
                    .execute_raw(Statement::from_sql_and_values(
                        DbBackend::Postgres,
                        &sql,
                        values,
                    ))
                    .await
                    .map_err(|e| {
                        AppError::InsertFailed(format!("row {} of {}: {}", idx + 1, table, e))
                    })?;

                // Natural-key conflict: the row already exists.
                if result.rows_affected() == 0 {
                    skipped += 1;
                } else {
                    inserted += 1;
                }
            }
        }
    }

    Ok(DecisionOutcome { inserted, skipped })
}

// ============================================================================
// Row assembly and SQL building
// ============================================================================

/// One column of a pending insert. Identifier names only ever come from the
/// catalog dictionary or live introspection, never from caller-supplied
/// record keys.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnValue {
    pub name: String,
    /// SQL type to cast the bound text to (introspected columns only).
    pub cast: Option<String>,
    pub value: Value,
}

/// Declared foreign keys carried by every committed monitoring/enhancement
/// row.
fn declared_keys(artifact: &upload_artifact::Model) -> Vec<ColumnValue> {
    let mut columns = Vec::new();
    if let Some(period_id) = artifact.period_id {
        columns.push(ColumnValue {
            name: "period_id".to_string(),
            cast: None,
            value: Value::from(period_id),
        });
    }
    if let Some(year_id) = artifact.year_id {
        columns.push(ColumnValue {
            name: "year_id".to_string(),
            cast: None,
            value: Value::from(year_id),
        });
    }
    columns
}

/// Mapped fields present in the record with a non-empty value. Unmapped
/// fields are dropped; absent/empty fields are never inserted as explicit
/// NULLs.
pub(crate) fn dictionary_columns(
    record: &StagedRecord,
    mapping: &BTreeMap<String, String>,
) -> Vec<ColumnValue> {
    let mut columns = Vec::new();
    for (field, column) in mapping {
        if let Some(raw) = record.get(field) {
            if raw.is_empty() {
                continue;
            }
            columns.push(ColumnValue {
                name: column.clone(),
                cast: None,
                value: infer_value(raw),
            });
        }
    }
    columns
}

/// Record fields intersected with the live column set. Unmatched fields are
/// dropped, not errored. Values bind as text and cast server-side to the
/// introspected type.
pub(crate) fn introspected_columns(
    record: &StagedRecord,
    live: &BTreeMap<String, String>,
) -> Vec<ColumnValue> {
    let mut columns = Vec::new();
    for (field, raw) in record {
        if raw.is_empty() {
            continue;
        }
        if let Some(data_type) = live.get(field) {
            columns.push(ColumnValue {
                name: field.clone(),
                cast: cast_for(data_type),
                value: Value::from(raw.clone()),
            });
        }
    }
    columns
}

/// Infer a bind value from a raw cell: integer, then float, else text.
pub(crate) fn infer_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        Value::BigInt(Some(i))
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Double(Some(f))
    } else {
        Value::from(raw.to_string())
    }
}

/// Server-side cast for an introspected data type. Text-like types need
/// none; anything outside the allowlist binds as plain text.
pub(crate) fn cast_for(data_type: &str) -> Option<String> {
    match data_type {
        "smallint" | "integer" | "bigint" | "numeric" | "real" | "double precision" | "date"
        | "boolean" | "uuid" | "timestamp with time zone" | "timestamp without time zone"
        | "time without time zone" => Some(data_type.to_string()),
        _ => None,
    }
}

/// Quote an identifier for PostgreSQL.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a parameterized single-row INSERT.
pub(crate) fn build_insert(
    table: &str,
    columns: &[ColumnValue],
    on_conflict_do_nothing: bool,
) -> (String, Vec<Value>) {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();
    let placeholders: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| match &c.cast {
            Some(data_type) => format!("CAST(${} AS {})", i + 1, data_type),
            None => format!("${}", i + 1),
        })
        .collect();

    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        names.join(", "),
        placeholders.join(", ")
    );
    if on_conflict_do_nothing {
        sql.push_str(" ON CONFLICT DO NOTHING");
    }

    let values = columns.iter().map(|c| c.value.clone()).collect();
    (sql, values)
}

/// Parse a submitted date cell. ISO first, then the day-first form the
/// older spreadsheets use.
pub(crate) fn parse_submitted_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryCatalog;

    fn record(fields: &[(&str, &str)]) -> StagedRecord {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value("4"), Value::BigInt(Some(4)));
        assert_eq!(infer_value("0.02"), Value::Double(Some(0.02)));
        assert_eq!(infer_value("SO2"), Value::from("SO2".to_string()));
        assert_eq!(infer_value("-17"), Value::BigInt(Some(-17)));
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident("Env_Wind_SO2"), "\"Env_Wind_SO2\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_dictionary_columns_drop_unmapped_and_empty() {
        let catalog = CategoryCatalog::new();
        let schema = catalog
            .resolve(CategoryKind::Monitoring, "SO2")
            .unwrap();

        let rec = record(&[
            ("station_id", "4"),
            ("indexName", "SO2"),
            ("day1st_result_ppm", "0.02"),
            ("day2nd_result_ppm", ""),
        ]);

        let columns = dictionary_columns(&rec, &schema.mapping);
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();

        // indexName is not in the SO2 dictionary; empty day2nd is dropped.
        assert_eq!(names, vec!["day1st_result_ppm", "station_id"]);
        assert_eq!(columns[0].value, Value::Double(Some(0.02)));
        assert_eq!(columns[1].value, Value::BigInt(Some(4)));
    }

    #[test]
    fn test_dictionary_columns_empty_when_nothing_maps() {
        let catalog = CategoryCatalog::new();
        let schema = catalog
            .resolve(CategoryKind::Monitoring, "SO2")
            .unwrap();

        let rec = record(&[("indexName", "SO2"), ("note", "calibration day")]);
        assert!(dictionary_columns(&rec, &schema.mapping).is_empty());
    }

    #[test]
    fn test_introspected_columns_intersect_live_set() {
        let live: BTreeMap<String, String> = [
            ("year".to_string(), "integer".to_string()),
            ("label".to_string(), "character varying".to_string()),
        ]
        .into();

        let rec = record(&[("year", "2024"), ("label", "FY2024"), ("rogue", "x")]);
        let columns = introspected_columns(&rec, &live);

        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["label", "year"]);
        assert_eq!(columns[1].cast.as_deref(), Some("integer"));
        assert_eq!(columns[0].cast, None);
    }

    #[test]
    fn test_build_insert_sql_shape() {
        let columns = vec![
            ColumnValue {
                name: "period_id".into(),
                cast: None,
                value: Value::from(7),
            },
            ColumnValue {
                name: "day1st_result_ppm".into(),
                cast: None,
                value: Value::Double(Some(0.02)),
            },
        ];

        let (sql, values) = build_insert("Env_Wind_SO2", &columns, false);
        assert_eq!(
            sql,
            "INSERT INTO \"Env_Wind_SO2\" (\"period_id\", \"day1st_result_ppm\") VALUES ($1, $2)"
        );
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_build_insert_with_casts_and_conflict_clause() {
        let columns = vec![ColumnValue {
            name: "year".into(),
            cast: Some("integer".into()),
            value: Value::from("2024".to_string()),
        }];

        let (sql, _) = build_insert("Years", &columns, true);
        assert_eq!(
            sql,
            "INSERT INTO \"Years\" (\"year\") VALUES (CAST($1 AS integer)) ON CONFLICT DO NOTHING"
        );
    }

    #[test]
    fn test_cast_allowlist() {
        assert_eq!(cast_for("integer").as_deref(), Some("integer"));
        assert_eq!(cast_for("date").as_deref(), Some("date"));
        assert_eq!(cast_for("character varying"), None);
        assert_eq!(cast_for("text"), None);
        assert_eq!(cast_for("USER-DEFINED"), None);
    }

    #[test]
    fn test_parse_submitted_date_formats() {
        let iso = parse_submitted_date("2024-04-01").unwrap();
        assert_eq!((iso.year(), iso.month(), iso.day()), (2024, 4, 1));

        let dayfirst = parse_submitted_date("01/04/2024").unwrap();
        assert_eq!(dayfirst, iso);

        assert!(parse_submitted_date("April 2024").is_none());
        assert!(parse_submitted_date("").is_none());
    }
}
