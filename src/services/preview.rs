//! Preview projection over a staged artifact's payload.
//!
//! Read-only: operates purely on the staged rows, never on the target table.

use std::collections::BTreeMap;

use crate::entity::upload_artifact;
use crate::error::{AppError, AppResult};
use crate::models::{ColumnDescriptor, PreviewPage, StagedRows};

/// Hard ceiling on preview page size.
const MAX_PAGE_SIZE: usize = 500;

/// Paginate the staged rows of an artifact for human review.
///
/// Column descriptors come from the resolved mapping when one was staged
/// (monitoring/enhancement); for reference uploads they fall back to the raw
/// record headers, since the live schema is only resolved at approval time.
pub fn preview_page(
    artifact: &upload_artifact::Model,
    page: Option<usize>,
    page_size: Option<usize>,
    default_page_size: usize,
) -> AppResult<PreviewPage> {
    let staged: StagedRows = serde_json::from_value(artifact.rows.clone())
        .map_err(|e| AppError::Database(format!("Corrupt staged payload: {}", e)))?;
    let mapping: BTreeMap<String, String> =
        serde_json::from_value(artifact.column_mapping.clone())
            .map_err(|e| AppError::Database(format!("Corrupt column mapping: {}", e)))?;

    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(default_page_size)
        .clamp(1, MAX_PAGE_SIZE);

    let total = staged.rows.len();
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = (start + page_size).min(total);

    let columns = staged
        .headers
        .iter()
        .map(|header| ColumnDescriptor {
            field: header.clone(),
            column: mapping.get(header).cloned(),
        })
        .collect();

    Ok(PreviewPage {
        artifact_id: artifact.id,
        page,
        page_size,
        total,
        columns,
        rows: staged.rows[start..end].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtifactStatus, CategoryKind, StagedRecord};
    use chrono::Utc;
    use uuid::Uuid;

    fn artifact_with_rows(n: usize, mapping: serde_json::Value) -> upload_artifact::Model {
        let rows: Vec<StagedRecord> = (0..n)
            .map(|i| {
                let mut r = StagedRecord::new();
                r.insert("station_id".into(), i.to_string());
                r.insert("day1st_result_ppm".into(), format!("0.0{}", i));
                r
            })
            .collect();

        upload_artifact::Model {
            id: Uuid::now_v7(),
            original_filename: "q1.csv".into(),
            storage_filename: "upload_0".into(),
            byte_size: 100,
            media_type: "text/csv".into(),
            uploaded_by: "operator".into(),
            status: ArtifactStatus::Pending.as_str().into(),
            category_kind: CategoryKind::Monitoring.as_str().into(),
            category_id: "SO2".into(),
            target_table: "Env_Wind_SO2".into(),
            column_mapping: mapping,
            rows: serde_json::to_value(StagedRows {
                headers: vec!["station_id".into(), "day1st_result_ppm".into()],
                rows,
            })
            .unwrap(),
            row_count: n as i32,
            period_id: Some(1),
            year_id: Some(1),
            main_category_id: Some(1),
            sub_category_id: Some(1),
            decided_by: None,
            decided_at: None,
            decision_reason: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_preview_round_trip_order() {
        let artifact = artifact_with_rows(5, serde_json::json!({}));
        let page = preview_page(&artifact, None, Some(10), 50).unwrap();

        assert_eq!(page.total, 5);
        let stations: Vec<&str> = page.rows.iter().map(|r| r["station_id"].as_str()).collect();
        assert_eq!(stations, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_preview_pagination_slices() {
        let artifact = artifact_with_rows(7, serde_json::json!({}));

        let first = preview_page(&artifact, Some(1), Some(3), 50).unwrap();
        assert_eq!(first.rows.len(), 3);
        assert_eq!(first.rows[0]["station_id"], "0");

        let third = preview_page(&artifact, Some(3), Some(3), 50).unwrap();
        assert_eq!(third.rows.len(), 1);
        assert_eq!(third.rows[0]["station_id"], "6");

        let past_end = preview_page(&artifact, Some(9), Some(3), 50).unwrap();
        assert!(past_end.rows.is_empty());
        assert_eq!(past_end.total, 7);
    }

    #[test]
    fn test_preview_columns_from_mapping() {
        let mapping = serde_json::json!({"station_id": "station_id"});
        let artifact = artifact_with_rows(1, mapping);
        let page = preview_page(&artifact, None, None, 50).unwrap();

        assert_eq!(
            page.columns,
            vec![
                ColumnDescriptor {
                    field: "station_id".into(),
                    column: Some("station_id".into()),
                },
                ColumnDescriptor {
                    field: "day1st_result_ppm".into(),
                    column: None,
                },
            ]
        );
    }

    #[test]
    fn test_preview_page_size_clamped() {
        let artifact = artifact_with_rows(2, serde_json::json!({}));
        let page = preview_page(&artifact, None, Some(100_000), 50).unwrap();
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
    }
}
