//! Upload artifact domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Which schema-resolution strategy applies to an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Periodic measurement categories with a hand-curated column dictionary.
    Monitoring,
    /// Mitigation/enhancement sub-tables, same resolution strategy as monitoring.
    Enhancement,
    /// Low-cardinality lookup tables resolved by live schema introspection.
    Reference,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monitoring => "monitoring",
            Self::Enhancement => "enhancement",
            Self::Reference => "reference",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monitoring" => Some(Self::Monitoring),
            "enhancement" => Some(Self::Enhancement),
            "reference" => Some(Self::Reference),
            _ => None,
        }
    }

    /// Monitoring and enhancement uploads are bound to a reporting period.
    pub fn requires_period(&self) -> bool {
        matches!(self, Self::Monitoring | Self::Enhancement)
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Artifact lifecycle status. Transitions are monotonic:
/// pending -> approved | rejected, nothing afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    Pending,
    Approved,
    Rejected,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One parsed record: header -> cell value, as submitted.
pub type StagedRecord = BTreeMap<String, String>;

/// The staged payload serialized into the artifact row (JSONB).
///
/// Headers are kept separately so the original column order survives the
/// per-record maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StagedRows {
    pub headers: Vec<String>,
    pub rows: Vec<StagedRecord>,
}

impl StagedRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Upload metadata captured at staging time.
#[derive(Debug, Clone)]
pub struct UploadMeta {
    /// Filename as sent by the client.
    pub original_filename: String,
    /// Server-generated scratch filename.
    pub storage_filename: String,
    /// Size of the uploaded file in bytes.
    pub byte_size: i64,
    /// Declared media type of the upload.
    pub media_type: String,
    /// Name of the authenticated uploader.
    pub uploaded_by: String,
    /// Reporting period (monitoring/enhancement only).
    pub period_id: Option<i32>,
}

/// Foreign keys derived transitively at staging time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DerivedKeys {
    pub period_id: Option<i32>,
    pub year_id: Option<i32>,
    pub main_category_id: Option<i32>,
    pub sub_category_id: Option<i32>,
}

/// Response after staging an upload.
#[derive(Debug, Serialize, ToSchema)]
pub struct StageResponse {
    /// Artifact id to use for preview and decision calls.
    pub artifact_id: Uuid,
    /// Resolved target table.
    pub target_table: String,
    /// Number of staged rows.
    pub row_count: usize,
    /// Artifact status (always pending after staging).
    pub status: ArtifactStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A column shown in the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ColumnDescriptor {
    /// External field name as it appears in the upload.
    pub field: String,
    /// Target column the field maps to, when a mapping is resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

/// One page of staged rows for human review.
#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewPage {
    pub artifact_id: Uuid,
    pub page: usize,
    pub page_size: usize,
    /// Total staged rows in the artifact.
    pub total: usize,
    pub columns: Vec<ColumnDescriptor>,
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<StagedRecord>,
}

/// Query parameters for the preview endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PreviewQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// Outcome of an approval commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DecisionOutcome {
    /// Rows inserted into the target table.
    pub inserted: usize,
    /// Rows skipped (no mapped columns, or reference natural-key conflict).
    pub skipped: usize,
}

/// Response after an approval or rejection.
#[derive(Debug, Serialize, ToSchema)]
pub struct DecisionResponse {
    pub artifact_id: Uuid,
    pub status: ArtifactStatus,
    pub decided_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DecisionOutcome>,
}

/// Request body for rejecting an artifact.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Why the upload was rejected. Optional, but reviewers should say.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Artifact summary for list responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ArtifactSummary {
    pub id: Uuid,
    pub status: ArtifactStatus,
    pub category_kind: CategoryKind,
    pub category_id: String,
    pub target_table: String,
    pub original_filename: String,
    pub row_count: i32,
    pub uploaded_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

/// Query parameters for listing artifacts.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListArtifactsQuery {
    /// Filter by category kind.
    #[serde(default)]
    pub kind: Option<CategoryKind>,
    /// Filter by status (default: pending).
    #[serde(default)]
    pub status: Option<ArtifactStatus>,
    /// Maximum results to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Offset for pagination.
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> u64 {
    50
}

/// Artifact list response with pagination.
#[derive(Debug, Serialize, ToSchema)]
pub struct ArtifactListResponse {
    pub artifacts: Vec<ArtifactSummary>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_kind_round_trip() {
        for kind in [
            CategoryKind::Monitoring,
            CategoryKind::Enhancement,
            CategoryKind::Reference,
        ] {
            assert_eq!(CategoryKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(CategoryKind::parse("unknown"), None);
    }

    #[test]
    fn test_period_required_by_kind() {
        assert!(CategoryKind::Monitoring.requires_period());
        assert!(CategoryKind::Enhancement.requires_period());
        assert!(!CategoryKind::Reference.requires_period());
    }

    #[test]
    fn test_status_terminality() {
        assert!(!ArtifactStatus::Pending.is_terminal());
        assert!(ArtifactStatus::Approved.is_terminal());
        assert!(ArtifactStatus::Rejected.is_terminal());
        assert_eq!(ArtifactStatus::parse("pending"), Some(ArtifactStatus::Pending));
        assert_eq!(ArtifactStatus::parse("Pending"), None);
    }

    #[test]
    fn test_staged_rows_serialization_shape() {
        let mut record = StagedRecord::new();
        record.insert("station_id".into(), "4".into());
        record.insert("day1st_result_ppm".into(), "0.02".into());

        let staged = StagedRows {
            headers: vec!["station_id".into(), "day1st_result_ppm".into()],
            rows: vec![record],
        };

        let json = serde_json::to_value(&staged).unwrap();
        let back: StagedRows = serde_json::from_value(json).unwrap();
        assert_eq!(back, staged);
        assert_eq!(back.len(), 1);
    }
}
