//! API Key model for authentication and the approval role gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Roles granted to API keys.
///
/// `operator` keys stage uploads, `reviewer` keys additionally decide
/// approvals, `admin` keys manage keys and delete artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyRole {
    Admin,
    Reviewer,
    #[default]
    Operator,
    Viewer,
}

impl ApiKeyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Reviewer => "reviewer",
            Self::Operator => "operator",
            Self::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "reviewer" => Some(Self::Reviewer),
            "operator" => Some(Self::Operator),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// Whether this role may stage new uploads.
    pub fn can_stage(&self) -> bool {
        matches!(self, Self::Admin | Self::Reviewer | Self::Operator)
    }

    /// Whether this role may approve or reject staged artifacts.
    pub fn can_decide(&self) -> bool {
        matches!(self, Self::Admin | Self::Reviewer)
    }
}

impl std::fmt::Display for ApiKeyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// API Key stored in database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    /// Unique identifier (UUID)
    pub id: String,
    /// SHA-256 hash of the full key
    pub key_hash: String,
    /// First 8 characters of the key for identification
    pub key_prefix: String,
    /// Human-readable name (e.g., "Station 4 operator")
    pub name: String,
    /// Role string as stored
    pub role: String,
    /// Expiration timestamp (optional)
    pub expires_at: Option<DateTime<Utc>>,
    /// Last used timestamp
    pub last_used_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Soft delete timestamp (revoked)
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Check if the key is revoked.
    pub fn is_revoked(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Check if the key is expired.
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Utc::now() > expires_at
        } else {
            false
        }
    }

    /// Get the role as enum.
    pub fn role_enum(&self) -> ApiKeyRole {
        ApiKeyRole::parse(&self.role).unwrap_or_default()
    }
}

/// Authenticated caller information extracted from API key.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller {
    pub key_id: String,
    pub name: String,
    pub key_prefix: String,
    pub role: ApiKeyRole,
}

impl AuthenticatedCaller {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, ApiKeyRole::Admin)
    }

    pub fn can_stage(&self) -> bool {
        self.role.can_stage()
    }

    pub fn can_decide(&self) -> bool {
        self.role.can_decide()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_round_trip() {
        for role in [
            ApiKeyRole::Admin,
            ApiKeyRole::Reviewer,
            ApiKeyRole::Operator,
            ApiKeyRole::Viewer,
        ] {
            assert_eq!(ApiKeyRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(ApiKeyRole::parse("auditor"), None);
    }

    #[test]
    fn test_decision_gate() {
        assert!(ApiKeyRole::Admin.can_decide());
        assert!(ApiKeyRole::Reviewer.can_decide());
        assert!(!ApiKeyRole::Operator.can_decide());
        assert!(!ApiKeyRole::Viewer.can_decide());
    }

    #[test]
    fn test_staging_gate() {
        assert!(ApiKeyRole::Operator.can_stage());
        assert!(!ApiKeyRole::Viewer.can_stage());
    }
}
