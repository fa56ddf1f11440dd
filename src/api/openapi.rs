//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Environmental Monitoring Upload Portal",
        version = "0.3.0",
        description = "API server for staging, previewing, and approving environmental monitoring uploads"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Staging
        api::uploads::stage_upload,
        // Artifact review
        api::artifacts::list_artifacts,
        api::artifacts::preview_artifact,
        api::artifacts::approve_artifact,
        api::artifacts::reject_artifact,
        api::artifacts::delete_artifact,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Staging
            services::parser::FileKind,
            api::uploads::StageQuery,
            models::CategoryKind,
            models::ArtifactStatus,
            models::StageResponse,
            // Review
            models::ArtifactSummary,
            models::ArtifactListResponse,
            models::ListArtifactsQuery,
            models::ColumnDescriptor,
            models::PreviewPage,
            models::PreviewQuery,
            models::DecisionOutcome,
            models::DecisionResponse,
            models::RejectRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Uploads", description = "Upload staging"),
        (name = "Artifacts", description = "Staged artifact review and decisions")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-API-Key"),
                    ),
                ),
            );
        }
    }
}
