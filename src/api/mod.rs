//! API endpoint modules.

pub mod artifacts;
pub mod health;
pub mod openapi;
pub mod uploads;

pub use artifacts::configure_routes as configure_artifact_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use uploads::configure_routes as configure_upload_routes;
