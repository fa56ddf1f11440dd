//! SeaORM entities.

pub mod api_key;
pub mod main_category;
pub mod period;
pub mod sub_category;
pub mod upload_artifact;
pub mod year;
