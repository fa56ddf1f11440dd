//! API key authentication.

pub mod extractor;

pub use extractor::ApiKeyAuth;
