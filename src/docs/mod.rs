//! API Documentation module
//!
//! Provides OpenAPI specification generation for the tokenize API using utoipa.

mod openapi;

pub use openapi::ApiDoc;
