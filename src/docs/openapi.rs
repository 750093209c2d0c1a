//! OpenAPI specification for the tokenize API
//!
//! Aggregates the tokenize endpoints and schemas into a single OpenAPI document.

use utoipa::OpenApi;

use crate::{
    error::{ErrorBody, ErrorResponse},
    routes::tokenize::{
        TokenizeFileForm, TokenizeFileResponse, TokenizeTextRequest, TokenizeTextResponse,
    },
};

/// OpenAPI specification for the Tally API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tally API",
        version = "1.0.0",
        description = "Counts language-model tokens for text and uploaded documents"
    ),
    paths(
        crate::routes::tokenize::tokenize_text,
        crate::routes::tokenize::tokenize_file
    ),
    components(
        schemas(
            TokenizeTextRequest,
            TokenizeTextResponse,
            TokenizeFileForm,
            TokenizeFileResponse,
            ErrorResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Tokenize", description = "Token counting endpoints")
    )
)]
pub struct ApiDoc;
