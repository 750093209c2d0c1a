//! Tokenize endpoints
//!
//! - `POST /tokenize-text` counts tokens for a JSON text payload
//! - `POST /tokenize-file` extracts text from an uploaded file and counts its tokens

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    extract::extract_text,
    logging::RequestContext,
    metrics::record_upload_bytes,
    tokens::resolver::encode_with,
    AppState,
};

/// Model used when the request does not name one
pub const DEFAULT_MODEL: &str = "gpt-4o";

const TOKENIZE_TEXT: &str = "tokenize-text";
const TOKENIZE_FILE: &str = "tokenize-file";

/// Text tokenize request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenizeTextRequest {
    /// Text to tokenize
    pub text: String,
    /// Model whose tokenizer should be used
    #[serde(default)]
    #[schema(default = "gpt-4o")]
    pub model: Option<String>,
}

/// Text tokenize response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenizeTextResponse {
    pub model: String,
    pub token_count: usize,
    /// Token ids in encoding order
    pub tokens: Vec<u32>,
}

/// Multipart form accepted by `/tokenize-file` (documentation only)
#[derive(Debug, ToSchema)]
pub struct TokenizeFileForm {
    /// File to tokenize
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Model whose tokenizer should be used
    #[schema(default = "gpt-4o")]
    pub model: Option<String>,
}

/// File tokenize response; the extracted text itself is not returned
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenizeFileResponse {
    pub filename: String,
    pub model: String,
    /// Size of the upload in bytes
    pub byte_size: usize,
    /// Length of the extracted text in characters
    pub text_length: usize,
    pub token_count: usize,
}

/// Count tokens in raw text
#[utoipa::path(
    post,
    path = "/tokenize-text",
    tag = "Tokenize",
    request_body = TokenizeTextRequest,
    responses(
        (status = 200, description = "Token count and token ids", body = TokenizeTextResponse),
        (status = 400, description = "Malformed JSON body", body = ErrorResponse),
        (status = 422, description = "JSON body does not match the request schema", body = ErrorResponse)
    )
)]
pub async fn tokenize_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenizeTextRequest>, JsonRejection>,
) -> AppResult<Json<TokenizeTextResponse>> {
    let ctx = RequestContext::new(TOKENIZE_TEXT);
    let Json(request) = payload.inspect_err(|e| ctx.log_error(e))?;

    let model = request.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let ctx = ctx.with_model(model.clone());
    ctx.log_request(request.text.len());

    let (encoding, encoder) = state
        .tokenizers
        .encoder_for(&model)
        .inspect_err(|e| ctx.log_error(e))?;

    let text = request.text;
    let tokens = run_blocking(move || encode_with(&encoder, &text))
        .await
        .inspect_err(|e| ctx.log_error(e))?;

    ctx.log_success(encoding, tokens.len());

    Ok(Json(TokenizeTextResponse {
        model,
        token_count: tokens.len(),
        tokens,
    }))
}

/// Count tokens in an uploaded file
#[utoipa::path(
    post,
    path = "/tokenize-file",
    tag = "Tokenize",
    request_body(content = TokenizeFileForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload metadata and token count", body = TokenizeFileResponse),
        (status = 400, description = "Malformed multipart body", body = ErrorResponse),
        (status = 422, description = "The `file` field is missing or is not a file upload", body = ErrorResponse)
    )
)]
pub async fn tokenize_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<TokenizeFileResponse>> {
    let ctx = RequestContext::new(TOKENIZE_FILE);
    let mut multipart = multipart.inspect_err(|e| ctx.log_error(e))?;
    let form = read_upload_form(&mut multipart)
        .await
        .inspect_err(|e| ctx.log_error(e))?;

    let ctx = ctx.with_model(form.model.clone());
    let byte_size = form.content.len();
    ctx.log_request(byte_size);
    record_upload_bytes(byte_size as u64);

    let (encoding, encoder) = state
        .tokenizers
        .encoder_for(&form.model)
        .inspect_err(|e| ctx.log_error(e))?;

    let filename = form.filename.clone();
    let content = form.content;
    let (text_length, token_count) = run_blocking(move || {
        let text = extract_text(&filename, &content);
        let tokens = encode_with(&encoder, &text);
        (text.chars().count(), tokens.len())
    })
    .await
    .inspect_err(|e| ctx.log_error(e))?;

    ctx.log_success(encoding, token_count);

    Ok(Json(TokenizeFileResponse {
        filename: form.filename,
        model: form.model,
        byte_size,
        text_length,
        token_count,
    }))
}

/// Fields read from the upload form
#[derive(Debug)]
struct UploadForm {
    filename: String,
    content: Bytes,
    model: String,
}

/// Read the whole multipart body. Unknown fields are ignored.
async fn read_upload_form(multipart: &mut Multipart) -> AppResult<UploadForm> {
    let mut upload: Option<(String, Bytes)> = None;
    let mut model: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                // A plain form value is not an upload
                let filename = field.file_name().map(str::to_owned).ok_or_else(|| {
                    AppError::Validation("Form field `file` must be a file upload".to_string())
                })?;
                let content = field.bytes().await?;
                upload = Some((filename, content));
            }
            Some("model") => model = Some(field.text().await?),
            _ => {}
        }
    }

    let (filename, content) = upload
        .ok_or_else(|| AppError::Validation("Missing required form field: file".to_string()))?;

    Ok(UploadForm {
        filename,
        content,
        model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
    })
}

/// Run CPU-bound work (extraction, encoding) off the async workers
async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Tokenize task failed: {}", e)))
}
