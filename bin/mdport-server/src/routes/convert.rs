//! Document conversion endpoint.
//!
//! `POST /api/convert` accepts the same request either as a JSON body or as
//! a multipart form. The multipart form may also carry a docx reference
//! template, which is written into the request's workspace and takes
//! precedence over the server default.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use mdport_core::ConversionRequest;
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::convert::{ConvertRequest, ConvertUpload, ErrorResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(convert),
    components(schemas(ConvertRequest, ConvertUpload, ErrorResponse)),
)]
pub struct ConvertApi;

/// Register conversion routes. `body_limit` bounds the request body,
/// uploads included.
pub fn router(body_limit: usize) -> Router<Arc<AppState>> {
    Router::new().route(
        "/convert",
        post(convert).layer(DefaultBodyLimit::max(body_limit)),
    )
}

/// Convert markdown to the requested format (`POST /api/convert`).
///
/// On success the converted document is streamed back as an attachment named
/// `document.<ext>`. Errors are `{"error": "..."}` bodies.
#[utoipa::path(
    post,
    path = "/api/convert",
    tag = "convert",
    request_body(
        content(
            (ConvertRequest = "application/json"),
            (ConvertUpload = "multipart/form-data"),
        ),
    ),
    responses(
        (status = 200, description = "Converted document", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid body, empty markdown or unsupported format", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 500, description = "Conversion failed", body = ErrorResponse),
        (status = 504, description = "Conversion timed out", body = ErrorResponse),
    )
)]
pub async fn convert(
    State(state): State<Arc<AppState>>,
    ConvertForm(request): ConvertForm,
) -> Result<Response, ServerError> {
    let document = state.pipeline.convert(request).await?;
    let format = document.format();
    let length = document.len();
    let stream = document.into_stream().await?;

    info!(format = %format, bytes = length, "streaming converted document");

    Response::builder()
        .header(header::CONTENT_TYPE, format.mime_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.attachment_name()),
        )
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from_stream(stream))
        .map_err(|e| ServerError::Internal(format!("failed to build response: {e}")))
}

// ── Request intake ────────────────────────────────────────────────────────────

/// A conversion request decoded from either a JSON or a multipart body.
#[derive(Debug)]
pub struct ConvertForm(pub ConversionRequest);

impl FromRequest<Arc<AppState>> for ConvertForm {
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                debug!(error = %e, "rejected multipart body");
                ServerError::BadRequest("Failed to parse form data".into())
            })?;
            return read_multipart(multipart).await.map(ConvertForm);
        }

        // Anything that is not multipart is decoded as JSON regardless of
        // the declared content type.
        let raw = Bytes::from_request(req, state).await.map_err(|e| {
            debug!(error = %e, "failed to read request body");
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ServerError::PayloadTooLarge("Request body too large".into())
            } else {
                ServerError::BadRequest("Invalid request body".into())
            }
        })?;
        let body: ConvertRequest = serde_json::from_slice(&raw).map_err(|e| {
            debug!(error = %e, "rejected json body");
            ServerError::BadRequest("Invalid request body".into())
        })?;

        Ok(ConvertForm(ConversionRequest {
            source: body.markdown,
            format: body.format,
            use_default_reference: body.use_custom_ref,
            reference_upload: None,
        }))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<ConversionRequest, ServerError> {
    let mut request = ConversionRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "markdown" => request.source = field.text().await.map_err(form_error)?,
            "format" => request.format = field.text().await.map_err(form_error)?,
            "useCustomRef" => {
                request.use_default_reference = field.text().await.map_err(form_error)? == "true";
            }
            "referenceDoc" => {
                let bytes: Bytes = field.bytes().await.map_err(form_error)?;
                debug!(size_bytes = bytes.len(), "received reference doc upload");
                request.reference_upload = (!bytes.is_empty()).then_some(bytes);
            }
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(request)
}

fn form_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(format!("Upload too large: {}", e.body_text()))
    } else {
        ServerError::BadRequest("Failed to parse form data".into())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
