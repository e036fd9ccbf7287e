//! Default reference template download.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::TryStreamExt;
use mdport_core::Format;
use tokio_util::io::ReaderStream;
use tracing::warn;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::convert::ErrorResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(download_default_reference))]
pub struct ReferenceApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/default-reference", get(download_default_reference))
}

/// Download the server's default docx reference template verbatim.
#[utoipa::path(
    get,
    path = "/api/default-reference",
    tag = "convert",
    responses(
        (status = 200, description = "Default reference template", content_type = "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        (status = 404, description = "No default template on this server", body = ErrorResponse),
    )
)]
pub async fn download_default_reference(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ServerError> {
    let Some((file, length)) = state.pipeline.open_default_reference().await? else {
        return Err(ServerError::NotFound("Default reference document not found".into()));
    };

    let stream = ReaderStream::new(file).inspect_err(|e| {
        warn!(error = %e, "failed to stream default reference doc");
    });

    Response::builder()
        .header(header::CONTENT_TYPE, Format::Docx.mime_type())
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"custom-reference.docx\"",
        )
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from_stream(stream))
        .map_err(|e| ServerError::Internal(format!("failed to build response: {e}")))
}
