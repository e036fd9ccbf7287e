use crate::routes::{convert, health, reference};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "mdport-server",
    description = "Markdown document conversion API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(convert::ConvertApi::openapi());
    root.merge(reference::ReferenceApi::openapi());
    root
}
