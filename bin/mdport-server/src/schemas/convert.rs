use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    /// Markdown source text. Must contain something other than whitespace.
    pub markdown: String,
    /// Target format: `pdf`, `docx`, `html`, `epub`, `latex`, `rst` or `odt`.
    pub format: String,
    /// For docx output, style with the server's default reference template.
    #[serde(default)]
    pub use_custom_ref: bool,
}

/// Multipart variant of [`ConvertRequest`].
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
#[schema(rename_all = "camelCase")]
pub struct ConvertUpload {
    pub markdown: String,
    pub format: String,
    /// `"true"` to fall back to the default template when no file is sent.
    pub use_custom_ref: Option<String>,
    /// Reference template file for docx output; wins over the default.
    #[schema(value_type = Option<String>)]
    pub reference_doc: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
