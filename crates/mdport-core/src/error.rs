use std::time::Duration;

use thiserror::Error;

/// All errors a conversion can end with.
///
/// Every variant is terminal for the request; nothing is retried.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The markdown source was empty or whitespace only.
    #[error("Markdown content is required")]
    EmptySource,

    /// The requested target format is not in the format table.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Workspace or output file I/O unrelated to caller input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The conversion binary could not be started at all.
    #[error("failed to start '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The conversion binary exited non-zero. `output` is the merged
    /// stdout/stderr text.
    #[error("Conversion failed: {output}")]
    Failed { code: Option<i32>, output: String },

    /// The conversion binary did not finish within its deadline.
    #[error("conversion timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The tool reported success but left no output file behind.
    #[error("conversion produced no output file")]
    OutputMissing,
}

impl ConvertError {
    /// `true` when the caller's input is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ConvertError::EmptySource | ConvertError::UnsupportedFormat(_))
    }
}
