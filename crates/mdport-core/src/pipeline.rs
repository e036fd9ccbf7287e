//! The conversion request pipeline.
//!
//! [`Pipeline::convert`] validates a [`ConversionRequest`], materialises a
//! [`Workspace`], runs the conversion tool and hands back a
//! [`ConvertedDocument`]. The workspace travels with the document and then
//! with its byte stream, so the scratch directory lives exactly as long as
//! someone can still read the output.

use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use tokio::fs::File;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use crate::args::{self, ArgumentBuilder, PdfOptions};
use crate::error::ConvertError;
use crate::executor::ConversionTool;
use crate::format::Format;
use crate::workspace::Workspace;

/// One conversion job as decoded from the caller.
#[derive(Debug, Clone, Default)]
pub struct ConversionRequest {
    /// Markdown source text.
    pub source: String,
    /// Requested format key, e.g. `"pdf"`.
    pub format: String,
    /// Use the server's default reference template when no upload is given.
    pub use_default_reference: bool,
    /// Reference template uploaded with the request.
    pub reference_upload: Option<Bytes>,
}

impl ConversionRequest {
    /// Check the request without touching the filesystem.
    pub fn validate(&self) -> Result<Format, ConvertError> {
        if self.source.trim().is_empty() {
            return Err(ConvertError::EmptySource);
        }
        Format::parse_key(&self.format)
    }
}

/// Static pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Parent directory for per-request workspaces.
    pub work_dir: PathBuf,
    /// Server-side default reference template. May not exist on disk.
    pub default_reference: Option<PathBuf>,
    pub pdf: PdfOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir(),
            default_reference: None,
            pdf: PdfOptions::default(),
        }
    }
}

/// Runs conversions against a [`ConversionTool`].
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    tool: Arc<dyn ConversionTool>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(config: PipelineConfig, tool: Arc<dyn ConversionTool>) -> Self {
        Self { config: Arc::new(config), tool }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Convert one request.
    ///
    /// Validation happens before any workspace exists, so a rejected request
    /// never touches the filesystem or spawns the tool.
    pub async fn convert(&self, request: ConversionRequest) -> Result<ConvertedDocument, ConvertError> {
        let format = request.validate()?;

        let workspace = Workspace::acquire(&self.config.work_dir, &request.source).await?;
        let output = workspace.output_path(format);

        // Uploads are only meaningful for docx; other formats never write them.
        let uploaded = match (&request.reference_upload, format) {
            (Some(bytes), Format::Docx) => Some(workspace.store_reference(bytes).await?),
            _ => None,
        };
        let reference = args::resolve_reference(
            format,
            uploaded.as_deref(),
            request.use_default_reference,
            self.config.default_reference.as_deref(),
        );

        let args = ArgumentBuilder::new(format, workspace.input_path(), &output, &self.config.pdf)
            .reference(reference.as_deref())
            .build();

        match self.tool.run(&args).await {
            Ok(out) => {
                if !out.log.is_empty() {
                    debug!(format = %format, log = %out.log, "conversion tool output");
                }
            }
            Err(e) => {
                warn!(format = %format, error = %e, "conversion failed");
                return Err(e);
            }
        }

        let length = match tokio::fs::metadata(&output).await {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => return Err(ConvertError::OutputMissing),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConvertError::OutputMissing);
            }
            Err(e) => return Err(e.into()),
        };

        info!(format = %format, bytes = length, "conversion succeeded");
        Ok(ConvertedDocument { format, output, length, workspace })
    }

    /// Open the default reference template, if one is configured and present.
    pub async fn open_default_reference(&self) -> Result<Option<(File, u64)>, ConvertError> {
        let Some(path) = self.config.default_reference.as_deref() else {
            return Ok(None);
        };
        open_if_present(path).await
    }
}

async fn open_if_present(path: &Path) -> Result<Option<(File, u64)>, ConvertError> {
    match File::open(path).await {
        Ok(file) => {
            let meta = file.metadata().await?;
            if !meta.is_file() {
                return Ok(None);
            }
            Ok(Some((file, meta.len())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A finished conversion whose output still sits in its workspace.
#[derive(Debug)]
pub struct ConvertedDocument {
    format: Format,
    output: PathBuf,
    length: u64,
    workspace: Workspace,
}

impl ConvertedDocument {
    pub fn format(&self) -> Format {
        self.format
    }

    /// Size of the output file in bytes.
    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    /// Open the output file as a byte stream that owns the workspace.
    ///
    /// If opening fails the workspace is released before returning.
    pub async fn into_stream(self) -> Result<DocumentStream, ConvertError> {
        let file = File::open(&self.output).await?;
        Ok(DocumentStream {
            inner: ReaderStream::new(file),
            workspace: Some(self.workspace),
            format: self.format,
            sent: 0,
        })
    }
}

/// Output bytes of a conversion.
///
/// The workspace is released as soon as the stream ends, fails, or is
/// dropped by a disconnecting client.
pub struct DocumentStream<R = File> {
    inner: ReaderStream<R>,
    workspace: Option<Workspace>,
    format: Format,
    sent: u64,
}

impl<R: AsyncRead + Unpin> Stream for DocumentStream<R> {
    type Item = std::io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                // Headers are already committed; the download ends short.
                warn!(
                    format = %this.format,
                    sent = this.sent,
                    error = %e,
                    "failed to stream converted document"
                );
                this.workspace.take();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                if this.workspace.take().is_some() {
                    debug!(format = %this.format, sent = this.sent, "document streamed");
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
