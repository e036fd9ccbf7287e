//! mdport-core – the conversion pipeline behind the mdport gateway.
//!
//! A request flows strictly top to bottom:
//! validation ([`format`]) → scratch directory ([`workspace`]) →
//! command line ([`args`]) → external tool ([`executor`]) → output
//! stream ([`pipeline`]).

pub mod args;
pub mod error;
pub mod executor;
pub mod format;
pub mod pipeline;
pub mod workspace;

pub use args::{ArgumentBuilder, PdfOptions};
pub use error::ConvertError;
pub use executor::{ConversionTool, Pandoc, ToolOutput};
pub use format::Format;
pub use pipeline::{ConversionRequest, ConvertedDocument, DocumentStream, Pipeline, PipelineConfig};
pub use workspace::Workspace;
