//! Command-line construction for the conversion tool.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::format::Format;

/// PDF rendering options. The font must cover CJK glyphs so that Chinese,
/// Japanese and Korean source text renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfOptions {
    pub engine: String,
    pub cjk_font: String,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            engine: "xelatex".to_owned(),
            cjk_font: "Noto Sans CJK SC".to_owned(),
        }
    }
}

/// Builds the ordered argument list for one conversion.
///
/// Building never fails: the format was validated before a builder exists.
#[derive(Debug)]
pub struct ArgumentBuilder<'a> {
    format: Format,
    input: &'a Path,
    output: &'a Path,
    reference: Option<&'a Path>,
    pdf: &'a PdfOptions,
}

impl<'a> ArgumentBuilder<'a> {
    pub fn new(format: Format, input: &'a Path, output: &'a Path, pdf: &'a PdfOptions) -> Self {
        Self { format, input, output, reference: None, pdf }
    }

    /// Reference template for word-processor output. Ignored for every
    /// format other than docx.
    pub fn reference(mut self, path: Option<&'a Path>) -> Self {
        self.reference = path;
        self
    }

    pub fn build(self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.input.into(),
            "-o".into(),
            self.output.into(),
            "--standalone".into(),
        ];

        match self.format {
            Format::Docx => {
                if let Some(reference) = self.reference {
                    let mut flag = OsString::from("--reference-doc=");
                    flag.push(reference);
                    args.push(flag);
                }
            }
            Format::Pdf => {
                args.push(format!("--pdf-engine={}", self.pdf.engine).into());
                args.push("-V".into());
                args.push(format!("CJKmainfont={}", self.pdf.cjk_font).into());
            }
            _ => {}
        }

        args
    }
}

/// Pick the reference template for a request.
///
/// Only docx output uses one. An uploaded template always wins; otherwise
/// the server default is used when the caller opted in and the file exists
/// right now.
pub fn resolve_reference(
    format: Format,
    uploaded: Option<&Path>,
    use_default: bool,
    default: Option<&Path>,
) -> Option<PathBuf> {
    if format != Format::Docx {
        return None;
    }
    if let Some(path) = uploaded {
        info!(reference = %path.display(), "using uploaded reference doc");
        return Some(path.to_path_buf());
    }
    if !use_default {
        return None;
    }
    match default {
        Some(path) if path.is_file() => {
            info!(reference = %path.display(), "using default reference doc");
            Some(path.to_path_buf())
        }
        Some(path) => {
            debug!(reference = %path.display(), "default reference doc not found");
            None
        }
        None => None,
    }
}
