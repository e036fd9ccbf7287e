//! Target format table.

use std::str::FromStr;

use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::ConvertError;

/// A supported output format, keyed by the name callers send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    Pdf,
    Docx,
    Html,
    Epub,
    Latex,
    Rst,
    Odt,
}

impl Format {
    /// Parse a request key. Matching is exact: `"PDF"` is rejected.
    pub fn parse_key(key: &str) -> Result<Self, ConvertError> {
        Format::from_str(key).map_err(|_| ConvertError::UnsupportedFormat(key.to_owned()))
    }

    /// `Content-Type` sent with the converted document.
    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Pdf => "application/pdf",
            Format::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Format::Html => "text/html",
            Format::Epub => "application/epub+zip",
            Format::Latex => "application/x-latex",
            Format::Rst => "text/x-rst",
            Format::Odt => "application/vnd.oasis.opendocument.text",
        }
    }

    /// File extension of the output file. Only latex differs from its key.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Docx => "docx",
            Format::Html => "html",
            Format::Epub => "epub",
            Format::Latex => "tex",
            Format::Rst => "rst",
            Format::Odt => "odt",
        }
    }

    /// Download filename, e.g. `document.tex`.
    pub fn attachment_name(self) -> String {
        format!("document.{}", self.extension())
    }
}
