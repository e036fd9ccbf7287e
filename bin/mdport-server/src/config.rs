//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use mdport_core::{PdfOptions, PipelineConfig};

/// Runtime configuration for mdport-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind, `{MDPORT_HOST}:{PORT}` (default: `"0.0.0.0:8080"`).
    pub bind_address: String,

    /// Conversion binary name or path (default: `"pandoc"`).
    pub pandoc_binary: String,

    /// Default docx reference template. Its presence is checked per request.
    pub default_reference: PathBuf,

    /// Parent directory for per-request workspaces.
    pub work_dir: PathBuf,

    /// Deadline for a single conversion tool run.
    pub convert_timeout: Duration,

    /// `--pdf-engine` value for pdf output.
    pub pdf_engine: String,

    /// `CJKmainfont` variable for pdf output.
    pub cjk_font: String,

    /// Upper bound for a multipart request body, in bytes.
    pub max_upload_bytes: usize,

    /// Comma-separated CORS origins; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        let host = env_or("MDPORT_HOST", "0.0.0.0");
        let port: u16 = parse_or(lookup("PORT"), 8080);
        // A zero deadline would time out every conversion.
        let timeout_secs = match parse_or(lookup("MDPORT_CONVERT_TIMEOUT_SECS"), 60u64) {
            0 => 60,
            secs => secs,
        };
        let upload_mb: usize = parse_or(lookup("MDPORT_MAX_UPLOAD_MB"), 10);

        Self {
            bind_address: format!("{host}:{port}"),
            pandoc_binary: env_or("MDPORT_PANDOC", "pandoc"),
            default_reference: env_or(
                "MDPORT_DEFAULT_REFERENCE",
                "/app/reference/custom-reference.docx",
            )
            .into(),
            work_dir: lookup("MDPORT_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            convert_timeout: Duration::from_secs(timeout_secs),
            pdf_engine: env_or("MDPORT_PDF_ENGINE", "xelatex"),
            cjk_font: env_or("MDPORT_CJK_FONT", "Noto Sans CJK SC"),
            max_upload_bytes: upload_mb.saturating_mul(1024 * 1024),
            cors_allowed_origins: lookup("MDPORT_CORS_ORIGINS").filter(|s| !s.trim().is_empty()),
            enable_swagger: flag("MDPORT_ENABLE_SWAGGER", true),
            log_level: env_or("MDPORT_LOG", "info"),
            log_json: flag("MDPORT_LOG_JSON", false),
        }
    }

    /// Settings handed to the conversion pipeline.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            work_dir: self.work_dir.clone(),
            default_reference: Some(self.default_reference.clone()),
            pdf: PdfOptions {
                engine: self.pdf_engine.clone(),
                cjk_font: self.cjk_font.clone(),
            },
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
