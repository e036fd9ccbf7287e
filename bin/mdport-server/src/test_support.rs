//! In-process harness for router tests: a fake conversion tool and helpers
//! to drive the full middleware stack with `tower::ServiceExt::oneshot`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::header::{self, AsHeaderName, HeaderMap};
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use mdport_core::{ConversionTool, ConvertError, Pipeline, ToolOutput};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::config::Config;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default)]
enum Behaviour {
    #[default]
    Convert,
    Fail(&'static str),
    Timeout,
    NoOutput,
}

/// Stands in for pandoc: renders the first markdown heading as HTML-ish
/// `<h1>` markup and records what it was asked to do.
#[derive(Debug, Default)]
struct FakeTool {
    behaviour: Behaviour,
    calls: Mutex<Vec<Vec<String>>>,
    workspaces: Mutex<Vec<PathBuf>>,
    references: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl ConversionTool for FakeTool {
    async fn run(&self, args: &[OsString]) -> Result<ToolOutput, ConvertError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        self.calls.lock().unwrap().push(args.clone());
        if let Some(dir) = Path::new(&args[0]).parent() {
            self.workspaces.lock().unwrap().push(dir.to_path_buf());
        }
        if let Some(reference) = args.iter().find_map(|a| a.strip_prefix("--reference-doc=")) {
            let bytes = tokio::fs::read(reference).await?;
            self.references.lock().unwrap().push(bytes);
        }

        // Yield so that concurrent requests interleave inside the tool.
        tokio::task::yield_now().await;

        match self.behaviour {
            Behaviour::Fail(msg) => Err(ConvertError::Failed { code: Some(1), output: msg.to_owned() }),
            Behaviour::Timeout => Err(ConvertError::Timeout(Duration::from_secs(60))),
            Behaviour::NoOutput => Ok(ToolOutput::default()),
            Behaviour::Convert => {
                let source = tokio::fs::read_to_string(&args[0]).await?;
                let title = source.trim().trim_start_matches('#').trim();
                let html = format!("<h1 id=\"{}\">{}</h1>\n", title.to_lowercase(), title);
                tokio::fs::write(&args[2], html).await?;
                Ok(ToolOutput::default())
            }
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn header<K: AsHeaderName>(&self, name: K) -> &str {
        self.headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }
}

pub struct TestApp {
    router: Router,
    tool: Arc<FakeTool>,
    work: TempDir,
    templates: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(Behaviour::Convert, None)
    }

    pub fn failing(diagnostics: &'static str) -> Self {
        Self::build(Behaviour::Fail(diagnostics), None)
    }

    pub fn timing_out() -> Self {
        Self::build(Behaviour::Timeout, None)
    }

    pub fn silent() -> Self {
        Self::build(Behaviour::NoOutput, None)
    }

    pub fn with_upload_limit(bytes: usize) -> Self {
        Self::build(Behaviour::Convert, Some(bytes))
    }

    fn build(behaviour: Behaviour, upload_limit: Option<usize>) -> Self {
        let work = tempfile::tempdir().unwrap();
        let templates = tempfile::tempdir().unwrap();

        let mut config = Config {
            work_dir: work.path().to_path_buf(),
            default_reference: templates.path().join("custom-reference.docx"),
            enable_swagger: false,
            ..Config::default()
        };
        if let Some(limit) = upload_limit {
            config.max_upload_bytes = limit;
        }

        let tool = Arc::new(FakeTool { behaviour, ..Default::default() });
        let pipeline = Pipeline::new(config.pipeline(), tool.clone());
        let state = Arc::new(AppState { config: Arc::new(config), pipeline });

        Self { router: crate::routes::build(state), tool, work, templates }
    }

    pub fn default_reference(&self) -> PathBuf {
        self.templates.path().join("custom-reference.docx")
    }

    pub fn write_default_reference(&self, bytes: &[u8]) {
        std::fs::write(self.default_reference(), bytes).unwrap();
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: Body,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some("application/json"), Body::from(body.to_string()))
            .await
    }

    pub async fn preflight(&self, uri: &str) -> TestResponse {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let body = res.into_body().collect().await.unwrap().to_bytes();
        TestResponse { status, headers, body }
    }

    pub fn tool_calls(&self) -> usize {
        self.tool.calls.lock().unwrap().len()
    }

    pub fn last_args(&self) -> Vec<String> {
        self.tool.calls.lock().unwrap().last().cloned().expect("tool was called")
    }

    pub fn last_reference_seen(&self) -> Option<Vec<u8>> {
        self.tool.references.lock().unwrap().last().cloned()
    }

    /// Distinct workspace directories the tool has been pointed at.
    pub fn workspaces_created(&self) -> usize {
        let mut seen = self.tool.workspaces.lock().unwrap().clone();
        seen.sort();
        seen.dedup();
        seen.len()
    }

    /// Entries still present under the work directory.
    pub fn workspaces_left(&self) -> usize {
        std::fs::read_dir(self.work.path()).unwrap().count()
    }
}

/// Encode a `multipart/form-data` body. Returns `(content_type, body)`.
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "mdport-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
