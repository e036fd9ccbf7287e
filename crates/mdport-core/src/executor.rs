//! Invocation of the external conversion tool.

use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::ConvertError;

/// Merged diagnostic text from a successful run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub log: String,
}

/// The opaque collaborator that turns an input file into an output file.
#[async_trait]
pub trait ConversionTool: Send + Sync {
    /// Run one conversion with `args`, returning once the tool has exited.
    async fn run(&self, args: &[OsString]) -> Result<ToolOutput, ConvertError>;
}

/// Runs the `pandoc` binary as a child process.
///
/// The child is killed when the run is abandoned, either because the
/// deadline passed or because the awaiting future was dropped.
#[derive(Debug, Clone)]
pub struct Pandoc {
    binary: String,
    timeout: Duration,
}

impl Pandoc {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self { binary: binary.into(), timeout }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }
}

#[async_trait]
impl ConversionTool for Pandoc {
    async fn run(&self, args: &[OsString]) -> Result<ToolOutput, ConvertError> {
        debug!(binary = %self.binary, ?args, "spawning conversion tool");

        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ConvertError::Spawn { binary: self.binary.clone(), source })?;

        // On expiry the `wait_with_output` future is dropped together with
        // the child, which kills it.
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(binary = %self.binary, timeout_secs = self.timeout.as_secs(), "conversion tool timed out");
                return Err(ConvertError::Timeout(self.timeout));
            }
        };

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(ConvertError::Failed { code: output.status.code(), output: log });
        }

        Ok(ToolOutput { log })
    }
}
