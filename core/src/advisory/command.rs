use std::ffi::OsString;
use std::io;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use probr_common::report::{Insight, OpenPort};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{AdvisoryAnalyzer, AdvisoryError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdvisoryRequest<'a> {
    target: &'a str,
    open_ports: &'a [OpenPort],
}

/// Delegates analysis to an external program.
///
/// The program receives `{"target": ..., "openPorts": [{"port", "service"}]}`
/// on stdin and must print a JSON array of insights on stdout.
pub struct CommandAnalyzer {
    program: OsString,
    args: Vec<OsString>,
    timeout: Duration,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

#[async_trait]
impl AdvisoryAnalyzer for CommandAnalyzer {
    async fn analyze(
        &self,
        target: &str,
        open_ports: &[OpenPort],
    ) -> Result<Vec<Insight>, AdvisoryError> {
        let request: Vec<u8> = serde_json::to_vec(&AdvisoryRequest { target, open_ports })?;
        let name = self.display_name();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AdvisoryError::Unavailable(format!("cannot start {name}: {e}")))?;

        let stdin = child.stdin.take();
        let feed = async {
            let Some(mut stdin) = stdin else {
                return Ok(());
            };
            match stdin.write_all(&request).await {
                // The program may answer without reading its input.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("{name} closed its stdin before reading the request");
                    Ok(())
                }
                other => other,
            }
        };

        let (fed, output) = timeout(self.timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| {
            AdvisoryError::Unavailable(format!(
                "{name} did not answer within {}ms",
                self.timeout.as_millis()
            ))
        })?;

        fed.map_err(|e| AdvisoryError::Unavailable(format!("cannot write to {name}: {e}")))?;
        let output =
            output.map_err(|e| AdvisoryError::Unavailable(format!("{name} failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdvisoryError::Unavailable(format!(
                "{name} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
