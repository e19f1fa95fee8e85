//! Interpreter subprocess helper
//!
//! Runs one interpreter invocation to completion with piped stdio. Input is
//! written from a separate task while output is collected, so large payloads
//! cannot deadlock on full pipes.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use shared::{component_debug, Component};

use crate::error::RuntimeFailure;

/// Captured output of a finished invocation
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Last non-empty stderr line, usually the exception summary
    pub fn error_summary(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("process exited with {}", self.status))
    }

    /// Convert a non-zero exit into a failure
    pub fn into_result(self) -> Result<ProcessOutput, RuntimeFailure> {
        if self.success() {
            Ok(self)
        } else {
            Err(RuntimeFailure::new(self.error_summary()))
        }
    }
}

/// Run `program` with `args`, optionally feeding `stdin`
///
/// The child is killed if the returned future is dropped, so callers can bound
/// it with a timeout without leaking processes.
pub async fn run_program(program: &Path, args: &[&str], stdin: Option<Vec<u8>>) -> Result<ProcessOutput, RuntimeFailure> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| RuntimeFailure::new(format!("Failed to spawn {}: {e}", program.display())))?;

    let writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => Some(tokio::spawn(async move {
            pipe.write_all(&input).await?;
            pipe.shutdown().await
        })),
        _ => None,
    };

    let output = child.wait_with_output().await?;

    if let Some(writer) = writer {
        match writer.await {
            Ok(Ok(())) => {}
            // A child that exits without reading stdin closes the pipe early; its
            // exit status tells the real story.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(e) => return Err(RuntimeFailure::new(format!("stdin writer failed: {e}"))),
        }
    }

    component_debug!(
        Component::Runtime,
        "{} exited with {} ({} stdout bytes)",
        program.display(),
        output.status,
        output.stdout.len()
    );

    Ok(ProcessOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
