//! Process runner backed by tokio child processes.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::ports::outbound::{CommandSpec, ProcessOutput, ProcessRunner};

/// Exit status reported when a child was terminated by a signal.
const SIGNALED_RETURN_CODE: i32 = -1;

/// Spawns commands directly (no shell) and captures both output streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: &CommandSpec, realtime_output: bool) -> io::Result<ProcessOutput> {
        debug!(%command, "Spawning process");
        let mut child = Command::new(command.program())
            .args(command.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stderr not captured"))?;

        // Drain both pipes concurrently.
        let (stdout, stderr) = tokio::try_join!(
            collect_lines(stdout, "stdout", realtime_output),
            collect_lines(stderr, "stderr", realtime_output),
        )?;
        let status = child.wait().await?;

        let return_code = status.code().unwrap_or(SIGNALED_RETURN_CODE);
        debug!(%command, return_code, "Process finished");
        Ok(ProcessOutput {
            stdout,
            stderr,
            return_code,
        })
    }
}

async fn collect_lines<R>(reader: R, stream: &'static str, realtime: bool) -> io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut captured = String::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if realtime {
            info!(stream, "{}", line.trim_end());
        }
        captured.push_str(&line);
    }
    Ok(captured)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_both_streams() {
        let cmd = CommandSpec::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = TokioProcessRunner::new().run(&cmd, true).await.unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.return_code, 3);
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_missing_program_is_io_error() {
        let cmd = CommandSpec::new("/nonexistent/utils_setup_missing");
        let err = TokioProcessRunner::new().run(&cmd, false).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
