//! Service control through `systemctl`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::ServiceError;
use crate::ports::outbound::{CommandSpec, ProcessRunner, ServiceController};

pub struct SystemdServiceController {
    runner: Arc<dyn ProcessRunner>,
    systemctl: PathBuf,
}

impl SystemdServiceController {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            systemctl: PathBuf::from("systemctl"),
        }
    }
}

#[async_trait]
impl ServiceController for SystemdServiceController {
    async fn restart(&self, service: &str) -> Result<(), ServiceError> {
        let command = CommandSpec::new(&self.systemctl).args(["restart", service]);
        let failed = |reason: String| ServiceError {
            service: service.to_string(),
            reason,
        };
        let output = self
            .runner
            .run(&command, false)
            .await
            .map_err(|e| failed(e.to_string()))?;
        if !output.success() {
            let stderr = output.stderr.trim();
            return Err(failed(if stderr.is_empty() {
                format!("systemctl exited with {}", output.return_code)
            } else {
                stderr.to_string()
            }));
        }
        info!(%service, "Restarted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::ProcessOutput;
    use parking_lot::Mutex;
    use std::io;

    struct RecordingRunner {
        return_code: i32,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProcessRunner for RecordingRunner {
        async fn run(&self, command: &CommandSpec, _realtime: bool) -> io::Result<ProcessOutput> {
            self.seen.lock().push(command.to_string());
            Ok(ProcessOutput {
                return_code: self.return_code,
                ..ProcessOutput::default()
            })
        }
    }

    #[tokio::test]
    async fn test_restart_runs_systemctl() {
        let runner = Arc::new(RecordingRunner {
            return_code: 0,
            seen: Mutex::new(Vec::new()),
        });
        SystemdServiceController::new(runner.clone())
            .restart("rsyslog.service")
            .await
            .unwrap();
        assert_eq!(runner.seen.lock().as_slice(), ["systemctl restart rsyslog.service"]);
    }

    #[tokio::test]
    async fn test_restart_failure_reports_exit_code() {
        let runner = Arc::new(RecordingRunner {
            return_code: 5,
            seen: Mutex::new(Vec::new()),
        });
        let err = SystemdServiceController::new(runner)
            .restart("rsyslog.service")
            .await
            .unwrap_err();
        assert_eq!(err.service, "rsyslog.service");
        assert!(err.reason.contains('5'));
    }
}
