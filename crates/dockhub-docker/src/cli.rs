//! Enumeration through the docker command-line client.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use dockhub_core::ContainerRecord;

use crate::ContainerSource;
use crate::parse::parse_ps_output;

/// Runs `docker ps --format json` with a bounded timeout.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl DockerCli {
    pub fn new(binary: &str, timeout: Duration) -> Self {
        Self::with_command(binary, ["ps", "--format", "json"], timeout)
    }

    /// Use an arbitrary command whose stdout has the `docker ps` JSON shape.
    pub fn with_command<I, S>(program: &str, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl ContainerSource for DockerCli {
    async fn list_containers(&self) -> Vec<ContainerRecord> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(program = %self.program, error = %e, "failed to launch container runtime");
                return Vec::new();
            }
            Err(_) => {
                warn!(
                    program = %self.program,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "container runtime timed out"
                );
                return Vec::new();
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            warn!(program = %self.program, exit_code, stderr = %stderr.trim(), "container runtime failed");
            return Vec::new();
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let records = parse_ps_output(&stdout);
        debug!(count = records.len(), "containers enumerated");
        for record in &records {
            debug!(container = %record.names, ports = %record.ports, "container");
        }
        records
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> DockerCli {
        DockerCli::with_command("sh", ["-c", script], timeout)
    }

    #[tokio::test]
    async fn reads_records_from_stdout() {
        let cli = sh(
            r#"printf '%s\n' '{"Names":"web","Ports":"0.0.0.0:8080->80/tcp"}' 'oops' '{"Names":"db"}'"#,
            Duration::from_secs(5),
        );
        let records = cli.list_containers().await;
        let names: Vec<_> = records.iter().map(|r| r.container_name()).collect();
        assert_eq!(names, vec!["web", "db"]);
    }

    #[tokio::test]
    async fn nonzero_exit_is_empty() {
        let cli = sh(r#"echo '{"Names":"web"}'; exit 3"#, Duration::from_secs(5));
        assert!(cli.list_containers().await.is_empty());
    }

    #[tokio::test]
    async fn missing_binary_is_empty() {
        let cli = DockerCli::new("/nonexistent/dockhub-docker-bin", Duration::from_secs(5));
        assert!(cli.list_containers().await.is_empty());
    }

    #[tokio::test]
    async fn timeout_is_empty() {
        let cli = sh("sleep 5", Duration::from_millis(100));
        let started = std::time::Instant::now();
        assert!(cli.list_containers().await.is_empty());
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
