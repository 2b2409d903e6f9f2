use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use common::Language;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::SandboxError;
use super::{RunOutput, Sandbox};

/// Sandbox driver backed by the docker CLI. Containers are started detached
/// with `--rm` and a keep-alive entrypoint, so a single `stop` both kills
/// and removes them.
#[derive(Debug, Clone)]
pub struct DockerSandbox {
    docker_bin: String,
}

impl DockerSandbox {
    pub fn new(docker_bin: impl Into<String>) -> Self {
        Self {
            docker_bin: docker_bin.into(),
        }
    }
}

/// A running per-submission container. Dropping an unstopped handle detaches
/// a best-effort `docker stop` so a panicking caller cannot leak containers.
#[derive(Debug)]
pub struct Container {
    id: String,
    docker_bin: String,
    stopped: bool,
}

impl Container {
    pub fn id(&self) -> &str {
        &self.id
    }

    async fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        let output = Command::new(&self.docker_bin)
            .args(["stop", &self.id])
            .output()
            .await;
        if let Err(e) = output {
            warn!(container_id = %self.id, error = %e, "failed to stop container");
        }
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        let _ = std::process::Command::new(&self.docker_bin)
            .args(["stop", &self.id])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
    }
}

#[async_trait]
impl Sandbox for DockerSandbox {
    type Handle = Container;

    async fn prepare(
        &self,
        code_path: &Path,
        language: &Language,
    ) -> Result<Container, SandboxError> {
        let abs_path = code_path.canonicalize().map_err(|e| {
            SandboxError::Create(format!(
                "failed to resolve code path {}: {e}",
                code_path.display()
            ))
        })?;
        let mount = format!(
            "{}:/app/{}:ro",
            abs_path.display(),
            language.source_file_name()
        );

        let output = Command::new(&self.docker_bin)
            .args(["run", "-d", "--rm", "-v", &mount, "-w", "/app"])
            .arg(language.container_image)
            .args(["tail", "-f", "/dev/null"])
            .output()
            .await
            .map_err(|e| SandboxError::Create(format!("failed to execute docker run: {e}")))?;

        if !output.status.success() {
            return Err(SandboxError::Create(format!(
                "container start error: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(SandboxError::Create(
                "docker run did not return a container id".to_string(),
            ));
        }

        let mut container = Container {
            id,
            docker_bin: self.docker_bin.clone(),
            stopped: false,
        };
        debug!(container_id = %container.id, image = language.container_image, "container started");

        if language.needs_compilation && !language.build_command.is_empty() {
            let build = Command::new(&self.docker_bin)
                .args(["exec", &container.id])
                .args(language.build_command)
                .output()
                .await
                .map_err(|e| SandboxError::Create(format!("failed to execute build: {e}")));

            let build = match build {
                Ok(build) => build,
                Err(e) => {
                    container.stop().await;
                    return Err(e);
                }
            };

            if !build.status.success() {
                let combined = format!(
                    "{}{}",
                    String::from_utf8_lossy(&build.stderr),
                    String::from_utf8_lossy(&build.stdout)
                );
                container.stop().await;
                return Err(SandboxError::Compilation(combined));
            }
        }

        Ok(container)
    }

    async fn run(
        &self,
        handle: &mut Container,
        language: &Language,
        stdin: &str,
    ) -> Result<RunOutput, SandboxError> {
        let mut child = Command::new(&self.docker_bin)
            .args(["exec", "-i", &handle.id])
            .args(language.run_command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SandboxError::Execution(format!("failed to execute program: {e}")))?;

        if let Some(mut sink) = child.stdin.take() {
            sink.write_all(stdin.as_bytes())
                .await
                .map_err(|e| SandboxError::Execution(format!("failed to write stdin: {e}")))?;
            // Dropping the sink closes the pipe so the program sees EOF.
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SandboxError::Execution(format!("failed to collect output: {e}")))?;

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        })
    }

    async fn destroy(&self, mut handle: Container) {
        handle.stop().await;
    }
}
