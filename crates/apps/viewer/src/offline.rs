//! Offline rendering through the external Sunflow renderer
//!
//! One job runs at a time on a background thread. Its output is forwarded
//! to tracing under the `sunflow` target and the outcome is reported back
//! over a channel that the frame loop polls.

use crate::config::ViewerConfig;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Everything needed to launch one render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    pub alias: String,
    pub scene_file: PathBuf,
    pub output: PathBuf,
    program: String,
    args: Vec<String>,
}

impl RenderJob {
    /// Build the renderer invocation for `alias` in `scene_file`
    ///
    /// `index` numbers the output image.
    pub fn new(config: &ViewerConfig, alias: &str, scene_file: &Path, index: u32) -> Self {
        let output = config
            .sunflow_output_path
            .join(format!("render_{}_{}.jpg", alias, index));
        let args = vec![
            format!("-Xmx{}", config.sunflow_ram),
            "-server".to_string(),
            "-jar".to_string(),
            config.sunflow_jar_path.display().to_string(),
            scene_file.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "-brdfAlias".to_string(),
            alias.to_string(),
        ];
        Self {
            alias: alias.to_string(),
            scene_file: scene_file.to_path_buf(),
            output,
            program: config.java_binary.clone(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

/// How a job ended
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Finished { alias: String, output: PathBuf },
    Failed { alias: String, error: String },
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("A render is already running")]
    Busy,
    #[error("Failed to start renderer thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Launches render jobs and tracks the one in flight
#[derive(Debug, Default)]
pub struct OfflineRenderer {
    completed: u32,
    running: Option<Receiver<JobOutcome>>,
}

impl OfflineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of renders that finished successfully; numbers the next output
    pub fn completed(&self) -> u32 {
        self.completed
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn launch(&mut self, job: RenderJob) -> Result<(), LaunchError> {
        if self.running.is_some() {
            return Err(LaunchError::Busy);
        }

        tracing::info!(
            "Rendering {} with BRDF {} to {}",
            job.scene_file.display(),
            job.alias,
            job.output.display()
        );

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("sunflow".to_string())
            .spawn(move || {
                let outcome = run_job(&job);
                // The receiver is gone only if the viewer already shut down
                let _ = tx.send(outcome);
            })?;
        self.running = Some(rx);
        Ok(())
    }

    /// Check for a finished job without blocking
    pub fn poll(&mut self) -> Option<JobOutcome> {
        let rx = self.running.as_ref()?;
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => JobOutcome::Failed {
                alias: String::new(),
                error: "renderer thread exited without reporting".to_string(),
            },
        };
        self.running = None;

        match &outcome {
            JobOutcome::Finished { alias, output } => {
                self.completed += 1;
                tracing::info!("Render of {} finished: {}", alias, output.display());
            }
            JobOutcome::Failed { alias, error } => {
                tracing::warn!("Render of {} failed: {}", alias, error);
            }
        }
        Some(outcome)
    }
}

fn run_job(job: &RenderJob) -> JobOutcome {
    let failed = |error: String| JobOutcome::Failed {
        alias: job.alias.clone(),
        error,
    };

    if let Some(dir) = job.output.parent() {
        if let Err(e) = std::fs::create_dir_all(dir) {
            return failed(format!("Failed to create {}: {}", dir.display(), e));
        }
    }

    let mut child = match job.command().spawn() {
        Ok(child) => child,
        Err(e) => return failed(format!("Failed to launch {}: {}", job.program, e)),
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    thread::scope(|scope| {
        if let Some(stderr) = stderr {
            scope.spawn(move || forward_lines(stderr, true));
        }
        if let Some(stdout) = stdout {
            forward_lines(stdout, false);
        }
    });

    match child.wait() {
        Ok(status) if status.success() => JobOutcome::Finished {
            alias: job.alias.clone(),
            output: job.output.clone(),
        },
        Ok(status) => failed(format!("Renderer exited with {}", status)),
        Err(e) => failed(format!("Failed to wait for renderer: {}", e)),
    }
}

fn forward_lines(stream: impl Read, is_stderr: bool) {
    for line in BufReader::new(stream).lines() {
        match line {
            Ok(line) if is_stderr => tracing::warn!(target: "sunflow", "{}", line),
            Ok(line) => tracing::info!(target: "sunflow", "{}", line),
            Err(e) => {
                tracing::debug!(target: "sunflow", "Output stream closed: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(renderer: &mut OfflineRenderer) -> JobOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = renderer.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "job did not finish");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_command_line() {
        let config = ViewerConfig::default();
        let scene = config.scene_path("Teapot").unwrap();
        let job = RenderJob::new(&config, "PhongBRDF", &scene, 3);

        assert_eq!(job.program(), "java");
        assert_eq!(
            job.args(),
            [
                "-Xmx2G",
                "-server",
                "-jar",
                "sunflow/sunflow.jar",
                "sunflow/scenes/gumbo_and_teapot.sc",
                "-o",
                "output/renders/render_PhongBRDF_3.jpg",
                "-brdfAlias",
                "PhongBRDF",
            ]
        );
        assert_eq!(job.output, PathBuf::from("output/renders/render_PhongBRDF_3.jpg"));
    }

    #[test]
    fn test_missing_binary_fails_without_counting() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig {
            java_binary: "definitely-not-a-java-binary".to_string(),
            sunflow_output_path: dir.path().to_path_buf(),
            ..ViewerConfig::default()
        };
        let job = RenderJob::new(&config, "LambertianBRDF", Path::new("scene.sc"), 0);

        let mut renderer = OfflineRenderer::new();
        renderer.launch(job).unwrap();
        assert!(renderer.is_running());

        let outcome = wait_for(&mut renderer);
        assert!(matches!(outcome, JobOutcome::Failed { .. }));
        assert!(!renderer.is_running());
        assert_eq!(renderer.completed(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_job_increments_counter() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig {
            java_binary: "true".to_string(),
            sunflow_output_path: dir.path().join("renders"),
            ..ViewerConfig::default()
        };
        let job = RenderJob::new(&config, "LambertianBRDF", Path::new("scene.sc"), 0);

        let mut renderer = OfflineRenderer::new();
        renderer.launch(job).unwrap();
        assert!(matches!(
            renderer.launch(RenderJob::new(&config, "x", Path::new("scene.sc"), 1)),
            Err(LaunchError::Busy)
        ));

        let outcome = wait_for(&mut renderer);
        assert!(matches!(outcome, JobOutcome::Finished { .. }));
        assert_eq!(renderer.completed(), 1);
        assert!(dir.path().join("renders").is_dir());
    }
}
