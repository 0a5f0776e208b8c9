//! Process executor
//!
//! Runs one external command with a hard deadline and an optional resident
//! memory ceiling. Breaching either kills the child; the outcome is always
//! returned as data. Only a failure to start or wait on the process is an
//! error.

use crate::error::ToolExecutionError;
use crate::types::{ExecutionMetrics, VerificationOptions};
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long to wait for pipe readers after the child is gone
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Program, arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// What happened to one process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutcome {
    /// `None` when killed or ended by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub peak_memory_bytes: u64,
    pub timed_out: bool,
    pub memory_exceeded: bool,
}

impl ProcessOutcome {
    /// Exited on its own with code 0
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    #[must_use]
    pub fn metrics(&self) -> ExecutionMetrics {
        ExecutionMetrics {
            execution_time: self.duration,
            memory_used_bytes: self.peak_memory_bytes,
            exit_code: self.exit_code,
            timed_out: self.timed_out,
            memory_exceeded: self.memory_exceeded,
        }
    }
}

/// Deadline- and memory-bounded process runner
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    timeout: Duration,
    max_memory_bytes: Option<u64>,
    capture_stdout: bool,
    capture_stderr: bool,
    sample_interval: Duration,
}

impl ProcessExecutor {
    /// Executor with a deadline, no memory ceiling, both streams captured
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            max_memory_bytes: None,
            capture_stdout: true,
            capture_stderr: true,
            sample_interval: Duration::from_millis(100),
        }
    }

    /// Executor matching verification options
    #[must_use]
    pub fn from_options(options: &VerificationOptions) -> Self {
        Self::new(options.timeout)
            .with_memory_limit(options.max_memory_bytes)
            .with_capture(options.capture_stdout, options.capture_stderr)
    }

    #[inline]
    #[must_use]
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_capture(mut self, stdout: bool, stderr: bool) -> Self {
        self.capture_stdout = stdout;
        self.capture_stderr = stderr;
        self
    }

    /// How often resident memory is sampled
    #[inline]
    #[must_use]
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `spec` to completion, deadline or memory breach
    ///
    /// # Errors
    /// Returns `ToolExecutionError` if the process cannot be spawned or waited on.
    pub async fn run(&self, spec: &CommandSpec) -> Result<ProcessOutcome, ToolExecutionError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(if self.capture_stdout { Stdio::piped() } else { Stdio::null() })
            .stderr(if self.capture_stderr { Stdio::piped() } else { Stdio::null() })
            .kill_on_drop(true);
        if let Some(dir) = &spec.working_dir {
            cmd.current_dir(dir);
        }

        info!("Spawning process: {spec}");
        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|source| ToolExecutionError::Spawn {
            program: spec.program.clone(),
            source,
        })?;
        let stdout_reader = child.stdout.take().map(|out| tokio::spawn(read_all(out)));
        let stderr_reader = child.stderr.take().map(|err| tokio::spawn(read_all(err)));
        let pid = child.id();

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);
        let mut sampler = tokio::time::interval(self.sample_interval);
        let mut outcome = ProcessOutcome::default();

        let status = loop {
            tokio::select! {
                status = child.wait() => {
                    break Some(status.map_err(|source| ToolExecutionError::Wait {
                        program: spec.program.clone(),
                        source,
                    })?);
                }
                () = &mut deadline => {
                    warn!("Process timed out after {:?}: {spec}", self.timeout);
                    outcome.timed_out = true;
                    break None;
                }
                _ = sampler.tick() => {
                    if let Some(rss) = pid.and_then(resident_memory_bytes) {
                        outcome.peak_memory_bytes = outcome.peak_memory_bytes.max(rss);
                        if self.max_memory_bytes.is_some_and(|limit| rss > limit) {
                            warn!("Process exceeded memory ceiling ({rss} bytes): {spec}");
                            outcome.memory_exceeded = true;
                            break None;
                        }
                    }
                }
            }
        };

        match status {
            Some(status) => outcome.exit_code = status.code(),
            None => {
                if let Err(e) = child.kill().await {
                    debug!("Kill after limit breach failed: {e}");
                }
            }
        }
        outcome.duration = started.elapsed();
        outcome.stdout = drain(stdout_reader).await;
        outcome.stderr = drain(stderr_reader).await;

        debug!(
            "Process finished in {:?} with exit code {:?}",
            outcome.duration, outcome.exit_code
        );
        Ok(outcome)
    }
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        debug!("Output pipe read stopped early: {e}");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Collect a reader's output; grandchildren holding the pipe open are not waited for
async fn drain(reader: Option<JoinHandle<String>>) -> String {
    let Some(mut handle) = reader else {
        return String::new();
    };
    match tokio::time::timeout(DRAIN_GRACE, &mut handle).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            debug!("Output reader task failed: {e}");
            String::new()
        }
        Err(_) => {
            handle.abort();
            String::new()
        }
    }
}

/// Resident set size of a live process
#[cfg(target_os = "linux")]
fn resident_memory_bytes(pid: u32) -> Option<u64> {
    let status = std::fs::read_to_string(format!("/proc/{pid}/status")).ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib * 1024)
}

#[cfg(not(target_os = "linux"))]
fn resident_memory_bytes(_pid: u32) -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_display() {
        let spec = CommandSpec::new("java").args(["-Xmx64m", "-jar"]).arg("app.jar");
        assert_eq!(spec.to_string(), "java -Xmx64m -jar app.jar");
    }

    #[tokio::test]
    async fn spawn_failure_is_error() {
        let err = ProcessExecutor::new(Duration::from_secs(1))
            .run(&CommandSpec::new("/no/such/program-jmig"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolExecutionError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_output_and_exit_code() {
        let spec = CommandSpec::new("sh").arg("-c").arg("echo hello; echo oops >&2; exit 3");
        let outcome = ProcessExecutor::new(Duration::from_secs(10)).run(&spec).await.unwrap();
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.stdout, "hello\n");
        assert_eq!(outcome.stderr, "oops\n");
        assert!(!outcome.timed_out);
        assert!(!outcome.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn uncaptured_streams_are_empty() {
        let spec = CommandSpec::new("sh").arg("-c").arg("echo hidden");
        let outcome = ProcessExecutor::new(Duration::from_secs(10))
            .with_capture(false, false)
            .run(&spec)
            .await
            .unwrap();
        assert!(outcome.success());
        assert!(outcome.stdout.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn memory_ceiling_kills_process() {
        let spec = CommandSpec::new("sh").arg("-c").arg("sleep 5");
        let started = Instant::now();
        let outcome = ProcessExecutor::new(Duration::from_secs(30))
            .with_memory_limit(1)
            .with_sample_interval(Duration::from_millis(20))
            .run(&spec)
            .await
            .unwrap();
        assert!(outcome.memory_exceeded);
        assert!(!outcome.timed_out);
        assert_eq!(outcome.exit_code, None);
        assert!(outcome.peak_memory_bytes > 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
