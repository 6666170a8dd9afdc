use std::{
    ffi::OsString,
    io,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use anyhow::Context;
use async_trait::async_trait;
use tokio::{io::AsyncWriteExt as _, process::Command};

use super::result::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Success,
    /// Negated signal number if the process was killed by a signal.
    NonZero(i32),
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub status: ExecStatus,
    /// Empty when timed out.
    pub stdout: String,
    pub stderr: String,
    pub execution_time: Duration,
}

/// One launch of the program under test for one phase.
#[async_trait]
pub trait Invoke: Send + Sync {
    async fn invoke(&self, phase: Phase, payload: &str) -> anyhow::Result<ExecutionResult>;
}

#[async_trait]
impl<T: Invoke + ?Sized> Invoke for &T {
    async fn invoke(&self, phase: Phase, payload: &str) -> anyhow::Result<ExecutionResult> {
        (**self).invoke(phase, payload).await
    }
}

#[derive(Debug, Clone)]
pub struct TestRunner {
    program: PathBuf,
    args: Vec<OsString>,
    execution_time_limit: Duration,
}

impl TestRunner {
    pub const DEFAULT_EXEC_TIME_LIMIT: Duration = Duration::from_millis(2000);

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            execution_time_limit: Self::DEFAULT_EXEC_TIME_LIMIT,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn execution_time_limit(mut self, limit: Duration) -> Self {
        self.execution_time_limit = limit;
        self
    }

    pub fn get_program(&self) -> &Path {
        &self.program
    }

    pub fn get_exec_time_limit(&self) -> Duration {
        self.execution_time_limit
    }

    /// Feeds `input` to a fresh process and waits at most the time limit for it.
    /// The process is always reaped or killed before this returns.
    pub async fn run(&self, input: String) -> anyhow::Result<ExecutionResult> {
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let mut proc = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn '{}'", self.program.to_string_lossy()))?;
        let mut stdin = proc.stdin.take().context("Failed to open stdin")?;
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let (res, start_at) = {
            let fut_stdin = async move {
                let res = match stdin.write_all(input.as_bytes()).await {
                    // exited without consuming its input; the exit status decides
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    res => res,
                };
                drop(stdin); // NOTE: closing stdin is essential
                res
            };
            let fut_stdout = tokio::io::copy(&mut stdout, &mut stdout_buf);
            let fut_stderr = tokio::io::copy(&mut stderr, &mut stderr_buf);
            let fut_exit_status = proc.wait();

            let start_at = tokio::time::Instant::now();

            let res = tokio::time::timeout(self.execution_time_limit, async {
                tokio::try_join!(fut_stdin, fut_stdout, fut_stderr, fut_exit_status)
                    .context("Failed to communicate with subprocess")
            })
            .await;
            (res, start_at)
        };

        let execution_time = tokio::time::Instant::now().duration_since(start_at);

        let exit_status = match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill TLE process: {:#}", e));
                return Ok(ExecutionResult {
                    status: ExecStatus::TimedOut,
                    stdout: String::new(),
                    stderr: String::new(),
                    execution_time,
                });
            }
            Ok(Err(e)) => {
                let _ = proc.kill().await;
                return Err(e);
            }
            Ok(Ok((_, _, _, exit_status))) => exit_status,
        };

        let status = if exit_status.success() {
            ExecStatus::Success
        } else {
            ExecStatus::NonZero(exit_code(exit_status))
        };
        Ok(ExecutionResult {
            status,
            stdout: String::from_utf8_lossy(&stdout_buf).into(),
            stderr: String::from_utf8_lossy(&stderr_buf).into(),
            execution_time,
        })
    }
}

#[async_trait]
impl Invoke for TestRunner {
    async fn invoke(&self, phase: Phase, payload: &str) -> anyhow::Result<ExecutionResult> {
        log::debug!(
            "Launching {} ({}, {} bytes of payload)",
            self.program.to_string_lossy(),
            phase,
            payload.len()
        );
        self.run(format!("{}\n{}", phase, payload)).await
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt as _;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}

#[cfg(test)]
mod test {
    use super::*;

    fn sh(script: &str) -> TestRunner {
        TestRunner::new("/bin/sh")
            .args(["-c", script])
            .execution_time_limit(Duration::from_millis(300))
    }

    #[tokio::test]
    async fn phase_tag_and_payload_are_written_to_stdin() {
        let r = sh(r#"read -r mode; printf '%s:' "$mode"; cat"#);
        let res = dbg!(r.invoke(Phase::Compress, "QUJD").await).unwrap();
        assert_eq!(res.status, ExecStatus::Success);
        assert_eq!(res.stdout, "compress:QUJD");

        let res = r.invoke(Phase::Decompress, "QQ==").await.unwrap();
        assert_eq!(res.stdout, "decompress:QQ==");
    }

    #[tokio::test]
    async fn should_be_nonzero_even_if_stdout_is_written() {
        let r = sh("cat >/dev/null; echo QUJD; echo oops >&2; exit 42");
        let res = r.invoke(Phase::Compress, "QUJD").await.unwrap();
        assert_eq!(res.status, ExecStatus::NonZero(42));
        assert_eq!(res.stdout, "QUJD\n");
        assert_eq!(res.stderr, "oops\n");
    }

    #[tokio::test]
    async fn should_time_out_and_discard_output() {
        let r = sh("echo partial; exec sleep 10");
        let res = r.invoke(Phase::Compress, "QUJD").await.unwrap();
        assert_eq!(res.status, ExecStatus::TimedOut);
        assert_eq!(res.stdout, "");
        assert!(res.execution_time < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn unread_stdin_is_not_an_error() {
        let payload = "A".repeat(4 << 20);
        let r = sh("exit 3");
        let res = r.invoke(Phase::Compress, &payload).await.unwrap();
        assert_eq!(res.status, ExecStatus::NonZero(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn killed_by_signal_reports_negated_signal() {
        let r = sh("kill -9 $$");
        let res = r.invoke(Phase::Compress, "").await.unwrap();
        assert_eq!(res.status, ExecStatus::NonZero(-9));
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let r = TestRunner::new("/nonexistent/solution");
        assert!(r.invoke(Phase::Compress, "QUJD").await.is_err());
    }
}
