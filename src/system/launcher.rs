// src/system/launcher.rs

//! Runs a freshly built command as a child process.
//!
//! Both modes race the child against SIGINT/SIGTERM. On a signal the launcher stops
//! waiting and returns `ExecutionError::Interrupted`; the child is left alone, as it
//! belongs to the same process group and received the signal itself.

use crate::system::executor::{self, ExecutionError};
use crate::system::interrupt::interrupted;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};

/// What a piped run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRun {
    pub exit_code: i32,
    /// Standard output followed by standard error.
    pub output: String,
}

/// Runs `bin` with the terminal's streams and returns its exit code.
pub fn run_passthrough(bin: &Path, args: &[String]) -> Result<i32, ExecutionError> {
    block_on(passthrough(bin, args))
}

/// Runs `bin` feeding it lines from `input` until EOF or the first blank line, and
/// captures everything it prints.
pub fn run_piped<R>(bin: &Path, args: &[String], input: R) -> Result<CapturedRun, ExecutionError>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    block_on(piped(bin, args, input))
}

fn block_on<F, T>(future: F) -> Result<T, ExecutionError>
where
    F: Future<Output = Result<T, ExecutionError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(future);
    // A forwarder blocked on the terminal must not hold the process open.
    runtime.shutdown_background();
    result
}

async fn passthrough(bin: &Path, args: &[String]) -> Result<i32, ExecutionError> {
    let command_line = executor::describe(&bin.to_string_lossy(), args);
    log::debug!("Executing '{}'", command_line);

    let mut child = Command::new(bin)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| ExecutionError::CommandFailed(command_line, e))?;

    tokio::select! {
        status = child.wait() => Ok(exit_code(status?)),
        () = interrupted() => Err(ExecutionError::Interrupted),
    }
}

async fn piped<R>(bin: &Path, args: &[String], input: R) -> Result<CapturedRun, ExecutionError>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let command_line = executor::describe(&bin.to_string_lossy(), args);
    log::debug!("Executing '{}' with piped input", command_line);

    let mut child = Command::new(bin)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExecutionError::CommandFailed(command_line, e))?;

    let forwarder = tokio::spawn(forward_lines(input, child.stdin.take()));

    let output = tokio::select! {
        output = child.wait_with_output() => output?,
        () = interrupted() => {
            forwarder.abort();
            return Err(ExecutionError::Interrupted);
        }
    };
    forwarder.abort();

    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);
    Ok(CapturedRun {
        exit_code: exit_code(output.status),
        output: String::from_utf8_lossy(&combined).into_owned(),
    })
}

/// Copies lines into the child's stdin, stopping at EOF or a blank line.
/// Dropping the handle at the end closes the child's input.
async fn forward_lines<R>(input: R, stdin: Option<ChildStdin>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            break;
        }
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
    }
    stdin.flush().await
}

/// The child's exit code. A child killed by a signal reports `128 + signal`, as shells do.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::system::interrupt::testing::{serial, signal_self_after};
    use std::time::{Duration, Instant};

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_passthrough_mirrors_exit_code() {
        let _serial = serial();
        assert_eq!(run_passthrough(Path::new("sh"), &sh("exit 3")).unwrap(), 3);
        assert_eq!(run_passthrough(Path::new("sh"), &sh("true")).unwrap(), 0);
    }

    #[test]
    fn test_passthrough_forwards_arguments() {
        let _serial = serial();
        let args = vec![
            "-c".to_string(),
            "[ \"$1\" = \"--flag\" ] && [ \"$2\" = \"two words\" ]".to_string(),
            "sh".to_string(),
            "--flag".to_string(),
            "two words".to_string(),
        ];
        assert_eq!(run_passthrough(Path::new("sh"), &args).unwrap(), 0);
    }

    #[test]
    fn test_piped_stops_at_blank_line() {
        let _serial = serial();
        let input: &'static [u8] = b"one\ntwo\n\nthree\n";
        let run = run_piped(Path::new("cat"), &[], input).unwrap();
        assert_eq!(run.output, "one\ntwo\n");
        assert_eq!(run.exit_code, 0);
    }

    #[test]
    fn test_piped_captures_stdout_then_stderr() {
        let _serial = serial();
        let input: &'static [u8] = b"hello\n";
        let run = run_piped(
            Path::new("sh"),
            &sh("echo err >&2; cat; exit 4"),
            input,
        )
        .unwrap();
        assert_eq!(run.output, "hello\nerr\n");
        assert_eq!(run.exit_code, 4);
    }

    #[test]
    fn test_missing_binary_is_command_failed() {
        let _serial = serial();
        let err = run_passthrough(Path::new("/nonexistent/goscript-test-bin"), &[]).unwrap_err();
        assert!(matches!(err, ExecutionError::CommandFailed(..)));
    }

    #[test]
    fn test_signalled_child_reports_shell_exit_code() {
        let _serial = serial();
        assert_eq!(
            run_passthrough(Path::new("sh"), &sh("kill -KILL $$")).unwrap(),
            137
        );
        let run = run_piped(Path::new("sh"), &sh("kill -TERM $$"), tokio::io::empty()).unwrap();
        assert_eq!(run.exit_code, 143);
    }

    #[test]
    fn test_passthrough_stops_waiting_on_interrupt() {
        let _serial = serial();
        let started = Instant::now();
        let sender = signal_self_after("INT", Duration::from_millis(500));

        let err = run_passthrough(Path::new("sh"), &sh("sleep 5")).unwrap_err();
        sender.join().unwrap();
        assert!(matches!(err, ExecutionError::Interrupted));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_piped_stops_waiting_on_interrupt() {
        let _serial = serial();
        let started = Instant::now();
        let sender = signal_self_after("INT", Duration::from_millis(500));

        let input: &'static [u8] = b"line\n";
        let err = run_piped(Path::new("sh"), &sh("cat >/dev/null; sleep 5"), input).unwrap_err();
        sender.join().unwrap();
        assert!(matches!(err, ExecutionError::Interrupted));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
