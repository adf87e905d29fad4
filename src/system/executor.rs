// src/system/executor.rs

use std::ffi::OsStr;
use std::io::Write;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{command}' exited with a non-zero status.\n{output}")]
    NonZeroExitStatus { command: String, output: String },
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("I/O error while talking to a child process: {0}")]
    Io(#[from] std::io::Error),
    #[error("Interrupted by signal.")]
    Interrupted,
}

impl ExecutionError {
    /// The diagnostic text a tool printed before failing, if it got that far.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::NonZeroExitStatus { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Renders a program and its arguments for log and error messages.
pub fn describe<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

/// Runs a tool to completion and returns its combined stdout and stderr.
///
/// A non-zero exit becomes `NonZeroExitStatus` carrying that same combined text,
/// which is what the Go toolchain diagnostics are matched against.
pub fn execute_and_capture_output<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    cwd: &Path,
) -> Result<String, ExecutionError> {
    let command_line = describe(program, args);
    log::debug!("Running '{}' in '{}'", command_line, cwd.display());

    let output = StdCommand::new(program)
        .args(args)
        .current_dir(dunce::simplified(cwd))
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;

    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);
    let text = String::from_utf8(combined).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: command_line.clone(),
        source: e,
    })?;

    if !output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus {
            command: command_line,
            output: text,
        });
    }
    Ok(text)
}

/// Feeds `input` to a filter program on stdin and returns its stdout.
///
/// On failure the filter's stderr is reported as the error output.
pub fn execute_with_input<S: AsRef<OsStr>>(
    program: &str,
    args: &[S],
    input: &str,
) -> Result<String, ExecutionError> {
    let command_line = describe(program, args);
    log::trace!("Piping {} bytes into '{}'", input.len(), command_line);

    let mut child = StdCommand::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;

    // Dropping the handle closes the pipe so the filter sees EOF.
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus {
            command: command_line,
            output: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: command_line,
        source: e,
    })
}

/// Runs a user-configured command line (e.g. `code --wait`) on a file, sharing the terminal.
///
/// The command line is split with shell-word rules; the file is appended as the last argument.
/// Blocks until the program exits.
pub fn execute_interactive(command_line: &str, file: &Path) -> Result<(), ExecutionError> {
    let trimmed_command = command_line.trim();
    let parts = shlex::split(trimmed_command)
        .ok_or_else(|| ExecutionError::CommandParse(trimmed_command.to_string()))?;
    let (program, args) = parts.split_first().ok_or(ExecutionError::EmptyCommand)?;

    log::debug!("Opening '{}' with '{}'", file.display(), trimmed_command);
    let status = StdCommand::new(program)
        .args(args)
        .arg(file)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| ExecutionError::CommandFailed(trimmed_command.to_string(), e))?;

    if !status.success() {
        log::warn!(
            "'{}' exited with code {:?}",
            trimmed_command,
            status.code()
        );
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_capture_combines_stdout_and_stderr() {
        let dir = tempdir().unwrap();
        let out =
            execute_and_capture_output("sh", &["-c", "echo out; echo err 1>&2"], dir.path())
                .unwrap();
        assert_eq!(out, "out\nerr\n");
    }

    #[test]
    fn test_capture_reports_output_on_failure() {
        let dir = tempdir().unwrap();
        let err = execute_and_capture_output("sh", &["-c", "echo broken 1>&2; exit 2"], dir.path())
            .unwrap_err();
        assert_eq!(err.output(), Some("broken\n"));
        assert!(err.to_string().contains("sh -c"));
    }

    #[test]
    fn test_missing_program_is_command_failed() {
        let dir = tempdir().unwrap();
        let err = execute_and_capture_output(
            "definitely-not-a-real-program-xyz",
            &[] as &[&str],
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, ExecutionError::CommandFailed(_, _)));
    }

    #[test]
    fn test_execute_with_input_filters_stdin() {
        let out = execute_with_input("tr", &["a-z", "A-Z"], "hello\n").unwrap();
        assert_eq!(out, "HELLO\n");
    }

    #[test]
    fn test_execute_interactive_rejects_empty_command() {
        let err = execute_interactive("   ", Path::new("x")).unwrap_err();
        assert!(matches!(err, ExecutionError::EmptyCommand));
    }

    #[test]
    fn test_execute_interactive_appends_file_argument() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("touched");
        execute_interactive("touch", &target).unwrap();
        assert!(target.exists());
    }
}
