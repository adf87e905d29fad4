// src/cli/handlers/run.rs

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::{
    cli::Cli,
    core::{assembler, builder, diagnostics::Diagnostics, paths::ProjectContext, store},
    models::CommandName,
    system::{interrupt::InterruptWatch, launcher},
};

/// Where the program to build comes from.
enum Input {
    /// A complete Go file, compiled as it is.
    File(PathBuf),
    /// A fragment (or a file holding one) wrapped by the project template.
    Code(String),
    /// The stored source of `--name`, rebuilt in place.
    Stored,
}

/// The default action: build `--file`, `--code` or `--name`, then optionally execute it.
///
/// Without `--name` the command is temporary. Its source and binary are removed when
/// this function returns, whether the build fails, the command runs or the user
/// interrupts it. An empty `--code` counts as no code.
pub fn handle(cli: &Cli, ctx: &ProjectContext<'_>, diagnostics: &mut Diagnostics) -> Result<i32> {
    let code = cli.code.as_deref().filter(|code| !code.is_empty());
    let input = match (&cli.file, code, &cli.name) {
        (Some(file), _, _) => Input::File(file.clone()),
        (None, Some(code), _) => Input::Code(code.to_string()),
        (None, None, Some(_)) => Input::Stored,
        (None, None, None) => return Err(crate::cli::CliError::MissingInput.into()),
    };

    let command = match cli.name.as_deref() {
        Some(name) => CommandName::named(store::validate_name(name)?),
        None => CommandName::temporary(),
    };

    // Listening before any file exists, so a signal cannot end the process ahead of
    // the cleanup guard.
    let watch = command.temporary.then(InterruptWatch::start).transpose()?;
    let check_interrupt = || watch.as_ref().map_or(Ok(()), InterruptWatch::check);

    let _cleanup = scopeguard::guard(&command, |command| {
        if command.temporary {
            if let Err(e) = store::cleanup_temporary(ctx, &command.name) {
                log::warn!("Could not remove temporary command '{}': {}", command.name, e);
            }
        }
    });

    let src = match input {
        Input::Stored => {
            let path = ctx.source_path(&command.name);
            if !path.is_file() {
                return Err(store::StoreError::NotFound(command.name.clone()).into());
            }
            path
        }
        Input::File(file) => {
            let source = assembler::read_source_file(&file)?;
            store::save(ctx, &command.name, &source)
                .with_context(|| format!(t!("run.error.save_failed"), name = command.name))?
        }
        Input::Code(code) => {
            let assembled = assembler::assemble(ctx, &code)?;
            if let Some(message) = &assembled.format_error {
                diagnostics.defer(t!("run.warning.format_failed"), message);
            }
            store::save(ctx, &command.name, &assembled.source)
                .with_context(|| format!(t!("run.error.save_failed"), name = command.name))?
        }
    };
    check_interrupt()?;

    let bin = ctx.binary_path(&command.name);
    let built = builder::compile_binary(ctx, &src, &bin);
    // The signal also reaches `go build` and `go get`; report the interrupt, not their failure.
    check_interrupt()?;
    built?;
    log::debug!("Built '{}'", bin.display());

    if cli.pipe {
        let run = launcher::run_piped(&bin, &cli.args, tokio::io::stdin())?;
        print!("{}", run.output);
        return Ok(run.exit_code);
    }
    if cli.exec {
        return Ok(launcher::run_passthrough(&bin, &cli.args)?);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_TEMPLATE;
    use crate::core::builder::BuildError;
    use crate::system::toolchain::testing::FakeToolchain;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    /// Every temporary command listens for signals while it exists.
    #[cfg(unix)]
    fn serial() -> std::sync::MutexGuard<'static, ()> {
        crate::system::interrupt::testing::serial()
    }

    #[cfg(not(unix))]
    fn serial() {}

    fn project() -> TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::create_dir(dir.path().join("bin")).unwrap();
        fs::write(dir.path().join("go.mod"), "module scratch\n").unwrap();
        fs::write(dir.path().join("script.tmpl"), DEFAULT_TEMPLATE).unwrap();
        dir
    }

    fn leftovers(dir: &TempDir) -> usize {
        ["src", "bin"]
            .iter()
            .map(|sub| fs::read_dir(dir.path().join(sub)).unwrap().count())
            .sum()
    }

    fn code_cli(code: &str) -> Cli {
        Cli {
            code: Some(code.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_temporary_command_is_removed_after_build() {
        let _serial = serial();
        let dir = project();
        let toolchain = FakeToolchain::default();
        let ctx = ProjectContext::new(dir.path(), &toolchain);

        let code = handle(&code_cli("fmt.Println(1)"), &ctx, &mut Diagnostics::new()).unwrap();
        assert_eq!(code, 0);
        assert_eq!(toolchain.count("build"), 1);
        assert_eq!(leftovers(&dir), 0);
    }

    #[test]
    fn test_temporary_command_is_removed_after_failed_build() {
        let _serial = serial();
        let dir = project();
        let toolchain = FakeToolchain::failing_builds(&["./x.go:1: undefined: nope\n"]);
        let ctx = ProjectContext::new(dir.path(), &toolchain);

        let err = handle(&code_cli("nope()"), &ctx, &mut Diagnostics::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::Compile { .. })
        ));
        assert_eq!(leftovers(&dir), 0);
    }

    #[test]
    fn test_named_command_is_kept() {
        let _serial = serial();
        let dir = project();
        let toolchain = FakeToolchain::default();
        let ctx = ProjectContext::new(dir.path(), &toolchain);
        let cli = Cli {
            name: Some("hello".to_string()),
            ..code_cli("fmt.Println(\"hello\")")
        };

        handle(&cli, &ctx, &mut Diagnostics::new()).unwrap();
        assert!(ctx.source_path("hello").is_file());
        assert!(ctx.binary_path("hello").is_file());

        // `--name` alone rebuilds the stored source without rewriting it.
        let before = fs::read_to_string(ctx.source_path("hello")).unwrap();
        let rebuild = Cli {
            name: Some("hello".to_string()),
            ..Default::default()
        };
        handle(&rebuild, &ctx, &mut Diagnostics::new()).unwrap();
        assert_eq!(fs::read_to_string(ctx.source_path("hello")).unwrap(), before);
        assert_eq!(toolchain.count("build"), 2);
    }

    #[test]
    fn test_format_failure_is_deferred_not_fatal() {
        let _serial = serial();
        let dir = project();
        let toolchain = FakeToolchain {
            format_failure: Some("expected ')'".to_string()),
            ..Default::default()
        };
        let ctx = ProjectContext::new(dir.path(), &toolchain);
        let mut diagnostics = Diagnostics::new();

        handle(&code_cli("fmt.Println("), &ctx, &mut diagnostics).unwrap();
        assert_eq!(diagnostics.messages().len(), 1);
        assert!(diagnostics.messages()[0].ends_with("expected ')'"));
    }

    #[test]
    fn test_missing_input_is_a_usage_error() {
        let _serial = serial();
        let dir = project();
        let toolchain = FakeToolchain::default();
        let ctx = ProjectContext::new(dir.path(), &toolchain);

        let err = handle(&Cli::default(), &ctx, &mut Diagnostics::new()).unwrap_err();
        assert!(err.downcast_ref::<crate::cli::CliError>().is_some());
        assert!(toolchain.calls().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_temporary_command_is_removed_when_launch_fails() {
        let _serial = serial();
        let dir = project();
        let toolchain = FakeToolchain::default();
        let ctx = ProjectContext::new(dir.path(), &toolchain);
        // The fake build writes a stub without the executable bit, so spawning it fails.
        let cli = Cli {
            exec: true,
            ..code_cli("fmt.Println(1)")
        };

        let err = handle(&cli, &ctx, &mut Diagnostics::new()).unwrap_err();
        assert!(err.downcast_ref::<crate::system::executor::ExecutionError>().is_some());
        assert_eq!(leftovers(&dir), 0);
    }

    #[test]
    fn test_empty_code_is_no_code() {
        let _serial = serial();
        let dir = project();
        let toolchain = FakeToolchain::default();
        let ctx = ProjectContext::new(dir.path(), &toolchain);

        let err = handle(&code_cli(""), &ctx, &mut Diagnostics::new()).unwrap_err();
        assert!(err.downcast_ref::<crate::cli::CliError>().is_some());
        assert!(toolchain.calls().is_empty());
        assert_eq!(leftovers(&dir), 0);
    }

    #[cfg(unix)]
    mod interrupts {
        use super::*;
        use crate::system::executor::ExecutionError;
        use crate::system::interrupt::testing::signal_self_after;
        use crate::system::toolchain::Toolchain;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;
        use std::thread;
        use std::time::{Duration, Instant};

        /// Builds by waiting, then writing `program` as an executable script.
        #[derive(Debug)]
        struct ScriptToolchain {
            build_delay: Duration,
            program: &'static str,
        }

        impl Toolchain for ScriptToolchain {
            fn build(&self, _root: &Path, _src: &Path, bin: &Path) -> Result<String, ExecutionError> {
                thread::sleep(self.build_delay);
                fs::write(bin, self.program)?;
                fs::set_permissions(bin, fs::Permissions::from_mode(0o755))?;
                Ok(String::new())
            }

            fn get(&self, _root: &Path, _package: &str) -> Result<String, ExecutionError> {
                Ok(String::new())
            }

            fn tidy(&self, _root: &Path) -> Result<String, ExecutionError> {
                Ok(String::new())
            }

            fn init_module(&self, _root: &Path, _name: &str) -> Result<String, ExecutionError> {
                Ok(String::new())
            }

            fn format(&self, source: &str) -> Result<String, ExecutionError> {
                Ok(source.to_string())
            }
        }

        fn exec_cli() -> Cli {
            Cli {
                exec: true,
                ..code_cli("fmt.Println(1)")
            }
        }

        fn is_interrupted(err: &anyhow::Error) -> bool {
            matches!(
                err.downcast_ref::<ExecutionError>(),
                Some(ExecutionError::Interrupted)
            )
        }

        #[test]
        fn test_interrupt_during_build_removes_temporary_files() {
            let _serial = serial();
            let dir = project();
            let toolchain = ScriptToolchain {
                build_delay: Duration::from_millis(1500),
                program: "#!/bin/sh\n",
            };
            let ctx = ProjectContext::new(dir.path(), &toolchain);
            let sender = signal_self_after("INT", Duration::from_millis(300));

            let err = handle(&exec_cli(), &ctx, &mut Diagnostics::new()).unwrap_err();
            sender.join().unwrap();
            assert!(is_interrupted(&err), "unexpected error: {:#}", err);
            assert_eq!(leftovers(&dir), 0);
        }

        #[test]
        fn test_interrupt_while_running_removes_temporary_files() {
            let _serial = serial();
            let dir = project();
            let toolchain = ScriptToolchain {
                build_delay: Duration::ZERO,
                program: "#!/bin/sh\nsleep 5\n",
            };
            let ctx = ProjectContext::new(dir.path(), &toolchain);
            let started = Instant::now();
            let sender = signal_self_after("INT", Duration::from_millis(800));

            let err = handle(&exec_cli(), &ctx, &mut Diagnostics::new()).unwrap_err();
            sender.join().unwrap();
            assert!(is_interrupted(&err), "unexpected error: {:#}", err);
            assert!(started.elapsed() < Duration::from_secs(4));
            assert_eq!(leftovers(&dir), 0);
        }
    }
}
