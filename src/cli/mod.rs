use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod dispatcher;
pub mod handlers;

/// Errors in how goscript was invoked, as opposed to errors while doing the work.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Nothing to compile: give --code, --file or --name.")]
    MissingInput,
}

/// Builds the color-aware help text from the locale template.
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = t!("cli.help.template")
        .replace("<bin>", &handlers::commons::program_name())
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// goscript: compile Go snippets and scripts into named, reusable commands.
#[derive(Parser, Debug, Default)]
#[command(
    about,
    help_template = { build_help_string() },
    disable_version_flag = true,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
pub struct Cli {
    /// The body of main(), or the name of a file holding it.
    #[arg(short, long, value_name = "CODE")]
    pub code: Option<String>,

    /// A complete Go source file (package, imports and main). Compiled as-is.
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Save the command under this name in the project. Alone, rebuilds that command.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Execute the resulting binary.
    #[arg(short = 'x', long)]
    pub exec: bool,

    /// Execute with piped input: forward lines until a blank line, print the output at the end.
    #[arg(long)]
    pub pipe: bool,

    /// Edit the named command with $GOSCRIPT_EDITOR or $EDITOR.
    #[arg(short, long, value_name = "NAME")]
    pub edit: Option<String>,

    /// Print a full program for --code (or an empty one), or save it with --name.
    #[arg(short, long)]
    pub template: bool,

    /// List the commands in the project.
    #[arg(short, long)]
    pub list: bool,

    /// Print the source path of a command. Prints nothing if there is none.
    #[arg(short, long, value_name = "NAME")]
    pub path: Option<String>,

    /// Print a command's source, or copy it to --name. The command stays in the project.
    #[arg(long, value_name = "NAME")]
    pub cat: Option<String>,

    /// Print a command's source with a shebang line, then delete it from the project.
    #[arg(long, value_name = "NAME")]
    pub export: Option<String>,

    /// Copy a command's binary to the current directory, then delete it from the project.
    #[arg(long = "export-bin", value_name = "NAME")]
    pub export_bin: Option<String>,

    /// Delete a command. Its source is kept so --restore can bring it back.
    #[arg(long, value_name = "NAME")]
    pub delete: Option<String>,

    /// Restore a deleted or exported command and rebuild it.
    #[arg(long, value_name = "NAME")]
    pub restore: Option<String>,

    /// Fetch a package into the project module and record its alias.
    #[arg(short, long, value_name = "PACKAGE")]
    pub goget: Option<String>,

    /// Run 'go mod tidy' in the project.
    #[arg(long)]
    pub gotidy: bool,

    /// Rebuild every command in the project.
    #[arg(long)]
    pub recompile: bool,

    /// Create a project at this path, or print the setup steps for 'help'.
    #[arg(long, value_name = "DIR")]
    pub setup: Option<String>,

    /// Print the project directory.
    #[arg(short, long)]
    pub dir: bool,

    /// Print the shebang line for scripts.
    #[arg(short, long)]
    pub bang: bool,

    /// Print the goscript version.
    #[arg(short, long)]
    pub version: bool,

    /// Arguments passed on to the executed command.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

impl Cli {
    /// Parses the process arguments, exiting with clap's message on invalid input.
    pub fn parse_from_env() -> Self {
        Self::try_parse_script_args(std::env::args_os().collect()).unwrap_or_else(|e| e.exit())
    }

    /// Parses `raw` (program name first), accounting for shebang invocation.
    ///
    /// A script run through `#!/usr/bin/env -S goscript` arrives as the first argument,
    /// before any flag. In that position an existing file is taken as `--file` and
    /// implies `--exec`. After `-x`, the first trailing argument is taken as the file
    /// when nothing else says what to compile.
    pub fn try_parse_script_args(mut raw: Vec<OsString>) -> Result<Self, clap::Error> {
        let script = match raw.get(1) {
            Some(first) if is_script(Path::new(first)) => Some(PathBuf::from(raw.remove(1))),
            _ => None,
        };

        let mut cli = Self::try_parse_from(raw)?;
        if let Some(path) = script {
            log::debug!("Running '{}' as a script", path.display());
            cli.file = Some(path);
            cli.exec = true;
        } else if cli.exec && !cli.has_input() {
            let first_is_script = cli.args.first().is_some_and(|a| is_script(Path::new(a)));
            if first_is_script {
                let path = cli.args.remove(0);
                cli.file = Some(PathBuf::from(path));
            }
        }
        Ok(cli)
    }

    /// Whether something to compile was given. An empty `--code` does not count.
    pub fn has_input(&self) -> bool {
        let has_code = self.code.as_deref().is_some_and(|code| !code.is_empty());
        self.file.is_some() || has_code || self.name.is_some()
    }
}

fn is_script(path: &Path) -> bool {
    !path.to_string_lossy().starts_with('-') && path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_script_args(args.iter().map(OsString::from).collect()).unwrap()
    }

    #[test]
    fn test_flags_and_forwarded_args() {
        let cli = parse(&["goscript", "-x", "-c", "fmt.Println(os.Args)", "a", "-b", "--c"]);
        assert!(cli.exec);
        assert_eq!(cli.code.as_deref(), Some("fmt.Println(os.Args)"));
        assert_eq!(cli.args, vec!["a", "-b", "--c"]);
    }

    #[test]
    fn test_shebang_script_as_first_argument() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("hello.go");
        fs::write(&script, "#!/usr/bin/env -S goscript\nfmt.Println(1)\n").unwrap();
        let script = script.to_str().unwrap();

        let cli = parse(&["goscript", script, "one", "--two"]);
        assert!(cli.exec);
        assert_eq!(cli.file.as_deref(), Some(Path::new(script)));
        assert_eq!(cli.args, vec!["one", "--two"]);
    }

    #[test]
    fn test_script_after_exec_flag() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("hello.go");
        fs::write(&script, "package main\n").unwrap();
        let script = script.to_str().unwrap();

        let cli = parse(&["goscript", "-x", script, "arg"]);
        assert_eq!(cli.file.as_deref(), Some(Path::new(script)));
        assert_eq!(cli.args, vec!["arg"]);
    }

    #[test]
    fn test_missing_file_is_not_promoted() {
        let cli = parse(&["goscript", "-x", "/nonexistent/hello.go"]);
        assert!(cli.file.is_none());
        assert!(!cli.has_input());
    }

    #[test]
    fn test_empty_code_leaves_room_for_a_script() {
        let dir = tempdir().unwrap();
        let script = dir.path().join("hello.go");
        fs::write(&script, "package main\n").unwrap();
        let script = script.to_str().unwrap();

        assert!(!parse(&["goscript", "-c", ""]).has_input());
        let cli = parse(&["goscript", "-x", "-c", "", script]);
        assert_eq!(cli.file.as_deref(), Some(Path::new(script)));
    }

    #[test]
    fn test_long_names() {
        let cli = parse(&[
            "goscript",
            "--export-bin",
            "tool",
            "--gotidy",
            "--setup",
            "help",
            "--pipe",
        ]);
        assert_eq!(cli.export_bin.as_deref(), Some("tool"));
        assert!(cli.gotidy);
        assert!(cli.pipe);
        assert_eq!(cli.setup.as_deref(), Some("help"));
    }
}
