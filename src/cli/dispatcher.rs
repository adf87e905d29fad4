use anyhow::Result;

use crate::{
    cli::{Cli, handlers},
    core::{diagnostics::Diagnostics, paths::ProjectContext},
    system::toolchain::Toolchain,
};

/// An action that works on the resolved project.
struct ActionDefinition {
    name: &'static str,
    selected: fn(&Cli) -> bool,
    handler: fn(&Cli, &ProjectContext<'_>, &mut Diagnostics) -> Result<i32>,
}

/// Project actions in precedence order: the first selected one runs, the rest of the
/// flags are ignored. Building (`run`) is the fallback.
static ACTION_REGISTRY: &[ActionDefinition] = &[
    ActionDefinition {
        name: "dir",
        selected: |cli| cli.dir,
        handler: handlers::info::handle_dir,
    },
    ActionDefinition {
        name: "path",
        selected: |cli| cli.path.is_some(),
        handler: handlers::info::handle_path,
    },
    ActionDefinition {
        name: "list",
        selected: |cli| cli.list,
        handler: handlers::list::handle,
    },
    ActionDefinition {
        name: "goget",
        selected: |cli| cli.goget.is_some(),
        handler: handlers::modules::handle_get,
    },
    ActionDefinition {
        name: "gotidy",
        selected: |cli| cli.gotidy,
        handler: handlers::modules::handle_tidy,
    },
    ActionDefinition {
        name: "recompile",
        selected: |cli| cli.recompile,
        handler: handlers::recompile::handle,
    },
    ActionDefinition {
        name: "template",
        selected: |cli| cli.template,
        handler: handlers::template::handle,
    },
    ActionDefinition {
        name: "edit",
        selected: |cli| cli.edit.is_some(),
        handler: handlers::edit::handle,
    },
    ActionDefinition {
        name: "cat",
        selected: |cli| cli.cat.is_some(),
        handler: handlers::cat::handle,
    },
    ActionDefinition {
        name: "export",
        selected: |cli| cli.export.is_some(),
        handler: handlers::export::handle_source,
    },
    ActionDefinition {
        name: "export-bin",
        selected: |cli| cli.export_bin.is_some(),
        handler: handlers::export::handle_binary,
    },
    ActionDefinition {
        name: "delete",
        selected: |cli| cli.delete.is_some(),
        handler: handlers::delete::handle,
    },
    ActionDefinition {
        name: "restore",
        selected: |cli| cli.restore.is_some(),
        handler: handlers::restore::handle,
    },
];

/// Finds the project action the flags ask for.
fn find_action(cli: &Cli) -> Option<&'static ActionDefinition> {
    ACTION_REGISTRY.iter().find(|action| (action.selected)(cli))
}

/// Routes one invocation and returns the process exit code.
///
/// `--version`, `--setup` and `--bang` need no project and run before it is resolved.
pub fn dispatch(cli: &Cli, toolchain: &dyn Toolchain, diagnostics: &mut Diagnostics) -> Result<i32> {
    log::debug!("CLI args parsed: {:?}", cli);

    if cli.version {
        return handlers::info::handle_version(cli);
    }
    if cli.setup.is_some() {
        return handlers::setup::handle(cli, toolchain);
    }
    if cli.bang {
        return handlers::info::handle_bang(cli);
    }

    let ctx = ProjectContext::resolve(toolchain)?;
    dispatch_in_project(cli, &ctx, diagnostics)
}

/// Routes an invocation against an already resolved project.
pub fn dispatch_in_project(
    cli: &Cli,
    ctx: &ProjectContext<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<i32> {
    match find_action(cli) {
        Some(action) => {
            log::debug!("Dispatching to '{}'", action.name);
            (action.handler)(cli, ctx, diagnostics)
        }
        None => handlers::run::handle(cli, ctx, diagnostics),
    }
}
