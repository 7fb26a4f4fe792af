//! `svcgen show`: print a registered project's descriptor.

use svcgen_adapters::WorkspaceRegistry;
use svcgen_core::application::ports::ProjectRegistry;

use crate::{
    cli::{ShowArgs, global::GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    args: ShowArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let registry = WorkspaceRegistry::new(config.workspace_root(global.workspace.as_deref()));
    let descriptor = registry.read(&args.name)?;
    output.json(&descriptor)?;
    Ok(())
}
