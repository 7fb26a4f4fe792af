//! Implementation of the `svcgen list` command.

use serde::Serialize;

use svcgen_adapters::WorkspaceRegistry;
use svcgen_core::{
    application::ports::ProjectRegistry,
    domain::{ProjectDescriptor, VARIANT_REGISTRY, VariantResolver},
};

use crate::{
    cli::{ListArgs, ListFormat, global::GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// One row of `svcgen list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VariantRow {
    variant: String,
    kind: String,
    template_set: String,
    description: &'static str,
    targets: Vec<String>,
}

pub fn execute(
    args: ListArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    if args.projects {
        let registry = WorkspaceRegistry::new(config.workspace_root(global.workspace.as_deref()));
        let projects = registry.list()?;
        return print_projects(&projects, args.format, &output);
    }

    let rows = variant_rows(&VariantResolver::new(config.deploy_policy()?))?;
    print_variants(&rows, args.format, &output)
}

fn variant_rows(resolver: &VariantResolver) -> CliResult<Vec<VariantRow>> {
    VARIANT_REGISTRY
        .iter()
        .map(|def| {
            let resolved = resolver.resolve(def.variant)?;
            Ok(VariantRow {
                variant: def.variant.to_string(),
                kind: def.kind.to_string(),
                template_set: resolved.template_set.to_string(),
                description: def.description,
                targets: resolved.graph.names().map(String::from).collect(),
            })
        })
        .collect()
}

fn print_variants(rows: &[VariantRow], format: ListFormat, output: &OutputManager) -> CliResult<()> {
    match format {
        ListFormat::Table => {
            output.header("Available Variants:")?;
            for row in rows {
                output.print(&format!(
                    "  {:<8} {:<11} {:<10} {}",
                    row.variant, row.kind, row.template_set, row.description
                ))?;
                let targets = if row.targets.is_empty() {
                    "(none)".to_string()
                } else {
                    row.targets.join(", ")
                };
                output.print(&format!("  {:<8} targets: {targets}", ""))?;
            }
        }
        // Machine-readable formats ignore --quiet.
        ListFormat::Json => output.json(&rows)?,
        ListFormat::List => {
            for row in rows {
                println!("{}", row.variant);
            }
        }
        ListFormat::Csv => {
            println!("variant,kind,template_set,targets");
            for row in rows {
                println!(
                    "{},{},{},{}",
                    row.variant,
                    row.kind,
                    row.template_set,
                    row.targets.join(";")
                );
            }
        }
    }
    Ok(())
}

fn print_projects(
    projects: &[ProjectDescriptor],
    format: ListFormat,
    output: &OutputManager,
) -> CliResult<()> {
    match format {
        ListFormat::Table => {
            if projects.is_empty() {
                output.info("No projects registered in this workspace")?;
                return Ok(());
            }
            output.header("Registered Projects:")?;
            for p in projects {
                output.print(&format!(
                    "  {:<24} {:<11} {}",
                    p.name.as_str(),
                    p.kind.as_str(),
                    p.root
                ))?;
            }
        }
        ListFormat::Json => output.json(&projects)?,
        ListFormat::List => {
            for p in projects {
                println!("{}", p.name);
            }
        }
        ListFormat::Csv => {
            println!("name,kind,root,source_root");
            for p in projects {
                println!("{},{},{},{}", p.name, p.kind, p.root, p.source_root);
            }
        }
    }
    Ok(())
}
