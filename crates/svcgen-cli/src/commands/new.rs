//! Implementation of the `svcgen new` command.
//!
//! Responsibility: turn CLI arguments into a `ServiceRequest`, wire the
//! adapters for the workspace, run the scaffold pipeline and report.  No
//! business logic lives here.

use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use svcgen_adapters::{
    CommandFormatter, InMemoryStore, LocalFilesystem, ProcessRunner, SimpleRenderer,
    TreeMaterializer, WorkspaceRegistry,
};
use svcgen_core::{
    application::{
        PostGenerationRunner, ScaffoldFailure, ScaffoldReport, ScaffoldService, Stage,
        TidyOutcome, TidyPolicy,
    },
    domain::{ProjectDescriptor, ProjectKind, ResolvedVariant, ServiceRequest, VariantResolver},
};

use crate::{
    cli::{NewArgs, OutputFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli as _},
    output::OutputManager,
};

/// Execute the `svcgen new` command.
///
/// 1. Build the request from arguments or a request document
/// 2. Wire adapters rooted at the workspace
/// 3. `--dry-run`: resolve and build only, print the descriptor
/// 4. `--resume-from`: re-enter a partial scaffold
/// 5. Otherwise confirm (unless `--yes`/`--quiet`) and run the pipeline
#[instrument(skip_all, fields(dry_run = args.dry_run))]
pub fn execute(
    args: NewArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let request = build_request(&args)?;
    let workspace_root = config.workspace_root(global.workspace.as_deref());
    let policy = args
        .tidy_policy
        .map(TidyPolicy::from)
        .unwrap_or(config.post_generation.tidy_policy);

    let service = build_service(&config, &workspace_root, policy)?;

    if args.dry_run {
        let (resolved, descriptor) = service.plan(&request)?;
        return show_plan(&resolved, &descriptor, &output);
    }

    let report = match args.resume_from {
        Some(stage) => {
            let stage = Stage::from(stage);
            output.info(&format!("Resuming '{}' from {stage}", request.name))?;
            run_with_spinner(&output, &request, |r| service.resume(r, stage))?
        }
        None => {
            if !output.is_quiet() && !args.yes && std::io::stdin().is_terminal() {
                let (resolved, descriptor) = service.plan(&request)?;
                show_configuration(&resolved, &descriptor, &workspace_root, policy, &output)?;
                if !confirm()? {
                    return Err(CliError::Cancelled);
                }
            }
            run_with_spinner(&output, &request, |r| service.scaffold(r))?
        }
    };

    info!(run_id = %report.run_id, project = %report.descriptor.name, "scaffold completed");
    show_report(&report, &output)
}

// ── Request ───────────────────────────────────────────────────────────────────

fn build_request(args: &NewArgs) -> CliResult<ServiceRequest> {
    let base = match (&args.request, &args.name, args.variant) {
        (Some(path), _, _) => {
            let raw = std::fs::read_to_string(path)
                .with_cli_context(|| format!("failed to read request file '{}'", path.display()))?;
            ServiceRequest::from_json(&raw)?
        }
        (None, Some(name), Some(variant)) => ServiceRequest::new(name.as_str(), variant.into())?,
        _ => {
            return Err(CliError::InvalidInput {
                message: "a NAME and --variant, or --request FILE, are required".into(),
                source: None,
            });
        }
    };

    Ok(args
        .fields
        .iter()
        .fold(base, |request, (key, value)| request.with_field(key, value)))
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn build_service(
    config: &AppConfig,
    workspace_root: &Path,
    policy: TidyPolicy,
) -> CliResult<ScaffoldService> {
    let resolver = VariantResolver::new(config.deploy_policy()?);

    let store = InMemoryStore::with_builtin(config.templates.local_path.as_deref())?;
    let materializer = TreeMaterializer::new(
        Box::new(store),
        Box::new(SimpleRenderer::new()),
        Box::new(LocalFilesystem::new()),
        workspace_root,
    );

    let formatter = CommandFormatter::new(Box::new(ProcessRunner::new()), workspace_root)
        .with_command(config.post_generation.format_command.clone())
        .with_extensions(config.post_generation.format_extensions.iter().cloned());
    let post_generation =
        PostGenerationRunner::new(Box::new(formatter), Box::new(ProcessRunner::new()), workspace_root)
            .with_tidy_command(config.post_generation.tidy_command.clone())
            .with_policy(policy);

    Ok(ScaffoldService::new(
        resolver,
        Box::new(WorkspaceRegistry::new(workspace_root)),
        Box::new(materializer),
        post_generation,
    ))
}

fn run_with_spinner<F>(
    output: &OutputManager,
    request: &ServiceRequest,
    run: F,
) -> CliResult<ScaffoldReport>
where
    F: FnOnce(&ServiceRequest) -> Result<ScaffoldReport, ScaffoldFailure>,
{
    let spinner = output.spinner(format!("Scaffolding {} '{}'...", request.variant, request.name));
    let result = run(request);
    spinner.finish_and_clear();
    Ok(result?)
}

// ── Reporting ─────────────────────────────────────────────────────────────────

/// JSON shape of a finished run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportView<'a> {
    run_id: Uuid,
    project: &'a ProjectDescriptor,
    written_files: Vec<String>,
    formatted: bool,
    tidy: &'static str,
}

impl<'a> From<&'a ScaffoldReport> for ReportView<'a> {
    fn from(report: &'a ScaffoldReport) -> Self {
        Self {
            run_id: report.run_id,
            project: &report.descriptor,
            written_files: report
                .written_files
                .iter()
                .map(|p| display_path(p))
                .collect(),
            formatted: report.post_generation.formatted,
            tidy: tidy_label(&report.post_generation.tidy),
        }
    }
}

fn tidy_label(outcome: &TidyOutcome) -> &'static str {
    match outcome {
        TidyOutcome::Succeeded => "succeeded",
        TidyOutcome::Failed { .. } => "failed",
        TidyOutcome::Skipped => "skipped",
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn show_report(report: &ScaffoldReport, out: &OutputManager) -> CliResult<()> {
    if out.format() == OutputFormat::Json {
        out.json(&ReportView::from(report))?;
        return Ok(());
    }

    let d = &report.descriptor;
    out.success(&format!("Project '{}' registered at {}", d.name, d.root))?;
    out.print(&format!("  Files written: {}", report.written_files.len()))?;
    for path in &report.written_files {
        out.print(&format!("    {}", display_path(path)))?;
    }

    if !report.post_generation.formatted {
        out.warning("Formatting failed; see the log above")?;
    }
    match &report.post_generation.tidy {
        TidyOutcome::Succeeded => {}
        TidyOutcome::Skipped => out.info("Workspace tidy skipped")?,
        TidyOutcome::Failed { reason } => out.warning(&format!("Workspace tidy failed: {reason}"))?,
    }

    out.print("")?;
    out.print("Next steps:")?;
    match d.kind {
        ProjectKind::Application => {
            out.print(&format!("  nx run {}:serve", d.name))?;
            out.print(&format!("  nx run {}:docker-build", d.name))?;
        }
        ProjectKind::Library => {
            out.print(&format!("  edit {}", d.source_root))?;
            out.print(&format!("  nx show project {}", d.name))?;
        }
    }
    Ok(())
}

fn show_plan(
    resolved: &ResolvedVariant,
    descriptor: &ProjectDescriptor,
    out: &OutputManager,
) -> CliResult<()> {
    if out.format() == OutputFormat::Json {
        out.json(descriptor)?;
        return Ok(());
    }

    out.info(&format!(
        "Dry run: would register '{}' at {}",
        descriptor.name, descriptor.root
    ))?;
    out.print(&format!("  Kind:         {}", descriptor.kind))?;
    out.print(&format!("  Template set: {}", resolved.template_set))?;
    out.print(&format!("  Source root:  {}", descriptor.source_root))?;
    let targets: Vec<&str> = descriptor.targets.names().collect();
    out.print(&format!(
        "  Targets:      {}",
        if targets.is_empty() {
            "(none)".to_string()
        } else {
            targets.join(", ")
        }
    ))?;
    Ok(())
}

fn show_configuration(
    resolved: &ResolvedVariant,
    descriptor: &ProjectDescriptor,
    workspace_root: &Path,
    policy: TidyPolicy,
    out: &OutputManager,
) -> CliResult<()> {
    out.header("Configuration")?;
    out.print(&format!("  Project:      {}", descriptor.name))?;
    out.print(&format!("  Variant:      {}", resolved.variant))?;
    out.print(&format!("  Template set: {}", resolved.template_set))?;
    out.print(&format!(
        "  Location:     {}",
        PathBuf::from(workspace_root).join(&descriptor.root).display()
    ))?;
    out.print(&format!("  Tidy policy:  {policy}"))?;
    out.print("")?;
    Ok(())
}

fn confirm() -> CliResult<bool> {
    use std::io::{self, Write};

    print!("Continue? [Y/n] ");
    io::stdout()
        .flush()
        .with_cli_context(|| "failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .with_cli_context(|| "failed to read confirmation input")?;

    let input = input.trim().to_ascii_lowercase();
    Ok(input.is_empty() || input == "y" || input == "yes")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ResumeStage, TidyPolicyArg, VariantArg};
    use svcgen_core::domain::Variant;
    use tempfile::TempDir;

    fn args(name: Option<&str>, variant: Option<VariantArg>) -> NewArgs {
        NewArgs {
            name: name.map(String::from),
            variant,
            fields: Vec::new(),
            request: None,
            yes: true,
            dry_run: false,
            tidy_policy: None,
            resume_from: None,
        }
    }

    #[test]
    fn request_from_arguments_carries_fields() {
        let mut a = args(Some("billing"), Some(VariantArg::Worker));
        a.fields = vec![("OWNER".into(), "payments".into())];
        let request = build_request(&a).unwrap();
        assert_eq!(request.name.as_str(), "billing");
        assert_eq!(request.variant, Variant::Worker);
        assert_eq!(request.fields.get("OWNER").map(String::as_str), Some("payments"));
    }

    #[test]
    fn invalid_name_is_user_error() {
        let err = build_request(&args(Some("a/b"), Some(VariantArg::Api))).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn request_document_is_read_and_fields_merged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"name":"catalog","variant":"graphql","fields":{"OWNER":"a"}}"#,
        )
        .unwrap();

        let mut a = args(None, None);
        a.request = Some(path);
        a.fields = vec![("OWNER".into(), "b".into())];
        let request = build_request(&a).unwrap();
        assert_eq!(request.variant, Variant::Graphql);
        assert_eq!(request.fields.get("OWNER").map(String::as_str), Some("b"));
    }

    #[test]
    fn missing_request_file_is_io_error() {
        let mut a = args(None, None);
        a.request = Some(PathBuf::from("/no/such/request.json"));
        assert!(matches!(build_request(&a), Err(CliError::IoError { .. })));
    }

    #[test]
    fn invalid_deploy_policy_fails_wiring() {
        let mut config = AppConfig::default();
        config.deploy.standby_regions = vec!["iad".into()];
        let err = build_service(&config, Path::new("."), TidyPolicy::Skip)
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn scaffold_library_into_workspace() {
        let ws = TempDir::new().unwrap();
        let service = build_service(&AppConfig::default(), ws.path(), TidyPolicy::Skip).unwrap();
        let request = ServiceRequest::new("shared-utils", Variant::Library).unwrap();

        let report = service.scaffold(&request).unwrap();

        assert_eq!(report.descriptor.root, "libs/shared-utils");
        assert!(ws.path().join("libs/shared-utils/project.json").is_file());
        assert!(ws.path().join("libs/shared-utils/src/shared_utils.go").is_file());
        assert_eq!(report.post_generation.tidy, TidyOutcome::Skipped);

        let view = ReportView::from(&report);
        assert_eq!(view.tidy, "skipped");
        assert!(view.written_files.iter().all(|p| p.starts_with("libs/shared-utils/")));
    }

    #[test]
    fn resume_stage_and_policy_flags_convert() {
        assert_eq!(Stage::from(ResumeStage::Materialize), Stage::Materialize);
        assert_eq!(TidyPolicy::from(TidyPolicyArg::Skip), TidyPolicy::Skip);
    }
}
