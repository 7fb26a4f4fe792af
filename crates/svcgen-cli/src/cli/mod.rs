//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use svcgen_core::{
    application::{Stage, TidyPolicy},
    domain::Variant,
};

pub mod global;
pub use global::{GlobalArgs, LogFormat, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "svcgen",
    bin_name = "svcgen",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Scaffold Go services and libraries into an Nx monorepo",
    long_about = "svcgen registers a new project in the workspace (project.json with \
                  its build, test, docker and deploy targets), writes the starter files \
                  for its variant, then formats them and tidies the workspace.",
    after_help = "EXAMPLES:\n\
        \x20 svcgen new billing --variant api\n\
        \x20 svcgen new catalog --variant graphql --field OWNER=payments\n\
        \x20 svcgen new shared-utils --variant library --dry-run\n\
        \x20 svcgen show billing\n\
        \x20 svcgen completions bash > /usr/share/bash-completion/completions/svcgen",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scaffold a new service or library.
    #[command(
        visible_alias = "n",
        about = "Scaffold a new project",
        after_help = "EXAMPLES:\n\
            \x20 svcgen new billing   --variant api\n\
            \x20 svcgen new ingest    --variant worker --tidy-policy best-effort\n\
            \x20 svcgen new catalog   --variant graphql --field OWNER=payments\n\
            \x20 svcgen new --request request.json --yes\n\
            \x20 svcgen new billing   --variant api --resume-from post-generate"
    )]
    New(NewArgs),

    /// List variants, or the projects registered in the workspace.
    #[command(
        visible_alias = "ls",
        about = "List variants or registered projects",
        after_help = "EXAMPLES:\n\
            \x20 svcgen list\n\
            \x20 svcgen list --format json\n\
            \x20 svcgen list --projects"
    )]
    List(ListArgs),

    /// Print the descriptor of a registered project.
    #[command(
        about = "Show a registered project",
        after_help = "EXAMPLES:\n\
            \x20 svcgen show billing"
    )]
    Show(ShowArgs),

    /// Write a default configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 svcgen init           # ./.svcgen.toml\n\
            \x20 svcgen init --global  # user config directory\n\
            \x20 svcgen init --force   # overwrite an existing file"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 svcgen completions bash > ~/.local/share/bash-completion/completions/svcgen\n\
            \x20 svcgen completions zsh  > ~/.zfunc/_svcgen\n\
            \x20 svcgen completions fish > ~/.config/fish/completions/svcgen.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the effective configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 svcgen config get deploy.primary_region\n\
            \x20 svcgen config list\n\
            \x20 svcgen config path"
    )]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `svcgen new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Project name: a single path segment, used as the directory name.
    #[arg(
        value_name = "NAME",
        required_unless_present = "request",
        help = "Project name"
    )]
    pub name: Option<String>,

    #[arg(
        short = 't',
        long = "variant",
        value_name = "VARIANT",
        value_enum,
        required_unless_present = "request",
        help = "Project variant"
    )]
    pub variant: Option<VariantArg>,

    /// Extra template variable, repeatable.
    #[arg(
        short = 'f',
        long = "field",
        value_name = "KEY=VALUE",
        value_parser = parse_field,
        help = "Template variable (repeatable)"
    )]
    pub fields: Vec<(String, String)>,

    /// Read the request from a JSON document instead of the arguments.
    #[arg(
        long = "request",
        value_name = "FILE",
        conflicts_with_all = ["name", "variant"],
        help = "JSON request document"
    )]
    pub request: Option<PathBuf>,

    /// Skip the confirmation prompt.
    #[arg(
        short = 'y',
        long = "yes",
        help = "Skip confirmation and create immediately"
    )]
    pub yes: bool,

    /// Preview the descriptor without registering or writing anything.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,

    /// How to treat the workspace tidy step; overrides the configuration.
    #[arg(
        long = "tidy-policy",
        value_name = "POLICY",
        value_enum,
        help = "Tidy policy (required, best-effort, skip)"
    )]
    pub tidy_policy: Option<TidyPolicyArg>,

    /// Re-enter the pipeline for an already registered project.
    #[arg(
        long = "resume-from",
        value_name = "STAGE",
        value_enum,
        conflicts_with = "dry_run",
        help = "Resume a partial scaffold at this stage"
    )]
    pub resume_from: Option<ResumeStage>,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

// ── list / show ───────────────────────────────────────────────────────────────

/// Arguments for `svcgen list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// List registered projects instead of variants.
    #[arg(long = "projects", help = "List projects registered in the workspace")]
    pub projects: bool,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

/// Arguments for `svcgen show`.
#[derive(Debug, Args)]
pub struct ShowArgs {
    #[arg(value_name = "NAME", help = "Registered project name")]
    pub name: String,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `svcgen init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to the user config directory.
    #[arg(
        long = "global",
        conflicts_with = "local",
        help = "Create global configuration"
    )]
    pub global: bool,

    /// Write `.svcgen.toml` in the current directory (the default).
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `svcgen completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `svcgen config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `post_generation.tidy_policy`.
        key: String,
    },
    /// Print the effective configuration as TOML.
    List,
    /// Print the path of the configuration file in use.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Project variants accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum VariantArg {
    Api,
    Graphql,
    Worker,
    App,
    #[value(alias = "lib")]
    Library,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Api => Variant::Api,
            VariantArg::Graphql => Variant::Graphql,
            VariantArg::Worker => Variant::Worker,
            VariantArg::App => Variant::App,
            VariantArg::Library => Variant::Library,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TidyPolicyArg {
    /// Run tidy and fail the scaffold if it fails.
    Required,
    /// Run tidy; log failures and carry on.
    BestEffort,
    /// Do not run tidy.
    Skip,
}

impl From<TidyPolicyArg> for TidyPolicy {
    fn from(arg: TidyPolicyArg) -> Self {
        match arg {
            TidyPolicyArg::Required => TidyPolicy::Required,
            TidyPolicyArg::BestEffort => TidyPolicy::BestEffort,
            TidyPolicyArg::Skip => TidyPolicy::Skip,
        }
    }
}

/// Stages a partial scaffold can be resumed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResumeStage {
    Materialize,
    PostGenerate,
}

impl From<ResumeStage> for Stage {
    fn from(arg: ResumeStage) -> Self {
        match arg {
            ResumeStage::Materialize => Stage::Materialize,
            ResumeStage::PostGenerate => Stage::PostGenerate,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_new_command() {
        let cli = Cli::parse_from([
            "svcgen",
            "new",
            "billing",
            "--variant",
            "api",
            "--field",
            "OWNER=payments",
            "-f",
            "EMPTY=",
        ]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.name.as_deref(), Some("billing"));
        assert_eq!(args.variant, Some(VariantArg::Api));
        assert_eq!(
            args.fields,
            vec![
                ("OWNER".to_string(), "payments".to_string()),
                ("EMPTY".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn variant_maps_to_core() {
        for (arg, variant) in [
            (VariantArg::Api, Variant::Api),
            (VariantArg::Graphql, Variant::Graphql),
            (VariantArg::Worker, Variant::Worker),
            (VariantArg::App, Variant::App),
            (VariantArg::Library, Variant::Library),
        ] {
            assert_eq!(Variant::from(arg), variant);
        }
    }

    #[test]
    fn library_alias() {
        let cli = Cli::parse_from(["svcgen", "new", "shared", "-t", "lib"]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.variant, Some(VariantArg::Library));
    }

    #[test]
    fn new_requires_variant_without_request() {
        assert!(Cli::try_parse_from(["svcgen", "new", "billing"]).is_err());
        assert!(Cli::try_parse_from(["svcgen", "new", "--request", "req.json"]).is_ok());
    }

    #[test]
    fn request_conflicts_with_name() {
        let result = Cli::try_parse_from([
            "svcgen", "new", "billing", "--variant", "api", "--request", "req.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn field_without_equals_is_rejected() {
        let result =
            Cli::try_parse_from(["svcgen", "new", "billing", "--variant", "api", "--field", "OWNER"]);
        assert!(result.is_err());
        assert!(parse_field("=x").is_err());
    }

    #[test]
    fn tidy_policy_and_resume_values() {
        let cli = Cli::parse_from([
            "svcgen",
            "new",
            "billing",
            "--variant",
            "api",
            "--tidy-policy",
            "best-effort",
            "--resume-from",
            "post-generate",
        ]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(
            args.tidy_policy.map(TidyPolicy::from),
            Some(TidyPolicy::BestEffort)
        );
        assert_eq!(args.resume_from.map(Stage::from), Some(Stage::PostGenerate));
    }

    #[test]
    fn resume_from_register_is_rejected() {
        let result = Cli::try_parse_from([
            "svcgen",
            "new",
            "billing",
            "--variant",
            "api",
            "--resume-from",
            "register",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["svcgen", "--quiet", "--verbose", "list"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["svcgen", "show", "billing", "-w", "/tmp/ws", "--log-format", "json"]);
        assert_eq!(cli.global.workspace, Some(PathBuf::from("/tmp/ws")));
        assert_eq!(cli.global.log_format, LogFormat::Json);
    }
}
