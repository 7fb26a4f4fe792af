//! Variant resolution: each variant maps to a target graph template and a
//! template set.
//!
//! Dispatch is a static table, [`VARIANT_REGISTRY`], with one entry per
//! [`Variant`]. Adding a variant means adding the enum case and a row here.
//!
//! Graph templates use `{{PROJECT_NAME}}` and `{{PROJECT_ROOT}}`, which the
//! configuration builder fills in. `{projectRoot}` is a build-tool token and
//! passes through unchanged.

use serde_json::json;
use tracing::instrument;

use crate::domain::{
    entities::target_graph::{TargetGraph, TargetSpec},
    error::DomainError,
    value_objects::{ProjectKind, TemplateSetId, Variant},
};

const GO_MAIN: &str = "{projectRoot}/cmd/server/main.go";
const RUN_COMMANDS: &str = "nx:run-commands";
const FLY_CONFIG: &str = "{{PROJECT_ROOT}}/fly.toml";

// ── Registry ──────────────────────────────────────────────────────────────────

/// Which targets a variant's graph contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphShape {
    /// No targets at all.
    Empty,
    /// build, serve, test, lint, tidy, docker-build, deploy.
    Base,
    /// The base graph plus a code-generation target.
    BaseWithGenerate,
}

/// One row of the variant table.
#[derive(Debug, Clone, Copy)]
pub struct VariantDef {
    pub variant: Variant,
    pub kind: ProjectKind,
    pub template_set: &'static str,
    pub shape: GraphShape,
    pub description: &'static str,
}

pub static VARIANT_REGISTRY: &[VariantDef] = &[
    VariantDef {
        variant: Variant::Api,
        kind: ProjectKind::Application,
        template_set: "api-worker",
        shape: GraphShape::Base,
        description: "HTTP API service",
    },
    VariantDef {
        variant: Variant::Graphql,
        kind: ProjectKind::Application,
        template_set: "graphql",
        shape: GraphShape::BaseWithGenerate,
        description: "GraphQL service with gqlgen code generation",
    },
    VariantDef {
        variant: Variant::Worker,
        kind: ProjectKind::Application,
        template_set: "api-worker",
        shape: GraphShape::Base,
        description: "Background worker service",
    },
    VariantDef {
        variant: Variant::App,
        kind: ProjectKind::Application,
        template_set: "api-worker",
        shape: GraphShape::Base,
        description: "Generic application (api-worker layout)",
    },
    VariantDef {
        variant: Variant::Library,
        kind: ProjectKind::Library,
        template_set: "library",
        shape: GraphShape::Empty,
        description: "Shared Go library",
    },
];

/// Look up the table row for a variant.
pub fn definition(variant: Variant) -> Option<&'static VariantDef> {
    VARIANT_REGISTRY.iter().find(|d| d.variant == variant)
}

// ── DeployPolicy ──────────────────────────────────────────────────────────────

/// Regions the deploy target scales across: one primary kept at one machine,
/// every standby scaled to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPolicy {
    primary_region: String,
    standby_regions: Vec<String>,
}

impl DeployPolicy {
    pub const DEFAULT_PRIMARY: &'static str = "iad";
    pub const DEFAULT_STANDBYS: [&'static str; 3] = ["ewr", "lax", "ord"];

    pub fn new(
        primary_region: impl Into<String>,
        standby_regions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, DomainError> {
        let policy = Self {
            primary_region: primary_region.into(),
            standby_regions: standby_regions.into_iter().map(Into::into).collect(),
        };
        policy.validate()?;
        Ok(policy)
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.primary_region.trim().is_empty() {
            return Err(DomainError::InvalidDeployPolicy(
                "primary region cannot be empty".into(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for region in &self.standby_regions {
            if region.trim().is_empty() {
                return Err(DomainError::InvalidDeployPolicy(
                    "standby region names cannot be empty".into(),
                ));
            }
            if *region == self.primary_region {
                return Err(DomainError::InvalidDeployPolicy(format!(
                    "primary region '{region}' is also listed as a standby"
                )));
            }
            if !seen.insert(region.as_str()) {
                return Err(DomainError::InvalidDeployPolicy(format!(
                    "standby region '{region}' is listed twice"
                )));
            }
        }
        Ok(())
    }

    pub fn primary_region(&self) -> &str {
        &self.primary_region
    }

    pub fn standby_regions(&self) -> &[String] {
        &self.standby_regions
    }

    /// Total known regions, primary included.
    pub fn region_count(&self) -> usize {
        1 + self.standby_regions.len()
    }

    fn deploy_commands(&self) -> Vec<String> {
        let mut commands = Vec::with_capacity(1 + self.region_count());
        commands.push(format!("flyctl deploy -c {FLY_CONFIG} -y"));
        commands.push(format!(
            "flyctl scale count 1 -r {} -c {FLY_CONFIG} -y",
            self.primary_region
        ));
        for region in &self.standby_regions {
            commands.push(format!("flyctl scale count 0 -r {region} -c {FLY_CONFIG} -y"));
        }
        commands
    }
}

impl Default for DeployPolicy {
    fn default() -> Self {
        Self {
            primary_region: Self::DEFAULT_PRIMARY.to_string(),
            standby_regions: Self::DEFAULT_STANDBYS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// The outcome of resolving a variant. The graph is still a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariant {
    pub variant: Variant,
    pub kind: ProjectKind,
    pub template_set: TemplateSetId,
    pub graph: TargetGraph,
}

/// Pure map from [`Variant`] to its graph template and template set.
///
/// Total over the enum. The only input besides the variant is the deploy
/// policy, so the same resolver always yields the same result.
#[derive(Debug, Clone, Default)]
pub struct VariantResolver {
    deploy: DeployPolicy,
}

impl VariantResolver {
    pub fn new(deploy: DeployPolicy) -> Self {
        Self { deploy }
    }

    pub fn deploy_policy(&self) -> &DeployPolicy {
        &self.deploy
    }

    #[instrument(skip(self), level = "debug")]
    pub fn resolve(&self, variant: Variant) -> Result<ResolvedVariant, DomainError> {
        let def = definition(variant).ok_or_else(|| DomainError::UnsupportedVariant {
            variant: variant.to_string(),
        })?;

        let graph = match def.shape {
            GraphShape::Empty => TargetGraph::new(),
            GraphShape::Base => self.base_graph(),
            GraphShape::BaseWithGenerate => self.base_graph().with_target(
                "generate",
                TargetSpec::new(RUN_COMMANDS)
                    .option("cwd", "{projectRoot}")
                    .option("parallel", false)
                    .option("commands", json!(["go generate ./...", "pnpm graphql:gen:dev"])),
            ),
        };

        tracing::debug!(
            template_set = def.template_set,
            targets = graph.len(),
            "variant resolved"
        );

        Ok(ResolvedVariant {
            variant,
            kind: def.kind,
            template_set: TemplateSetId::new(def.template_set),
            graph,
        })
    }

    /// Parse a variant tag and resolve it.
    pub fn resolve_tag(&self, tag: &str) -> Result<ResolvedVariant, DomainError> {
        self.resolve(tag.parse()?)
    }

    fn base_graph(&self) -> TargetGraph {
        TargetGraph::new()
            .with_target(
                "build",
                TargetSpec::new("@nx-go/nx-go:build").option("main", GO_MAIN),
            )
            .with_target(
                "serve",
                TargetSpec::new("@nx-go/nx-go:serve").option("main", GO_MAIN),
            )
            .with_target("test", TargetSpec::new("@nx-go/nx-go:test").option("race", true))
            .with_target("lint", TargetSpec::new("@nx-go/nx-go:lint"))
            .with_target("tidy", TargetSpec::new("@nx-go/nx-go:tidy"))
            .with_target(
                "docker-build",
                TargetSpec::new(RUN_COMMANDS)
                    .option(
                        "command",
                        "docker build -f {{PROJECT_ROOT}}/Dockerfile . -t {{PROJECT_NAME}}:latest",
                    )
                    .depends_on("build"),
            )
            .with_target(
                "deploy",
                TargetSpec::new(RUN_COMMANDS)
                    .option("parallel", false)
                    .option("commands", self.deploy.deploy_commands()),
            )
    }
}
