//! Scaffold Service - main application orchestrator.
//!
//! Drives one request through the pipeline:
//!
//! ```text
//! Requested → Resolved → Built → Registered → Materialized → Done
//!     │           │         │         │              │
//!     └───────────┴─────────┴─────────┴──────────────┴──→ Failed(stage)
//! ```
//!
//! Steps are strictly sequential and none is retried. The pipeline is not
//! transactional: once `Registered` is reached the registry entry stays,
//! whatever happens afterwards. [`ScaffoldFailure::is_partial`] tells the
//! caller when that is the case, and [`ScaffoldService::resume`] re-enters
//! the pipeline after the register step.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{ProjectRegistry, TemplateMaterializer},
        services::post_generation::{PostGenerationOutcome, PostGenerationRunner},
    },
    domain::{
        ConfigurationBuilder, DomainValidator, ProjectDescriptor, RenderContext, ResolvedVariant,
        ServiceRequest, VariantResolver,
    },
    error::{ErrorCategory, ScaffoldError},
};

// ── Stages and states ─────────────────────────────────────────────────────────

/// A pipeline step. Ordered as the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Resolve,
    Build,
    Register,
    Materialize,
    PostGenerate,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Self::Resolve,
        Self::Build,
        Self::Register,
        Self::Materialize,
        Self::PostGenerate,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Resolve => "resolve",
            Self::Build => "build",
            Self::Register => "register",
            Self::Materialize => "materialize",
            Self::PostGenerate => "post-generate",
        }
    }

    /// Whether a pipeline can be re-entered at this stage.
    pub const fn is_resumable(&self) -> bool {
        matches!(self, Self::Materialize | Self::PostGenerate)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ScaffoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == wanted)
            .ok_or_else(|| {
                ScaffoldError::configuration(format!(
                    "unknown stage '{s}' (expected one of: resolve, build, register, materialize, post-generate)"
                ))
            })
    }
}

/// Where a scaffold run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldState {
    Requested,
    Resolved,
    Built,
    Registered,
    Materialized,
    Done,
    Failed(Stage),
}

impl ScaffoldState {
    /// The stage that moves this state forward, `None` for terminal states.
    pub const fn next_stage(&self) -> Option<Stage> {
        match self {
            Self::Requested => Some(Stage::Resolve),
            Self::Resolved => Some(Stage::Build),
            Self::Built => Some(Stage::Register),
            Self::Registered => Some(Stage::Materialize),
            Self::Materialized => Some(Stage::PostGenerate),
            Self::Done | Self::Failed(_) => None,
        }
    }

    /// State reached after `stage` completes.
    pub const fn after(stage: Stage) -> Self {
        match stage {
            Stage::Resolve => Self::Resolved,
            Stage::Build => Self::Built,
            Stage::Register => Self::Registered,
            Stage::Materialize => Self::Materialized,
            Stage::PostGenerate => Self::Done,
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// A successful scaffold run.
#[derive(Debug, Clone)]
pub struct ScaffoldReport {
    pub run_id: Uuid,
    pub descriptor: ProjectDescriptor,
    /// Workspace-relative paths written by the materializer.
    pub written_files: Vec<PathBuf>,
    pub post_generation: PostGenerationOutcome,
    /// Every state visited, starting with the entry state.
    pub transitions: Vec<ScaffoldState>,
}

/// A scaffold run that stopped at `stage`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("scaffold failed during {stage}: {source}")]
pub struct ScaffoldFailure {
    pub stage: Stage,
    #[source]
    pub source: ScaffoldError,
    pub run_id: Uuid,
    /// Whether a registry entry for the project was known to exist when the
    /// run stopped.
    pub registered: bool,
}

impl ScaffoldFailure {
    fn new(stage: Stage, source: impl Into<ScaffoldError>, run_id: Uuid, registered: bool) -> Self {
        Self {
            stage,
            source: source.into(),
            run_id,
            registered,
        }
    }

    /// True when the project was registered before the failure, so the
    /// workspace now holds an entry whose files may be incomplete.
    ///
    /// A resume that cannot find or accept the registered descriptor fails
    /// at its entry stage but is not partial: nothing is known to exist.
    pub fn is_partial(&self) -> bool {
        self.registered
    }

    pub fn category(&self) -> ErrorCategory {
        self.source.category()
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.source.suggestions()
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// Main scaffolding service.
///
/// The registry is passed in explicitly; there is no ambient workspace.
pub struct ScaffoldService {
    resolver: VariantResolver,
    builder: ConfigurationBuilder,
    registry: Box<dyn ProjectRegistry>,
    materializer: Box<dyn TemplateMaterializer>,
    post_generation: PostGenerationRunner,
}

/// Tracks state transitions for one run.
struct Run {
    id: Uuid,
    state: ScaffoldState,
    transitions: Vec<ScaffoldState>,
    registered: bool,
}

impl Run {
    fn start(entry: ScaffoldState) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: entry,
            transitions: vec![entry],
            registered: false,
        }
    }

    fn complete(&mut self, stage: Stage) {
        let next = ScaffoldState::after(stage);
        debug!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
        self.transitions.push(next);
        if stage == Stage::Register {
            self.registered = true;
        }
    }

    /// A resume found and accepted the registered descriptor.
    fn adopt_registration(&mut self) {
        self.registered = true;
    }

    fn fail(&mut self, stage: Stage, source: impl Into<ScaffoldError>) -> ScaffoldFailure {
        let failure = ScaffoldFailure::new(stage, source, self.id, self.registered);
        self.state = ScaffoldState::Failed(stage);
        self.transitions.push(self.state);
        if failure.is_partial() {
            warn!(%stage, error = %failure.source, "scaffold failed after registration; project entry remains");
        } else {
            warn!(%stage, error = %failure.source, "scaffold failed; nothing was written");
        }
        failure
    }
}

impl ScaffoldService {
    pub fn new(
        resolver: VariantResolver,
        registry: Box<dyn ProjectRegistry>,
        materializer: Box<dyn TemplateMaterializer>,
        post_generation: PostGenerationRunner,
    ) -> Self {
        Self {
            resolver,
            builder: ConfigurationBuilder::new(),
            registry,
            materializer,
            post_generation,
        }
    }

    pub fn registry(&self) -> &dyn ProjectRegistry {
        self.registry.as_ref()
    }

    /// Resolve and build only. Used for `--dry-run`; touches no port.
    pub fn plan(
        &self,
        request: &ServiceRequest,
    ) -> Result<(ResolvedVariant, ProjectDescriptor), ScaffoldFailure> {
        let mut run = Run::start(ScaffoldState::Requested);
        self.resolve_and_build(request, &mut run)
    }

    /// Run the whole pipeline for `request`.
    pub fn scaffold(&self, request: &ServiceRequest) -> Result<ScaffoldReport, ScaffoldFailure> {
        let mut run = Run::start(ScaffoldState::Requested);
        let span = info_span!(
            "scaffold",
            run_id = %run.id,
            service = %request.name,
            variant = %request.variant
        );
        let _guard = span.enter();

        info!("scaffolding {} service '{}'", request.variant, request.name);

        let (resolved, descriptor) = self.resolve_and_build(request, &mut run)?;

        self.registry
            .register(&descriptor)
            .map_err(|e| run.fail(Stage::Register, e))?;
        info!(root = %descriptor.root, "project registered");
        run.complete(Stage::Register);

        self.finish(request, &resolved, descriptor, run)
    }

    /// Re-enter the pipeline at `from` for a project that is already
    /// registered. Only `materialize` and `post-generate` are accepted.
    ///
    /// The registered descriptor is used as-is; nothing is re-registered.
    /// Files that already exist with identical content are left alone by
    /// the materializer, so resuming after a partial write only fills gaps.
    pub fn resume(
        &self,
        request: &ServiceRequest,
        from: Stage,
    ) -> Result<ScaffoldReport, ScaffoldFailure> {
        let entry = match from {
            Stage::Materialize => ScaffoldState::Registered,
            Stage::PostGenerate => ScaffoldState::Materialized,
            other => {
                let mut run = Run::start(ScaffoldState::Requested);
                return Err(run.fail(
                    other,
                    ApplicationError::ResumeNotSupported {
                        stage: other.to_string(),
                    },
                ));
            }
        };

        let mut run = Run::start(entry);
        let span = info_span!(
            "resume",
            run_id = %run.id,
            service = %request.name,
            from = %from
        );
        let _guard = span.enter();

        let resolved = self
            .resolver
            .resolve(request.variant)
            .map_err(|e| run.fail(from, e))?;
        let descriptor = self
            .registry
            .read(request.name.as_str())
            .map_err(|e| run.fail(from, e))?;
        DomainValidator::validate_descriptor(&descriptor).map_err(|e| run.fail(from, e))?;

        if descriptor.kind != resolved.kind {
            return Err(run.fail(
                from,
                crate::domain::DomainError::InvalidRequest(format!(
                    "project '{}' is registered as {} but variant '{}' builds a {}",
                    descriptor.name, descriptor.kind, request.variant, resolved.kind
                )),
            ));
        }

        run.adopt_registration();
        info!(root = %descriptor.root, "resuming registered project");

        if from == Stage::PostGenerate {
            // The files from the earlier run are not known; format the whole root.
            let written = vec![PathBuf::from(&descriptor.root)];
            let post_generation = self
                .post_generation
                .run(&written)
                .map_err(|e| run.fail(Stage::PostGenerate, e))?;
            run.complete(Stage::PostGenerate);
            return Ok(ScaffoldReport {
                run_id: run.id,
                descriptor,
                written_files: Vec::new(),
                post_generation,
                transitions: run.transitions,
            });
        }

        self.finish(request, &resolved, descriptor, run)
    }

    fn resolve_and_build(
        &self,
        request: &ServiceRequest,
        run: &mut Run,
    ) -> Result<(ResolvedVariant, ProjectDescriptor), ScaffoldFailure> {
        let resolved = self
            .resolver
            .resolve(request.variant)
            .map_err(|e| run.fail(Stage::Resolve, e))?;
        debug!(template_set = %resolved.template_set, "resolved");
        run.complete(Stage::Resolve);

        let descriptor = self
            .builder
            .build(request, &resolved)
            .map_err(|e| run.fail(Stage::Build, e))?;
        run.complete(Stage::Build);

        Ok((resolved, descriptor))
    }

    /// Materialize and post-generate.
    fn finish(
        &self,
        request: &ServiceRequest,
        resolved: &ResolvedVariant,
        descriptor: ProjectDescriptor,
        mut run: Run,
    ) -> Result<ScaffoldReport, ScaffoldFailure> {
        let context = RenderContext::for_project(request, &descriptor);
        let root = Path::new(&descriptor.root);

        let written_files = self
            .materializer
            .render(&resolved.template_set, root, &context)
            .map_err(|e| {
                let reason = e.to_string();
                run.fail(
                    Stage::Materialize,
                    ApplicationError::MaterializationFailed {
                        template_set: resolved.template_set.to_string(),
                        root: root.to_path_buf(),
                        reason,
                    },
                )
            })?;
        info!(files = written_files.len(), "template set materialized");
        run.complete(Stage::Materialize);

        let post_generation = self
            .post_generation
            .run(&written_files)
            .map_err(|e| run.fail(Stage::PostGenerate, e))?;
        run.complete(Stage::PostGenerate);

        info!("scaffold completed");
        Ok(ScaffoldReport {
            run_id: run.id,
            descriptor,
            written_files,
            post_generation,
            transitions: run.transitions,
        })
    }
}
