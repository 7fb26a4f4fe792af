//! Integration tests for svcgen-core.
//!
//! The pipeline is driven through its public API with small in-process fakes
//! behind the ports, one isolated registry per test.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use svcgen_core::application::{ScaffoldState, TidyOutcome};
use svcgen_core::prelude::*;

// ── Fakes ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct SharedRegistry(Arc<RwLock<BTreeMap<String, ProjectDescriptor>>>);

impl ProjectRegistry for SharedRegistry {
    fn register(&self, descriptor: &ProjectDescriptor) -> ScaffoldResult<()> {
        let mut map = self.0.write().unwrap();
        let name = descriptor.name.to_string();
        if map.contains_key(&name) {
            return Err(ApplicationError::DuplicateProject { name }.into());
        }
        map.insert(name, descriptor.clone());
        Ok(())
    }

    fn read(&self, name: &str) -> ScaffoldResult<ProjectDescriptor> {
        self.0
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| ApplicationError::ProjectNotFound { name: name.into() }.into())
    }

    fn list(&self) -> ScaffoldResult<Vec<ProjectDescriptor>> {
        Ok(self.0.read().unwrap().values().cloned().collect())
    }
}

/// Writes one file per call unless told to fail.
#[derive(Clone, Default)]
struct RecordingMaterializer {
    calls: Arc<Mutex<Vec<(String, PathBuf, BTreeMap<String, String>)>>>,
    fail: bool,
}

impl TemplateMaterializer for RecordingMaterializer {
    fn render(
        &self,
        template_set: &TemplateSetId,
        destination_root: &Path,
        context: &RenderContext,
    ) -> ScaffoldResult<Vec<PathBuf>> {
        let vars = context
            .variables()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.calls.lock().unwrap().push((
            template_set.to_string(),
            destination_root.to_path_buf(),
            vars,
        ));
        if self.fail {
            return Err(ApplicationError::FilesystemError {
                path: destination_root.join("main.go"),
                reason: "permission denied".into(),
            }
            .into());
        }
        Ok(vec![destination_root.join("main.go")])
    }
}

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

struct LoggingFormatter(Log);

impl Formatter for LoggingFormatter {
    fn format(&self, paths: &[PathBuf]) -> ScaffoldResult<()> {
        for p in paths {
            self.0.0.lock().unwrap().push(format!("format {}", p.display()));
        }
        Ok(())
    }
}

struct LoggingRunner(Log, i32);

impl CommandRunner for LoggingRunner {
    fn run(&self, command_line: &str, cwd: &Path) -> ScaffoldResult<i32> {
        self.0
            .0
            .lock()
            .unwrap()
            .push(format!("run {command_line} in {}", cwd.display()));
        Ok(self.1)
    }
}

struct Harness {
    service: ScaffoldService,
    registry: SharedRegistry,
    materializer: RecordingMaterializer,
    log: Log,
}

fn harness(fail_materialize: bool, tidy_exit: i32, policy: TidyPolicy) -> Harness {
    let registry = SharedRegistry::default();
    let materializer = RecordingMaterializer {
        fail: fail_materialize,
        ..Default::default()
    };
    let log = Log::default();
    let post = PostGenerationRunner::new(
        Box::new(LoggingFormatter(log.clone())),
        Box::new(LoggingRunner(log.clone(), tidy_exit)),
        "/workspace",
    )
    .with_policy(policy);
    let service = ScaffoldService::new(
        VariantResolver::default(),
        Box::new(registry.clone()),
        Box::new(materializer.clone()),
        post,
    );
    Harness {
        service,
        registry,
        materializer,
        log,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn api_scaffold_end_to_end() {
    let h = harness(false, 0, TidyPolicy::Required);
    let request = ServiceRequest::new("billing", Variant::Api)
        .unwrap()
        .with_field("owner", "payments");

    let report = h.service.scaffold(&request).unwrap();

    assert_eq!(report.descriptor.root, "apps/services/billing");
    assert_eq!(h.registry.read("billing").unwrap(), report.descriptor);

    let calls = h.materializer.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (set, root, vars) = &calls[0];
    assert_eq!(set, "api-worker");
    assert_eq!(root, Path::new("apps/services/billing"));
    assert_eq!(vars.get("owner").map(String::as_str), Some("payments"));
    assert_eq!(vars.get("VARIANT").map(String::as_str), Some("api"));
    assert_eq!(vars.get("SOURCE_ROOT").map(String::as_str), Some("apps/services/billing"));

    let log = h.log.0.lock().unwrap();
    assert_eq!(
        *log,
        vec![
            "format apps/services/billing/main.go".to_string(),
            "run pnpm go:tidy in /workspace".to_string(),
        ]
    );
    assert_eq!(report.transitions.last(), Some(&ScaffoldState::Done));
}

#[test]
fn library_scaffold_uses_libs_root() {
    let h = harness(false, 0, TidyPolicy::Required);
    let report = h
        .service
        .scaffold(&ServiceRequest::new("shared", Variant::Library).unwrap())
        .unwrap();
    assert_eq!(report.descriptor.root, "libs/shared");
    assert_eq!(report.descriptor.source_root, "libs/shared/src");
    assert!(report.descriptor.targets.is_empty());
    assert_eq!(h.materializer.calls.lock().unwrap()[0].0, "library");
}

#[test]
fn duplicate_registration_leaves_first_entry_unchanged() {
    let h = harness(false, 0, TidyPolicy::Required);
    let first = h
        .service
        .scaffold(&ServiceRequest::new("svc", Variant::Api).unwrap())
        .unwrap();

    let failure = h
        .service
        .scaffold(&ServiceRequest::new("svc", Variant::Graphql).unwrap())
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Register);
    assert!(matches!(
        failure.source,
        ScaffoldError::Application(ApplicationError::DuplicateProject { .. })
    ));
    assert_eq!(h.registry.read("svc").unwrap(), first.descriptor);
    assert!(h.registry.read("svc").unwrap().targets.get("generate").is_none());
    assert_eq!(h.materializer.calls.lock().unwrap().len(), 1);
}

#[test]
fn failing_materialization_keeps_registry_entry() {
    let h = harness(true, 0, TidyPolicy::Required);
    let failure = h
        .service
        .scaffold(&ServiceRequest::new("svc", Variant::Worker).unwrap())
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Materialize);
    assert!(failure.is_partial());
    assert!(matches!(
        failure.source,
        ScaffoldError::Application(ApplicationError::MaterializationFailed { .. })
    ));
    assert!(h.registry.read("svc").is_ok());
    assert!(h.log.0.lock().unwrap().is_empty(), "post-generation must not run");
}

#[test]
fn invalid_name_has_no_side_effects() {
    let h = harness(false, 0, TidyPolicy::Required);
    let err = ServiceRequest::new("../escape", Variant::Api).unwrap_err();
    assert!(matches!(err, DomainError::InvalidName { .. }));
    assert!(h.registry.list().unwrap().is_empty());
}

#[test]
fn best_effort_tidy_completes_scaffold() {
    let h = harness(false, 3, TidyPolicy::BestEffort);
    let report = h
        .service
        .scaffold(&ServiceRequest::new("svc", Variant::Api).unwrap())
        .unwrap();
    assert!(matches!(report.post_generation.tidy, TidyOutcome::Failed { .. }));
}

#[test]
fn required_tidy_failure_is_partial() {
    let h = harness(false, 3, TidyPolicy::Required);
    let failure = h
        .service
        .scaffold(&ServiceRequest::new("svc", Variant::Api).unwrap())
        .unwrap_err();
    assert_eq!(failure.stage, Stage::PostGenerate);
    assert!(failure.is_partial());
    assert!(h.registry.read("svc").is_ok());
}

#[test]
fn resume_after_failed_materialization() {
    let failing = harness(true, 0, TidyPolicy::Required);
    let request = ServiceRequest::new("svc", Variant::Graphql).unwrap();
    failing.service.scaffold(&request).unwrap_err();

    // Same registry, working materializer.
    let materializer = RecordingMaterializer::default();
    let log = Log::default();
    let service = ScaffoldService::new(
        VariantResolver::default(),
        Box::new(failing.registry.clone()),
        Box::new(materializer.clone()),
        PostGenerationRunner::new(
            Box::new(LoggingFormatter(log.clone())),
            Box::new(LoggingRunner(log.clone(), 0)),
            "/workspace",
        ),
    );

    let report = service.resume(&request, Stage::Materialize).unwrap();
    assert_eq!(report.descriptor, failing.registry.read("svc").unwrap());
    assert_eq!(materializer.calls.lock().unwrap()[0].0, "graphql");
    assert_eq!(failing.registry.list().unwrap().len(), 1);
}

#[test]
fn resume_of_unregistered_project_fails() {
    let h = harness(false, 0, TidyPolicy::Required);
    let failure = h
        .service
        .resume(&ServiceRequest::new("ghost", Variant::Api).unwrap(), Stage::PostGenerate)
        .unwrap_err();
    assert!(matches!(
        failure.source,
        ScaffoldError::Application(ApplicationError::ProjectNotFound { .. })
    ));
}

#[test]
fn legacy_request_document_scaffolds() {
    let h = harness(false, 0, TidyPolicy::Skip);
    let request =
        ServiceRequest::from_json(r#"{"schemaVersion":1,"serviceName":"jobs","serviceType":"worker"}"#)
            .unwrap();
    let report = h.service.scaffold(&request).unwrap();
    assert_eq!(report.descriptor.root, "apps/services/jobs");
    assert_eq!(report.post_generation.tidy, TidyOutcome::Skipped);
}

#[test]
fn plan_is_deterministic_and_side_effect_free() {
    let h = harness(false, 0, TidyPolicy::Required);
    for variant in Variant::ALL {
        let request = ServiceRequest::new("svc", variant).unwrap();
        let (_, a) = h.service.plan(&request).unwrap();
        let (_, b) = h.service.plan(&request).unwrap();
        assert_eq!(a.to_json_pretty(), b.to_json_pretty());
    }
    assert!(h.registry.list().unwrap().is_empty());
    assert!(h.materializer.calls.lock().unwrap().is_empty());
}

#[test]
fn deploy_scales_across_configured_regions() {
    let policy = DeployPolicy::new("cdg", ["ams", "lhr", "fra", "mad"]).unwrap();
    let resolver = VariantResolver::new(policy.clone());
    let descriptor = ConfigurationBuilder::new()
        .build(
            &ServiceRequest::new("edge", Variant::Api).unwrap(),
            &resolver.resolve(Variant::Api).unwrap(),
        )
        .unwrap();
    let commands = descriptor.targets.get("deploy").unwrap().commands();
    let up = commands.iter().filter(|c| c.contains("scale count 1")).count();
    let down = commands.iter().filter(|c| c.contains("scale count 0")).count();
    assert_eq!(up, 1);
    assert_eq!(down, policy.region_count() - 1);
}
