//! Project descriptor synthesis.

use tracing::instrument;

use crate::domain::{
    entities::{
        descriptor::ProjectDescriptor,
        render_context::RenderContext,
        request::{ServiceName, ServiceRequest},
    },
    error::DomainError,
    value_objects::ProjectKind,
    variants::ResolvedVariant,
};

/// Where applications live in the workspace.
pub const APPLICATIONS_DIR: &str = "apps/services";
/// Where libraries live in the workspace.
pub const LIBRARIES_DIR: &str = "libs";

/// Builds a [`ProjectDescriptor`] from a request and its resolved variant.
///
/// Side-effect free: same inputs, same descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationBuilder;

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all, fields(service = %request.name, variant = %resolved.variant))]
    pub fn build(
        &self,
        request: &ServiceRequest,
        resolved: &ResolvedVariant,
    ) -> Result<ProjectDescriptor, DomainError> {
        // The name becomes a path segment below.
        let name = ServiceName::parse(request.name.as_str())?;
        let (root, source_root) = Self::roots(&name, resolved.kind);

        let ctx = RenderContext::new(name.as_str()).with_variable("PROJECT_ROOT", root.as_str());
        let targets = resolved.graph.instantiate(&ctx);
        targets.validate()?;

        tracing::debug!(%root, targets = targets.len(), "descriptor built");

        Ok(ProjectDescriptor {
            name,
            root,
            kind: resolved.kind,
            source_root,
            targets,
        })
    }

    /// `(root, sourceRoot)` for a project of the given kind.
    pub fn roots(name: &ServiceName, kind: ProjectKind) -> (String, String) {
        match kind {
            ProjectKind::Application => {
                let root = format!("{APPLICATIONS_DIR}/{name}");
                (root.clone(), root)
            }
            ProjectKind::Library => {
                let root = format!("{LIBRARIES_DIR}/{name}");
                let source_root = format!("{root}/src");
                (root, source_root)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        value_objects::Variant,
        variants::{DeployPolicy, VariantResolver},
    };

    fn build(name: &str, variant: Variant) -> ProjectDescriptor {
        let request = ServiceRequest::new(name, variant).unwrap();
        let resolved = VariantResolver::default().resolve(variant).unwrap();
        ConfigurationBuilder::new().build(&request, &resolved).unwrap()
    }

    #[test]
    fn api_paths() {
        let d = build("billing", Variant::Api);
        assert_eq!(d.root, "apps/services/billing");
        assert_eq!(d.source_root, "apps/services/billing");
        assert_eq!(d.kind, ProjectKind::Application);
    }

    #[test]
    fn library_paths_and_empty_graph() {
        let d = build("shared", Variant::Library);
        assert_eq!(d.root, "libs/shared");
        assert_eq!(d.source_root, "libs/shared/src");
        assert_eq!(d.kind, ProjectKind::Library);
        assert!(d.targets.is_empty());
    }

    #[test]
    fn placeholders_are_instantiated() {
        let d = build("billing", Variant::Api);
        let docker = d.targets.get("docker-build").unwrap();
        assert_eq!(
            docker.options["command"],
            "docker build -f apps/services/billing/Dockerfile . -t billing:latest"
        );
        assert_eq!(docker.depends_on, vec!["build".to_string()]);
        let deploy = d.targets.get("deploy").unwrap().commands();
        assert_eq!(
            deploy,
            vec![
                "flyctl deploy -c apps/services/billing/fly.toml -y",
                "flyctl scale count 1 -r iad -c apps/services/billing/fly.toml -y",
                "flyctl scale count 0 -r ewr -c apps/services/billing/fly.toml -y",
                "flyctl scale count 0 -r lax -c apps/services/billing/fly.toml -y",
                "flyctl scale count 0 -r ord -c apps/services/billing/fly.toml -y",
            ]
        );
        assert_eq!(
            d.targets.get("build").unwrap().options["main"],
            "{projectRoot}/cmd/server/main.go"
        );
    }

    #[test]
    fn building_twice_is_byte_identical() {
        for v in Variant::ALL {
            let a = build("svc", v).to_json_pretty();
            let b = build("svc", v).to_json_pretty();
            assert_eq!(a, b, "{v}");
        }
    }

    #[test]
    fn deploy_policy_flows_into_descriptor() {
        let request = ServiceRequest::new("edge", Variant::Api).unwrap();
        let resolver = VariantResolver::new(DeployPolicy::new("syd", ["nrt", "sin"]).unwrap());
        let d = ConfigurationBuilder::new()
            .build(&request, &resolver.resolve(Variant::Api).unwrap())
            .unwrap();
        let commands = d.targets.get("deploy").unwrap().commands();
        assert_eq!(commands.iter().filter(|c| c.contains("scale count 0")).count(), 2);
    }
}
