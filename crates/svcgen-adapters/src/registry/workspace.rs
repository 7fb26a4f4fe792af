use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::PathBuf,
};

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use walkdir::{DirEntry, WalkDir};

use svcgen_core::{
    application::{ApplicationError, ports::ProjectRegistry},
    domain::{ProjectDescriptor, RelativePath},
    error::{ScaffoldError, ScaffoldResult},
};

use crate::filesystem::map_io_error;

/// Descriptor file name inside each project root.
pub const PROJECT_FILE: &str = "project.json";

/// Directories never searched for project files.
const SKIPPED_DIRS: [&str; 4] = ["node_modules", ".git", "dist", "target"];

/// Registry backed by `<workspace>/<project root>/project.json` files.
///
/// The descriptor file is created with create-new semantics: when two
/// invocations race on one name, the loser sees `DuplicateProject` and the
/// winner's file is left untouched.
#[derive(Debug, Clone)]
pub struct WorkspaceRegistry {
    workspace_root: PathBuf,
}

impl WorkspaceRegistry {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }

    /// Every `project.json` under the workspace with its raw contents, in
    /// walk order.
    fn project_files(&self) -> ScaffoldResult<Vec<(PathBuf, String)>> {
        if !self.workspace_root.is_dir() {
            return Err(ApplicationError::RegistryError {
                reason: format!(
                    "workspace root '{}' is not a directory",
                    self.workspace_root.display()
                ),
            }
            .into());
        }

        let mut found = Vec::new();
        let walker = WalkDir::new(&self.workspace_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable workspace entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || entry.file_name() != PROJECT_FILE {
                continue;
            }

            let path = entry.into_path();
            let raw = fs::read_to_string(&path).map_err(|e| map_io_error(&path, e, "read file"))?;
            found.push((path, raw));
        }

        Ok(found)
    }

    /// Whether any project file, whatever else it contains, claims `name`.
    fn is_claimed(&self, name: &str) -> ScaffoldResult<bool> {
        Ok(self
            .project_files()?
            .iter()
            .any(|(_, raw)| declared_name(raw).as_deref() == Some(name)))
    }
}

/// Just the `name` of a project file. Files written by other tooling rarely
/// match [`ProjectDescriptor`] in full but still reserve their name.
#[derive(Deserialize)]
struct NameOnly {
    name: String,
}

fn declared_name(raw: &str) -> Option<String> {
    serde_json::from_str::<NameOnly>(raw).ok().map(|n| n.name)
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

impl ProjectRegistry for WorkspaceRegistry {
    #[instrument(skip_all, fields(project = %descriptor.name, root = %descriptor.root))]
    fn register(&self, descriptor: &ProjectDescriptor) -> ScaffoldResult<()> {
        let name = descriptor.name.to_string();
        let root = RelativePath::try_new(&descriptor.root).map_err(ScaffoldError::Domain)?;

        if self.is_claimed(&name)? {
            return Err(ApplicationError::DuplicateProject { name }.into());
        }

        let dir = self.workspace_root.join(root.as_path());
        fs::create_dir_all(&dir).map_err(|e| map_io_error(&dir, e, "create directory"))?;

        let path = dir.join(PROJECT_FILE);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ApplicationError::DuplicateProject { name }.into());
            }
            Err(e) => return Err(map_io_error(&path, e, "create file")),
        };
        file.write_all(descriptor.to_json_pretty().as_bytes())
            .map_err(|e| map_io_error(&path, e, "write file"))?;

        info!(path = %path.display(), "project registered");
        Ok(())
    }

    fn read(&self, name: &str) -> ScaffoldResult<ProjectDescriptor> {
        let Some((path, raw)) = self
            .project_files()?
            .into_iter()
            .find(|(_, raw)| declared_name(raw).as_deref() == Some(name))
        else {
            return Err(ApplicationError::ProjectNotFound {
                name: name.to_string(),
            }
            .into());
        };

        serde_json::from_str(&raw).map_err(|e| {
            ApplicationError::RegistryError {
                reason: format!(
                    "'{}' declares project '{name}' but is not a valid descriptor: {e}",
                    path.display()
                ),
            }
            .into()
        })
    }

    fn list(&self) -> ScaffoldResult<Vec<ProjectDescriptor>> {
        let mut projects: Vec<ProjectDescriptor> = self
            .project_files()?
            .into_iter()
            .filter_map(|(path, raw)| match serde_json::from_str(&raw) {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "ignoring unparseable project file");
                    None
                }
            })
            .collect();
        projects.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svcgen_core::domain::{ConfigurationBuilder, ServiceRequest, Variant, VariantResolver};
    use tempfile::TempDir;

    fn descriptor(name: &str, variant: Variant) -> ProjectDescriptor {
        ConfigurationBuilder::new()
            .build(
                &ServiceRequest::new(name, variant).unwrap(),
                &VariantResolver::default().resolve(variant).unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn register_writes_project_json_under_root() {
        let ws = TempDir::new().unwrap();
        let registry = WorkspaceRegistry::new(ws.path());
        let d = descriptor("billing", Variant::Api);

        registry.register(&d).unwrap();

        let raw = fs::read_to_string(ws.path().join("apps/services/billing/project.json")).unwrap();
        assert_eq!(raw, d.to_json_pretty());
        assert_eq!(registry.read("billing").unwrap(), d);
    }

    #[test]
    fn duplicate_name_leaves_existing_file_untouched() {
        let ws = TempDir::new().unwrap();
        let registry = WorkspaceRegistry::new(ws.path());
        let first = descriptor("shared", Variant::Api);
        registry.register(&first).unwrap();

        let err = registry.register(&descriptor("shared", Variant::Library)).unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Application(ApplicationError::DuplicateProject { .. })
        ));
        assert!(!ws.path().join("libs/shared").exists());
        assert_eq!(registry.read("shared").unwrap(), first);
    }

    #[test]
    fn existing_file_at_root_is_duplicate() {
        let ws = TempDir::new().unwrap();
        let dir = ws.path().join("apps/services/taken");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PROJECT_FILE), "not json").unwrap();

        let err = WorkspaceRegistry::new(ws.path())
            .register(&descriptor("taken", Variant::Worker))
            .unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Application(ApplicationError::DuplicateProject { .. })
        ));
        assert_eq!(fs::read_to_string(dir.join(PROJECT_FILE)).unwrap(), "not json");
    }

    /// Descriptor shaped the way other tooling writes it: a command-only
    /// target with no executor.
    const FOREIGN_BILLING: &str = r#"{
  "name": "billing",
  "root": "apps/services/billing",
  "projectType": "application",
  "sourceRoot": "apps/services/billing",
  "targets": {
    "docker-build": {
      "dependsOn": ["build"],
      "command": "docker build -f apps/services/billing/Dockerfile ."
    }
  }
}"#;

    #[test]
    fn name_claimed_by_foreign_project_file_is_duplicate() {
        let ws = TempDir::new().unwrap();
        let dir = ws.path().join("apps/services/billing");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PROJECT_FILE), FOREIGN_BILLING).unwrap();
        let registry = WorkspaceRegistry::new(ws.path());

        let err = registry.register(&descriptor("billing", Variant::Library)).unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Application(ApplicationError::DuplicateProject { .. })
        ));
        assert!(!ws.path().join("libs/billing").exists());

        let existing = registry.read("billing").unwrap();
        assert_eq!(existing.root, "apps/services/billing");
        assert!(existing.targets.get("docker-build").unwrap().executor.is_empty());
    }

    #[test]
    fn named_but_malformed_descriptor_is_registry_error_on_read() {
        let ws = TempDir::new().unwrap();
        let dir = ws.path().join("apps/services/broken");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PROJECT_FILE), r#"{"name":"broken","targets":7}"#).unwrap();
        let registry = WorkspaceRegistry::new(ws.path());

        assert!(matches!(
            registry.read("broken").unwrap_err(),
            ScaffoldError::Application(ApplicationError::RegistryError { .. })
        ));
        assert!(matches!(
            registry.register(&descriptor("broken", Variant::Library)).unwrap_err(),
            ScaffoldError::Application(ApplicationError::DuplicateProject { .. })
        ));
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn list_skips_vendor_dirs_and_sorts() {
        let ws = TempDir::new().unwrap();
        let registry = WorkspaceRegistry::new(ws.path());
        registry.register(&descriptor("zeta", Variant::Api)).unwrap();
        registry.register(&descriptor("alpha", Variant::Library)).unwrap();

        let vendored = ws.path().join("node_modules/pkg");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(
            vendored.join(PROJECT_FILE),
            descriptor("vendored", Variant::Api).to_json_pretty(),
        )
        .unwrap();

        let names: Vec<_> = registry
            .list()
            .unwrap()
            .into_iter()
            .map(|d| d.name.to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn unknown_project_is_not_found() {
        let ws = TempDir::new().unwrap();
        assert!(matches!(
            WorkspaceRegistry::new(ws.path()).read("ghost").unwrap_err(),
            ScaffoldError::Application(ApplicationError::ProjectNotFound { .. })
        ));
    }

    #[test]
    fn missing_workspace_root_is_registry_error() {
        let err = WorkspaceRegistry::new("/no/such/workspace").list().unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Application(ApplicationError::RegistryError { .. })
        ));
    }
}
