//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the scaffold pipeline needs from the outside
//! world. The `svcgen-adapters` crate provides implementations; unit tests
//! use the `mockall` mocks generated here.

use std::path::{Path, PathBuf};

use crate::domain::{ProjectDescriptor, ProjectStructure, RenderContext, Template, TemplateSetId};
use crate::error::ScaffoldResult;

/// Port for the workspace project registry.
///
/// Implemented by:
/// - `svcgen_adapters::registry::WorkspaceRegistry` (`project.json` files)
/// - `svcgen_adapters::registry::InMemoryRegistry` (testing)
///
/// `register` must be atomic with respect to the name: when two callers
/// register the same name, exactly one succeeds and the other sees
/// `DuplicateProject`. An existing record is never overwritten.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectRegistry: Send + Sync {
    fn register(&self, descriptor: &ProjectDescriptor) -> ScaffoldResult<()>;

    /// Fails with `ProjectNotFound` when the name is unknown.
    fn read(&self, name: &str) -> ScaffoldResult<ProjectDescriptor>;

    /// All registered projects, ordered by name.
    fn list(&self) -> ScaffoldResult<Vec<ProjectDescriptor>>;
}

/// Port for writing a template set under a project root.
///
/// Implemented by `svcgen_adapters::materializer::TreeMaterializer`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateMaterializer: Send + Sync {
    /// Render `template_set` into `destination_root` (workspace-relative) and
    /// return the workspace-relative paths of the files written.
    ///
    /// Never writes outside `destination_root`.
    fn render(
        &self,
        template_set: &TemplateSetId,
        destination_root: &Path,
        context: &RenderContext,
    ) -> ScaffoldResult<Vec<PathBuf>>;
}

/// Port for source formatting.
///
/// Implemented by `svcgen_adapters::process::CommandFormatter`.
#[cfg_attr(test, mockall::automock)]
pub trait Formatter: Send + Sync {
    /// Format the given workspace-relative paths in place.
    fn format(&self, paths: &[PathBuf]) -> ScaffoldResult<()>;
}

/// Port for running an external command line.
///
/// Implemented by `svcgen_adapters::process::ProcessRunner`.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Run `command_line` in `cwd`, wait for it, and return its exit code.
    ///
    /// `Err` means the command could not be started at all.
    fn run(&self, command_line: &str, cwd: &Path) -> ScaffoldResult<i32>;
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `svcgen_adapters::filesystem::LocalFilesystem` (production)
/// - `svcgen_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> ScaffoldResult<()>;

    /// Write content to a file.
    fn write_file(&self, path: &Path, content: &str) -> ScaffoldResult<()>;

    fn read_file(&self, path: &Path) -> ScaffoldResult<String>;

    /// Set file permissions.
    fn set_permissions(&self, path: &Path, executable: bool) -> ScaffoldResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for template storage and retrieval.
///
/// Implemented by `svcgen_adapters::template_store::InMemoryStore`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateStore: Send + Sync {
    /// Fails with `TemplateNotFound` when the id is unknown.
    fn get(&self, id: &TemplateSetId) -> ScaffoldResult<Template>;

    /// All template sets, ordered by id.
    fn list(&self) -> ScaffoldResult<Vec<Template>>;

    /// Insert or replace a template set.
    fn insert(&self, template: Template) -> ScaffoldResult<()>;
}

/// Port for template rendering.
///
/// Implemented by `svcgen_adapters::renderer::SimpleRenderer`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render a template into a project structure rooted at `output_root`.
    fn render(
        &self,
        template: &Template,
        context: &RenderContext,
        output_root: &Path,
    ) -> ScaffoldResult<ProjectStructure>;
}
