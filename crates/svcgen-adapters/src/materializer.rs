//! Writes a rendered template set under a project root.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, instrument};

use svcgen_core::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateMaterializer, TemplateRenderer, TemplateStore},
    },
    domain::{FsEntry, ProjectStructure, RenderContext, TemplateSetId},
    error::ScaffoldResult,
};

/// [`TemplateMaterializer`] built from a template store, a renderer and a
/// filesystem, rooted at the workspace directory.
///
/// Existing files are never overwritten. A file that already holds exactly
/// the rendered content is left alone and still reported, so materializing
/// the same project twice succeeds.
pub struct TreeMaterializer {
    store: Box<dyn TemplateStore>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
    workspace_root: PathBuf,
}

impl TreeMaterializer {
    pub fn new(
        store: Box<dyn TemplateStore>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            renderer,
            filesystem,
            workspace_root: workspace_root.into(),
        }
    }

    /// Fail with `FileExists` before anything is written if any target file
    /// exists with different content.
    fn check_conflicts(&self, structure: &ProjectStructure) -> ScaffoldResult<()> {
        for file in structure.files() {
            let relative = structure.root().join(&file.path);
            let absolute = self.workspace_root.join(&relative);
            if self.filesystem.exists(&absolute)
                && self.filesystem.read_file(&absolute)? != file.content
            {
                return Err(ApplicationError::FileExists { path: relative }.into());
            }
        }
        Ok(())
    }
}

impl TemplateMaterializer for TreeMaterializer {
    #[instrument(skip_all, fields(template_set = %template_set, root = %destination_root.display()))]
    fn render(
        &self,
        template_set: &TemplateSetId,
        destination_root: &Path,
        context: &RenderContext,
    ) -> ScaffoldResult<Vec<PathBuf>> {
        check_destination(destination_root)?;

        let template = self.store.get(template_set)?;
        let structure = self.renderer.render(&template, context, destination_root)?;
        self.check_conflicts(&structure)?;

        let mut written = Vec::new();
        for entry in structure.entries() {
            let relative = structure.root().join(entry.path());
            let absolute = self.workspace_root.join(&relative);

            match entry {
                FsEntry::Directory(_) => self.filesystem.create_dir_all(&absolute)?,
                FsEntry::File(file) => {
                    if self.filesystem.exists(&absolute) {
                        debug!(path = %relative.display(), "file already up to date");
                    } else {
                        if let Some(parent) = absolute.parent() {
                            self.filesystem.create_dir_all(parent)?;
                        }
                        self.filesystem.write_file(&absolute, &file.content)?;
                        if file.permissions.is_executable() {
                            self.filesystem.set_permissions(&absolute, true)?;
                        }
                        debug!(path = %relative.display(), "wrote file");
                    }
                    written.push(relative);
                }
            }
        }

        info!(files = written.len(), "template set materialized");
        Ok(written)
    }
}

/// The destination must be a non-empty workspace-relative path.
fn check_destination(root: &Path) -> ScaffoldResult<()> {
    let bad = root.as_os_str().is_empty()
        || root.is_absolute()
        || root.has_root()
        || root.components().any(|c| matches!(c, Component::ParentDir));
    if bad {
        return Err(ApplicationError::FilesystemError {
            path: root.to_path_buf(),
            reason: "destination must be a relative path inside the workspace".into(),
        }
        .into());
    }
    Ok(())
}
