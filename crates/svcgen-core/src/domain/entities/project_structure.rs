use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::domain::{entities::common::Permissions, error::DomainError};

/// A rendered template set, ready to be written.
///
/// Entry paths are relative to `root`; `root` itself is relative to the
/// workspace.
#[derive(Debug, Clone)]
pub struct ProjectStructure {
    pub(crate) root: PathBuf,
    pub(crate) entries: Vec<FsEntry>,
}

impl ProjectStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, content: String, permissions: Permissions) {
        self.entries.push(FsEntry::File(FileToWrite {
            path: path.into(),
            content,
            permissions,
        }));
    }

    pub fn add_directory(&mut self, path: impl Into<PathBuf>, permissions: Permissions) {
        self.entries.push(FsEntry::Directory(DirectoryToCreate {
            path: path.into(),
            permissions,
        }));
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: String, permissions: Permissions) -> Self {
        self.add_file(path, content, permissions);
        self
    }

    /// Substituted variables can smuggle `/` or `..` into a rendered path, so
    /// the rendered tree is checked again before anything is written.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.entries.is_empty() {
            return Err(DomainError::InvalidTemplate(format!(
                "template rendered no entries under {}",
                self.root.display()
            )));
        }

        let mut seen = HashSet::with_capacity(self.entries.len());
        for path in self.entries.iter().map(FsEntry::path) {
            let shown = path.display().to_string();
            if path.has_root() {
                return Err(DomainError::AbsolutePathNotAllowed { path: shown });
            }
            if path.components().any(|c| c == Component::ParentDir) {
                return Err(DomainError::PathEscapesRoot { path: shown });
            }
            if !seen.insert(path) {
                return Err(DomainError::DuplicatePath { path: shown });
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[FsEntry] {
        &self.entries
    }

    pub fn files(&self) -> impl Iterator<Item = &FileToWrite> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::File(f) => Some(f),
            FsEntry::Directory(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum FsEntry {
    File(FileToWrite),
    Directory(DirectoryToCreate),
}

impl FsEntry {
    pub fn path(&self) -> &Path {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileToWrite {
    pub path: PathBuf,
    pub content: String,
    pub permissions: Permissions,
}

#[derive(Debug, Clone)]
pub struct DirectoryToCreate {
    pub path: PathBuf,
    pub permissions: Permissions,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_file(path: &str) -> ProjectStructure {
        ProjectStructure::new("apps/services/x").with_file(path, String::new(), Permissions::regular())
    }

    #[test]
    fn rendered_parent_dir_is_rejected() {
        assert!(matches!(
            one_file("../../escape.go").validate(),
            Err(DomainError::PathEscapesRoot { .. })
        ));
    }

    #[test]
    fn rendered_absolute_path_is_rejected() {
        assert!(matches!(
            one_file("/tmp/escape.go").validate(),
            Err(DomainError::AbsolutePathNotAllowed { .. })
        ));
    }

    #[test]
    fn duplicate_rendered_paths_are_rejected() {
        let s = one_file("main.go").with_file("main.go", "x".into(), Permissions::regular());
        assert!(matches!(s.validate(), Err(DomainError::DuplicatePath { .. })));
    }

    #[test]
    fn empty_structure_is_invalid() {
        assert!(ProjectStructure::new("x").validate().is_err());
    }
}
