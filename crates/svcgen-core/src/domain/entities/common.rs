use std::fmt;
use std::path::{Component, Path, PathBuf};

use super::DomainError;

/// A template path that can only ever land inside the project root.
///
/// Never absolute, never contains `..`; checked in [`RelativePath::try_new`]
/// and again on every [`join`](RelativePath::join).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    pub fn try_new(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let shown = || path.display().to_string();
        if path.is_absolute() || path.has_root() {
            return Err(DomainError::AbsolutePathNotAllowed { path: shown() });
        }
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(DomainError::PathEscapesRoot { path: shown() });
        }
        Ok(Self(path))
    }

    pub fn join(&self, segment: impl AsRef<Path>) -> Result<Self, DomainError> {
        Self::try_new(self.0.join(segment))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// `/`-separated form, used for rendering and manifest lookups.
    pub fn as_str(&self) -> &str {
        self.0.to_str().unwrap_or_default()
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Mode bits a materialized file should carry. Only the executable bit is
/// modelled; everything else follows the process umask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    executable: bool,
}

impl Permissions {
    pub const fn regular() -> Self {
        Self { executable: false }
    }

    pub const fn executable() -> Self {
        Self { executable: true }
    }

    pub const fn is_executable(&self) -> bool {
        self.executable
    }
}
