//! Filesystem-based template loader.
//!
//! Discovers and parses `template.toml` manifests from a directory tree,
//! converting them into domain [`Template`] objects for the template store.
//!
//! # Directory layout expected
//!
//! ```text
//! templates/
//! ├── api-worker/
//! │   ├── template.toml        ← manifest (required)
//! │   ├── cmd/server/main.go   ← file content
//! │   └── Dockerfile
//! └── library/
//!     ├── template.toml
//!     └── src/{{PROJECT_NAME_SNAKE}}.go
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! id      = "api-worker"          # template set id the variant registry refers to
//! version = "1.0.0"
//!
//! [metadata]                      # optional
//! name        = "Go service"
//! description = "..."
//!
//! # Optional: override per-file content type.
//! # If omitted, files containing {{ }} are auto-detected as parameterized.
//! [[files]]
//! path = "gqlgen.yml"
//! type = "literal"                # literal | parameterized
//!
//! # Directories that must exist even when empty.
//! [[directories]]
//! path = "graph/model"
//! ```

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use svcgen_core::domain::{
    DirectorySpec, DomainError, FileSpec, RelativePath, Template, TemplateBuilder,
    TemplateContent, TemplateMetadata, TemplateNode, TemplateSource, TemplateTree,
};

/// Manifest file name inside each template set directory.
pub const MANIFEST_FILE: &str = "template.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `template.toml` file.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateManifest {
    pub template: TemplateSection,
    pub metadata: Option<MetadataSection>,
    /// Explicit per-file type overrides. Files not listed here are
    /// auto-detected.
    pub files: Option<Vec<FileEntry>>,
    pub directories: Option<Vec<DirectoryEntry>>,
}

/// `[template]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateSection {
    pub id: String,
    pub version: String,
}

/// `[metadata]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct MetadataSection {
    /// Display name shown in `svcgen list`.
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FileEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
}

/// Controls how a file's content is treated during scaffolding.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Copied verbatim.
    Literal,
    /// `{{VARIABLE}}` placeholders are substituted.
    Parameterized,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DirectoryEntry {
    pub path: String,
}

impl TemplateManifest {
    /// Parse manifest text. `origin` names the source in error messages.
    pub fn parse(raw: &str, origin: &str) -> Result<Self, DomainError> {
        toml::from_str(raw)
            .map_err(|e| DomainError::InvalidTemplate(format!("failed to parse '{origin}': {e}")))
    }

    /// Build a [`Template`] from this manifest and the set's files.
    ///
    /// `files` are `(relative path, content)` pairs in the order they should
    /// appear in the tree. Manifest directories come first.
    pub fn assemble<I>(&self, files: I) -> Result<Template, DomainError>
    where
        I: IntoIterator<Item = (String, TemplateSource)>,
    {
        let mut tree = TemplateTree::new();
        let mut added_paths: HashSet<String> = HashSet::new();

        for entry in self.directories.iter().flatten() {
            let path = normalize_path(&entry.path);
            if added_paths.insert(path.clone()) {
                tree.push(TemplateNode::Directory(DirectorySpec::new(
                    RelativePath::try_new(path)?,
                )));
            }
        }

        let overrides: HashMap<String, FileType> = self
            .files
            .iter()
            .flatten()
            .map(|f| (normalize_path(&f.path), f.file_type))
            .collect();

        for (path, source) in files {
            let path = normalize_path(&path);
            if !added_paths.insert(path.clone()) {
                continue;
            }
            let content = match overrides.get(&path) {
                Some(FileType::Literal) => TemplateContent::Literal(source),
                Some(FileType::Parameterized) => TemplateContent::Parameterized(source),
                None => TemplateContent::detect(source),
            };
            tree.push(TemplateNode::File(FileSpec::new(
                RelativePath::try_new(path)?,
                content,
            )));
        }

        let metadata = match &self.metadata {
            Some(m) => TemplateMetadata::new(m.name.clone())
                .description(m.description.clone().unwrap_or_default()),
            None => TemplateMetadata::new(self.template.id.clone()),
        }
        .version(self.template.version.clone());

        TemplateBuilder::default()
            .id(self.template.id.as_str())
            .metadata(metadata)
            .tree(tree)
            .build()
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads [`Template`] objects from a directory of template set directories.
///
/// Each immediate subdirectory of `templates_dir` that contains a valid
/// `template.toml` is one template set. Subdirectories whose manifest is
/// missing or invalid emit a `WARN` log and are skipped.
pub struct FilesystemTemplateLoader {
    templates_dir: PathBuf,
}

impl FilesystemTemplateLoader {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Load every valid template set found under the templates directory.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTemplate`] if the directory is missing
    /// or cannot be read. Individual broken sets are skipped, not fatal.
    #[instrument(skip(self), fields(dir = %self.templates_dir.display()))]
    pub fn load_all(&self) -> Result<Vec<Template>, DomainError> {
        if !self.templates_dir.exists() {
            return Err(DomainError::InvalidTemplate(format!(
                "templates directory not found: {}",
                self.templates_dir.display()
            )));
        }

        let read_dir = fs::read_dir(&self.templates_dir).map_err(|e| {
            DomainError::InvalidTemplate(format!(
                "failed to read templates directory '{}': {e}",
                self.templates_dir.display()
            ))
        })?;

        let mut dirs = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| {
                DomainError::InvalidTemplate(format!("failed to read directory entry: {e}"))
            })?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();

        let mut templates = Vec::new();
        for dir in dirs {
            match load_template_dir(&dir) {
                Ok(template) => {
                    debug!(id = %template.id, files = template.file_count(), "loaded template set");
                    templates.push(template);
                }
                Err(e) => {
                    warn!(
                        dir   = %dir.display(),
                        error = %e,
                        "skipping template directory due to load error"
                    );
                }
            }
        }

        debug!(count = templates.len(), "finished loading templates");
        Ok(templates)
    }
}

/// Load a single template set from one directory.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_template_dir(dir: &Path) -> Result<Template, DomainError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(DomainError::InvalidTemplate(format!(
            "missing {MANIFEST_FILE} in '{}'",
            dir.display()
        )));
    }

    let raw = fs::read_to_string(&manifest_path).map_err(|e| {
        DomainError::InvalidTemplate(format!("failed to read '{}': {e}", manifest_path.display()))
    })?;
    let manifest = TemplateManifest::parse(&raw, &manifest_path.display().to_string())?;

    let mut files = Vec::new();
    for walk_entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let walk_entry = walk_entry
            .map_err(|e| DomainError::InvalidTemplate(format!("directory walk error: {e}")))?;
        if !walk_entry.file_type().is_file() {
            continue;
        }
        let abs_path = walk_entry.path();
        let rel = abs_path.strip_prefix(dir).map_err(|_| {
            DomainError::InvalidTemplate(format!(
                "failed to relativise '{}' against '{}'",
                abs_path.display(),
                dir.display()
            ))
        })?;

        // The manifest is loader input, not a project file.
        if rel == Path::new(MANIFEST_FILE) {
            continue;
        }

        let path_str = normalize_path(&rel.to_string_lossy());
        let content = fs::read_to_string(abs_path).map_err(|e| {
            DomainError::InvalidTemplate(format!("failed to read file '{path_str}': {e}"))
        })?;
        files.push((path_str, TemplateSource::from(content)));
    }

    manifest.assemble(files)
}

/// Forward slashes only, so manifest paths compare equal across platforms.
pub(crate) fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}
