//! Built-in template sets.
//!
//! The three template sets the variant registry refers to (`api-worker`,
//! `graphql`, `library`) are compiled into the binary from the crate's
//! `templates/` directory. [`all_templates`] starts from those and lets a
//! directory on disk replace or extend them.
//!
//! # Override resolution
//!
//! 1. **`$SVCGEN_TEMPLATES_DIR`**, when set.
//! 2. The configured `templates.local_path`, when given.
//!
//! Only the first of these is used. A set on disk replaces the built-in set
//! with the same id; new ids are added. A configured directory that does not
//! exist is logged at `WARN` and the built-ins are used unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use svcgen_core::domain::{DomainError, Template, TemplateSource};

use crate::template_loader::{FilesystemTemplateLoader, MANIFEST_FILE, TemplateManifest};

/// Environment variable naming a template override directory.
pub const TEMPLATES_DIR_ENV: &str = "SVCGEN_TEMPLATES_DIR";

struct EmbeddedSet {
    manifest: &'static str,
    files: &'static [(&'static str, &'static str)],
}

macro_rules! embed {
    ($set:literal, [$($path:literal),* $(,)?]) => {
        EmbeddedSet {
            manifest: include_str!(concat!("../templates/", $set, "/template.toml")),
            files: &[$(($path, include_str!(concat!("../templates/", $set, "/", $path)))),*],
        }
    };
}

const API_WORKER: EmbeddedSet = embed!(
    "api-worker",
    [
        "cmd/server/main.go",
        "internal/config/config.go",
        "internal/application/generic_service_impl.go",
        "Dockerfile",
        "fly.toml",
    ]
);

const GRAPHQL: EmbeddedSet = embed!(
    "graphql",
    [
        "cmd/server/main.go",
        "internal/config/config.go",
        "internal/application/generic_service_impl.go",
        "graph/schema.graphqls",
        "graph/resolver.go",
        "gqlgen.yml",
        "Dockerfile",
        "fly.toml",
    ]
);

const LIBRARY: EmbeddedSet = embed!("library", ["src/{{PROJECT_NAME_SNAKE}}.go", "README.md"]);

const EMBEDDED: [&EmbeddedSet; 3] = [&API_WORKER, &GRAPHQL, &LIBRARY];

/// The compiled-in template sets, ordered by id.
pub fn builtin() -> Result<Vec<Template>, DomainError> {
    EMBEDDED
        .iter()
        .map(|set| {
            let manifest = TemplateManifest::parse(set.manifest, MANIFEST_FILE)?;
            manifest.assemble(
                set.files
                    .iter()
                    .map(|&(path, content)| (path.to_string(), TemplateSource::Static(content))),
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|mut templates| {
            templates.sort_by(|a, b| a.id.cmp(&b.id));
            templates
        })
}

/// Built-in sets merged with the override directory, if any.
///
/// `local_path` is the configured `templates.local_path`; the environment
/// variable takes precedence over it.
#[instrument(skip_all)]
pub fn all_templates(local_path: Option<&Path>) -> Result<Vec<Template>, DomainError> {
    let env_dir = std::env::var_os(TEMPLATES_DIR_ENV).map(PathBuf::from);
    merge_with_override(override_dir(env_dir, local_path))
}

fn override_dir(env_dir: Option<PathBuf>, local_path: Option<&Path>) -> Option<PathBuf> {
    env_dir
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| local_path.map(Path::to_path_buf))
}

fn merge_with_override(dir: Option<PathBuf>) -> Result<Vec<Template>, DomainError> {
    let mut by_id: BTreeMap<String, Template> = builtin()?
        .into_iter()
        .map(|t| (t.id.to_string(), t))
        .collect();

    let Some(dir) = dir else {
        debug!(count = by_id.len(), "using built-in templates");
        return Ok(by_id.into_values().collect());
    };

    if !dir.exists() {
        warn!(
            path = %dir.display(),
            "template override directory does not exist; using built-in templates"
        );
        return Ok(by_id.into_values().collect());
    }

    let overrides = FilesystemTemplateLoader::new(&dir).load_all()?;
    info!(
        path  = %dir.display(),
        count = overrides.len(),
        "loaded template overrides"
    );
    for template in overrides {
        if by_id.contains_key(template.id.as_str()) {
            debug!(id = %template.id, "template set overridden from disk");
        }
        by_id.insert(template.id.to_string(), template);
    }

    Ok(by_id.into_values().collect())
}
