//! Template sets: the files a variant materializes.
//!
//! ```text
//! Template (aggregate root)
//! ├── TemplateSetId     which set this is (api-worker, graphql, library)
//! ├── TemplateMetadata  display information
//! └── TemplateTree      ordered files and directories
//!      └── TemplateNode = FileSpec | DirectorySpec
//! ```
//!
//! Both node paths and file contents may contain `{{VARIABLE}}` placeholders.
//! A `Template` is pure data; rendering it into a [`ProjectStructure`] is the
//! job of the `TemplateRenderer` port.
//!
//! [`ProjectStructure`]: super::ProjectStructure

use std::collections::HashSet;

use crate::domain::{
    entities::common::{Permissions, RelativePath},
    error::DomainError,
    value_objects::TemplateSetId,
};

/// A named set of files materialized for a variant.
#[derive(Debug, Clone)]
pub struct Template {
    pub id: TemplateSetId,
    pub metadata: TemplateMetadata,
    pub tree: TemplateTree,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    /// Validate all invariants.
    ///
    /// Store adapters call this at load time so a broken template set is
    /// reported before anything is registered.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.as_str().is_empty() {
            return Err(DomainError::InvalidTemplate(
                "Template set id cannot be empty".into(),
            ));
        }

        if self.tree.is_empty() {
            return Err(DomainError::EmptyTemplate {
                template_id: self.id.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for node in &self.tree.nodes {
            let path = node.path().as_str();
            if !seen.insert(path) {
                return Err(DomainError::DuplicatePath {
                    path: path.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Number of file nodes (directories excluded).
    pub fn file_count(&self) -> usize {
        self.tree
            .nodes
            .iter()
            .filter(|n| matches!(n, TemplateNode::File(_)))
            .count()
    }
}

/// Builder for [`Template`]. `build()` enforces required fields.
#[derive(Default)]
pub struct TemplateBuilder {
    id: Option<TemplateSetId>,
    metadata: Option<TemplateMetadata>,
    tree: TemplateTree,
}

impl TemplateBuilder {
    pub fn id(mut self, id: impl Into<TemplateSetId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the entire tree at once (replaces any previous nodes).
    pub fn tree(mut self, tree: TemplateTree) -> Self {
        self.tree = tree;
        self
    }

    pub fn add_node(mut self, node: TemplateNode) -> Self {
        self.tree.push(node);
        self
    }

    pub fn build(self) -> Result<Template, DomainError> {
        let id = self
            .id
            .ok_or(DomainError::MissingRequiredField { field: "id" })?;
        let metadata = self
            .metadata
            .unwrap_or_else(|| TemplateMetadata::new(id.as_str()));

        let template = Template {
            id,
            metadata,
            tree: self.tree,
        };
        template.validate()?;
        Ok(template)
    }
}

/// Display information for `svcgen list` and logs.
#[derive(Debug, Clone)]
pub struct TemplateMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
}

impl TemplateMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: "0.1.0".to_string(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn version(mut self, ver: impl Into<String>) -> Self {
        self.version = ver.into();
        self
    }
}

/// Ordered list of filesystem nodes. Directories are listed before the
/// files they contain.
#[derive(Debug, Clone, Default)]
pub struct TemplateTree {
    pub nodes: Vec<TemplateNode>,
}

impl TemplateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: TemplateNode) {
        self.nodes.push(node);
    }

    pub fn with_node(mut self, node: TemplateNode) -> Self {
        self.push(node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

#[derive(Debug, Clone)]
pub enum TemplateNode {
    File(FileSpec),
    Directory(DirectorySpec),
}

impl TemplateNode {
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSpec {
    pub path: RelativePath,
    pub content: TemplateContent,
    pub permissions: Permissions,
}

impl FileSpec {
    pub fn new(path: RelativePath, content: TemplateContent) -> Self {
        Self {
            path,
            content,
            permissions: Permissions::regular(),
        }
    }

    pub fn executable(mut self) -> Self {
        self.permissions = Permissions::executable();
        self
    }
}

#[derive(Debug, Clone)]
pub struct DirectorySpec {
    pub path: RelativePath,
    pub permissions: Permissions,
}

impl DirectorySpec {
    pub fn new(path: RelativePath) -> Self {
        Self {
            path,
            permissions: Permissions::regular(),
        }
    }
}

/// File content: copied verbatim, or run through variable substitution.
#[derive(Debug, Clone)]
pub enum TemplateContent {
    Literal(TemplateSource),
    Parameterized(TemplateSource),
}

impl TemplateContent {
    /// Pick `Parameterized` when the source contains placeholder syntax.
    pub fn detect(source: impl Into<TemplateSource>) -> Self {
        let source = source.into();
        if source.contains_placeholder() {
            Self::Parameterized(source)
        } else {
            Self::Literal(source)
        }
    }
}

/// Compile-time (`include_str!`) or runtime-loaded content.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Static(&'static str),
    Owned(String),
}

impl From<&'static str> for TemplateSource {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

impl From<String> for TemplateSource {
    fn from(s: String) -> Self {
        Self::Owned(s)
    }
}

impl TemplateSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s,
        }
    }

    pub fn contains_placeholder(&self) -> bool {
        self.as_str().contains("{{") && self.as_str().contains("}}")
    }
}
