//! Core domain layer for svcgen.
//!
//! Pure logic only: no filesystem, no processes, no configuration files.
//! Everything that touches the outside world goes through the ports in
//! [`crate::application::ports`].
//!
//! - **No I/O**: variant resolution and descriptor synthesis are deterministic
//! - **Serde at the edges**: descriptors and requests define their own wire shape
//! - **Validated construction**: names, paths and graphs are checked when built

pub mod configuration;
pub mod entities;
pub mod error;
pub mod value_objects;
pub mod variants;

mod validation;

pub use configuration::{APPLICATIONS_DIR, ConfigurationBuilder, LIBRARIES_DIR};
pub use entities::{
    descriptor::ProjectDescriptor,
    project_structure::{DirectoryToCreate, FileToWrite, FsEntry, ProjectStructure},
    render_context::RenderContext,
    request::{CURRENT_SCHEMA_VERSION, ServiceName, ServiceRequest},
    target_graph::{TargetGraph, TargetSpec},
    template::{
        DirectorySpec, FileSpec, Template, TemplateBuilder, TemplateContent, TemplateMetadata,
        TemplateNode, TemplateSource, TemplateTree,
    },
};
pub use error::{DomainError, ErrorCategory};
pub use value_objects::{ProjectKind, TemplateSetId, Variant};
pub use variants::{
    DeployPolicy, GraphShape, ResolvedVariant, VARIANT_REGISTRY, VariantDef, VariantResolver,
};

pub use entities::common::{Permissions, RelativePath};
pub use validation::DomainValidator;
