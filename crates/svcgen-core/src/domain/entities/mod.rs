pub mod common;
pub mod descriptor;
pub mod project_structure;
pub mod render_context;
pub mod request;
pub mod target_graph;
pub mod template;

pub use crate::domain::DomainError;
pub use descriptor::ProjectDescriptor;
pub use project_structure::ProjectStructure;
pub use render_context::RenderContext;
pub use request::{ServiceName, ServiceRequest};
pub use target_graph::{TargetGraph, TargetSpec};
pub use template::Template;
