//! Infrastructure adapters for svcgen.
//!
//! This crate implements the ports defined in `svcgen_core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod builtin_templates;
pub mod filesystem;
pub mod materializer;
pub mod process;
pub mod registry;
pub mod renderer;
pub mod template_loader;
pub mod template_store;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use materializer::TreeMaterializer;
pub use process::{CommandFormatter, ProcessRunner};
pub use registry::{InMemoryRegistry, WorkspaceRegistry};
pub use renderer::SimpleRenderer;
pub use template_store::InMemoryStore;
