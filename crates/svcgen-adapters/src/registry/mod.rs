//! Project registry adapters.
//!
//! - [`WorkspaceRegistry`] keeps one `project.json` per project inside the
//!   workspace, the layout the monorepo build tool reads.
//! - [`InMemoryRegistry`] is for tests and dry runs.

mod memory;
mod workspace;

pub use memory::InMemoryRegistry;
pub use workspace::{PROJECT_FILE, WorkspaceRegistry};
