//! Application ports (traits) for external dependencies.
//!
//! Ports define what the application needs from the outside world. Adapters
//! in `svcgen-adapters` implement them.
//!
//! ## Port Types
//!
//! - **Pipeline ports**: called directly by `ScaffoldService` and
//!   `PostGenerationRunner`
//!   - `ProjectRegistry`, `TemplateMaterializer`, `Formatter`, `CommandRunner`
//! - **Materializer ports**: used by the tree materializer adapter
//!   - `TemplateStore`, `TemplateRenderer`, `Filesystem`

pub mod output;

pub use output::{
    CommandRunner, Filesystem, Formatter, ProjectRegistry, TemplateMaterializer,
    TemplateRenderer, TemplateStore,
};

#[cfg(test)]
pub use output::{
    MockCommandRunner, MockFormatter, MockProjectRegistry, MockTemplateMaterializer,
};
