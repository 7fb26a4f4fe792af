//! Application layer for svcgen.
//!
//! This layer contains:
//! - **Services**: the scaffold pipeline and post-generation steps
//! - **Ports**: traits for everything the pipeline needs from outside
//! - **Errors**: orchestration and adapter failures
//!
//! The application layer coordinates the domain layer but contains no
//! business rules itself. Those live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    DEFAULT_TIDY_COMMAND, PostGenerationOutcome, PostGenerationRunner, ScaffoldFailure,
    ScaffoldReport, ScaffoldService, ScaffoldState, Stage, TidyOutcome, TidyPolicy,
};

pub use ports::{
    CommandRunner, Filesystem, Formatter, ProjectRegistry, TemplateMaterializer,
    TemplateRenderer, TemplateStore,
};

pub use error::ApplicationError;
