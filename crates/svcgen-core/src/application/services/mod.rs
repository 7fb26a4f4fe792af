//! Application services - orchestrate use cases.

pub mod post_generation;
pub mod scaffold_service;

pub use post_generation::{
    DEFAULT_TIDY_COMMAND, PostGenerationOutcome, PostGenerationRunner, TidyOutcome, TidyPolicy,
};
pub use scaffold_service::{ScaffoldFailure, ScaffoldReport, ScaffoldService, ScaffoldState, Stage};
