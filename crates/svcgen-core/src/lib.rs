//! Variant resolution, project descriptors and the scaffold pipeline.
//!
//! Everything here is I/O free; the registry, template files, formatter and
//! tidy command are reached through the traits in [`application::ports`],
//! which `svcgen-adapters` implements.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           svcgen-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ScaffoldService, PostGenerationRunner)│
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Registry, Materializer, Formatter,     │
//! │  CommandRunner, Store, Filesystem)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      svcgen-adapters (Infrastructure)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Variant, TargetGraph, ProjectDescriptor│
//! │  VariantResolver, ConfigurationBuilder) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! request → resolve → build → register → materialize → post-generate
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use svcgen_core::prelude::*;
//!
//! let request = ServiceRequest::new("billing-api", Variant::Api)?;
//! let service = ScaffoldService::new(VariantResolver::default(), registry, materializer, post_generation);
//! let report = service.scaffold(&request)?;
//! println!("registered {} with {} files", report.descriptor.name, report.written_files.len());
//! ```

pub mod domain;

pub mod application;

pub mod error;

pub mod prelude {
    pub use crate::application::{
        ApplicationError, PostGenerationRunner, ScaffoldFailure, ScaffoldReport, ScaffoldService,
        Stage, TidyPolicy,
        ports::{
            CommandRunner, Filesystem, Formatter, ProjectRegistry, TemplateMaterializer,
            TemplateRenderer, TemplateStore,
        },
    };
    pub use crate::domain::{
        ConfigurationBuilder, DeployPolicy, DomainError, ProjectDescriptor, ProjectKind,
        RenderContext, ResolvedVariant, ServiceName, ServiceRequest, TargetGraph, TargetSpec,
        Template, TemplateSetId, Variant, VariantResolver,
    };
    pub use crate::error::{ScaffoldError, ScaffoldResult};
}
