//! Domain value objects: Variant, ProjectKind, TemplateSetId.
//!
//! # Design
//!
//! These are pure value types, equality-by-value, no identity.
//! They hold NO resolution logic. The variant → (graph, template set)
//! mapping lives in `variants.rs`. This file's only job is to define the
//! types, their string representations, and their `FromStr` parsers.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add the `as_str` arm and the `FromStr` arm here
//! 3. Add a `VariantDef` entry in `variants.rs`
//! 4. Done

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Variant ───────────────────────────────────────────────────────────────────

/// The closed set of service variants a scaffold request can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Api,
    Graphql,
    Worker,
    App,
    Library,
}

impl Variant {
    /// Every variant, in display order.
    pub const ALL: [Variant; 5] = [
        Self::Api,
        Self::Graphql,
        Self::Worker,
        Self::App,
        Self::Library,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Graphql => "graphql",
            Self::Worker => "worker",
            Self::App => "app",
            Self::Library => "library",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(Self::Api),
            "graphql" => Ok(Self::Graphql),
            "worker" => Ok(Self::Worker),
            "app" => Ok(Self::App),
            "library" | "lib" => Ok(Self::Library),
            _ => Err(DomainError::UnsupportedVariant {
                variant: s.to_string(),
            }),
        }
    }
}

// ── ProjectKind ───────────────────────────────────────────────────────────────

/// Whether a project is a deployable application or a shared library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Application,
    Library,
}

impl ProjectKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Library => "library",
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "application" | "app" => Ok(Self::Application),
            "library" | "lib" => Ok(Self::Library),
            other => Err(DomainError::InvalidRequest(format!(
                "unknown project kind: {other}"
            ))),
        }
    }
}

// ── TemplateSetId ─────────────────────────────────────────────────────────────

/// Opaque handle naming a template directory (e.g. `api-worker`).
///
/// Paired 1:1 with a target graph shape by the variant registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateSetId(String);

impl TemplateSetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateSetId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!(Variant::from_str("GraphQL").unwrap(), Variant::Graphql);
        assert_eq!(Variant::from_str("lib").unwrap(), Variant::Library);
    }

    #[test]
    fn unknown_variant_is_unsupported() {
        assert_eq!(
            Variant::from_str("frontend"),
            Err(DomainError::UnsupportedVariant {
                variant: "frontend".into()
            })
        );
    }

    #[test]
    fn variant_display_round_trips() {
        for v in Variant::ALL {
            assert_eq!(Variant::from_str(v.as_str()).unwrap(), v);
        }
    }

    #[test]
    fn project_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ProjectKind::Application).unwrap();
        assert_eq!(json, "\"application\"");
    }
}
