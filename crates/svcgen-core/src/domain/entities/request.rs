//! Scaffold requests and their input schemas.
//!
//! [`ServiceRequest`] is the canonical, validated input. Request *documents*
//! (JSON files handed to the CLI) are versioned: version 2 is the canonical
//! `{ name, variant, fields }` shape, version 1 is the historical
//! `{ serviceName, serviceType }` shape. A document only takes the legacy path
//! when it says so with `"schemaVersion": 1`; field names are never aliased
//! implicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, value_objects::Variant};

/// Current request document schema version.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

// ── ServiceName ───────────────────────────────────────────────────────────────

/// A validated service name: non-empty, a single filesystem path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn parse(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if let Err(reason) = check_segment(&name) {
            return Err(DomainError::InvalidName { name, reason });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ServiceName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}

fn check_segment(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name cannot be empty".into());
    }
    if name != name.trim() {
        return Err("name cannot have leading or trailing whitespace".into());
    }
    if name.starts_with('.') {
        return Err("name cannot start with '.'".into());
    }
    if let Some(c) = name
        .chars()
        .find(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control())
    {
        return Err(format!("name cannot contain {c:?}"));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err("name must be a single path segment".into()),
    }
}

// ── ServiceRequest ────────────────────────────────────────────────────────────

/// Transient scaffold input, consumed within one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub name: ServiceName,
    pub variant: Variant,
    /// Free-form values exposed to templates as substitution variables.
    pub fields: BTreeMap<String, String>,
}

impl ServiceRequest {
    pub fn new(name: impl Into<String>, variant: Variant) -> Result<Self, DomainError> {
        Ok(Self {
            name: ServiceName::parse(name)?,
            variant,
            fields: BTreeMap::new(),
        })
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Parse a versioned JSON request document.
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| DomainError::InvalidRequest(format!("malformed JSON: {e}")))?;
        Self::from_document(value)
    }

    /// Dispatch on `schemaVersion` and migrate older shapes explicitly.
    pub fn from_document(mut value: serde_json::Value) -> Result<Self, DomainError> {
        let obj = value
            .as_object_mut()
            .ok_or_else(|| DomainError::InvalidRequest("request must be a JSON object".into()))?;

        let version = match obj.remove("schemaVersion") {
            None => CURRENT_SCHEMA_VERSION,
            Some(v) => v
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    DomainError::InvalidRequest(format!("schemaVersion must be an integer, got {v}"))
                })?,
        };

        match version {
            1 => {
                let legacy: LegacyRequestV1 = deserialize_doc(value)?;
                tracing::info!(
                    service = %legacy.service_name,
                    "migrating schemaVersion 1 request (serviceName/serviceType) to current schema"
                );
                Ok(legacy.migrate())
            }
            CURRENT_SCHEMA_VERSION => {
                let doc: RequestDocument = deserialize_doc(value)?;
                Ok(doc.into())
            }
            other => Err(DomainError::InvalidRequest(format!(
                "unsupported schemaVersion {other} (supported: 1, {CURRENT_SCHEMA_VERSION})"
            ))),
        }
    }
}

fn deserialize_doc<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, DomainError> {
    serde_json::from_value(value).map_err(|e| {
        let msg = e.to_string();
        // Surface the name validator's own error rather than a serde wrapper.
        if msg.starts_with("invalid service name") {
            DomainError::InvalidRequest(msg)
        } else {
            DomainError::InvalidRequest(format!("request does not match schema: {msg}"))
        }
    })
}

/// Canonical request document (schema version 2).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RequestDocument {
    name: ServiceName,
    variant: Variant,
    #[serde(default)]
    fields: BTreeMap<String, String>,
}

impl From<RequestDocument> for ServiceRequest {
    fn from(doc: RequestDocument) -> Self {
        Self {
            name: doc.name,
            variant: doc.variant,
            fields: doc.fields,
        }
    }
}

/// Historical request shape (schema version 1).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct LegacyRequestV1 {
    service_name: ServiceName,
    service_type: Variant,
}

impl LegacyRequestV1 {
    fn migrate(self) -> ServiceRequest {
        ServiceRequest {
            name: self.service_name,
            variant: self.service_type,
            fields: BTreeMap::new(),
        }
    }
}
