//! In-memory template store with built-in templates.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, RwLock},
};

use svcgen_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::{DomainValidator as validator, Template, TemplateSetId},
    error::{ScaffoldError, ScaffoldResult},
};

use crate::builtin_templates;

/// Thread-safe in-memory template store keyed by template set id.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<BTreeMap<TemplateSetId, Template>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the built-in template sets, with any
    /// override directory applied.
    pub fn with_builtin(local_path: Option<&Path>) -> ScaffoldResult<Self> {
        let store = Self::new();
        for template in builtin_templates::all_templates(local_path)? {
            store.insert(template)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateStore for InMemoryStore {
    fn get(&self, id: &TemplateSetId) -> ScaffoldResult<Template> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.get(id).cloned().ok_or_else(|| {
            ApplicationError::TemplateNotFound {
                template_set: id.to_string(),
            }
            .into()
        })
    }

    fn list(&self) -> ScaffoldResult<Vec<Template>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        Ok(inner.values().cloned().collect())
    }

    fn insert(&self, template: Template) -> ScaffoldResult<()> {
        validator::validate_template(&template).map_err(ScaffoldError::Domain)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.insert(template.id.clone(), template);
        Ok(())
    }
}
