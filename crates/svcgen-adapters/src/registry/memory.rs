use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use tracing::debug;

use svcgen_core::{
    application::{ApplicationError, ports::ProjectRegistry},
    domain::ProjectDescriptor,
    error::ScaffoldResult,
};

/// In-memory registry. Clones share the same records.
///
/// `register` checks and inserts under a single write lock, so of two
/// concurrent registrations of one name exactly one succeeds.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    inner: Arc<RwLock<BTreeMap<String, ProjectDescriptor>>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProjectRegistry for InMemoryRegistry {
    fn register(&self, descriptor: &ProjectDescriptor) -> ScaffoldResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let name = descriptor.name.to_string();
        if inner.contains_key(&name) {
            return Err(ApplicationError::DuplicateProject { name }.into());
        }

        debug!(project = %name, root = %descriptor.root, "registered project");
        inner.insert(name, descriptor.clone());
        Ok(())
    }

    fn read(&self, name: &str) -> ScaffoldResult<ProjectDescriptor> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.get(name).cloned().ok_or_else(|| {
            ApplicationError::ProjectNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    fn list(&self) -> ScaffoldResult<Vec<ProjectDescriptor>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        Ok(inner.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use svcgen_core::{
        domain::{ConfigurationBuilder, ServiceRequest, Variant, VariantResolver},
        error::ScaffoldError,
    };

    fn descriptor(name: &str, variant: Variant) -> ProjectDescriptor {
        let resolver = VariantResolver::default();
        ConfigurationBuilder::new()
            .build(
                &ServiceRequest::new(name, variant).unwrap(),
                &resolver.resolve(variant).unwrap(),
            )
            .unwrap()
    }

    #[test]
    fn duplicate_keeps_first_record() {
        let registry = InMemoryRegistry::new();
        let first = descriptor("svc", Variant::Api);
        registry.register(&first).unwrap();

        let err = registry.register(&descriptor("svc", Variant::Library)).unwrap_err();
        assert!(matches!(
            err,
            ScaffoldError::Application(ApplicationError::DuplicateProject { .. })
        ));
        assert_eq!(registry.read("svc").unwrap(), first);
    }

    #[test]
    fn concurrent_registration_has_one_winner() {
        let registry = InMemoryRegistry::new();
        let d = descriptor("racy", Variant::Worker);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let d = d.clone();
                thread::spawn(move || registry.register(&d).is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn list_is_ordered_by_name() {
        let registry = InMemoryRegistry::new();
        registry.register(&descriptor("zeta", Variant::Api)).unwrap();
        registry.register(&descriptor("alpha", Variant::Library)).unwrap();
        let names: Vec<_> = registry
            .list()
            .unwrap()
            .into_iter()
            .map(|d| d.name.to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn unknown_name_is_not_found() {
        assert!(matches!(
            InMemoryRegistry::new().read("ghost").unwrap_err(),
            ScaffoldError::Application(ApplicationError::ProjectNotFound { .. })
        ));
    }
}
