use crate::domain::{
    configuration::ConfigurationBuilder,
    entities::{ProjectDescriptor, ProjectStructure, ServiceName, Template},
    error::DomainError,
};

/// Centralized domain validation.
///
/// Adapters that load domain objects from outside (template directories,
/// `project.json` files) funnel them through here.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_template(template: &Template) -> Result<(), DomainError> {
        template.validate()
    }

    pub fn validate_project_structure(structure: &ProjectStructure) -> Result<(), DomainError> {
        structure.validate()
    }

    /// A descriptor read back from disk must have a valid name, the root the
    /// builder would have computed for it, and a valid graph.
    pub fn validate_descriptor(descriptor: &ProjectDescriptor) -> Result<(), DomainError> {
        ServiceName::parse(descriptor.name.as_str())?;
        let (root, source_root) = ConfigurationBuilder::roots(&descriptor.name, descriptor.kind);
        if descriptor.root != root || descriptor.source_root != source_root {
            return Err(DomainError::InvalidRequest(format!(
                "project '{}' has root '{}' / sourceRoot '{}', expected '{root}' / '{source_root}'",
                descriptor.name, descriptor.root, descriptor.source_root
            )));
        }
        descriptor.targets.validate()
    }
}
