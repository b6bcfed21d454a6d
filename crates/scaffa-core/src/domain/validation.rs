use crate::domain::{error::DomainError, task_spec::SEPARATOR};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    /// A registrable scaffold name is non-blank and free of the task-spec
    /// separator, so `name:target` stays unambiguous.
    pub fn validate_scaffold_name(name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "name",
                "expected a non-empty scaffold name",
            ));
        }
        if name.contains(SEPARATOR) {
            return Err(DomainError::invalid_argument(
                "name",
                format!("scaffold names must not contain '{SEPARATOR}': {name}"),
            ));
        }
        Ok(())
    }
}
