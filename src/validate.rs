//! Post-resolution checks: required fields and option sets.
//!
//! Runs after every field holds its final value. Reports the first violation
//! in field order, not a collection.

use tracing::debug;

use crate::error::ConfigError;
use crate::schema::FieldDescriptor;

/// Check every field's final value.
///
/// A required field still holding its type's zero value fails with
/// [`ConfigError::MissingRequiredField`]. A field with an option set whose
/// rendered value is not a member fails with
/// [`ConfigError::ValueNotAValidOption`]. Fields are checked in order and the
/// first failure is returned.
pub fn validate(fields: &[FieldDescriptor<'_>]) -> Result<(), ConfigError> {
    for field in fields {
        if field.required() && field.is_zero() {
            debug!(key = field.key(), "required field not set");
            return Err(ConfigError::MissingRequiredField {
                key: field.key().to_string(),
                field: field.qualified_name().to_string(),
            });
        }

        if let Some(options) = field.options() {
            let value = field.current();
            if !options.contains(&value) {
                debug!(key = field.key(), "value outside option set");
                return Err(ConfigError::ValueNotAValidOption {
                    value,
                    options: options.clone(),
                });
            }
        }
    }
    Ok(())
}
