//! Schema extraction: turning a configuration structure into a flat, ordered
//! list of [`FieldDescriptor`]s.
//!
//! A structure describes itself by implementing [`Configurable`] and
//! registering each member on a [`Schema`]. Leaf members go through
//! [`Schema::field`] with a tag, nested structures through [`Schema::nested`].
//! Nested descriptors are spliced in place, so the final order matches
//! declaration order with sub-structures flattened depth-first.
//!
//! ```ignore
//! impl Configurable for DatabaseConfig {
//!     fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
//!         schema.field("Host", "host;default=localhost", &mut self.host)?;
//!         schema.field("Port", "port;default=5432", &mut self.port)?;
//!         schema.field("User", "user;required", &mut self.user)?;
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::trace;

use crate::convert::convert;
use crate::env::env_var_name;
use crate::error::{ConfigError, ValueParseError};
use crate::tag;
use crate::types::{FieldType, Kind, Value};

/// A structure whose members can be resolved from flags and environment.
pub trait Configurable {
    /// Register every member that takes part in resolution.
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError>;

    /// Whether there is a structure to describe at all. `None` optionals
    /// report `false`: they are skipped when nested and rejected as a
    /// top-level receiver.
    fn is_present(&self) -> bool {
        true
    }
}

impl<T: Configurable> Configurable for Option<T> {
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
        match self {
            Some(inner) => inner.describe(schema),
            None => Ok(()),
        }
    }

    fn is_present(&self) -> bool {
        self.as_ref().is_some_and(Configurable::is_present)
    }
}

impl<T: Configurable + ?Sized> Configurable for Box<T> {
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
        (**self).describe(schema)
    }

    fn is_present(&self) -> bool {
        (**self).is_present()
    }
}

/// Collects field descriptors for one structure level.
pub struct Schema<'a> {
    prefix: Option<String>,
    fields: Vec<FieldDescriptor<'a>>,
}

impl<'a> Schema<'a> {
    pub(crate) fn root() -> Self {
        Self {
            prefix: None,
            fields: Vec::new(),
        }
    }

    /// Register a leaf member.
    ///
    /// `name` is the member's name (used for diagnostics), `tag` follows the
    /// `key[;option]*` grammar. An empty tag skips the member entirely.
    /// The member's current value becomes its default unless the tag carries
    /// `default=`, which is converted now; a bad default fails here.
    pub fn field<T: FieldType + 'a>(
        &mut self,
        name: &str,
        tag: &str,
        slot: &'a mut T,
    ) -> Result<(), ConfigError> {
        let Some(tag) = tag::parse(tag) else {
            trace!(field = name, "skipping untagged field");
            return Ok(());
        };

        let key = match &self.prefix {
            Some(prefix) => format!("{}-{}", prefix.to_lowercase(), tag.key),
            None => tag.key.to_string(),
        };
        let qualified_name = format!("{}{name}", self.prefix.as_deref().unwrap_or(""));

        let mut default = slot.clone();
        if let Some(text) = tag.default {
            default = convert(text, &T::kind())
                .and_then(into_typed::<T>)
                .map_err(|source| ConfigError::DefaultValueConversion {
                    key: key.clone(),
                    type_name: T::kind().type_name(),
                    source: Box::new(source),
                })?;
        }

        self.fields.push(FieldDescriptor {
            qualified_name,
            key,
            short: tag.short.map(str::to_string),
            description: tag.description.unwrap_or_default().to_string(),
            required: tag.required,
            options: tag.options.filter(|o| !o.is_empty()),
            slot: Box::new(TypedSlot {
                target: slot,
                default,
            }),
        });
        Ok(())
    }

    /// Register a nested structure. Its fields are prefixed with `name` and
    /// spliced in at this position. Absent optionals are skipped.
    pub fn nested<C: Configurable + ?Sized>(
        &mut self,
        name: &str,
        inner: &'a mut C,
    ) -> Result<(), ConfigError> {
        if !inner.is_present() {
            trace!(field = name, "skipping absent nested structure");
            return Ok(());
        }

        let mut child = Schema {
            prefix: Some(name.to_string()),
            fields: Vec::new(),
        };
        inner.describe(&mut child)?;
        self.fields.append(&mut child.fields);
        Ok(())
    }

    /// Descriptors registered so far, in resolution order.
    pub fn fields(&self) -> &[FieldDescriptor<'a>] {
        &self.fields
    }

    pub(crate) fn into_fields(self) -> Vec<FieldDescriptor<'a>> {
        self.fields
    }
}

fn into_typed<T: FieldType>(value: Value) -> Result<T, ConfigError> {
    T::from_value(value)
        .ok_or_else(|| ValueParseError::Mismatch(T::kind().type_name()).into())
}

/// Write access to one member plus its default. Erases `T` so descriptors of
/// different types can share a list.
trait Slot {
    fn kind(&self) -> Kind;
    fn seed(&mut self);
    fn assign(&mut self, value: Value) -> Result<(), ConfigError>;
    fn is_zero(&self) -> bool;
    fn render(&self) -> String;
    fn render_default(&self) -> String;
    fn default_is_zero(&self) -> bool;
}

struct TypedSlot<'a, T> {
    target: &'a mut T,
    default: T,
}

impl<T: FieldType> Slot for TypedSlot<'_, T> {
    fn kind(&self) -> Kind {
        T::kind()
    }

    fn seed(&mut self) {
        *self.target = self.default.clone();
    }

    fn assign(&mut self, value: Value) -> Result<(), ConfigError> {
        *self.target = into_typed::<T>(value)?;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        *self.target == T::default()
    }

    fn render(&self) -> String {
        self.target.render()
    }

    fn render_default(&self) -> String {
        self.default.render()
    }

    fn default_is_zero(&self) -> bool {
        self.default == T::default()
    }
}

/// One resolvable leaf field. Owns exclusive write access to its member for
/// the duration of a load.
pub struct FieldDescriptor<'a> {
    qualified_name: String,
    key: String,
    short: Option<String>,
    description: String,
    required: bool,
    options: Option<BTreeSet<String>>,
    slot: Box<dyn Slot + 'a>,
}

impl FieldDescriptor<'_> {
    /// Parent prefix concatenated with the member name, e.g. `DatabasePort`.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Flag name, e.g. `database-port`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn options(&self) -> Option<&BTreeSet<String>> {
        self.options.as_ref()
    }

    pub fn kind(&self) -> Kind {
        self.slot.kind()
    }

    /// Environment variable consulted for this field, e.g. `DATABASE_PORT`.
    pub fn env_var(&self) -> String {
        env_var_name(&self.key)
    }

    /// The member's current value, rendered as text.
    pub fn current(&self) -> String {
        self.slot.render()
    }

    /// Default shown in help output. Empty for a required field whose default
    /// is the zero value, since that default can never satisfy it.
    pub fn display_default(&self) -> String {
        if self.required && self.slot.default_is_zero() {
            return String::new();
        }
        self.slot.render_default()
    }

    pub fn info(&self) -> FieldInfo {
        FieldInfo {
            key: self.key.clone(),
            short: self.short.clone(),
            env_var: self.env_var(),
            name: self.qualified_name.clone(),
            description: self.description.clone(),
            type_name: self.kind().type_name(),
            default: self.slot.render_default(),
            required: self.required,
            options: self
                .options
                .as_ref()
                .map(|o| o.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    pub(crate) fn seed(&mut self) {
        self.slot.seed();
    }

    pub(crate) fn assign(&mut self, value: Value) -> Result<(), ConfigError> {
        self.slot.assign(value)
    }

    /// Convert `text` and store it in the member.
    pub(crate) fn assign_text(&mut self, text: &str) -> Result<(), ConfigError> {
        let value = convert(text, &self.slot.kind())?;
        self.slot.assign(value)
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.slot.is_zero()
    }
}

/// A serializable summary of one field, for listings and documentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInfo {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    pub env_var: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub default: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorPattern;
    use crate::fixtures::test::{AppConfig, DatabaseConfig, Skipping};
    use std::collections::HashMap;

    fn extract<C: Configurable>(config: &mut C) -> Result<Vec<FieldInfo>, ConfigError> {
        let mut schema = Schema::root();
        config.describe(&mut schema)?;
        Ok(schema.fields().iter().map(FieldDescriptor::info).collect())
    }

    fn keys(infos: &[FieldInfo]) -> Vec<&str> {
        infos.iter().map(|i| i.key.as_str()).collect()
    }

    #[test]
    fn nested_fields_flatten_in_place() {
        let mut config = AppConfig::default();
        let infos = extract(&mut config).unwrap();
        assert_eq!(
            keys(&infos),
            vec![
                "name",
                "database-host",
                "database-port",
                "database-user",
                "debug",
                "hero-names",
                "timeout",
                "color",
            ]
        );
    }

    #[test]
    fn nested_names_and_env_vars() {
        let mut config = AppConfig::default();
        let infos = extract(&mut config).unwrap();
        let port = infos.iter().find(|i| i.key == "database-port").unwrap();
        assert_eq!(port.name, "DatabasePort");
        assert_eq!(port.env_var, "DATABASE_PORT");
        assert_eq!(port.default, "5432");
        assert_eq!(port.type_name, "u16");
    }

    #[test]
    fn present_optional_struct_is_flattened() {
        let mut config = AppConfig {
            replica: Some(Box::new(DatabaseConfig::default())),
            ..AppConfig::default()
        };
        let infos = extract(&mut config).unwrap();
        assert!(infos.iter().any(|i| i.key == "replica-host"));
        assert_eq!(infos.len(), 11);
    }

    #[test]
    fn absent_optional_struct_is_skipped() {
        let mut config = AppConfig::default();
        let infos = extract(&mut config).unwrap();
        assert!(!infos.iter().any(|i| i.key.starts_with("replica")));
    }

    #[test]
    fn untagged_fields_are_skipped() {
        let mut config = Skipping::default();
        let infos = extract(&mut config).unwrap();
        assert_eq!(keys(&infos), vec!["kept"]);
    }

    #[test]
    fn current_value_is_the_default() {
        struct Preset {
            port: u16,
        }
        impl Configurable for Preset {
            fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
                schema.field("Port", "port", &mut self.port)
            }
        }

        let infos = extract(&mut Preset { port: 9000 }).unwrap();
        assert_eq!(infos[0].default, "9000");
    }

    #[test]
    fn tag_default_overrides_current_value() {
        struct Preset {
            port: u16,
        }
        impl Configurable for Preset {
            fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
                schema.field("Port", "port;default=80", &mut self.port)
            }
        }

        let mut preset = Preset { port: 9000 };
        let infos = extract(&mut preset).unwrap();
        assert_eq!(infos[0].default, "80");
        // Extraction never writes to the member.
        assert_eq!(preset.port, 9000);
    }

    #[test]
    fn bad_default_aborts_extraction() {
        struct Bad {
            port: i32,
        }
        impl Configurable for Bad {
            fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
                schema.field("Port", "port;default=notanumber", &mut self.port)
            }
        }

        let err = extract(&mut Bad { port: 0 }).unwrap_err();
        assert!(err.matches(&ErrorPattern::DefaultValueConversion {
            key: Some("port".into()),
            type_name: Some("i32".into()),
        }));
        assert!(err.matches(&ErrorPattern::TypeConversion));
    }

    #[test]
    fn default_on_map_is_unsupported() {
        struct WithMap {
            names: HashMap<String, String>,
        }
        impl Configurable for WithMap {
            fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
                schema.field("Names", "default_name;default=Xablau", &mut self.names)
            }
        }

        let err = extract(&mut WithMap {
            names: HashMap::new(),
        })
        .unwrap_err();
        assert!(err.matches(&ErrorPattern::InvalidTypeForDefaultValues {
            type_name: Some("map".into()),
        }));
    }

    #[test]
    fn nested_default_failure_propagates() {
        struct Inner {
            flag: bool,
        }
        impl Configurable for Inner {
            fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
                schema.field("Flag", "bool;default=Xablau", &mut self.flag)
            }
        }
        struct Outer {
            inner: Option<Inner>,
        }
        impl Configurable for Outer {
            fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
                schema.nested("InvalidPtr", &mut self.inner)
            }
        }

        let err = extract(&mut Outer {
            inner: Some(Inner { flag: false }),
        })
        .unwrap_err();
        assert!(err.matches(&ErrorPattern::DefaultValueConversion {
            key: Some("invalidptr-bool".into()),
            type_name: None,
        }));
    }

    #[test]
    fn required_zero_default_hides_display_default() {
        let mut config = AppConfig::default();
        let mut schema = Schema::root();
        config.describe(&mut schema).unwrap();
        let user = schema
            .fields()
            .iter()
            .find(|f| f.key() == "database-user")
            .unwrap();
        assert!(user.required());
        assert_eq!(user.display_default(), "");
    }

    #[test]
    fn options_and_short_recorded() {
        let mut config = AppConfig::default();
        let infos = extract(&mut config).unwrap();
        let color = infos.iter().find(|i| i.key == "color").unwrap();
        assert_eq!(color.options, vec!["blue", "red"]);
        let debug = infos.iter().find(|i| i.key == "debug").unwrap();
        assert_eq!(debug.short.as_deref(), Some("d"));
    }

    #[test]
    fn field_info_serializes() {
        let mut config = AppConfig::default();
        let infos = extract(&mut config).unwrap();
        let json = serde_json::to_value(&infos[1]).unwrap();
        assert_eq!(json["key"], "database-host");
        assert_eq!(json["env_var"], "DATABASE_HOST");
        assert_eq!(json["type"], "string");
        assert!(json.get("short").is_none());
        assert!(json.get("options").is_none());
    }
}
