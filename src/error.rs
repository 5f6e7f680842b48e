use std::collections::BTreeSet;
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Env file not found: {path}: {source}")]
    DotEnvNotFound {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("Failed to read env file {path}: {source}")]
    DotEnvRead {
        path: PathBuf,
        source: dotenvy::Error,
    },

    #[error("Config receiver must be a present structure")]
    InvalidReceiver,

    #[error("Invalid default value for '{key}' ({type_name}): {source}")]
    DefaultValueConversion {
        key: String,
        type_name: String,
        source: Box<ConfigError>,
    },

    #[error("{0}")]
    TypeConversion(#[from] ValueParseError),

    #[error("Field type '{type_name}' not supported")]
    InvalidTypeForDefaultValues { type_name: String },

    #[error("Invalid value in environment variable {var}: {source}")]
    InvalidEnvValue {
        var: String,
        source: Box<ConfigError>,
    },

    #[error("{0}")]
    FlagParse(#[source] clap::Error),

    #[error("{}", join_messages(.0))]
    FlagCollection(Vec<ConfigError>),

    #[error("Required key '{key}' for field '{field}' not found")]
    MissingRequiredField { key: String, field: String },

    #[error("Received value \"{value}\" is not a valid option from {options:?}")]
    ValueNotAValidOption {
        value: String,
        options: BTreeSet<String>,
    },
}

/// Low-level parse failures wrapped by [`ConfigError::TypeConversion`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueParseError {
    #[error("invalid boolean '{0}'")]
    Bool(String),

    #[error("invalid integer '{input}': {source}")]
    Int {
        input: String,
        source: ParseIntError,
    },

    #[error("invalid float '{input}': {source}")]
    Float {
        input: String,
        source: ParseFloatError,
    },

    #[error("float '{input}' out of range for f{bits}")]
    FloatRange { input: String, bits: u32 },

    #[error("invalid duration '{input}': {reason}")]
    Duration { input: String, reason: &'static str },

    #[error("value does not fit field type {0}")]
    Mismatch(String),
}

fn join_messages(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A partially-specified [`ConfigError`] used for matching.
///
/// Every `None` field matches any value. Built for assertions like "loading
/// failed because field `name` was missing" without spelling out every
/// detail of the error.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPattern {
    DotEnvNotFound {
        path: Option<PathBuf>,
    },
    DotEnvRead {
        path: Option<PathBuf>,
    },
    InvalidReceiver,
    DefaultValueConversion {
        key: Option<String>,
        type_name: Option<String>,
    },
    TypeConversion,
    InvalidTypeForDefaultValues {
        type_name: Option<String>,
    },
    InvalidEnvValue {
        var: Option<String>,
    },
    FlagParse {
        kind: Option<clap::error::ErrorKind>,
    },
    /// With `Some(patterns)`, every collected error must match one of them.
    FlagCollection {
        errors: Option<Vec<ErrorPattern>>,
    },
    MissingRequiredField {
        key: Option<String>,
        field: Option<String>,
    },
    ValueNotAValidOption {
        value: Option<String>,
        options: Option<BTreeSet<String>>,
    },
}

fn field_matches<T: PartialEq + ?Sized>(expected: Option<&T>, actual: &T) -> bool {
    expected.is_none_or(|e| e == actual)
}

impl ConfigError {
    /// True if this error, or any error it wraps, matches `pattern`.
    pub fn matches(&self, pattern: &ErrorPattern) -> bool {
        self.matches_self(pattern) || self.wrapped().is_some_and(|inner| inner.matches(pattern))
    }

    fn wrapped(&self) -> Option<&ConfigError> {
        match self {
            ConfigError::DefaultValueConversion { source, .. }
            | ConfigError::InvalidEnvValue { source, .. } => Some(source),
            _ => None,
        }
    }

    fn matches_self(&self, pattern: &ErrorPattern) -> bool {
        match (self, pattern) {
            (ConfigError::DotEnvNotFound { path, .. }, ErrorPattern::DotEnvNotFound { path: p })
            | (ConfigError::DotEnvRead { path, .. }, ErrorPattern::DotEnvRead { path: p }) => {
                field_matches(p.as_ref(), path)
            }
            (ConfigError::InvalidReceiver, ErrorPattern::InvalidReceiver) => true,
            (
                ConfigError::DefaultValueConversion { key, type_name, .. },
                ErrorPattern::DefaultValueConversion {
                    key: k,
                    type_name: t,
                },
            ) => field_matches(k.as_ref(), key) && field_matches(t.as_ref(), type_name),
            (ConfigError::TypeConversion(_), ErrorPattern::TypeConversion) => true,
            (
                ConfigError::InvalidTypeForDefaultValues { type_name },
                ErrorPattern::InvalidTypeForDefaultValues { type_name: t },
            ) => field_matches(t.as_ref(), type_name),
            (ConfigError::InvalidEnvValue { var, .. }, ErrorPattern::InvalidEnvValue { var: v }) => {
                field_matches(v.as_ref(), var)
            }
            (ConfigError::FlagParse(err), ErrorPattern::FlagParse { kind }) => {
                field_matches(kind.as_ref(), &err.kind())
            }
            (ConfigError::FlagCollection(errors), ErrorPattern::FlagCollection { errors: p }) => {
                match p {
                    None => true,
                    Some(patterns) => errors
                        .iter()
                        .all(|err| patterns.iter().any(|pattern| err.matches(pattern))),
                }
            }
            (
                ConfigError::MissingRequiredField { key, field },
                ErrorPattern::MissingRequiredField { key: k, field: f },
            ) => field_matches(k.as_ref(), key) && field_matches(f.as_ref(), field),
            (
                ConfigError::ValueNotAValidOption { value, options },
                ErrorPattern::ValueNotAValidOption {
                    value: v,
                    options: o,
                },
            ) => field_matches(v.as_ref(), value) && field_matches(o.as_ref(), options),
            _ => false,
        }
    }
}
