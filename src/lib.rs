//! Declarative configuration from command-line flags, environment variables
//! and `.env` files. Describe a struct once, then load it.
//!
//! ```ignore
//! let mut config = AppConfig::default();
//! flagenv::load(&mut config)?;
//! ```
//!
//! That single call reads `.env` from the working directory, registers one
//! `--flag` per field, consults the matching environment variables, applies
//! declared defaults and checks required fields.
//!
//! # Describing a structure
//!
//! There is no derive. A structure implements [`Configurable`] and registers
//! each member on a [`Schema`] together with a tag:
//!
//! ```ignore
//! impl Configurable for AppConfig {
//!     fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
//!         schema.field("Name", "name;default=flagenv", &mut self.name)?;
//!         schema.field("Debug", "debug;short=d;description=Enable debug output", &mut self.debug)?;
//!         schema.nested("Database", &mut self.database)?;
//!         Ok(())
//!     }
//! }
//! ```
//!
//! Tags follow `key[;option]*`:
//!
//! | Option | Effect |
//! |--------|--------|
//! | `required` | the final value must differ from the type's zero value |
//! | `short=<name>` | one character gives `-x`, longer names a `--name` alias |
//! | `description=<text>` | help text |
//! | `default=<value>` | default, converted when the structure is described |
//! | `options=<a,b,...>` | the final value must be one of these |
//!
//! An empty tag leaves the member out entirely. Members never registered are
//! never touched.
//!
//! Supported member types are `bool`, the signed and unsigned integers, `f32`,
//! `f64`, `String`, [`Duration`](std::time::Duration) (Go-style literals such
//! as `1h30m` or `300ms`), [`chrono::TimeDelta`] for durations that may be
//! negative (`-1m30s`) and `Vec` of any of these (comma-separated). Nested
//! structures may be plain, boxed or `Option`al; `None` is skipped.
//!
//! # Keys, flags and environment variables
//!
//! Nested fields are keyed by the lowercased parent name plus the tag key:
//!
//! | Member | Flag | Env var |
//! |--------|------|---------|
//! | `name` | `--name` | `NAME` |
//! | `database.port` | `--database-port` | `DATABASE_PORT` |
//!
//! Short names have no environment equivalent. Empty environment values count
//! as unset.
//!
//! Long flags may also be spelled with a single dash, `-database-port=5433`.
//! Flag parsing stops at `--` or at the first argument that is not a flag;
//! the remaining arguments are returned by
//! [`Loader::load_with_operands`].
//!
//! # Precedence
//!
//! ```text
//! Member's current value   or the tag's default=
//!        ↑ overridden by
//! .env files               never override the real environment
//!        ↑ overridden by
//! Environment variables
//!        ↑ overridden by
//! Command-line flags
//! ```
//!
//! Every layer is sparse: a source only replaces the fields it names.
//!
//! # Errors
//!
//! All fallible operations return [`ConfigError`]. Malformed environment
//! values are collected and reported together; a command-line parse error
//! (including `--help`) is reported on its own. [`ErrorPattern`] supports
//! partial matching through [`ConfigError::matches`].
//!
//! # Logging
//!
//! Phase boundaries and per-field source decisions are emitted as `tracing`
//! events at `debug` and `trace` level. Values are never logged. No
//! subscriber is installed.

pub mod error;
pub mod types;

mod builder;
mod cli;
mod convert;
mod dotenv;
mod env;
mod resolve;
mod schema;
mod tag;
mod validate;

#[cfg(test)]
mod fixtures;

use std::path::PathBuf;

pub use builder::Loader;
pub use convert::{
    convert, format_duration, format_signed_duration, parse_duration, parse_signed_duration,
};
pub use error::{ConfigError, ErrorPattern, ValueParseError};
pub use schema::{Configurable, FieldDescriptor, FieldInfo, Schema};
pub use types::{FieldType, Kind, Value};

/// Populate `config` from `.env`, the process environment and the process
/// arguments.
pub fn load<C: Configurable + ?Sized>(config: &mut C) -> Result<(), ConfigError> {
    Loader::new().load(config)
}

/// Like [`load`], reading `files` instead of `.env`. The first file to define
/// a variable wins.
pub fn load_with_files<C, I, P>(config: &mut C, files: I) -> Result<(), ConfigError>
where
    C: Configurable + ?Sized,
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    Loader::new().env_files(files).load(config)
}
