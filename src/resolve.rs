//! Core resolution pipeline: seed defaults, apply environment and
//! command-line values, then validate.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O, making the full
//! pipeline testable with synthetic inputs. Steps:
//!
//! 1. Seed every field with its default
//! 2. Apply environment values on top, collecting conversion failures
//! 3. Parse the command line and apply explicit flags (highest priority)
//! 4. Check required fields and option sets

use std::collections::HashMap;
use std::ffi::OsString;

use tracing::{debug, trace};

use crate::cli;
use crate::env;
use crate::error::ConfigError;
use crate::schema::FieldDescriptor;
use crate::validate;

/// All pre-loaded data needed to resolve a config. No I/O happens here.
pub struct ResolveInput {
    /// Environment snapshot, dotenv entries already layered underneath.
    pub env: HashMap<String, String>,
    /// Command-line arguments, program name first.
    pub args: Vec<OsString>,
    /// Name shown in help and usage output.
    pub command_name: String,
}

/// Resolve every field from pre-loaded inputs, writing results into the
/// members the descriptors point at. Returns the command-line operands that
/// followed the flags.
///
/// Environment conversion failures are gathered into one
/// [`ConfigError::FlagCollection`], but a command-line parse failure is
/// reported on its own and takes precedence. Members may be left partially
/// assigned when an error is returned.
pub fn resolve(
    fields: &mut [FieldDescriptor<'_>],
    input: &ResolveInput,
) -> Result<Vec<OsString>, ConfigError> {
    // 1: Defaults
    for field in fields.iter_mut() {
        field.seed();
    }

    // 2: Environment on top of defaults
    let command = cli::command(&input.command_name, fields);
    let mut env_errors = Vec::new();
    for field in fields.iter_mut() {
        let Some(text) = env::lookup(&input.env, field.key()) else {
            continue;
        };
        let var = field.env_var();
        match field.assign_text(text) {
            Ok(()) => trace!(key = field.key(), var = %var, "applied environment value"),
            Err(source) => {
                debug!(key = field.key(), var = %var, "invalid environment value");
                env_errors.push(ConfigError::InvalidEnvValue {
                    var,
                    source: Box::new(source),
                });
            }
        }
    }

    // 3: Command line on top of everything
    let args = cli::normalize_args(fields, &input.args);
    let matches = cli::parse(command, &args).map_err(ConfigError::FlagParse)?;
    if !env_errors.is_empty() {
        return Err(ConfigError::FlagCollection(env_errors));
    }
    for field in fields.iter_mut() {
        if let Some(value) = cli::explicit_value(&matches, field.key()) {
            field.assign(value.clone())?;
            trace!(key = field.key(), "applied command-line value");
        }
    }

    // 4: Final values must satisfy required and option constraints
    validate::validate(fields)?;
    Ok(cli::operands(&matches))
}
