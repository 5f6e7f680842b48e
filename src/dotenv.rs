//! Reading `.env` files.
//!
//! Files are parsed with `dotenvy` into an in-memory map instead of being
//! written into the process environment. The map is then layered under the
//! real environment by [`env::layered`](crate::env::layered).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

/// File read when no env files were requested.
pub const DEFAULT_FILE: &str = ".env";

/// Read the requested env files, or `.env` when `files` is empty.
///
/// A missing `.env` is fine when it was only the implicit default. A missing
/// file that was asked for is [`ConfigError::DotEnvNotFound`]. When several
/// files define the same name, the first file wins.
pub fn load_files(files: &[PathBuf]) -> Result<HashMap<String, String>, ConfigError> {
    if files.is_empty() {
        let path = Path::new(DEFAULT_FILE);
        return match read_file(path) {
            Err(ConfigError::DotEnvNotFound { .. }) => {
                debug!("no default env file found");
                Ok(HashMap::new())
            }
            other => other,
        };
    }

    let mut merged = HashMap::new();
    for path in files {
        for (name, value) in read_file(path)? {
            merged.entry(name).or_insert(value);
        }
    }
    Ok(merged)
}

fn read_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let classify = |source: dotenvy::Error| {
        if source.not_found() {
            ConfigError::DotEnvNotFound {
                path: path.to_path_buf(),
                source,
            }
        } else {
            ConfigError::DotEnvRead {
                path: path.to_path_buf(),
                source,
            }
        }
    };

    let entries = dotenvy::from_path_iter(path)
        .map_err(classify)?
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(classify)?;
    debug!(path = %path.display(), count = entries.len(), "loaded env file");
    Ok(entries)
}
