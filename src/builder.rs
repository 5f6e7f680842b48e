use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::dotenv;
use crate::env;
use crate::error::ConfigError;
use crate::resolve::{self, ResolveInput};
use crate::schema::{Configurable, FieldDescriptor, FieldInfo, Schema};

const FALLBACK_NAME: &str = "app";

/// Builder for loading a [`Configurable`] structure from flags, environment
/// variables and `.env` files.
///
/// Every input has a process-wide default: `std::env::args_os()`,
/// `std::env::vars_os()` and `.env` in the working directory. Each can be
/// replaced, which is how tests feed synthetic data.
#[derive(Debug, Clone)]
pub struct Loader {
    name: Option<String>,
    env_files: Vec<PathBuf>,
    dotenv: bool,
    args: Option<Vec<OsString>>,
    env_vars: Option<Vec<(String, String)>>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    pub fn new() -> Self {
        Self {
            name: None,
            env_files: Vec::new(),
            dotenv: true,
            args: None,
            env_vars: None,
        }
    }

    /// Set the program name shown in help output (default: derived from the
    /// first argument).
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Add an env file to read instead of the default `.env`. A missing file
    /// added here is an error. Files added first take precedence.
    pub fn env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_files.push(path.into());
        self
    }

    /// Replace the list of env files.
    pub fn env_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.env_files = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Skip env files entirely.
    pub fn no_dotenv(mut self) -> Self {
        self.dotenv = false;
        self
    }

    /// Parse these arguments instead of the process arguments. The first
    /// element is the program name.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Resolve against these variables instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Resolve the effective program name.
    fn effective_name(&self, args: &[OsString]) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        args.first()
            .and_then(|arg0| Path::new(arg0).file_name())
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_NAME)
            .to_string()
    }

    /// Build the `ResolveInput` from current builder state.
    fn build_input(&self) -> Result<ResolveInput, ConfigError> {
        let dotenv = if self.dotenv {
            dotenv::load_files(&self.env_files)?
        } else {
            Default::default()
        };
        let vars = match &self.env_vars {
            Some(vars) => vars.clone(),
            None => env::process_vars(),
        };
        let args = match &self.args {
            Some(args) => args.clone(),
            None => std::env::args_os().collect(),
        };

        Ok(ResolveInput {
            env: env::layered(dotenv, vars),
            command_name: self.effective_name(&args),
            args,
        })
    }

    /// Populate `config` from all sources.
    ///
    /// On success every registered member holds its resolved value. On error
    /// the structure may be partially populated.
    pub fn load<C: Configurable + ?Sized>(&self, config: &mut C) -> Result<(), ConfigError> {
        self.load_with_operands(config).map(drop)
    }

    /// Like [`load`](Self::load), also returning the arguments that followed
    /// the flags: `app --name=x serve -v` yields `["serve", "-v"]`.
    pub fn load_with_operands<C: Configurable + ?Sized>(
        &self,
        config: &mut C,
    ) -> Result<Vec<OsString>, ConfigError> {
        let input = self.build_input()?;
        let mut fields = describe(config)?;
        debug!(fields = fields.len(), "resolving configuration");
        resolve::resolve(&mut fields, &input)
    }

    /// List the fields `config` registers, without resolving anything.
    pub fn fields<C: Configurable + ?Sized>(config: &mut C) -> Result<Vec<FieldInfo>, ConfigError> {
        let fields = describe(config)?;
        Ok(fields.iter().map(FieldDescriptor::info).collect())
    }
}

fn describe<C: Configurable + ?Sized>(config: &mut C) -> Result<Vec<FieldDescriptor<'_>>, ConfigError> {
    if !config.is_present() {
        return Err(ConfigError::InvalidReceiver);
    }
    let mut schema = Schema::root();
    config.describe(&mut schema)?;
    Ok(schema.into_fields())
}
