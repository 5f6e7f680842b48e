//! # flagenv demo application
//!
//! A sample service entry point that loads its configuration with
//! [flagenv](https://docs.rs/flagenv). It exists purely to demonstrate and
//! manually verify flagenv's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example flagenv_demo -- --server-user=admin
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature             | How to exercise it                                                          |
//! |---------------------|-----------------------------------------------------------------------------|
//! | Declared defaults   | `cargo run --example flagenv_demo -- --server-user=admin`                   |
//! | Required field      | `cargo run --example flagenv_demo` (fails: `server-user` missing)           |
//! | Env var override    | `SERVER_PORT=9999 SERVER_USER=admin cargo run --example flagenv_demo`       |
//! | `.env` file         | Put `SERVER_USER=admin` in `.env`, then run with no arguments               |
//! | Short flag          | `cargo run --example flagenv_demo -- -v --server-user=admin`                |
//! | Option set          | `cargo run --example flagenv_demo -- --color=purple --server-user=admin`    |
//! | Durations and lists | `cargo run --example flagenv_demo -- --timeout=1m30s --tags=a,b --server-user=x` |
//! | Generated help      | `cargo run --example flagenv_demo -- --help`                                |
//! | Field listing       | `cargo run --example flagenv_demo -- --list-fields`                         |
//! | Logging             | `RUST_LOG=flagenv=trace cargo run --example flagenv_demo -- --server-user=x` |

use std::ffi::OsStr;
use std::time::Duration;

use clap::error::ErrorKind;
use flagenv::{ConfigError, Configurable, Loader, Schema, format_duration};
use tracing_subscriber::EnvFilter;

/// Root configuration for the demo application.
#[derive(Debug, Default)]
struct DemoConfig {
    name: String,
    verbose: bool,
    color: String,
    timeout: Duration,
    tags: Vec<String>,
    server: ServerConfig,
    list_fields: bool,
}

/// Server settings, exposed as `--server-*` flags and `SERVER_*` variables.
#[derive(Debug, Default)]
struct ServerConfig {
    host: String,
    port: u16,
    user: String,
}

impl Configurable for DemoConfig {
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
        schema.field(
            "Name",
            "name;default=flagenv-demo;description=Name shown in the banner",
            &mut self.name,
        )?;
        schema.field(
            "Verbose",
            "verbose;short=v;description=Print every resolved field",
            &mut self.verbose,
        )?;
        schema.field(
            "Color",
            "color;default=yellow;options=red,green,yellow,blue;description=Banner color",
            &mut self.color,
        )?;
        schema.field(
            "Timeout",
            "timeout;default=30s;description=Request timeout",
            &mut self.timeout,
        )?;
        schema.field("Tags", "tags;description=Comma-separated tags", &mut self.tags)?;
        schema.nested("Server", &mut self.server)?;
        schema.field(
            "ListFields",
            "list-fields;description=Print the field listing as JSON and exit",
            &mut self.list_fields,
        )?;
        Ok(())
    }
}

impl Configurable for ServerConfig {
    fn describe<'a>(&'a mut self, schema: &mut Schema<'a>) -> Result<(), ConfigError> {
        schema.field("Host", "host;default=127.0.0.1", &mut self.host)?;
        schema.field("Port", "port;default=8080", &mut self.port)?;
        schema.field(
            "User",
            "user;required;description=Account the server runs as",
            &mut self.user,
        )?;
        Ok(())
    }
}

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        _ => "\x1b[0m",
    }
}

const RESET: &str = "\x1b[0m";

fn print_fields() {
    let mut config = DemoConfig::default();
    let fields = Loader::fields(&mut config).unwrap_or_else(|e| {
        eprintln!("Failed to describe config:\n{e}");
        std::process::exit(1);
    });
    match serde_json::to_string_pretty(&fields) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize fields:\n{e}");
            std::process::exit(1);
        }
    }
}

fn echo(config: &DemoConfig) {
    let color = ansi_color_code(&config.color);
    println!("{color}{}{RESET}", config.name);

    if config.verbose {
        let entries = [
            ("color", config.color.clone()),
            ("timeout", format_duration(config.timeout)),
            ("tags", config.tags.join(",")),
            ("server-host", config.server.host.clone()),
            ("server-port", config.server.port.to_string()),
            ("server-user", config.server.user.clone()),
        ];
        let max_key_len = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in &entries {
            println!("{color}{key:<max_key_len$}{RESET}  {value}");
        }
    }
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = DemoConfig::default();
    let result = Loader::new().name("flagenv-demo").load(&mut config);

    // The listing must work even when required fields are missing.
    if config.list_fields || std::env::args_os().any(|a| a.as_os_str() == OsStr::new("--list-fields")) {
        print_fields();
        return;
    }

    match result {
        Ok(()) => echo(&config),
        Err(ConfigError::FlagParse(e)) if e.kind() == ErrorKind::DisplayHelp => {
            print!("{e}");
        }
        Err(e) => {
            eprintln!("Failed to load config:\n{e}");
            std::process::exit(1);
        }
    }
}
