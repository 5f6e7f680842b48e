//! Clap adapter: the command-line flag registry.
//!
//! Every field descriptor becomes one clap argument named by its key. Values
//! are converted inside clap's value parser with the same converter used for
//! defaults and environment values, so a malformed command-line value is a
//! clap error, reported as [`ConfigError::FlagParse`](crate::ConfigError::FlagParse).
//!
//! Nothing here is global: each load builds and parses its own [`Command`].

use std::collections::HashMap;
use std::ffi::OsString;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::convert::convert;
use crate::schema::FieldDescriptor;
use crate::types::{Kind, Value};

// Ids no tag key can collide with.
const HELP_ID: &str = "__flagenv_help";
const OPERANDS_ID: &str = "__flagenv_operands";

/// Build a clap command with one argument per field.
///
/// Non-flag arguments are accepted as operands: the first one ends flag
/// parsing and everything from there on is returned by [`operands`].
pub fn command(name: &str, fields: &[FieldDescriptor<'_>]) -> Command {
    // Clap's automatic `-h` would collide with fields using `short=h`.
    let mut command = Command::new(name.to_string())
        .disable_help_flag(true)
        .args_override_self(true);
    // A field may claim `--help` for itself.
    if !fields.iter().any(|f| claims_long(f, "help")) {
        command = command.arg(
            Arg::new(HELP_ID)
                .long("help")
                .action(ArgAction::Help)
                .help("Print help"),
        );
    }
    for field in fields {
        command = command.arg(field_arg(field));
    }
    command.arg(
        Arg::new(OPERANDS_ID)
            .value_name("ARGS")
            .num_args(1..)
            .trailing_var_arg(true)
            .value_parser(value_parser!(OsString)),
    )
}

fn claims_long(field: &FieldDescriptor<'_>, name: &str) -> bool {
    field.key() == name || field.short() == Some(name)
}

fn field_arg(field: &FieldDescriptor<'_>) -> Arg {
    let kind = field.kind();
    let mut arg = Arg::new(field.key().to_string())
        .long(field.key().to_string())
        .action(ArgAction::Set)
        .value_name(kind.type_name())
        .help(help_text(field));

    if let Some(short) = field.short() {
        let mut chars = short.chars();
        arg = match (chars.next(), chars.next()) {
            (Some(c), None) => arg.short(c),
            _ => arg.visible_alias(short.to_string()),
        };
    }

    arg = if kind == Kind::Bool {
        // `--debug` alone means true; an explicit value must use `=`.
        arg.num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
    } else {
        arg.allow_hyphen_values(true)
    };

    arg.value_parser(move |text: &str| convert(text, &kind))
}

fn help_text(field: &FieldDescriptor<'_>) -> String {
    let mut help = field.description().to_string();
    let default = field.display_default();
    if !default.is_empty() {
        if !help.is_empty() {
            help.push(' ');
        }
        help.push_str(&format!("[default: {default}]"));
    }
    if let Some(options) = field.options() {
        let listed: Vec<&str> = options.iter().map(String::as_str).collect();
        help.push_str(&format!(" [possible values: {}]", listed.join(", ")));
    }
    help
}

/// Parse `args` (including the program name in position 0).
pub fn parse(command: Command, args: &[OsString]) -> Result<ArgMatches, clap::Error> {
    command.try_get_matches_from(args)
}

/// Rewrite single-dash spellings of long flags, `-database-port=5433`, to
/// `--database-port=5433`.
///
/// Rewriting stops at `--` and at the first operand. An argument consumed as
/// the value of the preceding flag is never rewritten.
pub fn normalize_args(fields: &[FieldDescriptor<'_>], args: &[OsString]) -> Vec<OsString> {
    // Long name -> whether the flag takes a separate value.
    let mut longs: HashMap<&str, bool> = HashMap::new();
    let mut shorts: HashMap<char, bool> = HashMap::new();
    for field in fields {
        let takes_value = field.kind() != Kind::Bool;
        longs.insert(field.key(), takes_value);
        if let Some(short) = field.short() {
            let mut chars = short.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    shorts.insert(c, takes_value);
                }
                _ => {
                    longs.insert(short, takes_value);
                }
            }
        }
    }
    longs.entry("help").or_insert(false);

    let mut out = Vec::with_capacity(args.len());
    let mut rest = args.iter();
    out.extend(rest.next().cloned());

    let mut expect_value = false;
    let mut done = false;
    for arg in rest {
        if done || expect_value {
            expect_value = false;
            out.push(arg.clone());
            continue;
        }
        let Some(text) = arg.to_str() else {
            done = true;
            out.push(arg.clone());
            continue;
        };

        if text == "--" {
            done = true;
            out.push(arg.clone());
        } else if let Some(long) = text.strip_prefix("--") {
            let (name, inline) = split_inline(long);
            expect_value = !inline && longs.get(name).copied().unwrap_or(false);
            out.push(arg.clone());
        } else if let Some(flag) = text.strip_prefix('-').filter(|f| !f.is_empty()) {
            let (name, inline) = split_inline(flag);
            let mut chars = name.chars();
            let single = match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            };
            if let Some(&takes_value) = longs.get(name)
                && single.is_none_or(|c| !shorts.contains_key(&c))
            {
                expect_value = takes_value && !inline;
                out.push(OsString::from(format!("-{text}")));
            } else {
                expect_value = !inline
                    && flag.chars().count() == 1
                    && single.is_some_and(|c| shorts.get(&c).copied().unwrap_or(false));
                out.push(arg.clone());
            }
        } else {
            done = true;
            out.push(arg.clone());
        }
    }
    out
}

fn split_inline(flag: &str) -> (&str, bool) {
    match flag.split_once('=') {
        Some((name, _)) => (name, true),
        None => (flag, false),
    }
}

/// Arguments left after flag parsing stopped, in order.
pub fn operands(matches: &ArgMatches) -> Vec<OsString> {
    matches
        .try_get_many::<OsString>(OPERANDS_ID)
        .ok()
        .flatten()
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// The converted value for `key`, if it was given on the command line.
pub fn explicit_value<'m>(matches: &'m ArgMatches, key: &str) -> Option<&'m Value> {
    matches.try_get_one::<Value>(key).ok().flatten()
}
