//! Parsing of field tags: `key[;option]*`.
//!
//! Options are `required`, `short=<name>`, `description=<text>`,
//! `default=<text>` and `options=<v1,v2,...>`. Anything else is ignored.
//! When an option repeats, the last occurrence wins.

use std::collections::BTreeSet;

const SHORT: &str = "short=";
const DESCRIPTION: &str = "description=";
const DEFAULT: &str = "default=";
const OPTIONS: &str = "options=";

#[derive(Debug, Default, PartialEq)]
pub struct Tag<'t> {
    pub key: &'t str,
    pub required: bool,
    pub short: Option<&'t str>,
    pub description: Option<&'t str>,
    pub default: Option<&'t str>,
    pub options: Option<BTreeSet<String>>,
}

/// Parse a tag. Returns `None` for an empty tag or an empty key, meaning the
/// field takes no part in resolution.
pub fn parse(tag: &str) -> Option<Tag<'_>> {
    let mut parts = tag.split(';');
    let key = parts.next().filter(|k| !k.is_empty())?;

    let mut parsed = Tag {
        key,
        ..Tag::default()
    };
    for opt in parts {
        if opt == "required" {
            parsed.required = true;
        } else if let Some(short) = opt.strip_prefix(SHORT) {
            parsed.short = Some(short).filter(|s| !s.is_empty());
        } else if let Some(description) = opt.strip_prefix(DESCRIPTION) {
            parsed.description = Some(description);
        } else if let Some(default) = opt.strip_prefix(DEFAULT) {
            parsed.default = Some(default);
        } else if let Some(options) = opt.strip_prefix(OPTIONS) {
            parsed.options = Some(options.split(',').map(|o| o.trim().to_string()).collect());
        }
    }
    Some(parsed)
}
