use std::collections::HashMap;

/// Environment variable name for a flag key: uppercased, `-` becomes `_`.
///
/// `database-port` → `DATABASE_PORT`.
pub fn env_var_name(key: &str) -> String {
    key.to_uppercase().replace('-', "_")
}

/// Build the environment snapshot one load resolves against.
///
/// `dotenv` entries sit below `vars`: a variable already present in `vars`
/// is never overridden by a dotenv file, matching how dotenv loaders treat
/// an existing process environment.
///
/// Takes iterators so tests can pass synthetic data instead of
/// `std::env::vars()`.
pub fn layered(
    dotenv: impl IntoIterator<Item = (String, String)>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> HashMap<String, String> {
    let mut env: HashMap<String, String> = dotenv.into_iter().collect();
    env.extend(vars);
    env
}

/// The current process environment. Entries that aren't valid UTF-8 are
/// dropped, since no key can name them.
pub fn process_vars() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Look up the value for a flag key. Empty values count as unset.
pub fn lookup<'e>(env: &'e HashMap<String, String>, key: &str) -> Option<&'e str> {
    env.get(&env_var_name(key))
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}
