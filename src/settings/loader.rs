use alloc::{
    collections::BTreeMap,
    string::{String, ToString as _},
};
use std::{env, fs, io, path::Path};
use tracing::{debug, warn};

use crate::errors::SettingsErrorKind;

/// Parses `KEY=VALUE` lines.
///
/// Blank lines, `#` comments and lines without `=` are skipped.
/// Keys and values are trimmed and quotes around values are removed.
#[must_use]
pub fn parse_env(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches(|c| c == '\'' || c == '"');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Reads and parses an env file
///
/// # Errors
/// [`SettingsErrorKind::Io`] if the file can't be read
pub fn read_env_file(path: impl AsRef<Path>) -> Result<BTreeMap<String, String>, SettingsErrorKind> {
    let content = fs::read_to_string(path)?;
    Ok(parse_env(&content))
}

/// Sets the variables of an env file in the process environment, returning how many were set.
///
/// Variables that are already set aren't overwritten. A missing file only emits a warning.
///
/// # Errors
/// [`SettingsErrorKind::Io`] if the file exists, but can't be read
pub fn load_env_file(path: impl AsRef<Path>) -> Result<usize, SettingsErrorKind> {
    let path = path.as_ref();
    let vars = match read_env_file(path) {
        Ok(vars) => vars,
        Err(SettingsErrorKind::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Env file not found");
            return Ok(0);
        }
        Err(err) => return Err(err),
    };

    let mut loaded = 0;
    for (key, value) in vars {
        if env::var_os(&key).is_none() {
            env::set_var(&key, value);
            loaded += 1;
        }
    }

    debug!(path = %path.display(), loaded, "Env file loaded");
    Ok(loaded)
}
