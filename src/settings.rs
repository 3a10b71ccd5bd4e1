//! Typed settings read from the environment.
//!
//! The registry doesn't depend on this module, a [`ConfigSource`] is all a producer needs to read configuration.

mod loader;
mod parser;

pub use loader::{load_env_file, parse_env, read_env_file};
pub use parser::FromSetting;

use alloc::{
    boxed::Box,
    collections::BTreeMap,
    string::{String, ToString as _},
};
use core::any::Any;
use parking_lot::Mutex;
use std::{env, path::Path};
use tracing::{debug, error};

use crate::errors::SettingsErrorKind;

/// Source of raw configuration values
pub trait ConfigSource {
    fn get_config_value(&self, name: &str) -> Option<String>;
}

/// Process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct Env;

impl ConfigSource for Env {
    #[inline]
    fn get_config_value(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

impl ConfigSource for BTreeMap<String, String> {
    #[inline]
    fn get_config_value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<F> ConfigSource for F
where
    F: Fn(&str) -> Option<String>,
{
    #[inline]
    fn get_config_value(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Lazily parsed settings.
///
/// A setting named `retries` is read from `RETRIES` on first access and cached.
///
/// # Examples
/// ```rust
/// use std::collections::BTreeMap;
/// use skuf::settings::Settings;
///
/// let source = BTreeMap::from([
///     ("RETRIES".to_owned(), "3".to_owned()),
///     ("SERVERS".to_owned(), "a, b".to_owned()),
/// ]);
/// let settings = Settings::new(source);
///
/// assert_eq!(settings.get::<u8>("retries").unwrap(), 3);
/// assert_eq!(settings.get::<Vec<String>>("servers").unwrap(), ["a", "b"]);
/// ```
pub struct Settings<S = Env> {
    source: S,
    values: Mutex<BTreeMap<String, Box<dyn Any + Send + Sync>>>,
}

impl Settings {
    /// Settings read from the process environment, after loading the env file at `path`
    ///
    /// # Errors
    /// [`SettingsErrorKind::Io`] if the file exists, but can't be read
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, SettingsErrorKind> {
        load_env_file(path)?;
        Ok(Self::new(Env))
    }
}

impl<S: ConfigSource> Settings<S> {
    #[inline]
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self {
            source,
            values: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the setting, reading and parsing it if it isn't loaded yet.
    ///
    /// # Errors
    /// - [`SettingsErrorKind::NotSet`] if the source has no value or a blank one
    /// - [`SettingsErrorKind::Parse`] if the value isn't a valid `T`
    pub fn get<T>(&self, name: &str) -> Result<T, SettingsErrorKind>
    where
        T: FromSetting + Clone + Send + Sync + 'static,
    {
        if let Some(val) = self.values.lock().get(name).and_then(|val| val.downcast_ref::<T>()) {
            return Ok(val.clone());
        }

        let env_name = name.to_uppercase();
        let raw = match self.source.get_config_value(&env_name) {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                let err = SettingsErrorKind::NotSet { name: env_name };
                error!("{}", err);
                return Err(err);
            }
        };

        let val = match T::from_setting(&raw) {
            Ok(val) => val,
            Err(reason) => {
                let err = SettingsErrorKind::Parse {
                    name: env_name,
                    value: raw,
                    reason,
                };
                error!("{}", err);
                return Err(err);
            }
        };

        debug!(name, "Setting loaded");
        self.values.lock().insert(name.to_string(), Box::new(val.clone()));
        Ok(val)
    }

    /// Overrides the setting, the source isn't read for it anymore
    pub fn set<T: Send + Sync + 'static>(&self, name: &str, val: T) {
        self.values.lock().insert(name.to_string(), Box::new(val));
    }

    /// Whether the setting was already read or set
    #[inline]
    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.values.lock().contains_key(name)
    }

    #[inline]
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }
}
