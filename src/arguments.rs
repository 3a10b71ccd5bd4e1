use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};
use core::{
    any::Any,
    fmt::{self, Debug, Formatter},
    mem,
};
use tracing::error;

use crate::{errors::BindErrorKind, signature::Signature};

/// Arguments of an injected call: positional values followed by named ones.
///
/// Before the target runs, positional values are moved to the names of the positional parameters
/// they stand for, so the target reads every declared parameter by name.
/// Positional values beyond the declared parameters stay positional,
/// undeclared names stay as they are.
///
/// # Examples
/// ```rust
/// use skuf::Arguments;
///
/// let mut args = Arguments::new().with(1u32).with_named("verbose", true);
///
/// assert_eq!(args.positional_len(), 1);
/// assert_eq!(args.take::<bool>("verbose"), Some(true));
/// ```
#[derive(Default)]
pub struct Arguments {
    positional: Vec<Box<dyn Any + Send>>,
    named: BTreeMap<&'static str, Box<dyn Any + Send>>,
}

impl Arguments {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            positional: Vec::new(),
            named: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn push<T: Send + 'static>(&mut self, val: T) {
        self.positional.push(Box::new(val));
    }

    #[inline]
    #[must_use]
    pub fn with<T: Send + 'static>(mut self, val: T) -> Self {
        self.push(val);
        self
    }

    /// Sets a named value, returning `true` if it replaced another one
    #[inline]
    pub fn insert<T: Send + 'static>(&mut self, name: &'static str, val: T) -> bool {
        self.insert_boxed(name, Box::new(val))
    }

    #[inline]
    #[must_use]
    pub fn with_named<T: Send + 'static>(mut self, name: &'static str, val: T) -> Self {
        self.insert(name, val);
        self
    }

    #[inline]
    pub(crate) fn insert_boxed(&mut self, name: &'static str, val: Box<dyn Any + Send>) -> bool {
        self.named.insert(name, val).is_some()
    }

    #[inline]
    #[must_use]
    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    #[inline]
    #[must_use]
    pub fn get<T: 'static>(&self, name: &str) -> Option<&T> {
        self.named.get(name)?.downcast_ref()
    }

    #[inline]
    #[must_use]
    pub fn get_positional<T: 'static>(&self, index: usize) -> Option<&T> {
        self.positional.get(index)?.downcast_ref()
    }

    /// Removes a named value. A value of another type is left in place.
    pub fn take<T: 'static>(&mut self, name: &'static str) -> Option<T> {
        let val = self.named.remove(name)?;
        match val.downcast::<T>() {
            Ok(val) => Some(*val),
            Err(val) => {
                self.named.insert(name, val);
                None
            }
        }
    }

    /// Moves positional values to the names of the positional parameters of `signature`.
    ///
    /// # Errors
    /// [`BindErrorKind::MultipleValues`] if a parameter is given both positionally and by name
    pub fn bind(&mut self, signature: &Signature) -> Result<(), BindErrorKind> {
        let names = signature
            .positional()
            .take(self.positional.len())
            .map(|param| param.name())
            .collect::<Vec<_>>();

        if let Some(&name) = names.iter().find(|name| self.named.contains_key(**name)) {
            let err = BindErrorKind::MultipleValues { name };
            error!("{}", err);
            return Err(err);
        }

        let rest = self.positional.split_off(names.len());
        let bound = mem::replace(&mut self.positional, rest);
        self.named.extend(names.into_iter().zip(bound));

        Ok(())
    }
}

impl Debug for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments")
            .field("positional", &self.positional.len())
            .field("named", &self.named.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::Arguments;
    use crate::{
        errors::BindErrorKind,
        signature::{Param, Signature},
    };

    use alloc::{
        format,
        string::{String, ToString as _},
    };
    use tracing_test::traced_test;

    fn signature() -> Signature {
        Signature::new()
            .param(Param::positional("user_id"))
            .param(Param::positional("db"))
            .param(Param::named("verbose"))
    }

    #[test]
    fn test_take() {
        let mut args = Arguments::new().with_named("user_id", 1u32);

        assert_eq!(args.take::<u64>("user_id"), None);
        assert_eq!(args.get::<u32>("user_id"), Some(&1));
        assert_eq!(args.take::<u32>("user_id"), Some(1));
        assert!(!args.contains("user_id"));
    }

    #[test]
    fn test_bind() {
        let mut args = Arguments::new().with(1u32).with_named("verbose", true);
        args.bind(&signature()).unwrap();

        assert_eq!(args.positional_len(), 0);
        assert_eq!(args.get::<u32>("user_id"), Some(&1));
        assert!(!args.contains("db"));
        assert_eq!(args.get::<bool>("verbose"), Some(&true));
    }

    #[test]
    fn test_bind_extra_positional() {
        let mut args = Arguments::new().with(1u32).with("db").with('x');
        args.bind(&signature()).unwrap();

        assert_eq!(args.positional_len(), 1);
        assert_eq!(args.get_positional::<char>(0), Some(&'x'));
        assert_eq!(args.get::<&str>("db"), Some(&"db"));
    }

    #[test]
    #[traced_test]
    fn test_bind_multiple_values() {
        let mut args = Arguments::new().with(1u32).with_named("user_id", 2u32);

        assert_eq!(
            args.bind(&signature()),
            Err(BindErrorKind::MultipleValues { name: "user_id" })
        );
        assert!(logs_contain("Multiple values for parameter `user_id`"));
    }
}
