use alloc::boxed::Box;
use core::{
    any::Any,
    fmt::{self, Debug, Formatter},
};

use crate::{any::TypeInfo, config::Config, errors::ResolveErrorKind, key::Key, resource::ErasedResource};
#[cfg(feature = "async")]
use crate::r#async::{resource::ErasedAsyncResource, stream::BoxStream};

pub(crate) enum ResolvedKind {
    Value(Box<dyn Any + Send>),
    Resource(Box<dyn ErasedResource>),
    #[cfg(feature = "async")]
    AsyncResource(Box<dyn ErasedAsyncResource>),
    #[cfg(feature = "async")]
    Stream(BoxStream),
}

/// What a producer returned for a key, before anything is acquired from it.
///
/// Use [`crate::inspector::classify`] to find out its shape.
pub struct Resolved {
    pub(crate) key: Key,
    pub(crate) provides: TypeInfo,
    pub(crate) config: Config,
    pub(crate) kind: ResolvedKind,
}

impl Resolved {
    #[inline]
    #[must_use]
    pub const fn key(&self) -> Key {
        self.key
    }

    /// Type of the value, or of the object a resource or stream yields
    #[inline]
    #[must_use]
    pub const fn provides(&self) -> TypeInfo {
        self.provides
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Extracts a plain value.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::UnsupportedShape`] if a resource or stream was produced
    /// - [`ResolveErrorKind::IncorrectType`] if the value isn't of type `T`
    pub fn into_value<T: 'static>(self) -> Result<T, ResolveErrorKind> {
        let shape = crate::inspector::classify(&self);
        let ResolvedKind::Value(value) = self.kind else {
            return Err(ResolveErrorKind::UnsupportedShape { key: self.key, shape });
        };
        downcast(value, self.key, TypeInfo::of::<T>(), self.provides)
    }
}

impl Debug for Resolved {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("key", &self.key)
            .field("provides", &self.provides.name)
            .field("shape", &crate::inspector::classify(self))
            .finish_non_exhaustive()
    }
}

/// `actual` is the type the value was registered with
pub(crate) fn downcast<T: 'static>(
    value: Box<dyn Any + Send>,
    key: Key,
    expected: TypeInfo,
    actual: TypeInfo,
) -> Result<T, ResolveErrorKind> {
    match value.downcast::<T>() {
        Ok(value) => Ok(*value),
        Err(_) => Err(ResolveErrorKind::IncorrectType { key, expected, actual }),
    }
}

#[cfg(test)]
mod tests {
    use super::{Resolved, ResolvedKind};
    use crate::{any::TypeInfo, config::Config, errors::ResolveErrorKind, key::Key};

    use alloc::{boxed::Box, string::ToString as _};

    fn value(val: u8) -> Resolved {
        Resolved {
            key: Key::of::<u8>(),
            provides: TypeInfo::of::<u8>(),
            config: Config::default(),
            kind: ResolvedKind::Value(Box::new(val)),
        }
    }

    #[test]
    fn test_into_value() {
        assert_eq!(value(3).into_value::<u8>().unwrap(), 3);
        assert!(matches!(
            value(3).into_value::<u16>(),
            Err(ResolveErrorKind::IncorrectType { expected, actual, .. })
                if expected == TypeInfo::of::<u16>() && actual == TypeInfo::of::<u8>()
        ));
        assert_eq!(
            value(3).into_value::<u16>().unwrap_err().to_string(),
            "Incorrect type produced for u8. Actual: u8, expected: u16"
        );
    }
}
