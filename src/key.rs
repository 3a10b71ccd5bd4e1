use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// Identifier a producer is registered under.
///
/// Most dependencies are keyed by their type with [`Key::of`].
/// [`Key::named`] allows several producers of the same type, e.g. two connection strings,
/// at the cost of checking the produced type at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    Type(TypeInfo),
    Named(&'static str),
}

impl Key {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    #[inline]
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self::Named(name)
    }

    /// Type the key stands for, if it's keyed by type
    #[inline]
    #[must_use]
    pub const fn type_info(&self) -> Option<TypeInfo> {
        match self {
            Self::Type(info) => Some(*info),
            Self::Named(_) => None,
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(info) => write!(f, "{}", info.short_name()),
            Self::Named(name) => write!(f, "\"{name}\""),
        }
    }
}
