//! Classification of resolved values.
//!
//! A resolved value has exactly one shape. When a value could be seen as more than one,
//! e.g. a type implementing both resource traits, it's classified by the registration it came from,
//! so the order of [`Shape`] variants only matters for comparisons.

use core::fmt::{self, Display, Formatter};

use crate::resolved::{Resolved, ResolvedKind};

/// Shape of a resolved value, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shape {
    /// Synchronous scoped resource
    Resource,
    /// Asynchronous scoped resource
    AsyncResource,
    /// Asynchronous multi-value stream, only the first value is used
    Stream,
    /// Plain value, injected as is
    Value,
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resource => "a resource",
            Self::AsyncResource => "an async resource",
            Self::Stream => "a stream",
            Self::Value => "a plain value",
        })
    }
}

#[must_use]
pub fn classify(resolved: &Resolved) -> Shape {
    match resolved.kind {
        ResolvedKind::Resource(_) => Shape::Resource,
        #[cfg(feature = "async")]
        ResolvedKind::AsyncResource(_) => Shape::AsyncResource,
        #[cfg(feature = "async")]
        ResolvedKind::Stream(_) => Shape::Stream,
        ResolvedKind::Value(_) => Shape::Value,
    }
}

#[inline]
#[must_use]
pub fn is_value(resolved: Option<&Resolved>) -> bool {
    resolved.is_some_and(|resolved| classify(resolved) == Shape::Value)
}

#[inline]
#[must_use]
pub fn is_resource(resolved: Option<&Resolved>) -> bool {
    resolved.is_some_and(|resolved| classify(resolved) == Shape::Resource)
}

#[inline]
#[must_use]
pub fn is_async_resource(resolved: Option<&Resolved>) -> bool {
    resolved.is_some_and(|resolved| classify(resolved) == Shape::AsyncResource)
}

#[inline]
#[must_use]
pub fn is_stream(resolved: Option<&Resolved>) -> bool {
    resolved.is_some_and(|resolved| classify(resolved) == Shape::Stream)
}
