use alloc::{boxed::Box, string::String};
use core::{
    any::Any,
    fmt::{self, Debug, Display, Formatter},
};
use tracing::{debug, error, warn};

use crate::{errors::InstantiateErrorKind, key::Key};

/// How the use of an acquired resource ended
#[derive(Clone, Copy)]
pub enum Exit<'a> {
    /// The call returned successfully
    Completed,
    /// The call failed with this error, which is propagated to the caller after the release.
    /// It's the error's rendered message, so the error type itself only needs `Display`.
    Failed(&'a (dyn Display + Sync)),
    /// The call didn't finish: it panicked or its future was dropped
    Aborted,
}

impl<'a> Exit<'a> {
    /// `Failed` with the message of the call's error if there is one, `Completed` otherwise
    #[inline]
    #[must_use]
    pub(crate) fn from_failure(failure: Option<&'a String>) -> Self {
        match failure {
            Some(message) => Self::Failed(message),
            None => Self::Completed,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Completed)
    }

    #[inline]
    #[must_use]
    pub const fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

impl Debug for Exit<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("Completed"),
            Self::Failed(err) => f.debug_tuple("Failed").field(&format_args!("{err}")).finish(),
            Self::Aborted => f.write_str("Aborted"),
        }
    }
}

/// Synchronous scoped resource.
///
/// The object returned by [`Resource::acquire`] is what gets injected, not the resource itself.
/// [`Resource::release`] runs exactly once after the injected call, whatever its outcome.
/// Returning an error from it doesn't suppress the call's own error.
///
/// # Examples
/// ```rust
/// use skuf::{Exit, InstantiateErrorKind, Resource};
///
/// struct Connection;
///
/// struct Pool;
///
/// impl Resource for Pool {
///     type Target = Connection;
///
///     fn acquire(&mut self) -> Result<Connection, InstantiateErrorKind> {
///         Ok(Connection)
///     }
///
///     fn release(self, exit: Exit<'_>) -> Result<(), InstantiateErrorKind> {
///         if exit.is_err() {
///             // rollback
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Resource: Send + 'static {
    type Target: Send + 'static;

    fn acquire(&mut self) -> Result<Self::Target, InstantiateErrorKind>;

    fn release(self, exit: Exit<'_>) -> Result<(), InstantiateErrorKind>;
}

pub(crate) trait ErasedResource: Send {
    fn acquire(&mut self) -> Result<Box<dyn Any + Send>, InstantiateErrorKind>;

    fn release(self: Box<Self>, exit: Exit<'_>) -> Result<(), InstantiateErrorKind>;
}

impl<R: Resource> ErasedResource for R {
    #[inline]
    fn acquire(&mut self) -> Result<Box<dyn Any + Send>, InstantiateErrorKind> {
        Ok(Box::new(Resource::acquire(self)?) as _)
    }

    #[inline]
    fn release(self: Box<Self>, exit: Exit<'_>) -> Result<(), InstantiateErrorKind> {
        Resource::release(*self, exit)
    }
}

/// Owns an acquired resource until it's released.
/// If dropped before that, e.g. while unwinding, the resource is released with [`Exit::Aborted`].
pub(crate) struct ReleaseGuard {
    resource: Option<Box<dyn ErasedResource>>,
    key: Key,
}

impl ReleaseGuard {
    #[inline]
    #[must_use]
    pub(crate) fn new(resource: Box<dyn ErasedResource>, key: Key) -> Self {
        Self {
            resource: Some(resource),
            key,
        }
    }

    /// Acquires the resource, the returned guard owns it from then on
    pub(crate) fn acquire(
        mut resource: Box<dyn ErasedResource>,
        key: Key,
    ) -> Result<(Box<dyn Any + Send>, Self), InstantiateErrorKind> {
        match resource.acquire() {
            Ok(acquired) => {
                debug!(%key, "Acquired");
                Ok((acquired, Self::new(resource, key)))
            }
            Err(err) => {
                error!(%key, "{}", err);
                Err(err)
            }
        }
    }

    pub(crate) fn release(mut self, exit: Exit<'_>) -> Result<(), InstantiateErrorKind> {
        let Some(resource) = self.resource.take() else {
            return Ok(());
        };
        match resource.release(exit) {
            Ok(()) => {
                debug!(key = %self.key, ?exit, "Released");
                Ok(())
            }
            Err(err) => {
                error!(key = %self.key, "{}", err);
                Err(err)
            }
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            warn!(key = %self.key, "Resource wasn't released, releasing as aborted");
            if let Err(err) = resource.release(Exit::Aborted) {
                error!(key = %self.key, "{}", err);
            }
        }
    }
}
