use alloc::boxed::Box;
use core::{any::Any, future::Future};
use tracing::{debug, error, warn};

use crate::{errors::InstantiateErrorKind, key::Key, resource::Exit, utils::future::BoxFuture};

/// Asynchronous scoped resource.
///
/// Same contract as [`crate::Resource`], but both steps are awaited by the injected call.
///
/// [`AsyncResource::abort`] is called instead of [`AsyncResource::release`]
/// when the injected future is dropped before the release could run, e.g. on cancellation.
/// It can't await, so it's the place for best-effort synchronous cleanup only.
///
/// # Examples
/// ```rust
/// use skuf::{AsyncResource, Exit, InstantiateErrorKind};
///
/// struct Transaction;
///
/// struct UnitOfWork;
///
/// impl AsyncResource for UnitOfWork {
///     type Target = Transaction;
///
///     async fn acquire(&mut self) -> Result<Transaction, InstantiateErrorKind> {
///         Ok(Transaction)
///     }
///
///     async fn release(self, exit: Exit<'_>) -> Result<(), InstantiateErrorKind> {
///         if exit.is_ok() {
///             // commit
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait AsyncResource: Send + 'static {
    type Target: Send + 'static;

    fn acquire(&mut self) -> impl Future<Output = Result<Self::Target, InstantiateErrorKind>> + Send;

    fn release(self, exit: Exit<'_>) -> impl Future<Output = Result<(), InstantiateErrorKind>> + Send;

    #[inline]
    fn abort(self)
    where
        Self: Sized,
    {
    }
}

pub(crate) trait ErasedAsyncResource: Send {
    fn acquire(&mut self) -> BoxFuture<'_, Result<Box<dyn Any + Send>, InstantiateErrorKind>>;

    fn release<'a>(self: Box<Self>, exit: Exit<'a>) -> BoxFuture<'a, Result<(), InstantiateErrorKind>>;

    fn abort(self: Box<Self>);
}

impl<R: AsyncResource> ErasedAsyncResource for R {
    #[inline]
    fn acquire(&mut self) -> BoxFuture<'_, Result<Box<dyn Any + Send>, InstantiateErrorKind>> {
        Box::pin(async move {
            let target = AsyncResource::acquire(self).await?;
            Ok::<_, InstantiateErrorKind>(Box::new(target) as Box<dyn Any + Send>)
        })
    }

    #[inline]
    fn release<'a>(self: Box<Self>, exit: Exit<'a>) -> BoxFuture<'a, Result<(), InstantiateErrorKind>> {
        Box::pin(AsyncResource::release(*self, exit))
    }

    #[inline]
    fn abort(self: Box<Self>) {
        AsyncResource::abort(*self);
    }
}

/// Async counterpart of [`crate::resource::ReleaseGuard`].
/// If dropped before the release, the resource is aborted.
pub(crate) struct AsyncReleaseGuard {
    resource: Option<Box<dyn ErasedAsyncResource>>,
    key: Key,
}

impl AsyncReleaseGuard {
    #[inline]
    #[must_use]
    pub(crate) fn new(resource: Box<dyn ErasedAsyncResource>, key: Key) -> Self {
        Self {
            resource: Some(resource),
            key,
        }
    }

    pub(crate) async fn acquire(
        mut resource: Box<dyn ErasedAsyncResource>,
        key: Key,
    ) -> Result<(Box<dyn Any + Send>, Self), InstantiateErrorKind> {
        match resource.acquire().await {
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

    pub(crate) async fn release(mut self, exit: Exit<'_>) -> Result<(), InstantiateErrorKind> {
        let Some(resource) = self.resource.take() else {
            return Ok(());
        };
        match resource.release(exit).await {
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

impl Drop for AsyncReleaseGuard {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            warn!(key = %self.key, "Resource wasn't released, aborting");
            resource.abort();
        }
    }
}
