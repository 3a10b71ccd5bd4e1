use alloc::{boxed::Box, sync::Arc};
use core::{any::type_name, fmt::Display, future::Future};
use tracing::{debug, debug_span, error, Instrument as _};

use super::{
    resource::AsyncReleaseGuard,
    service::fn_service,
    stream::{drain, next},
};
use crate::{
    any::TypeInfo,
    arguments::Arguments,
    config::StreamPolicy,
    errors::{InjectErrorKind, ResolveErrorKind, WrapErrorKind},
    injector::{failure, merge, Binding, Injector},
    key::Key,
    registry::Registry,
    resolved::ResolvedKind,
    resource::{Exit, ReleaseGuard},
    service::{BoxCloneService, Service as _},
    signature::Signature,
    utils::future::BoxFuture,
};

pub(crate) type BoxedCloneAsyncTarget<Out, E> =
    BoxCloneService<Arguments, Out, InjectErrorKind<E>, BoxFuture<'static, Result<Out, InjectErrorKind<E>>>>;

fn target_service<F, Fut, Out, E>(mut target: F, signature: Arc<Signature>) -> BoxedCloneAsyncTarget<Out, E>
where
    F: FnMut(Arguments) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, E>> + Send + 'static,
    Out: Send + 'static,
    E: Send + 'static,
{
    BoxCloneService::new(fn_service(
        move |mut args: Arguments| -> BoxFuture<'static, Result<Out, InjectErrorKind<E>>> {
            if let Err(err) = args.bind(&signature) {
                return Box::pin(async move { Err::<Out, _>(InjectErrorKind::Bind(err)) });
            }

            let fut = target(args);
            Box::pin(async move { fut.await.map_err(InjectErrorKind::Target) })
        },
    ))
}

fn inject_layer<Out, E>(inner: BoxedCloneAsyncTarget<Out, E>, registry: Arc<Registry>, binding: Binding) -> BoxedCloneAsyncTarget<Out, E>
where
    Out: Send + 'static,
    E: Display + Send + 'static,
{
    BoxCloneService::new(fn_service(
        move |args: Arguments| -> BoxFuture<'static, Result<Out, InjectErrorKind<E>>> {
            let span = debug_span!("inject", param = binding.param, key = %binding.key);
            Box::pin(inject(inner.clone(), registry.clone(), binding, args).instrument(span))
        },
    ))
}

async fn inject<Out, E>(
    mut inner: BoxedCloneAsyncTarget<Out, E>,
    registry: Arc<Registry>,
    binding: Binding,
    mut args: Arguments,
) -> Result<Out, InjectErrorKind<E>>
where
    Out: Send + 'static,
    E: Display + Send + 'static,
{
    let resolved = registry.resolve(&binding.key)?;
    if binding.is_supplied(&args) {
        debug!("Skipped, supplied positionally");
        return inner.call(args).await;
    }
    binding.check(&resolved)?;

    let config = resolved.config;
    match resolved.kind {
        ResolvedKind::Value(val) => {
            if args.contains(binding.param) {
                debug!("Skipped, supplied by name");
            } else {
                args.insert_boxed(binding.param, val);
                debug!("Injected");
            }
            inner.call(args).await
        }
        ResolvedKind::Resource(resource) => {
            let (acquired, guard) = ReleaseGuard::acquire(resource, binding.key).map_err(ResolveErrorKind::Instantiate)?;
            args.insert_boxed(binding.param, acquired);

            let result = inner.call(args).await;
            let failed = failure(&result);
            merge(result, guard.release(Exit::from_failure(failed.as_ref())))
        }
        ResolvedKind::AsyncResource(resource) => {
            let (acquired, guard) = AsyncReleaseGuard::acquire(resource, binding.key)
                .await
                .map_err(ResolveErrorKind::Instantiate)?;
            args.insert_boxed(binding.param, acquired);

            let result = inner.call(args).await;
            let failed = failure(&result);
            merge(result, guard.release(Exit::from_failure(failed.as_ref())).await)
        }
        ResolvedKind::Stream(mut stream) => {
            let acquired = match next(&mut stream).await {
                Some(Ok(acquired)) => acquired,
                Some(Err(err)) => {
                    error!("{}", err);
                    return Err(ResolveErrorKind::Instantiate(err).into());
                }
                None => {
                    let err = ResolveErrorKind::EmptyStream { key: binding.key };
                    error!("{}", err);
                    return Err(err.into());
                }
            };
            args.insert_boxed(binding.param, acquired);
            debug!("Acquired first value");

            let result = inner.call(args).await;
            match config.stream_policy {
                StreamPolicy::Drain => merge(result, drain(stream, binding.key).await),
                StreamPolicy::Abandon => {
                    drop(stream);
                    debug!("Abandoned");
                    result
                }
            }
        }
    }
}

/// Async callable with dependencies injected into its parameters
pub struct AsyncInjected<Out, E> {
    registry: Arc<Registry>,
    signature: Arc<Signature>,
    service: BoxedCloneAsyncTarget<Out, E>,
}

impl<Out, E> Clone for AsyncInjected<Out, E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            signature: self.signature.clone(),
            service: self.service.clone(),
        }
    }
}

impl<Out, E> AsyncInjected<Out, E>
where
    Out: Send + 'static,
    E: Display + Send + 'static,
{
    /// Calls the target once.
    ///
    /// Dropping the returned future releases sync resources with [`Exit::Aborted`]
    /// and calls [`crate::AsyncResource::abort`] for async ones.
    ///
    /// # Errors
    /// Same as [`crate::Injected::call`], plus
    /// [`ResolveErrorKind::EmptyStream`] if a stream ended before its first value
    #[inline]
    pub fn call(&mut self, args: Arguments) -> impl Future<Output = Result<Out, InjectErrorKind<E>>> + Send + 'static {
        self.service.call(args)
    }

    /// Injects one more parameter. Its position is taken from the target's signature.
    ///
    /// # Errors
    /// [`WrapErrorKind::UnknownParameter`] if `param` isn't declared
    pub fn bind(self, param: &'static str, key: Key) -> Result<Self, WrapErrorKind> {
        let binding = Binding::new(&self.signature, param, key, None)?;
        Ok(self.layer(binding))
    }

    pub fn bind_as<T: 'static>(self, param: &'static str, key: Key) -> Result<Self, WrapErrorKind> {
        let binding = Binding::new(&self.signature, param, key, Some(TypeInfo::of::<T>()))?;
        Ok(self.layer(binding))
    }

    fn layer(self, binding: Binding) -> Self {
        debug!(param = binding.param, key = %binding.key, "Bound");
        Self {
            service: inject_layer(self.service, self.registry.clone(), binding),
            registry: self.registry,
            signature: self.signature,
        }
    }
}

impl Injector {
    /// Wraps an asynchronous target.
    ///
    /// # Errors
    /// [`WrapErrorKind::UnknownParameter`] if a bound parameter isn't declared in the signature
    pub fn build_async<F, Fut, Out, E>(self, target: F) -> Result<AsyncInjected<Out, E>, WrapErrorKind>
    where
        F: FnMut(Arguments) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<Out, E>> + Send + 'static,
        Out: Send + 'static,
        E: Display + Send + 'static,
    {
        let _guard = debug_span!("build", target = type_name::<F>()).entered();

        let bindings = self.bindings()?;
        let injected = AsyncInjected {
            service: target_service(target, self.signature.clone()),
            registry: self.registry,
            signature: self.signature,
        };

        Ok(bindings.into_iter().rev().fold(injected, AsyncInjected::layer))
    }
}

/// Async counterpart of [`crate::wrap`]
///
/// # Errors
/// [`WrapErrorKind::UnknownParameter`] if `param` isn't declared in `signature`
pub fn wrap_async<F, Fut, Out, E>(
    registry: Arc<Registry>,
    signature: Signature,
    target: F,
    param: &'static str,
    key: Key,
) -> Result<AsyncInjected<Out, E>, WrapErrorKind>
where
    F: FnMut(Arguments) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<Out, E>> + Send + 'static,
    Out: Send + 'static,
    E: Display + Send + 'static,
{
    Injector::new(registry, signature).bind(param, key).build_async(target)
}
