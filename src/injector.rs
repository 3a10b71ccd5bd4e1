use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::{any::type_name, fmt::Display};
use tracing::{debug, debug_span, error};

use crate::{
    any::TypeInfo,
    arguments::Arguments,
    errors::{InjectErrorKind, InstantiateErrorKind, ResolveErrorKind, WrapErrorKind},
    key::Key,
    registry::Registry,
    resolved::{Resolved, ResolvedKind},
    resource::{Exit, ReleaseGuard},
    service::{service_fn, BoxCloneService, Service as _},
    signature::Signature,
};
#[cfg(feature = "async")]
use crate::inspector::Shape;

/// One parameter to inject, located against the target's signature
#[derive(Debug, Clone, Copy)]
pub(crate) struct Binding {
    pub(crate) param: &'static str,
    pub(crate) key: Key,
    pub(crate) position: Option<usize>,
    pub(crate) expected: Option<TypeInfo>,
}

impl Binding {
    pub(crate) fn new(
        signature: &Signature,
        param: &'static str,
        key: Key,
        expected: Option<TypeInfo>,
    ) -> Result<Self, WrapErrorKind> {
        if signature.get(param).is_none() {
            let err = WrapErrorKind::UnknownParameter { name: param };
            error!("{}", err);
            return Err(err);
        }

        Ok(Self {
            param,
            key,
            position: signature.position(param),
            expected: expected.or_else(|| key.type_info()),
        })
    }

    /// Whether the caller already supplied the parameter positionally
    #[inline]
    pub(crate) fn is_supplied(&self, args: &Arguments) -> bool {
        self.position.is_some_and(|position| args.positional_len() > position)
    }

    /// Fails if the producer declared another type than the expected one
    pub(crate) fn check(&self, resolved: &Resolved) -> Result<(), ResolveErrorKind> {
        match self.expected {
            Some(expected) if expected != resolved.provides => {
                let err = ResolveErrorKind::IncorrectType {
                    key: self.key,
                    expected,
                    actual: resolved.provides,
                };
                error!("{}", err);
                Err(err)
            }
            _ => Ok(()),
        }
    }
}

pub(crate) type BoxedCloneTarget<Out, E> = BoxCloneService<Arguments, Out, InjectErrorKind<E>>;

fn target_service<F, Out, E>(mut target: F, signature: Arc<Signature>) -> BoxedCloneTarget<Out, E>
where
    F: FnMut(Arguments) -> Result<Out, E> + Clone + Send + Sync + 'static,
    Out: 'static,
    E: 'static,
{
    BoxCloneService::new(service_fn(move |mut args: Arguments| {
        args.bind(&signature)?;
        target(args).map_err(InjectErrorKind::Target)
    }))
}

fn inject_layer<Out, E>(mut inner: BoxedCloneTarget<Out, E>, registry: Arc<Registry>, binding: Binding) -> BoxedCloneTarget<Out, E>
where
    Out: 'static,
    E: Display + 'static,
{
    BoxCloneService::new(service_fn(move |mut args: Arguments| {
        let _guard = debug_span!("inject", param = binding.param, key = %binding.key).entered();

        let resolved = registry.resolve(&binding.key)?;
        if binding.is_supplied(&args) {
            debug!("Skipped, supplied positionally");
            return inner.call(args);
        }
        binding.check(&resolved)?;

        match resolved.kind {
            ResolvedKind::Value(val) => {
                if args.contains(binding.param) {
                    debug!("Skipped, supplied by name");
                } else {
                    args.insert_boxed(binding.param, val);
                    debug!("Injected");
                }
                inner.call(args)
            }
            ResolvedKind::Resource(resource) => {
                let (acquired, guard) = ReleaseGuard::acquire(resource, binding.key).map_err(ResolveErrorKind::Instantiate)?;
                args.insert_boxed(binding.param, acquired);

                let result = inner.call(args);
                let failed = failure(&result);
                merge(result, guard.release(Exit::from_failure(failed.as_ref())))
            }
            #[cfg(feature = "async")]
            ResolvedKind::AsyncResource(_) => Err(unsupported(binding.key, Shape::AsyncResource).into()),
            #[cfg(feature = "async")]
            ResolvedKind::Stream(_) => Err(unsupported(binding.key, Shape::Stream).into()),
        }
    }))
}

#[cfg(feature = "async")]
fn unsupported(key: Key, shape: Shape) -> ResolveErrorKind {
    let err = ResolveErrorKind::UnsupportedShape { key, shape };
    error!("{}", err);
    err
}

/// The call's error rendered once, for the resource to see how the call ended
pub(crate) fn failure<Out, E: Display>(result: &Result<Out, InjectErrorKind<E>>) -> Option<String> {
    result.as_ref().err().map(ToString::to_string)
}

/// Merges the call's result with the outcome of the cleanup after it.
/// The call's error takes precedence, the cleanup one is already logged.
pub(crate) fn merge<Out, E>(
    result: Result<Out, InjectErrorKind<E>>,
    cleanup: Result<(), InstantiateErrorKind>,
) -> Result<Out, InjectErrorKind<E>> {
    match (result, cleanup) {
        (Ok(_), Err(err)) => Err(InjectErrorKind::Release(err)),
        (result, _) => result,
    }
}

/// Callable with dependencies injected into its parameters.
///
/// Cloning is cheap relative to a call and gives an independent callable sharing the registry.
pub struct Injected<Out, E> {
    registry: Arc<Registry>,
    signature: Arc<Signature>,
    service: BoxedCloneTarget<Out, E>,
}

impl<Out, E> Clone for Injected<Out, E> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            signature: self.signature.clone(),
            service: self.service.clone(),
        }
    }
}

impl<Out, E> Injected<Out, E>
where
    Out: 'static,
    E: Display + 'static,
{
    /// Calls the target once.
    ///
    /// # Errors
    /// - [`InjectErrorKind::Resolve`] if a dependency couldn't be resolved or acquired, the target isn't called then
    /// - [`InjectErrorKind::Bind`] if the arguments don't fit the signature
    /// - [`InjectErrorKind::Target`] with the target's own error, after the resources are released
    /// - [`InjectErrorKind::Release`] if the target succeeded, but a resource release failed
    #[inline]
    pub fn call(&mut self, args: Arguments) -> Result<Out, InjectErrorKind<E>> {
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

    /// Same as [`Injected::bind`], expecting the dependency to be of type `T`
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

/// Builder of injected callables.
///
/// # Examples
/// ```rust
/// use std::sync::Arc;
/// use skuf::{Arguments, Injector, Key, Options, Param, Registry, Signature};
///
/// struct Greeting(&'static str);
///
/// let registry = Arc::new(Registry::new());
/// registry.provide(Options::factory(|| Ok(Greeting("Hello"))));
///
/// let signature = Signature::new()
///     .param(Param::positional("name"))
///     .param(Param::positional("greeting").inject(Key::of::<Greeting>()));
///
/// let mut greet = Injector::new(registry, signature)
///     .scan()
///     .build(|mut args: Arguments| {
///         let name = args.take::<&str>("name").ok_or("name is missing")?;
///         let Greeting(greeting) = args.take::<Greeting>("greeting").ok_or("greeting is missing")?;
///         Ok::<_, &str>(format!("{greeting}, {name}!"))
///     })
///     .unwrap();
///
/// assert_eq!(greet.call(Arguments::new().with("world")).unwrap(), "Hello, world!");
/// ```
pub struct Injector {
    pub(crate) registry: Arc<Registry>,
    pub(crate) signature: Arc<Signature>,
    bindings: Vec<(&'static str, Key, Option<TypeInfo>)>,
}

impl Injector {
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<Registry>, signature: Signature) -> Self {
        Self {
            registry,
            signature: Arc::new(signature),
            bindings: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn bind(mut self, param: &'static str, key: Key) -> Self {
        self.bindings.push((param, key, None));
        self
    }

    /// Same as [`Injector::bind`], expecting the dependency to be of type `T`
    #[inline]
    #[must_use]
    pub fn bind_as<T: 'static>(mut self, param: &'static str, key: Key) -> Self {
        self.bindings.push((param, key, Some(TypeInfo::of::<T>())));
        self
    }

    /// Binds every parameter marked with [`crate::Param::inject`]
    #[must_use]
    pub fn scan(mut self) -> Self {
        let markers = self.signature.markers().collect::<Vec<_>>();
        for (param, key) in markers {
            self.bindings.push((param, key, None));
        }
        self
    }

    pub(crate) fn bindings(&self) -> Result<Vec<Binding>, WrapErrorKind> {
        self.bindings
            .iter()
            .map(|&(param, key, expected)| Binding::new(&self.signature, param, key, expected))
            .collect()
    }

    /// Wraps a synchronous target.
    ///
    /// # Errors
    /// [`WrapErrorKind::UnknownParameter`] if a bound parameter isn't declared in the signature
    pub fn build<F, Out, E>(self, target: F) -> Result<Injected<Out, E>, WrapErrorKind>
    where
        F: FnMut(Arguments) -> Result<Out, E> + Clone + Send + Sync + 'static,
        Out: 'static,
        E: Display + 'static,
    {
        let _guard = debug_span!("build", target = type_name::<F>()).entered();

        let bindings = self.bindings()?;
        let injected = Injected {
            service: target_service(target, self.signature.clone()),
            registry: self.registry,
            signature: self.signature,
        };

        // The first binding is resolved first
        Ok(bindings.into_iter().rev().fold(injected, Injected::layer))
    }
}

/// Wraps `target` so `param` gets the dependency registered for `key`.
///
/// # Errors
/// [`WrapErrorKind::UnknownParameter`] if `param` isn't declared in `signature`
pub fn wrap<F, Out, E>(
    registry: Arc<Registry>,
    signature: Signature,
    target: F,
    param: &'static str,
    key: Key,
) -> Result<Injected<Out, E>, WrapErrorKind>
where
    F: FnMut(Arguments) -> Result<Out, E> + Clone + Send + Sync + 'static,
    Out: 'static,
    E: Display + 'static,
{
    Injector::new(registry, signature).bind(param, key).build(target)
}
