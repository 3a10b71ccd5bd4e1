use alloc::{boxed::Box, vec::Vec};
use core::{
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
};

use crate::{
    errors::InstantiateErrorKind,
    producer::{boxed_producer, instance, BoxedCloneProducer, Producer},
    resolved::ResolvedKind,
    resource::Resource,
};
#[cfg(feature = "async")]
use crate::r#async::{resource::AsyncResource, stream::boxed_stream};

/// Kind of a producer, ordered by registration priority: the lowest kind supplied wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProducerKind {
    Instance,
    Factory,
    Resource,
    AsyncResource,
    Stream,
    Default,
}

#[derive(Clone)]
pub(crate) struct Candidate {
    pub(crate) kind: ProducerKind,
    pub(crate) producer: BoxedCloneProducer,
}

/// Producers offered for one key.
///
/// Several alternatives may be supplied at once,
/// only the one with the highest [`ProducerKind`] priority gets registered:
/// instance > factory > resource > async resource > stream > default.
///
/// # Examples
/// ```rust
/// use skuf::{Key, Options, Registry};
///
/// let registry = Registry::new();
/// registry.register(
///     Key::named("retries"),
///     Options::factory(|| Ok(3u8)).with_instance(5u8),
/// );
///
/// assert_eq!(registry.get::<u8>(&Key::named("retries")).unwrap(), 5);
/// ```
pub struct Options<T> {
    first: Candidate,
    rest: Vec<Candidate>,
    _provides: PhantomData<fn() -> T>,
}

fn value_kind<T: Send + 'static>(val: T) -> ResolvedKind {
    ResolvedKind::Value(Box::new(val))
}

fn resource_kind<R: Resource>(resource: R) -> ResolvedKind {
    ResolvedKind::Resource(Box::new(resource))
}

#[cfg(feature = "async")]
fn async_resource_kind<R: AsyncResource>(resource: R) -> ResolvedKind {
    ResolvedKind::AsyncResource(Box::new(resource))
}

#[cfg(feature = "async")]
fn stream_kind<S, T>(stream: S) -> ResolvedKind
where
    S: futures_core::Stream<Item = Result<T, InstantiateErrorKind>> + Send + 'static,
    T: Send + 'static,
{
    ResolvedKind::Stream(boxed_stream(stream))
}

impl<T: Send + 'static> Options<T> {
    #[inline]
    fn from_candidate(kind: ProducerKind, producer: BoxedCloneProducer) -> Self {
        Self {
            first: Candidate { kind, producer },
            rest: Vec::new(),
            _provides: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    fn with_candidate(mut self, kind: ProducerKind, producer: BoxedCloneProducer) -> Self {
        self.rest.push(Candidate { kind, producer });
        self
    }

    /// Fixed value, cloned on every resolution
    #[inline]
    #[must_use]
    pub fn instance(val: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_candidate(ProducerKind::Instance, boxed_producer(instance(val), value_kind::<T>))
    }

    /// Function called on every resolution
    #[inline]
    #[must_use]
    #[allow(private_bounds)]
    pub fn factory<P>(factory: P) -> Self
    where
        P: Producer<Provides = T, Error = InstantiateErrorKind>,
    {
        Self::from_candidate(ProducerKind::Factory, boxed_producer(factory, value_kind::<T>))
    }

    /// Function returning a [`Resource`] that is acquired and released around each injected call
    #[inline]
    #[must_use]
    #[allow(private_bounds)]
    pub fn resource<P, R>(factory: P) -> Self
    where
        P: Producer<Provides = R, Error = InstantiateErrorKind>,
        R: Resource<Target = T>,
    {
        Self::from_candidate(ProducerKind::Resource, boxed_producer(factory, resource_kind::<R>))
    }

    #[cfg(feature = "async")]
    #[inline]
    #[must_use]
    #[allow(private_bounds)]
    pub fn async_resource<P, R>(factory: P) -> Self
    where
        P: Producer<Provides = R, Error = InstantiateErrorKind>,
        R: AsyncResource<Target = T>,
    {
        Self::from_candidate(ProducerKind::AsyncResource, boxed_producer(factory, async_resource_kind::<R>))
    }

    /// Function returning a stream. Only its first value is injected.
    /// What happens with the rest is decided by [`crate::Config::stream_policy`].
    #[cfg(feature = "async")]
    #[inline]
    #[must_use]
    #[allow(private_bounds)]
    pub fn stream<P, S>(factory: P) -> Self
    where
        P: Producer<Provides = S, Error = InstantiateErrorKind>,
        S: futures_core::Stream<Item = Result<T, InstantiateErrorKind>> + Send + 'static,
    {
        Self::from_candidate(ProducerKind::Stream, boxed_producer(factory, stream_kind::<S, T>))
    }

    #[inline]
    #[must_use]
    pub fn with_instance(self, val: T) -> Self
    where
        T: Clone + Sync,
    {
        self.with_candidate(ProducerKind::Instance, boxed_producer(instance(val), value_kind::<T>))
    }

    #[inline]
    #[must_use]
    #[allow(private_bounds)]
    pub fn with_factory<P>(self, factory: P) -> Self
    where
        P: Producer<Provides = T, Error = InstantiateErrorKind>,
    {
        self.with_candidate(ProducerKind::Factory, boxed_producer(factory, value_kind::<T>))
    }

    #[inline]
    #[must_use]
    #[allow(private_bounds)]
    pub fn with_resource<P, R>(self, factory: P) -> Self
    where
        P: Producer<Provides = R, Error = InstantiateErrorKind>,
        R: Resource<Target = T>,
    {
        self.with_candidate(ProducerKind::Resource, boxed_producer(factory, resource_kind::<R>))
    }

    #[cfg(feature = "async")]
    #[inline]
    #[must_use]
    #[allow(private_bounds)]
    pub fn with_async_resource<P, R>(self, factory: P) -> Self
    where
        P: Producer<Provides = R, Error = InstantiateErrorKind>,
        R: AsyncResource<Target = T>,
    {
        self.with_candidate(ProducerKind::AsyncResource, boxed_producer(factory, async_resource_kind::<R>))
    }

    #[cfg(feature = "async")]
    #[inline]
    #[must_use]
    #[allow(private_bounds)]
    pub fn with_stream<P, S>(self, factory: P) -> Self
    where
        P: Producer<Provides = S, Error = InstantiateErrorKind>,
        S: futures_core::Stream<Item = Result<T, InstantiateErrorKind>> + Send + 'static,
    {
        self.with_candidate(ProducerKind::Stream, boxed_producer(factory, stream_kind::<S, T>))
    }

    /// Adds `T::default()` as the lowest priority alternative
    #[inline]
    #[must_use]
    pub fn with_default(self) -> Self
    where
        T: Default,
    {
        self.with_candidate(ProducerKind::Default, default_producer::<T>())
    }

    /// Kind that wins the registration
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ProducerKind {
        self.rest
            .iter()
            .fold(self.first.kind, |kind, candidate| kind.min(candidate.kind))
    }

    /// Picks the highest priority candidate. The later one wins among candidates of the same kind.
    pub(crate) fn select(self) -> Candidate {
        self.rest
            .into_iter()
            .fold(self.first, |selected, candidate| {
                if candidate.kind <= selected.kind {
                    candidate
                } else {
                    selected
                }
            })
    }
}

fn default_producer<T: Default + Send + 'static>() -> BoxedCloneProducer {
    boxed_producer(|| Ok::<_, InstantiateErrorKind>(T::default()), value_kind::<T>)
}

impl<T: Default + Send + 'static> Default for Options<T> {
    /// Construction with `T::default()` on every resolution
    #[inline]
    fn default() -> Self {
        Self::from_candidate(ProducerKind::Default, default_producer::<T>())
    }
}

impl<T> Debug for Options<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entry(&self.first.kind)
            .entries(self.rest.iter().map(|candidate| candidate.kind))
            .finish()
    }
}
