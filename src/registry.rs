use alloc::{collections::BTreeMap, sync::Arc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, debug_span, error, warn};

use crate::{
    any::TypeInfo,
    config::Config,
    errors::ResolveErrorKind,
    key::Key,
    options::{Candidate, Options, ProducerKind},
    producer::BoxedCloneProducer,
    resolved::Resolved,
    service::Service as _,
};

#[derive(Clone)]
struct ProducerData {
    // Called in place, so state a producer keeps between calls survives resolutions
    producer: Arc<Mutex<BoxedCloneProducer>>,
    kind: ProducerKind,
    provides: TypeInfo,
    config: Config,
}

/// Mapping from a [`Key`] to the producer registered for it.
///
/// A key holds at most one producer, registering again overwrites it.
/// The registry is usually shared as `Arc<Registry>` between the injected callables.
///
/// # Examples
/// ```rust
/// use skuf::{Key, Options, Registry};
///
/// struct Settings {
///     debug: bool,
/// }
///
/// let registry = Registry::new();
/// registry.provide(Options::factory(|| Ok(Settings { debug: true })));
///
/// let settings = registry.get::<Settings>(&Key::of::<Settings>()).unwrap();
/// assert!(settings.debug);
/// ```
#[derive(Default)]
pub struct Registry {
    producers: RwLock<BTreeMap<Key, ProducerData>>,
}

impl Registry {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            producers: RwLock::new(BTreeMap::new()),
        }
    }

    /// Registers the highest priority producer of `options` for `key`
    #[inline]
    pub fn register<T: Send + 'static>(&self, key: Key, options: Options<T>) {
        self.register_with_config(key, options, Config::default());
    }

    pub fn register_with_config<T: Send + 'static>(&self, key: Key, options: Options<T>, config: Config) {
        let Candidate { kind, producer } = options.select();
        let data = ProducerData {
            producer: Arc::new(Mutex::new(producer)),
            kind,
            provides: TypeInfo::of::<T>(),
            config,
        };

        if self.producers.write().insert(key, data).is_some() {
            debug!(%key, ?kind, "Producer overwritten");
        } else {
            debug!(%key, ?kind, "Producer registered");
        }
    }

    /// Registers `options` under the key of their type
    #[inline]
    pub fn provide<T: Send + 'static>(&self, options: Options<T>) {
        self.register(Key::of::<T>(), options);
    }

    #[inline]
    pub fn provide_with_config<T: Send + 'static>(&self, options: Options<T>, config: Config) {
        self.register_with_config(Key::of::<T>(), options, config);
    }

    /// Calls the producer registered for `key`.
    ///
    /// Resources and streams are returned as they are, nothing is acquired here.
    /// The registry lock isn't held while the producer runs, so producers may resolve other keys.
    /// Calls of the same producer are serialized, so a producer must not resolve its own key.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NoProducer`] if nothing is registered for `key`
    /// - [`ResolveErrorKind::Instantiate`] if the producer failed
    pub fn resolve(&self, key: &Key) -> Result<Resolved, ResolveErrorKind> {
        let _guard = debug_span!("resolve", %key).entered();

        let data = self.producers.read().get(key).cloned();
        let Some(ProducerData {
            producer,
            provides,
            config,
            ..
        }) = data
        else {
            let err = ResolveErrorKind::NoProducer { key: *key };
            error!("{}", err);
            return Err(err);
        };

        let kind = producer.lock().call(())?;
        let resolved = Resolved {
            key: *key,
            provides,
            config,
            kind,
        };

        debug!(shape = %crate::inspector::classify(&resolved), "Resolved");
        Ok(resolved)
    }

    /// Resolves a plain value of type `T`.
    ///
    /// # Errors
    /// Same as [`Registry::resolve`], plus
    /// - [`ResolveErrorKind::IncorrectType`] if the value isn't of type `T`
    /// - [`ResolveErrorKind::UnsupportedShape`] if the producer returned a resource or a stream
    pub fn get<T: 'static>(&self, key: &Key) -> Result<T, ResolveErrorKind> {
        match self.resolve(key)?.into_value() {
            Ok(val) => Ok(val),
            Err(err) => {
                error!(%key, "{}", err);
                Err(err)
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, key: &Key) -> bool {
        self.producers.read().contains_key(key)
    }

    /// Kind of the producer registered for `key`
    #[inline]
    #[must_use]
    pub fn kind(&self, key: &Key) -> Option<ProducerKind> {
        self.producers.read().get(key).map(|data| data.kind)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.producers.read().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.producers.read().is_empty()
    }

    /// Unregisters every key
    pub fn clear(&self) {
        let mut producers = self.producers.write();
        warn!(count = producers.len(), "Clearing registry, every key is unregistered");
        producers.clear();
    }
}
