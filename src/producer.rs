use core::any::type_name;
use tracing::{debug, debug_span, error};

use crate::{
    errors::InstantiateErrorKind,
    resolved::ResolvedKind,
    service::{service_fn, BoxCloneService},
};

/// Zero-argument callable stored in the registry and invoked on every resolution
pub(crate) trait Producer: Clone + Send + Sync + 'static {
    type Provides: Send + 'static;
    type Error: Into<InstantiateErrorKind>;

    fn produce(&mut self) -> Result<Self::Provides, Self::Error>;
}

impl<F, Response, Err> Producer for F
where
    F: FnMut() -> Result<Response, Err> + Clone + Send + Sync + 'static,
    Response: Send + 'static,
    Err: Into<InstantiateErrorKind>,
{
    type Provides = Response;
    type Error = Err;

    #[inline]
    fn produce(&mut self) -> Result<Self::Provides, Self::Error> {
        self()
    }
}

pub(crate) type BoxedCloneProducer = BoxCloneService<(), ResolvedKind, InstantiateErrorKind>;

#[must_use]
pub(crate) fn boxed_producer<P>(mut producer: P, into_kind: fn(P::Provides) -> ResolvedKind) -> BoxedCloneProducer
where
    P: Producer,
{
    BoxCloneService::new(service_fn(move |()| {
        let _guard = debug_span!("producer", provides = type_name::<P::Provides>()).entered();

        match producer.produce() {
            Ok(provides) => {
                debug!("Produced");
                Ok(into_kind(provides))
            }
            Err(err) => {
                let err = err.into();
                error!("{}", err);
                Err(err)
            }
        }
    }))
}

/// Producer of a fixed value. Every resolution gets a clone of it,
/// so wrap the value in an `Arc` to share one object.
#[inline]
#[must_use]
pub(crate) fn instance<T: Clone + Send + Sync + 'static>(val: T) -> impl Producer<Provides = T, Error = InstantiateErrorKind> {
    move || Ok(val.clone())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{boxed_producer, instance, Producer};
    use crate::{errors::InstantiateErrorKind, resolved::ResolvedKind, service::Service as _};

    use alloc::{
        boxed::Box,
        format,
        string::{String, ToString as _},
        sync::Arc,
    };
    use core::sync::atomic::{AtomicU8, Ordering};
    use tracing_test::traced_test;

    fn value<T: Send + 'static>(val: T) -> ResolvedKind {
        ResolvedKind::Value(Box::new(val))
    }

    #[test]
    #[allow(dead_code)]
    fn test_producer_helper() {
        fn producer<P: Producer<Error = InstantiateErrorKind>>(_p: P) {}

        producer(|| Ok(()));
        producer(instance(1u8));
    }

    #[test]
    #[traced_test]
    fn test_boxed_producer() {
        let call_count = Arc::new(AtomicU8::new(0));

        let mut producer = boxed_producer(
            {
                let call_count = call_count.clone();
                move || {
                    call_count.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, InstantiateErrorKind>(call_count.load(Ordering::SeqCst))
                }
            },
            value,
        );
        let mut cloned = producer.clone();

        let ResolvedKind::Value(first) = producer.call(()).unwrap() else {
            panic!("unexpected kind");
        };
        let ResolvedKind::Value(second) = cloned.call(()).unwrap() else {
            panic!("unexpected kind");
        };

        assert_eq!(*first.downcast::<u8>().unwrap(), 1);
        assert_eq!(*second.downcast::<u8>().unwrap(), 2);
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert!(logs_contain("Produced"));
    }

    #[test]
    #[traced_test]
    fn test_boxed_producer_error() {
        let mut producer = boxed_producer(
            || Err::<u8, _>(InstantiateErrorKind::Custom(anyhow::anyhow!("unavailable"))),
            value,
        );

        let Err(err) = producer.call(()) else {
            panic!("producer must fail");
        };

        assert_eq!(err.to_string(), "unavailable");
        assert!(logs_contain("unavailable"));
    }

    #[test]
    fn test_instance_identity() {
        let shared = Arc::new(5u8);
        let mut producer = instance(shared.clone());

        let first = producer.produce().unwrap();
        let second = producer.produce().unwrap();

        assert!(Arc::ptr_eq(&first, &shared));
        assert!(Arc::ptr_eq(&first, &second));
    }
}
