use alloc::boxed::Box;
use core::{
    any::Any,
    future::poll_fn,
    pin::Pin,
    task::{Context, Poll},
};
use futures_core::Stream;
use tracing::{debug, error};

use crate::{errors::InstantiateErrorKind, key::Key};

pub(crate) type BoxStream = Pin<Box<dyn Stream<Item = Result<Box<dyn Any + Send>, InstantiateErrorKind>> + Send>>;

struct Erased<S>(Pin<Box<S>>);

impl<S, T> Stream for Erased<S>
where
    S: Stream<Item = Result<T, InstantiateErrorKind>>,
    T: Send + 'static,
{
    type Item = Result<Box<dyn Any + Send>, InstantiateErrorKind>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0
            .as_mut()
            .poll_next(cx)
            .map(|item| item.map(|res| res.map(|val| Box::new(val) as _)))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

#[inline]
#[must_use]
pub(crate) fn boxed_stream<S, T>(stream: S) -> BoxStream
where
    S: Stream<Item = Result<T, InstantiateErrorKind>> + Send + 'static,
    T: Send + 'static,
{
    Box::pin(Erased(Box::pin(stream)))
}

#[inline]
pub(crate) async fn next(stream: &mut BoxStream) -> Option<Result<Box<dyn Any + Send>, InstantiateErrorKind>> {
    poll_fn(|cx| stream.as_mut().poll_next(cx)).await
}

/// Polls the stream to the end, discarding the values.
/// Stops at the first error.
pub(crate) async fn drain(mut stream: BoxStream, key: Key) -> Result<(), InstantiateErrorKind> {
    let mut discarded = 0usize;
    while let Some(item) = next(&mut stream).await {
        if let Err(err) = item {
            error!(%key, "{}", err);
            return Err(err);
        }
        discarded += 1;
    }

    debug!(%key, discarded, "Drained");
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::{boxed_stream, drain, next};
    use crate::{errors::InstantiateErrorKind, key::Key};

    use alloc::{
        format,
        string::{String, ToString as _},
    };
    use futures_util::stream;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn test_next_and_drain() {
        let mut stream = boxed_stream(stream::iter([1u8, 2, 3].map(Ok::<_, InstantiateErrorKind>)));

        let first = next(&mut stream).await.unwrap().unwrap();
        assert_eq!(*first.downcast::<u8>().unwrap(), 1);

        drain(stream, Key::of::<u8>()).await.unwrap();
        assert!(logs_contain("discarded=2"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_drain_error() {
        let stream = boxed_stream(stream::iter([
            Ok(1u8),
            Err(InstantiateErrorKind::Custom(anyhow::anyhow!("broken"))),
            Ok(2),
        ]));

        let err = drain(stream, Key::of::<u8>()).await.unwrap_err();
        assert_eq!(err.to_string(), "broken");
    }

    #[tokio::test]
    async fn test_empty() {
        let mut stream = boxed_stream(stream::empty::<Result<u8, InstantiateErrorKind>>());

        assert!(next(&mut stream).await.is_none());
    }
}
