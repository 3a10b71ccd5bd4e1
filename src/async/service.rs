use core::future::Future;

use crate::service::Service;

#[derive(Clone)]
pub(crate) struct FnService<F>(F);

#[inline]
#[must_use]
pub(crate) const fn fn_service<F>(f: F) -> FnService<F> {
    FnService(f)
}

impl<F, Fut, Request, Response, Error> Service<Request> for FnService<F>
where
    F: FnMut(Request) -> Fut,
    Fut: Future<Output = Result<Response, Error>>,
{
    type Response = Response;
    type Error = Error;
    type Output = Fut;

    #[inline]
    fn call(&mut self, request: Request) -> Self::Output {
        (self.0)(request)
    }
}
