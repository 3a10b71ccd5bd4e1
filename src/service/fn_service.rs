use super::base::Service;

#[derive(Clone)]
pub(crate) struct FnServiceSync<F>(pub(crate) F);

#[inline]
#[must_use]
pub(crate) const fn service_fn<F>(f: F) -> FnServiceSync<F> {
    FnServiceSync(f)
}

impl<F, Request, Response, Error> Service<Request> for FnServiceSync<F>
where
    F: FnMut(Request) -> Result<Response, Error>,
{
    type Response = Response;
    type Error = Error;
    type Output = Result<Self::Response, Self::Error>;

    #[inline]
    fn call(&mut self, request: Request) -> Self::Output {
        self.0(request)
    }
}
