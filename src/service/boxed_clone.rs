use alloc::boxed::Box;

use super::base::Service;

pub(crate) type BoxCloneServiceInner<Request, Response, Error, Output> =
    Box<dyn CloneService<Request, Response = Response, Error = Error, Output = Output> + Send + Sync>;

pub(crate) struct BoxCloneService<Request, Response, Error, Output = Result<Response, Error>>(
    pub(crate) BoxCloneServiceInner<Request, Response, Error, Output>,
);

impl<Request, Response, Error, Output> BoxCloneService<Request, Response, Error, Output> {
    #[inline]
    pub(crate) fn new<S>(inner: S) -> Self
    where
        S: Service<Request, Response = Response, Error = Error, Output = Output> + Clone + Send + Sync + 'static,
    {
        Self(Box::new(inner))
    }
}

pub(crate) trait CloneService<Request>: Service<Request> {
    #[must_use]
    fn clone_box(&self) -> BoxCloneServiceInner<Request, Self::Response, Self::Error, Self::Output>;
}

impl<Request, T> CloneService<Request> for T
where
    T: Service<Request> + Clone + Send + Sync + 'static,
{
    #[inline]
    fn clone_box(&self) -> BoxCloneServiceInner<Request, T::Response, T::Error, T::Output> {
        Box::new(self.clone())
    }
}

impl<Request, Response, Error, Output> Clone for BoxCloneService<Request, Response, Error, Output> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl<Request, Response, Error, Output> Service<Request> for BoxCloneService<Request, Response, Error, Output> {
    type Response = Response;
    type Error = Error;
    type Output = Output;

    #[inline]
    fn call(&mut self, request: Request) -> Self::Output {
        self.0.call(request)
    }
}
