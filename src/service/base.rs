/// Callable step of an injected call chain. Each inject layer wraps the next one as a service.
pub(crate) trait Service<Request> {
    type Response;
    type Error;

    // Sync services return `Result<Response, Error>` here, async ones a future resolving to it.
    type Output;

    fn call(&mut self, request: Request) -> Self::Output;
}
