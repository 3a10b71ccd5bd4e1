pub(crate) mod injector;
pub(crate) mod resource;
pub(crate) mod service;
pub(crate) mod stream;

pub use injector::{wrap_async, AsyncInjected};
pub use resource::AsyncResource;
