#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod arguments;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod injector;
pub(crate) mod key;
pub(crate) mod options;
pub(crate) mod producer;
pub(crate) mod registry;
pub(crate) mod resolved;
pub(crate) mod resource;
pub(crate) mod service;
pub(crate) mod signature;
pub(crate) mod utils;

pub mod inspector;

#[cfg(feature = "async")]
pub(crate) mod r#async;

#[cfg(feature = "std")]
pub mod settings;

pub use any::TypeInfo;
pub use arguments::Arguments;
pub use config::{Config, StreamPolicy};
pub use errors::{BindErrorKind, InjectErrorKind, InstantiateErrorKind, ResolveErrorKind, WrapErrorKind};
pub use injector::{wrap, Injected, Injector};
pub use inspector::Shape;
pub use key::Key;
pub use options::{Options, ProducerKind};
pub use registry::Registry;
pub use resolved::Resolved;
pub use resource::{Exit, Resource};
pub use signature::{Param, ParamKind, Signature};

#[cfg(feature = "async")]
pub use r#async::{wrap_async, AsyncInjected, AsyncResource};

#[cfg(feature = "std")]
pub use errors::SettingsErrorKind;
