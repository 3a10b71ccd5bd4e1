mod inject;
mod instantiate;
mod resolve;
#[cfg(feature = "std")]
mod settings;
mod wrap;

pub use inject::InjectErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use resolve::ResolveErrorKind;
#[cfg(feature = "std")]
pub use settings::SettingsErrorKind;
pub use wrap::{BindErrorKind, WrapErrorKind};
