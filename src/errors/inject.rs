use super::{instantiate::InstantiateErrorKind, resolve::ResolveErrorKind, wrap::BindErrorKind};

/// Error of an injected call.
///
/// The target's own error is kept as is in [`InjectErrorKind::Target`].
#[derive(thiserror::Error, Debug)]
pub enum InjectErrorKind<E> {
    #[error(transparent)]
    Resolve(#[from] ResolveErrorKind),
    #[error(transparent)]
    Bind(#[from] BindErrorKind),
    #[error("Resource release failed: {0}")]
    Release(InstantiateErrorKind),
    #[error(transparent)]
    Target(E),
}

impl<E> InjectErrorKind<E> {
    /// Returns the target's error, if the call failed in the target itself
    #[inline]
    #[must_use]
    pub fn into_target(self) -> Option<E> {
        match self {
            Self::Target(err) => Some(err),
            _ => None,
        }
    }
}
