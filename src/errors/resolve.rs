use super::instantiate::InstantiateErrorKind;
use crate::{any::TypeInfo, inspector::Shape, key::Key};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Producer for {key} not found in registry")]
    NoProducer { key: Key },
    #[error("Incorrect type produced for {key}. Actual: {actual}, expected: {expected}")]
    IncorrectType { key: Key, expected: TypeInfo, actual: TypeInfo },
    #[error("Producer for {key} yields {shape}, which can't be used here")]
    UnsupportedShape { key: Key, shape: Shape },
    #[error("Stream for {key} finished without yielding a value")]
    EmptyStream { key: Key },
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
}
