#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum WrapErrorKind {
    #[error("Parameter `{name}` isn't declared in the signature")]
    UnknownParameter { name: &'static str },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BindErrorKind {
    #[error("Multiple values for parameter `{name}`")]
    MultipleValues { name: &'static str },
}
