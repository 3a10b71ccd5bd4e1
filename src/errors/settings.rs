use alloc::string::String;

#[derive(thiserror::Error, Debug)]
pub enum SettingsErrorKind {
    #[error("Setting {name} isn't set")]
    NotSet { name: String },
    #[error("Setting {name} has invalid value `{value}`: {reason}")]
    Parse { name: String, value: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
