use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid lock instance given for the current object.")]
    InvalidBinding,

    #[error("Please set a valid lock instance on this object before attempting to use it.")]
    NotBound,

    #[error("The permission type you provided \"{0}\" is incorrect.")]
    InvalidPermissionType(String),

    #[error("Clearing permissions by target without an action is not supported.")]
    UnsupportedClear,

    #[error("An error occurred deserializing definition: {0}.")]
    Deserializing(#[source] serde_json::Error),

    #[error("An error occurred validating definition: {0}.")]
    Validation(String),

    #[error("Permission driver failure: {0}.")]
    Driver(String),

    #[error("A permission lock was poisoned by a panicking thread.")]
    Poisoned,
}
