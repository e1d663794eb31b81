use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration-time failures.
///
/// These indicate programmer misuse of the registration API and surface
/// during the scan phase, before the application starts serving. Request-time
/// conditions (negotiation mismatch, validation failure) are responses, not
/// errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No renderer named `{name}` registered (service at {path})")]
    UnknownRenderer { name: String, path: String },

    #[error("Method {method} cannot be routed (service at {path})")]
    UnroutableMethod { method: String, path: String },

    #[error("A view for {method} {path} is already registered")]
    DuplicateView { method: String, path: String },
}
