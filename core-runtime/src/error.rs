use thiserror::Error;

/// Errors raised while setting up the runtime (logging, event plumbing).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging already initialized")]
    AlreadyInitialized,
}

pub type Result<T> = std::result::Result<T, Error>;
