use thiserror::Error;

/// Error type shared by event construction, accessors and subscriber setup.
#[derive(Debug, Error)]
pub enum Error {
    #[error("logging event requires a level")]
    MissingLevel,

    #[error("logging event requires a message")]
    MissingMessage,

    #[error("logging event was not created by a logger")]
    NoCreatingLogger,

    #[error("unknown log level '{0}'")]
    UnknownLevel(String),

    #[error("a global tracing subscriber is already installed")]
    SubscriberAlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}
