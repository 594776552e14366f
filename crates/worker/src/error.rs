use thiserror::Error;

/// Errors that can occur when starting or running the worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The configuration file is not valid TOML for [`WorkerConfig`](crate::config::WorkerConfig).
    #[error("invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// An I/O error (reading the config or an event file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An event file is not a valid queue-delivery event.
    #[error("invalid event: {0}")]
    Event(#[from] serde_json::Error),

    /// The orchestrator could not be assembled.
    #[error(transparent)]
    Build(#[from] seedbomb_consumer::BuildError),

    /// The dispatch client could not be built.
    #[error("dispatcher error: {0}")]
    Dispatcher(#[from] seedbomb_github::GitHubError),

    /// A message in a handled event failed.
    #[error("processing failed: {0}")]
    Processing(#[from] seedbomb_consumer::ProcessingFailure),
}
