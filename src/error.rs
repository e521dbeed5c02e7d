use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the simulation core and its command channel.
///
/// Physics steps themselves never fail; errors come from validating configuration,
/// parsing operator commands, and talking to a simulation that has already stopped.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Numerical issue (non-finite values, degenerate geometry).
    #[error("numerical error: {0}")]
    MathError(String),

    /// Malformed operator command.
    #[error("bad command: {0}")]
    Command(String),

    /// The simulation side of the command channel has shut down.
    #[error("simulation is no longer running")]
    Disconnected,

    /// Propagated I/O errors from the command stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed configuration file.
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}
