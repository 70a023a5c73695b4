//! Error types for netra-scan

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// netra-scan error types
///
/// Capacity overflow during segmentation and an empty selector result are
/// deliberately not represented here: the first is reported as a flag on a
/// successful sweep outcome and the second is an ordinary `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration is structurally valid but unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analog or capture hardware unavailable, or reported an implausible value
    #[error("Sensor fault: {0}")]
    SensorFault(String),

    /// No return pulse arrived within the echo timeout
    #[error("No echo within timeout")]
    EchoTimeout,

    /// Echo interval spanned more timer periods than is physically plausible
    #[error("Echo capture spanned {overflows} timer overflows")]
    CaptureOverflow {
        /// Number of timer overflows observed between the captured edges
        overflows: u32,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
