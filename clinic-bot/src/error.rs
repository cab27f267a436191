use thiserror::Error;

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Failures talking to the clinic backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend answered with status {0}")]
    Status(u16),

    #[error("malformed backend response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A well-formed `{"error": ...}` body
    #[error("backend reported an error: {0}")]
    Backend(String),

    #[error("SECRET_KEY is not configured")]
    MissingSecret,

    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures turning a voice clip into a WAV file.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("cannot decode voice clip: {0}")]
    Decode(String),

    #[error("unsupported voice clip: {0}")]
    Unsupported(String),

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("failed to write audio file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("environment variable {var} has invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}
