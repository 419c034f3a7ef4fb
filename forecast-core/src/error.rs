use thiserror::Error;

/// Failures reported by a [`crate::WeatherClient`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WeatherError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The provider could not resolve the requested city or query.
    #[error("Location not found: {0}")]
    NotFound(String),

    /// Any other non-success answer from the provider.
    #[error("Weather API returned status {status}: {message}")]
    Api { status: u16, message: String },
}

impl WeatherError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WeatherError::Network(_) => ErrorKind::Network,
            WeatherError::Parse(_) => ErrorKind::Parse,
            WeatherError::NotFound(_) => ErrorKind::NotFound,
            WeatherError::Api { .. } => ErrorKind::Other,
        }
    }
}

/// Coarse error category shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    NotFound,
    Other,
}

/// Failures from a [`crate::PreferenceStore`].
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Preference I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse preferences file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine platform data directory")]
    NoDataDir,
}
