//! Domain error types.

/// Top-level error type for signalbench.
#[derive(Debug, thiserror::Error)]
pub enum SignalbenchError {
    #[error("data provider error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol} ({interval})")]
    NoData { symbol: String, interval: String },

    #[error("insufficient data for {symbol} ({interval}): have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        interval: String,
        bars: usize,
        minimum: usize,
    },

    #[error("invalid bar series: {reason}")]
    InvalidBars { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SignalbenchError> for std::process::ExitCode {
    fn from(err: &SignalbenchError) -> Self {
        let code: u8 = match err {
            SignalbenchError::Io(_) => 1,
            SignalbenchError::ConfigParse { .. }
            | SignalbenchError::ConfigMissing { .. }
            | SignalbenchError::ConfigInvalid { .. } => 2,
            SignalbenchError::Data { .. } => 3,
            SignalbenchError::UnknownStrategy { .. } => 4,
            SignalbenchError::NoData { .. }
            | SignalbenchError::InsufficientData { .. }
            | SignalbenchError::InvalidBars { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
