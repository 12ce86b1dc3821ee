use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model load error: {0}")]
    Model(String),

    #[error("No JSON data received")]
    InvalidRequest,

    #[error("Error during prediction: {0}")]
    Prediction(#[from] PredictionError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

/// Failures raised while turning a request body into a prediction.
///
/// All variants are reported to clients the same way; the split exists so
/// logs and callers can tell bad input apart from a misbehaving model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("missing required feature '{0}'")]
    MissingField(String),

    #[error("unknown feature '{0}'")]
    UnknownField(String),

    #[error("feature '{field}' must be numeric, got {found}")]
    WrongType { field: String, found: String },

    #[error("model error: {0}")]
    Model(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }
}

impl PredictionError {
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn wrong_type(field: impl Into<String>, found: impl Into<String>) -> Self {
        Self::WrongType {
            field: field.into(),
            found: found.into(),
        }
    }
}
