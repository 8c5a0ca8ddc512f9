use thiserror::Error;

/// A rejected document. Carries the first violation found, phrased so
/// the user can locate and fix the problem directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("JSON syntax error: {0}")]
    Syntax(String),

    #[error("invalid document structure: {0}")]
    Structure(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
