use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaxError {
    #[error("not initialized: run 'vax init'")]
    NotInitialized,

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("unsupported catalog format '{0}': expected .yaml, .yml or .json")]
    UnknownCatalogFormat(String),

    #[error("invalid date '{0}': expected DD/MM/YYYY")]
    InvalidDate(String),

    #[error("invalid reset policy '{0}': expected 'session' or 'per_step'")]
    InvalidPolicy(String),

    #[error("invalid step: {0}")]
    InvalidStep(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VaxError>;
