use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE source not found: {0}")]
    SourceNotFound(String),
    #[error("file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidTle { file: String, message: String },
    #[error("Propagation error: {0}")]
    Propagation(String),
    #[error("window of {0} hours outside (0, {max}]", max = crate::predict::MAX_WINDOW_HOURS)]
    InvalidWindow(f64),
    #[error("satellite config error: {0}")]
    SatelliteConfig(#[from] serde_json::Error),
}
