use thiserror::Error;

#[derive(Error, Debug)]
pub enum SparkStatsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid JSON file: {file}")]
    InvalidJson { file: String },

    #[error("Data error: {0}")]
    Data(String),
}

pub type Result<T> = std::result::Result<T, SparkStatsError>;
