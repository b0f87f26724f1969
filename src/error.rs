use thiserror::Error;

#[derive(Error, Debug)]
pub enum FteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },

    #[error("No worksheet found in {0}")]
    EmptySheet(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, FteError>;
