#[derive(Debug, thiserror::Error)]
pub enum CasMatchError {
    #[error("failed to read document: {0}")]
    DocumentRead(String),

    #[error("no leveled rows found in {0}")]
    EmptyExtraction(String),

    #[error("invalid reference list: {0}")]
    Schema(String),

    #[error("output key '{0}' was already written in this batch")]
    OutputKeyCollision(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("failed to write report: {0}")]
    ReportWrite(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
