#[derive(Debug, thiserror::Error)]
pub enum EdgarError {
    #[error("invalid downloader configuration: {0}")]
    InvalidConfig(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("EDGAR returned {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse EDGAR response: {0}")]
    Parse(String),
    #[error("unknown ticker: {0}")]
    UnknownTicker(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
