#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("endpoint returned {status}: {message}")]
    RemoteInvocation { status: u16, message: String },
    #[error("failed to decode endpoint response: {0}")]
    Decode(String),
}
