pub mod config;
pub mod edgar;
pub mod endpoint;
pub mod error;

pub use config::{ConfigError, DataConfig, RagConfig};
pub use edgar::{CompanyRecord, EdgarClient, EdgarError, EdgarFetch, FilingQuery, FilingRef};
pub use endpoint::{
    teardown_deployment, teardown_stack, EmbeddingResult, EndpointControl, EndpointResponse,
    EndpointTransport, ManagedEndpointClient, SageMakerControl, SageMakerTransport,
};
pub use error::EndpointError;
