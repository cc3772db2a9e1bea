pub mod client;
pub mod sagemaker;
pub mod teardown;

use async_trait::async_trait;

use crate::error::EndpointError;

/// Raw answer from a hosted endpoint, before any decoding.
#[derive(Debug, Clone)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Data-plane call to a hosted model endpoint. SageMaker in production, a
/// hand-rolled double in tests.
///
/// Implementations return `Ok` for any response the endpoint produced, error
/// status included; `Err` is reserved for failures where no response came
/// back at all (connection refused, DNS, timeout).
#[async_trait]
pub trait EndpointTransport: Send + Sync {
    async fn invoke(
        &self,
        endpoint_name: &str,
        payload: &[u8],
    ) -> Result<EndpointResponse, EndpointError>;
}

/// Blanket impl so `Box<dyn EndpointTransport>` can be passed directly to
/// `ManagedEndpointClient::new()`.
#[async_trait]
impl EndpointTransport for Box<dyn EndpointTransport> {
    async fn invoke(
        &self,
        endpoint_name: &str,
        payload: &[u8],
    ) -> Result<EndpointResponse, EndpointError> {
        (**self).invoke(endpoint_name, payload).await
    }
}

/// Control-plane deletes for tearing a deployment down.
#[async_trait]
pub trait EndpointControl: Send + Sync {
    async fn delete_endpoint(&self, endpoint_name: &str) -> Result<(), EndpointError>;
    async fn delete_model(&self, model_name: &str) -> Result<(), EndpointError>;
    async fn delete_endpoint_config(
        &self,
        endpoint_config_name: &str,
    ) -> Result<(), EndpointError>;
}

pub use client::{EmbeddingResult, ManagedEndpointClient};
pub use sagemaker::{SageMakerControl, SageMakerTransport};
pub use teardown::{teardown_deployment, teardown_stack};
