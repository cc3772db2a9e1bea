use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{EndpointResponse, EndpointTransport};
use crate::error::EndpointError;

/// Decoded body from the embedding endpoint.
///
/// The shape is the deployed model's business, not this crate's: some models
/// answer with one vector per input, others with per-token matrices. Whatever
/// JSON the endpoint produced is handed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmbeddingResult(pub Value);

impl EmbeddingResult {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Top-level entry count, when the endpoint answered with a JSON array.
    /// Batch endpoints answer with one entry per input, in input order, so
    /// this is the quick alignment check.
    pub fn entry_count(&self) -> Option<usize> {
        self.0.as_array().map(Vec::len)
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

/// Client for a pair of hosted model endpoints: one embedding model, one
/// generation model. Holds opaque endpoint names only; the network side
/// lives behind the injected [`EndpointTransport`].
///
/// Construction never touches the network, and every invocation is
/// independent. No retries, no batching, no rate limiting.
pub struct ManagedEndpointClient {
    transport: Box<dyn EndpointTransport>,
    embedding_endpoint: String,
    generation_endpoint: String,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ManagedEndpointClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedEndpointClient")
            .field("embedding_endpoint", &self.embedding_endpoint)
            .field("generation_endpoint", &self.generation_endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ManagedEndpointClient {
    /// Both endpoint names are required and must be non-empty. Nothing is
    /// resolved or dialed until the first invocation.
    pub fn new(
        transport: impl EndpointTransport + 'static,
        embedding_endpoint: impl Into<String>,
        generation_endpoint: impl Into<String>,
    ) -> Result<Self, EndpointError> {
        let embedding_endpoint = embedding_endpoint.into();
        let generation_endpoint = generation_endpoint.into();
        if embedding_endpoint.is_empty() {
            return Err(EndpointError::InvalidConfiguration(
                "embedding endpoint name must not be empty".to_string(),
            ));
        }
        if generation_endpoint.is_empty() {
            return Err(EndpointError::InvalidConfiguration(
                "generation endpoint name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            transport: Box::new(transport),
            embedding_endpoint,
            generation_endpoint,
            timeout: None,
        })
    }

    /// Overall budget for one invocation. On expiry the call fails with
    /// [`EndpointError::Transport`]; there is no partial result.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn embedding_endpoint(&self) -> &str {
        &self.embedding_endpoint
    }

    /// Name of the generation endpoint this deployment pairs with. Carried
    /// for lifecycle operations; no call here invokes it.
    pub fn generation_endpoint(&self) -> &str {
        &self.generation_endpoint
    }

    /// Embed a batch of strings. The batch goes out as one request, in
    /// submission order, as `{"inputs": [...]}`; the endpoint's JSON answer
    /// comes back without further interpretation. A successful result is
    /// index-aligned with `inputs`.
    pub async fn invoke_embedding(
        &self,
        inputs: &[String],
    ) -> Result<EmbeddingResult, EndpointError> {
        if inputs.is_empty() {
            return Err(EndpointError::InvalidConfiguration(
                "input batch must not be empty".to_string(),
            ));
        }

        let payload = serde_json::to_vec(&EmbedRequest { inputs })
            .map_err(|e| EndpointError::InvalidConfiguration(format!("unencodable batch: {e}")))?;

        debug!(
            endpoint = %self.embedding_endpoint,
            batch = inputs.len(),
            "invoking embedding endpoint"
        );

        let call = self.transport.invoke(&self.embedding_endpoint, &payload);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                EndpointError::Transport(format!(
                    "embedding request timed out after {}ms",
                    limit.as_millis()
                ))
            })??,
            None => call.await?,
        };

        if !(200..300).contains(&response.status) {
            return Err(EndpointError::RemoteInvocation {
                status: response.status,
                message: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        let decoded: Value = serde_json::from_slice(&response.body)
            .map_err(|e| EndpointError::Decode(e.to_string()))?;
        Ok(EmbeddingResult(decoded))
    }
}
