use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sagemakerruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sagemakerruntime::primitives::Blob;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use tracing::debug;

use super::{EndpointControl, EndpointResponse, EndpointTransport};
use crate::error::EndpointError;

/// Data-plane adapter over the SageMaker runtime API. Region, credentials,
/// and signing all come from the SDK configuration.
pub struct SageMakerTransport {
    client: aws_sdk_sagemakerruntime::Client,
}

impl SageMakerTransport {
    pub fn new(client: aws_sdk_sagemakerruntime::Client) -> Self {
        Self { client }
    }

    /// Build from the default credential and region chain (env, profile,
    /// instance metadata).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(aws_sdk_sagemakerruntime::Client::new(&config))
    }
}

#[async_trait]
impl EndpointTransport for SageMakerTransport {
    async fn invoke(
        &self,
        endpoint_name: &str,
        payload: &[u8],
    ) -> Result<EndpointResponse, EndpointError> {
        debug!(endpoint = endpoint_name, bytes = payload.len(), "invoking sagemaker endpoint");
        let sent = self
            .client
            .invoke_endpoint()
            .endpoint_name(endpoint_name)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await;

        match sent {
            // the SDK only hands back 2xx responses here
            Ok(output) => Ok(EndpointResponse {
                status: 200,
                body: output.body.map(Blob::into_inner).unwrap_or_default(),
            }),
            Err(SdkError::ServiceError(ctx)) => {
                let status = ctx.raw().status().as_u16();
                let body = ctx
                    .raw()
                    .body()
                    .bytes()
                    .map(<[u8]>::to_vec)
                    .unwrap_or_else(|| ctx.err().message().unwrap_or_default().into());
                Ok(EndpointResponse { status, body })
            }
            Err(other) => Err(EndpointError::Transport(format!(
                "invoke {endpoint_name}: {}",
                DisplayErrorContext(&other)
            ))),
        }
    }
}

/// Control-plane adapter over the SageMaker API, used for teardown.
pub struct SageMakerControl {
    client: aws_sdk_sagemaker::Client,
}

impl SageMakerControl {
    pub fn new(client: aws_sdk_sagemaker::Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(aws_sdk_sagemaker::Client::new(&config))
    }
}

#[async_trait]
impl EndpointControl for SageMakerControl {
    async fn delete_endpoint(&self, endpoint_name: &str) -> Result<(), EndpointError> {
        self.client
            .delete_endpoint()
            .endpoint_name(endpoint_name)
            .send()
            .await
            .map_err(|e| map_sdk_error("delete endpoint", e))?;
        Ok(())
    }

    async fn delete_model(&self, model_name: &str) -> Result<(), EndpointError> {
        self.client
            .delete_model()
            .model_name(model_name)
            .send()
            .await
            .map_err(|e| map_sdk_error("delete model", e))?;
        Ok(())
    }

    async fn delete_endpoint_config(
        &self,
        endpoint_config_name: &str,
    ) -> Result<(), EndpointError> {
        self.client
            .delete_endpoint_config()
            .endpoint_config_name(endpoint_config_name)
            .send()
            .await
            .map_err(|e| map_sdk_error("delete endpoint config", e))?;
        Ok(())
    }
}

fn map_sdk_error<E>(action: &str, err: SdkError<E, HttpResponse>) -> EndpointError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err {
        SdkError::ServiceError(ctx) => EndpointError::RemoteInvocation {
            status: ctx.raw().status().as_u16(),
            message: ctx
                .err()
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| ctx.err().to_string()),
        },
        other => EndpointError::Transport(format!("{action}: {}", DisplayErrorContext(&other))),
    }
}
