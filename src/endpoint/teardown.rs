use tracing::info;

use super::EndpointControl;
use crate::config::RagConfig;
use crate::error::EndpointError;

/// Delete one deployment's hosted resources: endpoint, then model, then
/// endpoint config. The endpoint config shares the endpoint's name. The
/// first failure aborts the remaining deletes; nothing is retried.
pub async fn teardown_deployment(
    control: &dyn EndpointControl,
    endpoint_name: &str,
    model_name: &str,
) -> Result<(), EndpointError> {
    control.delete_endpoint(endpoint_name).await?;
    info!(endpoint = endpoint_name, "deleted endpoint");
    control.delete_model(model_name).await?;
    info!(model = model_name, "deleted model");
    control.delete_endpoint_config(endpoint_name).await?;
    info!(endpoint_config = endpoint_name, "deleted endpoint config");
    Ok(())
}

/// Tear down both deployments named in the config: the generation stack
/// first, then the embedding stack.
pub async fn teardown_stack(
    control: &dyn EndpointControl,
    config: &RagConfig,
) -> Result<(), EndpointError> {
    teardown_deployment(control, &config.llm_endpoint_name, &config.llm_model_name).await?;
    teardown_deployment(control, &config.emb_endpoint_name, &config.emb_model_name).await?;
    info!("endpoints deleted");
    Ok(())
}
