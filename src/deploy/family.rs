use serde_json::Value;
use tracing::{debug, info};

use crate::clients::AwsClients;
use crate::config::Config;
use crate::deploy::{roll_out, DeployError, DeployOutcome};
use crate::ecs;
use crate::params::DeployParameters;

/// Deploys a new image to the latest revision of a task family. The service
/// is only updated when the event names one.
pub async fn handler(
    clients: &AwsClients,
    config: &Config,
    event: Value,
) -> Result<DeployOutcome, DeployError> {
    let params = DeployParameters::for_family(&event, config)?;
    debug!("Deploy parameters: {:?}", params);

    let source = ecs::describe_task_definition(&clients.ecs, params.task_definition()).await?;
    info!(
        "Rewriting container {} of {} to {} (tag {})",
        params.container_name(),
        params.task_definition(),
        params.image_base(),
        params.image_tag()
    );

    roll_out(clients, config, &params, params.service(), source).await
}
