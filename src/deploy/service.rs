use serde_json::Value;
use tracing::{debug, info};

use crate::clients::AwsClients;
use crate::config::Config;
use crate::deploy::{roll_out, DeployError, DeployOutcome};
use crate::ecs;
use crate::params::DeployParameters;

/// Deploys a new image to the task definition a service is currently running
/// and points the service at the new revision.
pub async fn handler(
    clients: &AwsClients,
    config: &Config,
    event: Value,
) -> Result<DeployOutcome, DeployError> {
    let params = DeployParameters::for_service(&event, config)?;
    debug!("Deploy parameters: {:?}", params);
    let Some(service) = params.service() else {
        unreachable!("service parameters always carry a service name");
    };

    info!(
        "Looking up task definition of service {} in cluster {} (requested {})",
        service,
        params.cluster(),
        params.task_definition()
    );
    let reference =
        ecs::describe_service_task_definition(&clients.ecs, params.cluster(), service).await?;
    let source = ecs::describe_task_definition(&clients.ecs, &reference).await?;
    info!(
        "Rewriting container {} of {} to {} (tag {})",
        params.container_name(),
        reference,
        params.image_base(),
        params.image_tag()
    );

    roll_out(clients, config, &params, Some(service), source).await
}
