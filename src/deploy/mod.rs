use aws_sdk_ecs::types::TaskDefinition;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::clients::AwsClients;
use crate::config::Config;
use crate::ecs::{self, EcsError};
use crate::params::{DeployParameters, ParameterError};

pub mod family;
pub mod service;

#[derive(thiserror::Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    InvalidParameters(#[from] ParameterError),
    #[error(transparent)]
    Ecs(#[from] EcsError),
    #[error("container {container} not found in task definition {family}")]
    ContainerNotFound { container: String, family: String },
    #[error("registered {task_definition_arn} but the service was not updated: {source}")]
    OrphanedRevision {
        task_definition_arn: String,
        #[source]
        source: EcsError,
    },
}

/// Response returned to the lambda runtime once a deploy completes.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutcome {
    pub task_definition_arn: String,
    pub family: Option<String>,
    pub container_name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceUpdate>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpdate {
    pub cluster: String,
    pub service_name: Option<String>,
    pub service_arn: Option<String>,
    pub task_definition: Option<String>,
    pub status: Option<String>,
}

// Rewrite -> Register -> (optionally) Update Service, shared by both handlers
// once the source task definition has been located.
pub(crate) async fn roll_out(
    clients: &AwsClients,
    config: &Config,
    params: &DeployParameters,
    service: Option<&str>,
    source: TaskDefinition,
) -> Result<DeployOutcome, DeployError> {
    let family = source.family.clone().unwrap_or_default();
    let containers = source.container_definitions.as_deref().unwrap_or_default();

    if !ecs::has_container(containers, params.container_name()) {
        if config.require_container_match {
            return Err(DeployError::ContainerNotFound {
                container: params.container_name().to_string(),
                family,
            });
        }
        warn!(
            "container {} not found in task definition {}, registering it unchanged",
            params.container_name(),
            family
        );
    }
    let containers = ecs::rewrite_container_image(containers, params.container_name(), params.image());

    let registered = ecs::register_task_definition(&clients.ecs, &source, containers).await?;
    let task_definition_arn = registered.task_definition_arn.unwrap_or_default();
    info!("Registered task definition {}", task_definition_arn);

    let mut outcome = DeployOutcome {
        task_definition_arn,
        family: registered.family,
        container_name: params.container_name().to_string(),
        image: params.image().to_string(),
        service: None,
    };

    let Some(service) = service else {
        info!("No service given, skipping service update");
        return Ok(outcome);
    };

    let updated = match ecs::update_service(
        &clients.ecs,
        params.cluster(),
        service,
        &outcome.task_definition_arn,
        config.force_new_deployment,
    )
    .await
    {
        Ok(updated) => updated,
        Err(e) => {
            error!(
                "Failed to update service {} in cluster {}, task definition {} was registered but is not in use: {}",
                service,
                params.cluster(),
                outcome.task_definition_arn,
                e
            );
            return Err(DeployError::OrphanedRevision {
                task_definition_arn: outcome.task_definition_arn,
                source: e,
            });
        }
    };
    info!(
        "Updated service {} in cluster {} to {}",
        service,
        params.cluster(),
        outcome.task_definition_arn
    );

    outcome.service = Some(ServiceUpdate {
        cluster: params.cluster().to_string(),
        service_name: updated
            .as_ref()
            .and_then(|s| s.service_name.clone())
            .or_else(|| Some(service.to_string())),
        service_arn: updated.as_ref().and_then(|s| s.service_arn.clone()),
        task_definition: updated.as_ref().and_then(|s| s.task_definition.clone()),
        status: updated.and_then(|s| s.status),
    });

    Ok(outcome)
}
