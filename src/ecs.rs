use aws_sdk_ecs::error::{DisplayErrorContext, SdkError};
use aws_sdk_ecs::operation::describe_services::DescribeServicesError;
use aws_sdk_ecs::operation::describe_task_definition::DescribeTaskDefinitionError;
use aws_sdk_ecs::operation::register_task_definition::RegisterTaskDefinitionError;
use aws_sdk_ecs::operation::update_service::UpdateServiceError;
use aws_sdk_ecs::types::{ContainerDefinition, Service, TaskDefinition};
use aws_sdk_ecs::Client as EcsClient;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum EcsError {
    #[error("failed to describe services: {}", DisplayErrorContext(.0))]
    DescribeServices(#[from] SdkError<DescribeServicesError, HttpResponse>),
    #[error("service {service} not found in cluster {cluster}: {reason}")]
    ServiceNotFound {
        cluster: String,
        service: String,
        reason: String,
    },
    #[error("service {service} has no task definition")]
    MissingTaskDefinition { service: String },
    #[error("failed to describe task definition: {}", DisplayErrorContext(.0))]
    DescribeTaskDefinition(#[from] SdkError<DescribeTaskDefinitionError, HttpResponse>),
    #[error("task definition {0} not found")]
    TaskDefinitionNotFound(String),
    #[error("failed to register task definition: {}", DisplayErrorContext(.0))]
    RegisterTaskDefinition(#[from] SdkError<RegisterTaskDefinitionError, HttpResponse>),
    #[error("registered task definition for family {0} has no ARN")]
    MissingTaskDefinitionArn(String),
    #[error("failed to update service: {}", DisplayErrorContext(.0))]
    UpdateService(#[from] SdkError<UpdateServiceError, HttpResponse>),
}

/// Returns the task definition reference the service is currently running.
pub async fn describe_service_task_definition(
    ecs_client: &EcsClient,
    cluster: &str,
    service: &str,
) -> Result<String, EcsError> {
    let response = ecs_client
        .describe_services()
        .cluster(cluster)
        .services(service)
        .send()
        .await?;
    debug!("DescribeServices response: {:?}", response);

    let Some(found) = response.services.unwrap_or_default().into_iter().next() else {
        let reason = response
            .failures
            .unwrap_or_default()
            .into_iter()
            .find_map(|failure| failure.reason)
            .unwrap_or("no service returned".to_string());
        return Err(EcsError::ServiceNotFound {
            cluster: cluster.to_string(),
            service: service.to_string(),
            reason,
        });
    };

    found
        .task_definition
        .ok_or_else(|| EcsError::MissingTaskDefinition {
            service: service.to_string(),
        })
}

/// Fetches a task definition by family, `family:revision` or ARN.
pub async fn describe_task_definition(
    ecs_client: &EcsClient,
    reference: &str,
) -> Result<TaskDefinition, EcsError> {
    let response = ecs_client
        .describe_task_definition()
        .task_definition(reference)
        .send()
        .await?;

    response
        .task_definition
        .ok_or_else(|| EcsError::TaskDefinitionNotFound(reference.to_string()))
}

/// Replaces the image of every container named `target`, keeping order and
/// leaving all other containers as they are. No match is not an error.
pub fn rewrite_container_image(
    containers: &[ContainerDefinition],
    target: &str,
    image: &str,
) -> Vec<ContainerDefinition> {
    containers
        .iter()
        .map(|container| {
            if container.name.as_deref() == Some(target) {
                let mut rewritten = container.clone();
                rewritten.image = Some(image.to_string());
                rewritten
            } else {
                container.clone()
            }
        })
        .collect()
}

pub fn has_container(containers: &[ContainerDefinition], target: &str) -> bool {
    containers
        .iter()
        .any(|container| container.name.as_deref() == Some(target))
}

/// Registers a new revision carrying only the family, volumes and task role of
/// `source` alongside the given containers.
pub async fn register_task_definition(
    ecs_client: &EcsClient,
    source: &TaskDefinition,
    containers: Vec<ContainerDefinition>,
) -> Result<TaskDefinition, EcsError> {
    let family = source.family.clone().unwrap_or_default();
    let response = ecs_client
        .register_task_definition()
        .family(family.clone())
        .set_volumes(source.volumes.clone())
        .set_task_role_arn(source.task_role_arn.clone())
        .set_container_definitions(Some(containers))
        .send()
        .await?;

    match response.task_definition {
        Some(registered) if registered.task_definition_arn.is_some() => Ok(registered),
        _ => Err(EcsError::MissingTaskDefinitionArn(family)),
    }
}

pub async fn update_service(
    ecs_client: &EcsClient,
    cluster: &str,
    service: &str,
    task_definition_arn: &str,
    force_new_deployment: bool,
) -> Result<Option<Service>, EcsError> {
    let response = ecs_client
        .update_service()
        .cluster(cluster)
        .service(service)
        .task_definition(task_definition_arn)
        .force_new_deployment(force_new_deployment)
        .send()
        .await?;

    Ok(response.service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_config::BehaviorVersion;
    use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};
    use aws_smithy_runtime_api::client::orchestrator::HttpRequest;
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;

    // get_mock_ecs_client returns a mock ecs client that answers each call with the next body
    fn get_mock_ecs_client(responses: Vec<(u16, &str)>) -> (EcsClient, StaticReplayClient) {
        let events = responses
            .into_iter()
            .map(|(status, body)| {
                ReplayEvent::new(
                    HttpRequest::new(SdkBody::from("")),
                    HttpResponse::new(
                        StatusCode::try_from(status).unwrap(),
                        SdkBody::from(body.to_string()),
                    ),
                )
            })
            .collect();
        let http_client = StaticReplayClient::new(events);

        let conf = aws_sdk_ecs::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(aws_sdk_ecs::config::Credentials::new(
                "SOMETESTKEYID",
                "somesecretkey",
                Some("somesessiontoken".to_string()),
                None,
                "",
            ))
            .region(aws_sdk_ecs::config::Region::new("eu-central-1"))
            .http_client(http_client.clone())
            .build();

        (EcsClient::from_conf(conf), http_client)
    }

    fn container(name: &str, image: &str) -> ContainerDefinition {
        ContainerDefinition::builder()
            .name(name)
            .image(image)
            .memory(256)
            .build()
    }

    #[test]
    fn test_rewrite_replaces_only_the_target() {
        let containers = vec![
            container("proxy", "envoy:1.29"),
            container("web", "repo/app:v1"),
            container("worker", "repo/worker:v7"),
        ];

        let rewritten = rewrite_container_image(&containers, "web", "repo/app:v2");

        assert_eq!(rewritten.len(), 3);
        let names: Vec<_> = rewritten.iter().map(|c| c.name.as_deref()).collect();
        assert_eq!(names, vec![Some("proxy"), Some("web"), Some("worker")]);
        assert_eq!(rewritten[0], containers[0]);
        assert_eq!(rewritten[1].image.as_deref(), Some("repo/app:v2"));
        assert_eq!(rewritten[1].memory, containers[1].memory);
        assert_eq!(rewritten[2], containers[2]);
    }

    #[test]
    fn test_rewrite_without_match_is_a_noop() {
        let containers = vec![container("proxy", "envoy:1.29"), container("web", "repo/app:v1")];

        let rewritten = rewrite_container_image(&containers, "api", "repo/app:v2");

        assert_eq!(rewritten, containers);
        assert!(!has_container(&containers, "api"));
        assert!(has_container(&containers, "web"));
    }

    #[tokio::test]
    async fn test_describe_service_task_definition() {
        let (client, _) = get_mock_ecs_client(vec![(
            200,
            r#"{"services":[{"serviceName":"svc","taskDefinition":"arn:aws:ecs:eu-central-1:123456789012:task-definition/app:3"}],"failures":[]}"#,
        )]);

        let reference = describe_service_task_definition(&client, "default", "svc")
            .await
            .unwrap();
        assert_eq!(
            reference,
            "arn:aws:ecs:eu-central-1:123456789012:task-definition/app:3"
        );
    }

    #[tokio::test]
    async fn test_describe_service_not_found() {
        let (client, _) = get_mock_ecs_client(vec![(
            200,
            r#"{"services":[],"failures":[{"arn":"arn:aws:ecs:eu-central-1:123456789012:service/default/svc","reason":"MISSING"}]}"#,
        )]);

        let err = describe_service_task_definition(&client, "default", "svc")
            .await
            .unwrap_err();
        match err {
            EcsError::ServiceNotFound { reason, .. } => assert_eq!(reason, "MISSING"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_describe_service_without_task_definition() {
        let (client, _) = get_mock_ecs_client(vec![(
            200,
            r#"{"services":[{"serviceName":"svc"}],"failures":[]}"#,
        )]);

        let err = describe_service_task_definition(&client, "default", "svc")
            .await
            .unwrap_err();
        assert!(matches!(err, EcsError::MissingTaskDefinition { ref service } if service == "svc"));
    }

    #[tokio::test]
    async fn test_describe_task_definition_not_found() {
        let (client, _) = get_mock_ecs_client(vec![(200, "{}")]);

        let err = describe_task_definition(&client, "app:3").await.unwrap_err();
        assert!(matches!(err, EcsError::TaskDefinitionNotFound(ref r) if r == "app:3"));
    }

    #[tokio::test]
    async fn test_describe_task_definition_service_error() {
        let (client, _) = get_mock_ecs_client(vec![(
            400,
            r#"{"__type":"ClientException","message":"Unable to describe task definition."}"#,
        )]);

        let err = describe_task_definition(&client, "app:3").await.unwrap_err();
        assert!(matches!(err, EcsError::DescribeTaskDefinition(_)));
        assert!(
            err.to_string().contains("Unable to describe task definition."),
            "got: {}",
            err
        );
    }

    #[tokio::test]
    async fn test_register_requires_arn() {
        let (client, http_client) =
            get_mock_ecs_client(vec![(200, r#"{"taskDefinition":{"family":"app"}}"#)]);
        let source = TaskDefinition::builder().family("app").build();

        let err = register_task_definition(&client, &source, vec![container("web", "repo/app:v2")])
            .await
            .unwrap_err();
        assert!(matches!(err, EcsError::MissingTaskDefinitionArn(ref f) if f == "app"));
        assert_eq!(http_client.actual_requests().count(), 1);
    }
}
