use aws_config::SdkConfig;
use aws_sdk_ecs::Client as EcsClient;

/// A type used to hold the AWS clients required to interact with AWS services
/// used by the lambda function.
#[derive(Clone)]
pub struct AwsClients {
    pub ecs: EcsClient,
}

impl AwsClients {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        AwsClients {
            ecs: EcsClient::new(sdk_config),
        }
    }
}
