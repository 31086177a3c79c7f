use aws_config::BehaviorVersion;
use ecs_image_deployer::clients::AwsClients;
use ecs_image_deployer::config;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    ecs_image_deployer::set_up_logging();

    info!(
        "Initializing {} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let clients = AwsClients::new(&aws_config);
    let config = config::Config::load_from_env()?;

    run(service_fn(|request: LambdaEvent<Value>| {
        ecs_image_deployer::function_handler(&clients, &config, request)
    }))
    .await
}
