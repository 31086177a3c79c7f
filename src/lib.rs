use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::clients::AwsClients;
use crate::config::{Config, DeployMode};
use crate::deploy::DeployOutcome;

pub mod clients;
pub mod config;
pub mod deploy;
pub mod ecs;
pub mod params;

pub fn set_up_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .init();
}

// lambda handler
pub async fn function_handler(
    clients: &AwsClients,
    config: &Config,
    evt: LambdaEvent<Value>,
) -> Result<DeployOutcome, Error> {
    info!("Handling lambda invocation in {} mode", config.mode);
    debug!("Handling event payload: {:?}", evt.payload);

    let outcome = match config.mode {
        DeployMode::Service => deploy::service::handler(clients, config, evt.payload).await?,
        DeployMode::Family => deploy::family::handler(clients, config, evt.payload).await?,
    };

    Ok(outcome)
}
