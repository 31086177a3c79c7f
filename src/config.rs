use std::str::FromStr;
use std::string::String;
use std::{env, fmt};

pub const DEFAULT_CLUSTER: &str = "default";
pub const DEFAULT_IMAGE_TAG: &str = "latest";

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: DeployMode,
    pub default_cluster: String,
    pub default_image_tag: String,
    // fail instead of registering an unchanged revision when no container matches
    pub require_container_match: bool,
    pub force_new_deployment: bool,
}

/// Selects how the task definition to update is located.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum DeployMode {
    /// Read the task definition from a running service, then update that service.
    Service,
    /// Name the task family directly; the service update is optional.
    Family,
}

impl FromStr for DeployMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "Service" | "service" => Ok(DeployMode::Service),
            "Family" | "family" | "TaskFamily" => Ok(DeployMode::Family),
            other => Err(format!("Invalid or Unsupported deploy mode {}", other)),
        }
    }
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Config {
    #[cfg(test)]
    pub(crate) fn new(mode: DeployMode) -> Config {
        Config {
            mode,
            default_cluster: DEFAULT_CLUSTER.to_string(),
            default_image_tag: DEFAULT_IMAGE_TAG.to_string(),
            require_container_match: false,
            force_new_deployment: false,
        }
    }

    pub fn load_from_env() -> Result<Config, String> {
        let conf = Config {
            mode: env::var("DEPLOY_MODE")
                .map_err(|e| format!("DEPLOY_MODE not set - {}", e))
                .and_then(|s| s.parse::<DeployMode>())?,
            default_cluster: env::var("DEFAULT_CLUSTER")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_CLUSTER.to_string()),
            default_image_tag: env::var("DEFAULT_IMAGE_TAG")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_IMAGE_TAG.to_string()),
            require_container_match: env::var("REQUIRE_CONTAINER_MATCH")
                .unwrap_or("false".to_string())
                .parse::<bool>()
                .map_err(|e| format!("Error parsing REQUIRE_CONTAINER_MATCH to bool - {}", e))?,
            force_new_deployment: env::var("FORCE_NEW_DEPLOYMENT")
                .unwrap_or("false".to_string())
                .parse::<bool>()
                .map_err(|e| format!("Error parsing FORCE_NEW_DEPLOYMENT to bool - {}", e))?,
        };

        Ok(conf)
    }
}
