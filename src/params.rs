use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::Config;

/// Every violation found while reading the deploy parameters out of an event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid deploy parameters: {}", .violations.join("; "))]
pub struct ParameterError {
    pub violations: Vec<String>,
}

/// Validated parameters of a single deploy invocation.
///
/// Only constructed through [`DeployParameters::for_service`] or
/// [`DeployParameters::for_family`], so every required field is present and
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployParameters {
    cluster: String,
    service: Option<String>,
    task_definition: String,
    container_name: String,
    image_base: String,
    image_tag: String,
    image: String,
}

enum Field {
    Missing,
    Invalid,
    Present(String),
}

fn missing(field: &str) -> String {
    format!("{} is required", field)
}

fn read_field(event: &Map<String, Value>, key: &str) -> Field {
    match event.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Field::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => Field::Missing,
        Some(Value::String(s)) => Field::Present(s.trim().to_string()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Field::Missing,
        Some(Value::Number(n)) => Field::Present(n.to_string()),
        Some(_) => Field::Invalid,
    }
}

struct FieldReader<'a> {
    event: &'a Map<String, Value>,
    violations: Vec<String>,
}

impl<'a> FieldReader<'a> {
    fn new(event: &'a Value) -> Result<Self, ParameterError> {
        match event.as_object() {
            Some(event) => Ok(FieldReader {
                event,
                violations: Vec::new(),
            }),
            None => Err(ParameterError {
                violations: vec!["event must be a JSON object".to_string()],
            }),
        }
    }

    fn optional(&mut self, key: &str) -> Option<String> {
        match read_field(self.event, key) {
            Field::Present(value) => Some(value),
            Field::Missing => None,
            Field::Invalid => {
                self.violations.push(format!("{} must be a string", key));
                None
            }
        }
    }

    fn required(&mut self, key: &str) -> String {
        match read_field(self.event, key) {
            Field::Present(value) => value,
            Field::Missing => {
                self.violations.push(missing(key));
                String::new()
            }
            Field::Invalid => {
                self.violations.push(format!("{} must be a string", key));
                String::new()
            }
        }
    }

    fn finish(self) -> Result<(), ParameterError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ParameterError {
                violations: self.violations,
            })
        }
    }
}

impl DeployParameters {
    /// Parameters for a deploy that reads the task definition from a running
    /// service. `service` and `taskDefinition` are both required.
    pub fn for_service(event: &Value, config: &Config) -> Result<Self, ParameterError> {
        let mut reader = FieldReader::new(event)?;
        let cluster = reader.optional("cluster");
        let service = reader.required("service");
        let task_definition = reader.required("taskDefinition");
        let container_name = reader.required("containerName");
        let image_base = reader.required("imageBase");
        let image_tag = reader.optional("imageTag");
        reader.finish()?;

        Ok(Self::build(
            config,
            cluster,
            Some(service),
            task_definition,
            container_name,
            image_base,
            image_tag,
        ))
    }

    /// Parameters for a deploy that names the task family directly. The
    /// service is optional, but must be given whenever a cluster is.
    pub fn for_family(event: &Value, config: &Config) -> Result<Self, ParameterError> {
        let mut reader = FieldReader::new(event)?;
        let cluster = reader.optional("cluster");
        let service = reader.optional("service");
        let task_family = reader.required("taskFamily");
        let container_name = reader.required("containerName");
        let image_base = reader.required("imageBase");
        let image_tag = reader.optional("imageTag");
        if cluster.is_some() && service.is_none() {
            reader
                .violations
                .push("service is required when cluster is specified".to_string());
        }
        reader.finish()?;

        Ok(Self::build(
            config,
            cluster,
            service,
            task_family,
            container_name,
            image_base,
            image_tag,
        ))
    }

    fn build(
        config: &Config,
        cluster: Option<String>,
        service: Option<String>,
        task_definition: String,
        container_name: String,
        image_base: String,
        image_tag: Option<String>,
    ) -> Self {
        let image_tag = image_tag.unwrap_or_else(|| config.default_image_tag.clone());
        let image = format!("{}:{}", image_base, image_tag);
        DeployParameters {
            cluster: cluster.unwrap_or_else(|| config.default_cluster.clone()),
            service,
            task_definition,
            container_name,
            image_base,
            image_tag,
            image,
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// The `taskDefinition` reference or the `taskFamily`, depending on the
    /// factory used.
    pub fn task_definition(&self) -> &str {
        &self.task_definition
    }

    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    pub fn image_base(&self) -> &str {
        &self.image_base
    }

    pub fn image_tag(&self) -> &str {
        &self.image_tag
    }

    pub fn image(&self) -> &str {
        &self.image
    }
}
