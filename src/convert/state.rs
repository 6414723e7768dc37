use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ConvertError;
use crate::traits::FileSystem;

/// A resource instance captured in Terraform/OpenTofu state after import
#[derive(Debug, Clone, PartialEq)]
pub struct StateInstance {
    pub resource_type: String,
    pub name: String,
    pub attributes: Map<String, Value>,
}

/// Parses Terraform/OpenTofu state files
pub struct StateParser;

impl StateParser {
    /// Read and parse a `terraform.tfstate` file
    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Vec<StateInstance>> {
        let content = fs
            .read_to_string(path)
            .map_err(|e| ConvertError::FileSystem(format!("{:#}", e)))
            .with_context(|| format!("Failed to collect state from {}", path.display()))?;

        Self::parse_str(&content)
            .with_context(|| format!("Failed to parse state file {}", path.display()))
    }

    /// Extract managed resource instances, in state order
    ///
    /// Imported resources carry exactly one instance; anything else (count,
    /// for_each) was not produced by this tool and is rejected.
    pub fn parse_str(content: &str) -> Result<Vec<StateInstance>> {
        let state: Value =
            serde_json::from_str(content).context("Failed to parse state file as JSON")?;

        let mut instances = Vec::new();

        let Some(resources) = state.get("resources").and_then(|r| r.as_array()) else {
            return Ok(instances);
        };

        for resource in resources {
            let mode = resource
                .get("mode")
                .and_then(|m| m.as_str())
                .unwrap_or("managed");
            if mode != "managed" {
                continue;
            }

            let resource_type = resource
                .get("type")
                .and_then(|t| t.as_str())
                .context("State resource is missing 'type'")?;
            let resource_name = resource
                .get("name")
                .and_then(|n| n.as_str())
                .context("State resource is missing 'name'")?;

            let state_instances = resource
                .get("instances")
                .and_then(|i| i.as_array())
                .map(Vec::as_slice)
                .unwrap_or_default();

            match state_instances {
                [] => continue,
                [instance] => {
                    let attributes = instance
                        .get("attributes")
                        .and_then(|a| a.as_object())
                        .cloned()
                        .unwrap_or_default();

                    instances.push(StateInstance {
                        resource_type: resource_type.to_string(),
                        name: resource_name.to_string(),
                        attributes,
                    });
                }
                _ => anyhow::bail!(
                    "Resource {}.{} has {} instances; only single-instance resources can be converted",
                    resource_type,
                    resource_name,
                    state_instances.len()
                ),
            }
        }

        Ok(instances)
    }
}
