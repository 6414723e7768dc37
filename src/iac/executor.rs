use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// Which IaC binary drives the import/apply cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    #[default]
    Terraform,
    #[serde(alias = "opentofu")]
    Tofu,
}

impl ExecutorKind {
    pub fn binary(&self) -> &'static str {
        match self {
            ExecutorKind::Terraform => "terraform",
            ExecutorKind::Tofu => "tofu",
        }
    }
}

/// Trait for Infrastructure as Code executors (Terraform, OpenTofu)
///
/// Every operation fails with `ConvertError::ExternalTool` when the binary
/// exits unsuccessfully.
pub trait IacExecutor {
    /// Check if the IaC executor is installed and available
    fn check_installed(&self) -> Result<bool>;

    /// Initialize providers in the working directory
    fn init(&self, working_dir: &Path) -> Result<()>;

    /// Import remote object `id` into state under `address`
    fn import(&self, working_dir: &Path, address: &str, id: &str) -> Result<()>;

    /// Create or update everything declared in the working directory
    fn apply(&self, working_dir: &Path) -> Result<()>;

    /// Get the name of this executor (e.g., "terraform", "tofu")
    fn get_name(&self) -> &str;
}
