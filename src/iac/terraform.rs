use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use super::executor::{ExecutorKind, IacExecutor};
use crate::error::ConvertError;
use crate::traits::CommandExecutor;

/// Terraform/OpenTofu executor implementation
pub struct TerraformExecutor {
    kind: ExecutorKind,
    command: Arc<dyn CommandExecutor>,
}

impl TerraformExecutor {
    pub fn new(kind: ExecutorKind, command: Arc<dyn CommandExecutor>) -> Self {
        Self { kind, command }
    }

    fn run(&self, working_dir: &Path, args: &[&str]) -> Result<()> {
        let binary = self.kind.binary();
        let output = self.command.execute(binary, args, working_dir)?;

        if !output.status.success() {
            return Err(ConvertError::ExternalTool {
                command: format!("{} {}", binary, args.join(" ")),
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        Ok(())
    }
}

impl IacExecutor for TerraformExecutor {
    fn check_installed(&self) -> Result<bool> {
        match self
            .command
            .execute(self.kind.binary(), &["version"], Path::new("."))
        {
            Ok(output) => Ok(output.status.success()),
            Err(_) => Ok(false), // Command not found or failed to execute
        }
    }

    fn init(&self, working_dir: &Path) -> Result<()> {
        self.run(working_dir, &["init", "-input=false"])
    }

    fn import(&self, working_dir: &Path, address: &str, id: &str) -> Result<()> {
        self.run(working_dir, &["import", "-input=false", address, id])
    }

    fn apply(&self, working_dir: &Path) -> Result<()> {
        self.run(working_dir, &["apply", "-auto-approve", "-input=false"])
    }

    fn get_name(&self) -> &str {
        self.kind.binary()
    }
}
