pub mod executor;
pub mod terraform;

pub use executor::{ExecutorKind, IacExecutor};
pub use terraform::TerraformExecutor;
