use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::convert::SchemaOverrides;
use crate::error::ConvertError;
use crate::iac::ExecutorKind;
use crate::remote::NameFrom;
use crate::traits::FileSystem;

/// Settings for a conversion run, typically loaded from .appconv.yaml
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// IaC binary used for init/import/apply
    pub executor: ExecutorKind,
    /// Directory (relative to the working directory) for the source-side files
    pub source_dir: PathBuf,
    /// Directory (relative to the working directory) for the destination-side files
    pub destination_dir: PathBuf,
    pub name_from: NameFrom,
    /// Parameters for the destination `provider` block
    pub destination_provider: BTreeMap<String, Value>,
    pub schemas: SchemaOverrides,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            executor: ExecutorKind::default(),
            source_dir: PathBuf::from("src"),
            destination_dir: PathBuf::from("dst"),
            name_from: NameFrom::default(),
            destination_provider: BTreeMap::new(),
            schemas: SchemaOverrides::default(),
        }
    }
}

impl ConvertConfig {
    pub const FILE_NAME: &'static str = ".appconv.yaml";

    /// Resolve the configuration for a run
    ///
    /// An explicit path must exist. Otherwise `.appconv.yaml` in the working
    /// directory wins over `~/.appconv/config.yaml`; with neither, defaults.
    pub fn load(fs: &dyn FileSystem, working_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(fs, path);
        }

        let local = working_dir.join(Self::FILE_NAME);
        if fs.exists(&local) {
            return Self::from_file(fs, &local);
        }

        if let Some(global) = Self::global_path() {
            if fs.exists(&global) {
                return Self::from_file(fs, &global);
            }
        }

        Ok(Self::default())
    }

    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs
            .read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load configuration {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes to null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: ConvertConfig = serde_yaml::from_str(content).map_err(ConvertError::from)?;

        if same_directory(&config.source_dir, &config.destination_dir) {
            return Err(ConvertError::Config(format!(
                "source_dir and destination_dir must differ (both are '{}')",
                config.source_dir.display()
            ))
            .into());
        }

        Ok(config)
    }

    fn global_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".appconv").join("config.yaml"))
    }
}

/// Compare two relative directories after resolving `.` and `..` lexically
fn same_directory(a: &Path, b: &Path) -> bool {
    lexical_components(a) == lexical_components(b)
}

fn lexical_components(path: &Path) -> Vec<Component<'_>> {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(components.last(), Some(Component::Normal(_))) => {
                components.pop();
            }
            other => components.push(other),
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{SchemaSelector, Variant};
    use crate::traits::MockFileSystem;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = ConvertConfig::from_yaml("").unwrap();

        assert_eq!(config.executor, ExecutorKind::Terraform);
        assert_eq!(config.source_dir, PathBuf::from("src"));
        assert_eq!(config.destination_dir, PathBuf::from("dst"));
        assert_eq!(config.name_from, NameFrom::DisplayName);
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
executor: tofu
source_dir: export
destination_dir: target
name_from: type_tag
destination_provider:
  url: https://api.eu.onelogin.com
  retries: 3
schemas:
  destination:
    onelogin_apps:
      - name
      - visible
"#;
        let config = ConvertConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.executor, ExecutorKind::Tofu);
        assert_eq!(config.source_dir, PathBuf::from("export"));
        assert_eq!(config.name_from, NameFrom::TypeTag);
        assert_eq!(config.destination_provider["url"], json!("https://api.eu.onelogin.com"));
        assert_eq!(config.destination_provider["retries"], json!(3));

        let mut selector = SchemaSelector::builtin();
        selector.apply_overrides(&config.schemas);
        assert_eq!(
            selector
                .resolve("onelogin_apps", Variant::Destination)
                .unwrap()
                .fields()
                .len(),
            2
        );
    }

    #[test]
    fn test_rejects_unknown_keys_and_same_dirs() {
        assert!(ConvertConfig::from_yaml("exeuctor: tofu\n").is_err());

        let err = ConvertConfig::from_yaml("source_dir: out\ndestination_dir: out\n").unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_same_dirs_spelled_differently() {
        for (source, destination) in [("src", "./src"), ("src/", "src"), ("dst/../src", "src")] {
            let yaml = format!("source_dir: {}\ndestination_dir: {}\n", source, destination);
            let err = ConvertConfig::from_yaml(&yaml).unwrap_err();
            assert!(err.to_string().contains("must differ"), "{} vs {}", source, destination);
        }

        let config = ConvertConfig::from_yaml("source_dir: ./src\ndestination_dir: ./out\n").unwrap();
        assert_eq!(config.destination_dir, PathBuf::from("./out"));
        assert!(!same_directory(Path::new("../src"), Path::new("src")));
    }

    #[test]
    fn test_load_prefers_working_dir_file() {
        let fs = MockFileSystem::new();
        let workdir = Path::new("/work");
        fs.write(&workdir.join(ConvertConfig::FILE_NAME), "executor: tofu\n")
            .unwrap();

        let config = ConvertConfig::load(&fs, workdir, None).unwrap();
        assert_eq!(config.executor, ExecutorKind::Tofu);
    }

    #[test]
    fn test_load_explicit_path_must_exist() {
        let fs = MockFileSystem::new();
        let result = ConvertConfig::load(&fs, Path::new("/work"), Some(Path::new("/nope.yaml")));
        assert!(result.is_err());
    }
}
