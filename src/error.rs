use std::fmt;

use crate::convert::schema::Variant;

/// Error types for a conversion run
///
/// Every variant is terminal for the run. `SchemaMismatch` is the odd one out:
/// it never comes from the user's environment, it means the classifier and the
/// schema tables disagree about which resource types exist.
#[derive(Debug)]
pub enum ConvertError {
    /// A listing request against the provider API failed
    RemoteFetch {
        /// Resources accumulated from earlier pages before the failure
        fetched: usize,
        message: String,
    },

    /// Declaration or state files could not be read or written
    FileSystem(String),

    /// The IaC binary exited unsuccessfully
    ExternalTool {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// A state instance has a type with no allow-list for the requested variant
    SchemaMismatch {
        resource_type: String,
        variant: Variant,
    },

    /// The source/destination pair is not a known conversion
    UnknownConversion {
        source: String,
        destination: String,
        available: Vec<String>,
    },

    /// Configuration file or credentials are unusable
    Config(String),
}

impl ConvertError {
    /// Whether this error indicates a bug rather than an environmental failure
    pub fn is_internal(&self) -> bool {
        matches!(self, ConvertError::SchemaMismatch { .. })
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::RemoteFetch { fetched, message } => {
                write!(
                    f,
                    "Failed to retrieve apps (aborted after {} fetched): {}",
                    fetched, message
                )
            }
            ConvertError::FileSystem(msg) => {
                write!(f, "File system error: {}", msg)
            }
            ConvertError::ExternalTool {
                command,
                exit_code,
                stderr,
            } => {
                write!(f, "Command '{}' failed", command)?;

                if let Some(code) = exit_code {
                    write!(f, " (exit code {})", code)?;
                }

                if stderr.trim().is_empty() {
                    Ok(())
                } else {
                    write!(f, ": {}", stderr.trim())
                }
            }
            ConvertError::SchemaMismatch {
                resource_type,
                variant,
            } => {
                write!(
                    f,
                    "Internal error: no {} schema for resource type '{}'",
                    variant, resource_type
                )
            }
            ConvertError::UnknownConversion {
                source,
                destination,
                available,
            } => {
                write!(
                    f,
                    "Unknown conversion '{} => {}'. Available conversions: {}",
                    source,
                    destination,
                    available.join(", ")
                )
            }
            ConvertError::Config(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::FileSystem(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        ConvertError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_tool_display_includes_exit_code_and_stderr() {
        let err = ConvertError::ExternalTool {
            command: "terraform import onelogin_apps.app-1 1".to_string(),
            exit_code: Some(1),
            stderr: "Error: resource not found\n".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Command 'terraform import onelogin_apps.app-1 1' failed (exit code 1): Error: resource not found"
        );
    }

    #[test]
    fn test_only_schema_mismatch_is_internal() {
        let mismatch = ConvertError::SchemaMismatch {
            resource_type: "okta_apps".to_string(),
            variant: Variant::Destination,
        };
        assert!(mismatch.is_internal());
        assert!(mismatch.to_string().contains("destination"));

        let remote = ConvertError::RemoteFetch {
            fetched: 3,
            message: "timeout".to_string(),
        };
        assert!(!remote.is_internal());
        assert!(remote.to_string().contains("after 3 fetched"));
    }

    #[test]
    fn test_unknown_conversion_lists_available() {
        let err = ConvertError::UnknownConversion {
            source: "okta_apps".to_string(),
            destination: "onelogin_apps".to_string(),
            available: vec!["onelogin_apps => onelogin_apps".to_string()],
        };
        assert!(err.to_string().contains("Available conversions: onelogin_apps => onelogin_apps"));
    }
}
