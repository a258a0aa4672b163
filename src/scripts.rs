//! Cadence source lookup.
//!
//! Built-in sources are compiled into the binary. A configured directory
//! takes precedence, so edited scripts can be tried without rebuilding.
//! Names may carry a leading `cadence/` as in `cadence/create_account.cdc`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ExampleError, ExampleResult};

const EMBEDDED: &[(&str, &str)] = &[
    ("add_key.cdc", include_str!("../cadence/add_key.cdc")),
    ("create_account.cdc", include_str!("../cadence/create_account.cdc")),
    ("deploy_contract.cdc", include_str!("../cadence/deploy_contract.cdc")),
    (
        "execute_complex_script_example.cdc",
        include_str!("../cadence/execute_complex_script_example.cdc"),
    ),
    (
        "execute_simple_script_example.cdc",
        include_str!("../cadence/execute_simple_script_example.cdc"),
    ),
    ("great_token.cdc", include_str!("../cadence/great_token.cdc")),
    ("greeting_script.cdc", include_str!("../cadence/greeting_script.cdc")),
    ("simple_transaction.cdc", include_str!("../cadence/simple_transaction.cdc")),
    (
        "simple_transaction_2_authorizers.cdc",
        include_str!("../cadence/simple_transaction_2_authorizers.cdc"),
    ),
    ("transfer_flow.cdc", include_str!("../cadence/transfer_flow.cdc")),
    ("user_signature.cdc", include_str!("../cadence/user_signature.cdc")),
    (
        "user_signature_validate_all.cdc",
        include_str!("../cadence/user_signature_validate_all.cdc"),
    ),
    (
        "user_signature_validate_any.cdc",
        include_str!("../cadence/user_signature_validate_any.cdc"),
    ),
];

/// Resolves script names to Cadence source bytes.
#[derive(Debug, Clone, Default)]
pub struct ScriptLoader {
    directory: Option<PathBuf>,
}

impl ScriptLoader {
    /// Loader that only serves the built-in sources.
    pub fn embedded() -> Self {
        Self { directory: None }
    }

    /// Loader that checks `directory` before the built-in sources.
    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: Some(directory.into()),
        }
    }

    pub fn from_config(config: &crate::config::ScriptsConfig) -> Self {
        Self {
            directory: config.directory.clone(),
        }
    }

    /// Source bytes for `name`.
    pub fn load_script(&self, name: &str) -> ExampleResult<Vec<u8>> {
        let file_name = normalize(name);

        if let Some(dir) = &self.directory {
            let path = dir.join(file_name);
            if path.is_file() {
                tracing::debug!(path = %path.display(), "Loading script override");
                return fs::read(&path).map_err(|source| ExampleError::ScriptIo {
                    name: name.to_string(),
                    source,
                });
            }
        }

        EMBEDDED
            .iter()
            .find(|(n, _)| *n == file_name)
            .map(|(_, source)| source.as_bytes().to_vec())
            .ok_or_else(|| ExampleError::ScriptNotFound(name.to_string()))
    }

    /// Source text for `name`.
    pub fn load_script_content(&self, name: &str) -> ExampleResult<String> {
        let bytes = self.load_script(name)?;
        String::from_utf8(bytes).map_err(|e| ExampleError::ScriptIo {
            name: name.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }
}

/// Built-in source bytes for `name`.
pub fn load_script(name: &str) -> ExampleResult<Vec<u8>> {
    ScriptLoader::embedded().load_script(name)
}

/// Built-in source text for `name`.
pub fn load_script_content(name: &str) -> ExampleResult<String> {
    ScriptLoader::embedded().load_script_content(name)
}

/// Names of the built-in sources.
pub fn embedded_names() -> impl Iterator<Item = &'static str> {
    EMBEDDED.iter().map(|(n, _)| *n)
}

fn normalize(name: &str) -> &str {
    let name = name.strip_prefix("cadence/").unwrap_or(name);
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
}
