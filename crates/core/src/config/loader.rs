//! Configuration file loader for the `.nocopy/` directory.
//!
//! The only file read is `.nocopy/config.toml`:
//!
//! ```toml
//! work_dir = "/var/tmp/nocopy"
//! artifact_name = "nocopyoutput"
//!
//! [toolchains.C]
//! compile = [{ program = "clang", args = ["{source}", "-o", "{output}"] }]
//!
//! [toolchains.Python]
//! run = [{ program = "pypy3", args = ["{script}"] }]
//! ```

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{HarnessConfig, ToolchainOverride, DEFAULT_ARTIFACT_NAME};
use nc_protocol::Language;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// On-disk shape of `config.toml`, before validation.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    work_dir: Option<PathBuf>,

    #[serde(default)]
    artifact_name: Option<String>,

    #[serde(default)]
    toolchains: HashMap<String, ToolchainOverride>,
}

/// Loads the harness configuration from `<root>/.nocopy/config.toml`.
///
/// # Returns
///
/// A validated `HarnessConfig`. If the `.nocopy/` directory or the file is
/// missing, returns the default configuration rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file is not valid TOML or has unknown keys
/// - A toolchain table names an unknown language, has an empty candidate
///   list, or the artifact name is not a plain file name
///
/// # Example
///
/// ```rust,no_run
/// use nc_core::config::load_config;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("."))?;
/// println!("Staging into {}", config.work_dir().display());
/// # Ok(())
/// # }
/// ```
pub fn load_config(root: &Path) -> ConfigResult<HarnessConfig> {
    let config_path = root.join(".nocopy").join("config.toml");

    // If config.toml doesn't exist, return default
    if !config_path.exists() {
        return Ok(HarnessConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    parse_config(&content, &config_path)
}

/// Parses and validates the content of a `config.toml` file.
///
/// `path` is only used for error messages.
pub fn parse_config(content: &str, path: &Path) -> ConfigResult<HarnessConfig> {
    let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    let invalid = |reason: String| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
    };

    let artifact_name = raw
        .artifact_name
        .unwrap_or_else(|| DEFAULT_ARTIFACT_NAME.to_string());
    if artifact_name.trim().is_empty()
        || artifact_name.contains('/')
        || artifact_name.contains('\\')
    {
        return Err(invalid(format!(
            "artifact_name must be a plain file name, got {artifact_name:?}"
        )));
    }

    let mut toolchains = HashMap::new();
    for (tag, toolchain) in raw.toolchains {
        let language = Language::from_tag(&tag)
            .ok_or_else(|| invalid(format!("unknown language in [toolchains.{tag}]")))?;

        for (role, list) in [("compile", &toolchain.compile), ("run", &toolchain.run)] {
            let Some(list) = list else { continue };
            if list.is_empty() {
                return Err(invalid(format!(
                    "[toolchains.{tag}] {role} must list at least one candidate"
                )));
            }
            if list.iter().any(|c| c.program.trim().is_empty()) {
                return Err(invalid(format!(
                    "[toolchains.{tag}] {role} has a candidate with an empty program"
                )));
            }
        }

        toolchains.insert(language, toolchain);
    }

    Ok(HarnessConfig {
        work_dir: raw.work_dir,
        artifact_name,
        toolchains,
    })
}
