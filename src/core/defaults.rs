use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::io;

/// Root configuration structure for a `--config` file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct XrunConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// Settings a config file may override
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_shell")]
    pub shell: ShellConfig,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            shell: default_shell(),
        }
    }
}

/// Shell used to run rendered commands: `<program> <arg> "<command>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_shell_program")]
    pub program: String,

    #[serde(default = "default_shell_arg")]
    pub arg: String,
}

fn default_shell() -> ShellConfig {
    ShellConfig {
        program: default_shell_program(),
        arg: default_shell_arg(),
    }
}

#[cfg(windows)]
fn default_shell_program() -> String {
    "cmd".to_string()
}

#[cfg(not(windows))]
fn default_shell_program() -> String {
    "sh".to_string()
}

#[cfg(windows)]
fn default_shell_arg() -> String {
    "/C".to_string()
}

#[cfg(not(windows))]
fn default_shell_arg() -> String {
    "-c".to_string()
}

/// Load defaults from an explicit config file, or use the built-in ones.
///
/// Nothing is looked up implicitly. A given path that can't be read or
/// doesn't parse is an error.
pub fn load_config(explicit: Option<&Path>) -> crate::Result<Defaults> {
    let Some(path) = explicit else {
        return Ok(Defaults::default());
    };

    let content = io::read_file(path, &format!("read {}", path.display()))?;
    let config: XrunConfig = serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))?;

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config.defaults)
}
