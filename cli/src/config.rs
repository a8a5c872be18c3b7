use std::path::Path;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Configuration for the CLI.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Options used when compiling patterns.
    pub engine: retrace::Config,
    /// Configuration for the `grep` command.
    pub grep: GrepConfig,
}

/// Configuration for the `grep` command.
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct GrepConfig {
    /// Print line numbers even if `--line-number` is not used.
    pub line_number: bool,
    /// Highlight matches. Colors are never used when the output is not a
    /// terminal.
    pub color: bool,
}

impl Default for GrepConfig {
    fn default() -> GrepConfig {
        GrepConfig { line_number: false, color: true }
    }
}

/// Load a config file from a given path. Path must contain a valid TOML file
/// or this function will propagate the error. Options missing in the file
/// take their default values.
pub fn load_config_from_file(
    config_file: &Path,
) -> Result<Config, Box<figment::Error>> {
    let config: Config =
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file_exact(config_file))
            .extract()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    use super::load_config_from_file;

    #[test]
    fn partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.child("config.toml");

        config_file.write_str("[grep]\nline_number = true\n").unwrap();

        let config = load_config_from_file(config_file.path()).unwrap();
        assert!(config.grep.line_number);
        assert!(config.grep.color);
        assert_eq!(config.engine, retrace::Config::default());
    }

    #[test]
    fn unknown_fields() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.child("config.toml");

        config_file.write_str("[engine]\nturbo = true\n").unwrap();

        assert!(load_config_from_file(config_file.path()).is_err());
    }
}
