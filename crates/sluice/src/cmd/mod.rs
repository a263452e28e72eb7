//! Command implementations for the Sluice CLI

pub mod check;
pub mod run;

use anyhow::{Context, Result};
use sluice_config::Config;
use std::path::{Path, PathBuf};

/// Paths tried when no `--config` is given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["sluice.toml", "configs/sluice.toml"];

/// Load configuration: explicit path > default paths > built-in defaults
///
/// Runs before logging is installed, so nothing here logs.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Config::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()));
    }

    for candidate in DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from) {
        if candidate.exists() {
            return Config::from_file(&candidate).with_context(|| {
                format!("failed to load configuration from {}", candidate.display())
            });
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_explicit_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[pipelines]]\nid = \"p1\"\nevent_type = \"a\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.pipelines.len(), 1);
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_invalid_config_has_context() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[pipelines]]\nid = \"a|b\"\nevent_type = \"a\"").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().starts_with("failed to load configuration"));
    }
}
