//! Global config store — load, or synthesize and persist a default on first use.
//!
//! A user-supplied config file is never written back. The only file this
//! module creates is the default config, and only when it is missing.

use super::error::EmitError;
use super::paths;
use super::types::GlobalConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bundled default configuration. Relative paths resolve against the cwd.
const DEFAULT_CONFIG_JSON: &str = include_str!("default_config.json");

/// Derive the default config location under a home directory.
pub fn default_config_path(homedir: &Path) -> PathBuf {
    homedir.join("wic").join("global_config.json")
}

/// Return the config at `config_file` with every search path absolute.
///
/// If `config_file` is missing and is the default location, the bundled
/// default is written there first. If it is missing and the user named it
/// explicitly, `EmitError::MissingUserConfig` is returned.
pub fn get_config(config_file: &Path, default_config_file: &Path) -> Result<GlobalConfig, EmitError> {
    if config_file.exists() {
        return read_config_from_disk(config_file);
    }
    if config_file != default_config_file {
        return Err(EmitError::MissingUserConfig {
            path: config_file.to_path_buf(),
        });
    }

    let config = default_config()?;
    write_config_to_disk(&config, default_config_file)?;
    info!(path = %default_config_file.display(), "default config file generated");
    Ok(config)
}

/// Read a config file and make its search paths absolute.
pub fn read_config_from_disk(config_file: &Path) -> Result<GlobalConfig, EmitError> {
    let content = std::fs::read_to_string(config_file).map_err(EmitError::io(config_file))?;
    let config = parse_config(&content, config_file)?;
    debug!(path = %config_file.display(), "loaded config");
    absolutize_config(config)
}

/// Parse a config document. `origin` is only used in error messages.
pub fn parse_config(json: &str, origin: &Path) -> Result<GlobalConfig, EmitError> {
    serde_json::from_str(json).map_err(EmitError::json(origin))
}

/// Pass every search-path category through the path resolver.
pub fn absolutize_config(mut config: GlobalConfig) -> Result<GlobalConfig, EmitError> {
    config.search_paths_cwl = paths::absolute_paths(&config.search_paths_cwl)?;
    config.search_paths_wic = paths::absolute_paths(&config.search_paths_wic)?;
    Ok(config)
}

/// The bundled default config with absolute paths.
pub fn default_config() -> Result<GlobalConfig, EmitError> {
    let config = parse_config(DEFAULT_CONFIG_JSON, Path::new("<bundled default_config.json>"))?;
    absolutize_config(config)
}

/// Write a config as pretty JSON, creating parent directories.
pub fn write_config_to_disk(config: &GlobalConfig, config_file: &Path) -> Result<(), EmitError> {
    if let Some(parent) = config_file.parent() {
        std::fs::create_dir_all(parent).map_err(EmitError::io(parent))?;
    }
    let json = serde_json::to_string_pretty(config).map_err(EmitError::json(config_file))?;
    std::fs::write(config_file, json).map_err(EmitError::io(config_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_paths(config: &GlobalConfig) -> Vec<&String> {
        config
            .search_paths_cwl
            .values()
            .chain(config.search_paths_wic.values())
            .flatten()
            .collect()
    }

    #[test]
    fn test_config_default_path() {
        let p = default_config_path(Path::new("/home/u"));
        assert_eq!(p, PathBuf::from("/home/u/wic/global_config.json"));
    }

    #[test]
    fn test_config_bundled_default_parses() {
        let config = default_config().unwrap();
        assert!(!config.search_paths_cwl.is_empty());
        assert!(!config.search_paths_wic.is_empty());
        assert!(all_paths(&config).iter().all(|p| Path::new(p).is_absolute()));
    }

    #[test]
    fn test_config_generates_default_once() {
        let dir = tempfile::tempdir().unwrap();
        let default = default_config_path(dir.path());

        let first = get_config(&default, &default).unwrap();
        assert!(default.exists());
        let content_first = std::fs::read_to_string(&default).unwrap();

        let second = get_config(&default, &default).unwrap();
        let content_second = std::fs::read_to_string(&default).unwrap();

        assert_eq!(first, second);
        assert_eq!(content_first, content_second);
    }

    #[test]
    fn test_config_missing_user_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let default = default_config_path(dir.path());
        let user = dir.path().join("typo.json");

        let err = get_config(&user, &default).unwrap_err();
        assert!(err.is_fatal_user_error());
        assert!(!default.exists());
        assert!(!user.exists());
    }

    #[test]
    fn test_config_user_file_made_absolute_but_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("mine.json");
        let raw = r#"{
  "search_paths_cwl": {"global": ["adapters", "/abs/tools"]},
  "search_paths_wic": {"global": ["wfs"], "lab": ["../lab/wfs"]},
  "note": "kept"
}"#;
        std::fs::write(&user, raw).unwrap();

        let config = get_config(&user, &default_config_path(dir.path())).unwrap();
        assert!(all_paths(&config).iter().all(|p| Path::new(p).is_absolute()));
        assert_eq!(config.search_paths_cwl["global"][1], "/abs/tools");
        assert_eq!(config.extra["note"], serde_json::json!("kept"));
        assert_eq!(std::fs::read_to_string(&user).unwrap(), raw);
    }

    #[test]
    fn test_config_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("bad.json");
        std::fs::write(&user, "{ not json").unwrap();
        let err = read_config_from_disk(&user).unwrap_err();
        assert!(matches!(err, EmitError::Json { .. }));
    }

    #[test]
    fn test_config_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("config.json");
        write_config_to_disk(&GlobalConfig::default(), &target).unwrap();
        let back = read_config_from_disk(&target).unwrap();
        assert_eq!(back, GlobalConfig::default());
    }
}
