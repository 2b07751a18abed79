use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `SPEEDUPPER_ENGINE__DEFAULT_SPEED=2.0`
const ENV_PREFIX: &str = "SPEEDUPPER_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(env_overrides())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load `path` if given, else the per-user config file if one exists,
/// else built-in defaults. Environment overrides apply in every case.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }

    if let Some(path) = default_config_path().filter(|p| p.exists()) {
        return load_config(&path);
    }

    Figment::from(Serialized::defaults(Config::default()))
        .merge(env_overrides())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// `<config dir>/speedupper/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("speedupper").join("config.toml"))
}

fn env_overrides() -> Env {
    // Nested keys use a double underscore: SPEEDUPPER_TRANSCODER__FFMPEG_PATH
    Env::prefixed(ENV_PREFIX).split("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[transcoder]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 60

[engine]
default_speed = 2.5
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(
            config.transcoder.ffmpeg_path,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        assert_eq!(config.transcoder.timeout_secs, 60);
        assert_eq!(config.engine.default_speed, 2.5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.transcoder.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.engine.default_speed, 1.84);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_config_from_str_wrong_type() {
        let toml = r#"
[engine]
default_speed = "fast"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[engine]
preview_dir = "/tmp/previews"
broadcast_capacity = 16

[logging]
level = "debug"
json = true
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.engine.preview_dir, PathBuf::from("/tmp/previews"));
        assert_eq!(config.engine.broadcast_capacity, 16);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_config_or_default_explicit_missing_path() {
        let result = load_config_or_default(Some(Path::new("/nonexistent/speedupper.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }
}
