use crate::job::SpeedFactor;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Default speed is a usable tempo
/// - Transcoder path is set and the timeout is not 0
/// - Broadcast capacity is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if let Err(e) = SpeedFactor::new(config.engine.default_speed) {
        return Err(ConfigError::ValidationError(format!(
            "engine.default_speed: {}",
            e
        )));
    }

    if config.engine.broadcast_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "engine.broadcast_capacity cannot be 0".to_string(),
        ));
    }

    if config.transcoder.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "transcoder.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.transcoder.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "transcoder.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_speed_out_of_range() {
        let mut config = Config::default();
        config.engine.default_speed = 0.1;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("default_speed"));
    }

    #[test]
    fn test_validate_zero_capacity_fails() {
        let mut config = Config::default();
        config.engine.broadcast_capacity = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_transcoder() {
        let mut config = Config::default();
        config.transcoder.ffmpeg_path = std::path::PathBuf::new();
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.transcoder.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
