//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{FluxConfig, LogOutput};

/// Validates a loaded configuration.
///
/// Catches the values figment cannot reject on its own: a trigger that is
/// not exactly one character and zero-capacity buffers.
pub fn validate_config(config: &FluxConfig) -> ConfigResult<()> {
    let trigger_chars = config.engine.trigger.chars().count();
    if trigger_chars != 1 {
        return Err(ConfigError::Invalid(format!(
            "engine.trigger must be exactly one character, got {:?}",
            config.engine.trigger
        )));
    }

    if config.engine.buffer_size == 0 {
        return Err(ConfigError::Invalid(
            "engine.buffer_size must be at least 1".to_string(),
        ));
    }

    if config.engine.adapter_channel_size == 0 {
        return Err(ConfigError::Invalid(
            "engine.adapter_channel_size must be at least 1".to_string(),
        ));
    }

    if config.logging.output == LogOutput::File && config.logging.file_path.is_none() {
        return Err(ConfigError::Invalid(
            "logging.output = \"file\" requires logging.file_path".to_string(),
        ));
    }

    Ok(())
}
