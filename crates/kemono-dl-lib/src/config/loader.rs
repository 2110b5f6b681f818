use super::Config;
use crate::error::KemonoDlError;
use config::{Config as ConfigBuilder, Environment, File};

pub const ENV_PREFIX: &str = "KEMONO_DL";

/// Layers, lowest priority first: built-in defaults, the optional config file,
/// then `KEMONO_DL__*` environment variables.
pub fn load_config(config_path: Option<&str>) -> Result<Config, KemonoDlError> {
    let mut config_builder = ConfigBuilder::builder();

    if let Some(config_path) = config_path {
        config_builder = config_builder.add_source(File::with_name(config_path));
    }

    let app_config: Config = config_builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    validate_config(&app_config)?;
    Ok(app_config)
}

pub fn validate_config(app_config: &Config) -> Result<(), KemonoDlError> {
    let invalid = |details: &str| {
        Err(KemonoDlError::ConfigValidation {
            details: details.to_string(),
        })
    };

    if app_config.threads == 0 {
        return invalid("threads must be greater than 0");
    }
    if app_config.retry.max_attempts == 0 {
        return invalid("retry.max_attempts must be greater than 0");
    }
    if app_config.retry.multiplier.is_nan() || app_config.retry.multiplier < 1.0 {
        return invalid("retry.multiplier must be at least 1.0");
    }
    if app_config.retry.max_backoff_ms < app_config.retry.initial_backoff_ms {
        return invalid("retry.max_backoff_ms must not be smaller than retry.initial_backoff_ms");
    }
    if app_config.http.request_timeout_secs == 0 || app_config.http.connect_timeout_secs == 0 {
        return invalid("http timeouts must be greater than 0");
    }
    Ok(())
}
