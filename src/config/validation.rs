use crate::config::types::{Config, CrawlerConfig, OutputConfig, TokenizerConfig, UserAgentConfig};
use crate::ConfigError;

/// Upper bound for the per-request timeout (five minutes)
const MAX_REQUEST_TIMEOUT_MS: u64 = 300_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_tokenizer_config(&config.tokenizer)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_ms < 1 || config.request_timeout_ms > MAX_REQUEST_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "request_timeout_ms must be between 1 and {}, got {}",
            MAX_REQUEST_TIMEOUT_MS, config.request_timeout_ms
        )));
    }

    if config.accept.trim().is_empty() {
        return Err(ConfigError::Validation(
            "accept header cannot be empty".to_string(),
        ));
    }

    if config.max_attempts == Some(0) {
        return Err(ConfigError::Validation(
            "max_attempts must be >= 1 when set".to_string(),
        ));
    }

    if let Some(idle) = config.idle_poll_ms {
        if idle < 10 {
            return Err(ConfigError::Validation(format!(
                "idle_poll_ms must be >= 10ms when set, got {}ms",
                idle
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "crawler_version cannot contain whitespace, got '{}'",
            config.crawler_version
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates tokenizer configuration
fn validate_tokenizer_config(config: &TokenizerConfig) -> Result<(), ConfigError> {
    if config.min_token_length < 1 {
        return Err(ConfigError::Validation(
            "min_token_length must be >= 1".to_string(),
        ));
    }

    if config.max_tokens < 1 {
        return Err(ConfigError::Validation(
            "max_tokens must be >= 1".to_string(),
        ));
    }

    Ok(())
}
