//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `ANOA_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `ANOA_SERVER__PORT=8080`
/// - `ANOA_GEMINI__API_KEY=...`
/// - `ANOA_GEMINI__USE_FAKE=true`
/// - `ANOA_AUDIO__DEFAULT_VOICE=Puck`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5080)?
        .set_default("server.max_body_bytes", 20 * 1024 * 1024)?
        .set_default("gemini.api_key", "")?
        .set_default("gemini.base_url", "https://generativelanguage.googleapis.com")?
        .set_default("gemini.text_model", "gemini-3-pro-preview")?
        .set_default("gemini.image_model", "gemini-2.5-flash-image")?
        .set_default("gemini.tts_model", "gemini-2.5-flash-preview-tts")?
        .set_default("gemini.timeout_secs", 120)?
        .set_default("gemini.max_retries", 0)?
        .set_default("gemini.use_fake", false)?
        .set_default("audio.default_voice", "Kore")?
        .set_default("audio.default_sample_rate", 24000)?
        .set_default("session.expire_secs", 3600)?
        .set_default("session.sweep_interval_secs", 300)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    builder = builder.add_source(
        Environment::with_prefix("ANOA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    // fake 生成端不需要 API key，真实生成端必须有
    if !config.gemini.use_fake && config.gemini.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Gemini API key cannot be empty unless gemini.use_fake is enabled".to_string(),
        ));
    }

    if config.gemini.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Gemini base URL cannot be empty".to_string(),
        ));
    }

    if config.audio.default_sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Default sample rate cannot be 0".to_string(),
        ));
    }

    if config.audio.default_voice.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Default voice cannot be empty".to_string(),
        ));
    }

    if config.session.sweep_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Session sweep interval cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Max Body: {} bytes", config.server.max_body_bytes);
    tracing::info!("Gemini Base URL: {}", config.gemini.base_url);
    tracing::info!("Text Model: {}", config.gemini.text_model);
    tracing::info!("Image Model: {}", config.gemini.image_model);
    tracing::info!("TTS Model: {}", config.gemini.tts_model);
    tracing::info!("Gemini Timeout: {}s", config.gemini.timeout_secs);
    tracing::info!("Fake Gateway: {}", config.gemini.use_fake);
    tracing::info!("Default Voice: {}", config.audio.default_voice);
    tracing::info!("Default Sample Rate: {} Hz", config.audio.default_sample_rate);
    tracing::info!("Session Expire: {}s", config.session.expire_secs);
    tracing::info!("Session Sweep Interval: {}s", config.session.sweep_interval_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.gemini.use_fake = true;
        config
    }

    #[test]
    fn test_validation_passes_for_fake_gateway_without_key() {
        assert!(validate_config(&fake_config()).is_ok());
    }

    #[test]
    fn test_validation_error_for_missing_api_key() {
        // use_fake 关闭且无 key
        let config = AppConfig::default();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_passes_with_api_key() {
        let mut config = AppConfig::default();
        config.gemini.api_key = "test-key".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = fake_config();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_sample_rate() {
        let mut config = fake_config();
        config.audio.default_sample_rate = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_blank_voice() {
        let mut config = fake_config();
        config.audio.default_voice = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }
}
