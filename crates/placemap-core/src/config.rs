use crate::app_config::AppConfig;
use crate::error::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric env var holds an unparsable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a numeric env var holds an unparsable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing logic, decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("PLACEMAP_LOG_LEVEL", "info");

    let geocoder_api_key = lookup("PLACEMAP_GEOCODER_API_KEY").ok();
    let geocoder_base_url = or_default(
        "PLACEMAP_GEOCODER_BASE_URL",
        "https://apis.map.qq.com/ws/geocoder/v1/",
    );
    let geocoder_address_prefix = or_default("PLACEMAP_GEOCODER_ADDRESS_PREFIX", "");
    let geocoder_request_timeout_secs = parse_u64("PLACEMAP_GEOCODER_REQUEST_TIMEOUT_SECS", "10")?;
    let geocoder_request_delay_ms = parse_u64("PLACEMAP_GEOCODER_REQUEST_DELAY_MS", "1000")?;
    let geocoder_max_retries = parse_u32("PLACEMAP_GEOCODER_MAX_RETRIES", "3")?;
    let geocoder_retry_backoff_base_secs =
        parse_u64("PLACEMAP_GEOCODER_RETRY_BACKOFF_BASE_SECS", "2")?;

    let llm_api_key = lookup("PLACEMAP_LLM_API_KEY").ok();
    let llm_base_url = or_default(
        "PLACEMAP_LLM_BASE_URL",
        "https://dashscope.aliyuncs.com/compatible-mode/v1",
    );
    let llm_text_model = or_default("PLACEMAP_LLM_TEXT_MODEL", "qwen-max-latest");
    let llm_request_timeout_secs = parse_u64("PLACEMAP_LLM_REQUEST_TIMEOUT_SECS", "120")?;

    Ok(AppConfig {
        log_level,
        geocoder_api_key,
        geocoder_base_url,
        geocoder_address_prefix,
        geocoder_request_timeout_secs,
        geocoder_request_delay_ms,
        geocoder_max_retries,
        geocoder_retry_backoff_base_secs,
        llm_api_key,
        llm_base_url,
        llm_text_model,
        llm_request_timeout_secs,
    })
}
