/// Runtime configuration for the tool and its external collaborators.
///
/// API keys are optional: the core works fully offline, and the geocode
/// and extract clients report a distinguishable "not configured" error
/// when a command needs a key that is absent.
#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub geocoder_api_key: Option<String>,
    pub geocoder_base_url: String,
    pub geocoder_address_prefix: String,
    pub geocoder_request_timeout_secs: u64,
    pub geocoder_request_delay_ms: u64,
    pub geocoder_max_retries: u32,
    pub geocoder_retry_backoff_base_secs: u64,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_text_model: String,
    pub llm_request_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field(
                "geocoder_api_key",
                &self.geocoder_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("geocoder_address_prefix", &self.geocoder_address_prefix)
            .field(
                "geocoder_request_timeout_secs",
                &self.geocoder_request_timeout_secs,
            )
            .field("geocoder_request_delay_ms", &self.geocoder_request_delay_ms)
            .field("geocoder_max_retries", &self.geocoder_max_retries)
            .field(
                "geocoder_retry_backoff_base_secs",
                &self.geocoder_retry_backoff_base_secs,
            )
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_text_model", &self.llm_text_model)
            .field("llm_request_timeout_secs", &self.llm_request_timeout_secs)
            .finish()
    }
}
