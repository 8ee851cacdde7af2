/// Application configuration, parsed from environment variables.
///
/// Provider credentials are optional at startup: an instance missing a key
/// still serves its health endpoint and returns a clear configuration error
/// from the scoring endpoint. The handler checks them before any network call.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// WAQI (aqicn.org) API token.
    pub aqicn_token: Option<String>,
    /// TomTom traffic API key.
    pub tomtom_api_key: Option<String>,
    /// API key for the chat-completion endpoint.
    pub openai_api_key: Option<String>,
    /// Chat-completion model used for AI advice.
    pub advice_model: String,
    /// User-Agent sent to nominatim, required by its usage policy.
    pub geocoder_user_agent: String,
}

/// The three provider credentials, present and validated.
#[derive(Debug)]
pub struct ProviderCredentials<'a> {
    pub aqicn_token: &'a str,
    pub tomtom_api_key: &'a str,
    pub openai_api_key: &'a str,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            aqicn_token: std::env::var("AQICN_TOKEN").ok(),
            tomtom_api_key: std::env::var("TOMTOM_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            advice_model: std::env::var("ADVICE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            geocoder_user_agent: std::env::var("GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| "HealthyTripAdvisor/1.0".to_string()),
        }
    }

    /// All three provider credentials, or a configuration error if any is
    /// missing. Called per request so the failure mode is a clean 500 rather
    /// than a startup crash.
    pub fn credentials(&self) -> Result<ProviderCredentials<'_>, crate::errors::AppError> {
        match (
            self.aqicn_token.as_deref(),
            self.tomtom_api_key.as_deref(),
            self.openai_api_key.as_deref(),
        ) {
            (Some(aqicn_token), Some(tomtom_api_key), Some(openai_api_key)) => {
                Ok(ProviderCredentials {
                    aqicn_token,
                    tomtom_api_key,
                    openai_api_key,
                })
            }
            _ => Err(crate::errors::AppError::Configuration(
                "API keys missing.".to_string(),
            )),
        }
    }
}
