//! OpenAI client configuration shared by the embedder and the generator.

use crate::error::{ChatTubeError, FailureClass, Result};
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::Client;
use std::time::Duration;

/// OpenAI client type used throughout the crate.
pub type OpenAIClient = Client<OpenAIConfig>;

/// Create an OpenAI client with an optional API base and a custom timeout.
///
/// The API key comes from `OPENAI_API_KEY`.
pub fn create_client_with(api_base: Option<&str>, timeout: Duration) -> Result<OpenAIClient> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ChatTubeError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = api_base {
        config = config.with_api_base(base);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Sort an OpenAI error into transient or permanent.
pub fn classify_error(err: &OpenAIError) -> FailureClass {
    match err {
        OpenAIError::Reqwest(e) => {
            let server_side = e.status().is_some_and(|s| s.is_server_error() || s.as_u16() == 429);
            if e.is_timeout() || e.is_connect() || e.is_request() || server_side {
                FailureClass::Transient
            } else {
                FailureClass::Permanent
            }
        }
        OpenAIError::ApiError(api) => {
            let kind = api.r#type.as_deref().unwrap_or_default();
            let message = api.message.to_lowercase();
            if kind == "insufficient_quota" || message.contains("exceeded your current quota") {
                FailureClass::Permanent
            } else if matches!(kind, "server_error" | "requests" | "tokens")
                || message.contains("rate limit")
                || message.contains("overloaded")
            {
                FailureClass::Transient
            } else {
                FailureClass::Permanent
            }
        }
        OpenAIError::StreamError(_) => FailureClass::Transient,
        _ => FailureClass::Permanent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    fn api_error(kind: Option<&str>, message: &str) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: kind.map(|k| k.to_string()),
            param: None,
            code: None,
        })
    }

    #[test]
    fn test_rate_limits_are_transient() {
        let err = api_error(Some("requests"), "Rate limit reached for requests");
        assert_eq!(classify_error(&err), FailureClass::Transient);
    }

    #[test]
    fn test_quota_and_auth_are_permanent() {
        let quota = api_error(Some("insufficient_quota"), "You exceeded your current quota");
        assert_eq!(classify_error(&quota), FailureClass::Permanent);

        let auth = api_error(Some("invalid_request_error"), "Incorrect API key provided");
        assert_eq!(classify_error(&auth), FailureClass::Permanent);
    }

    #[test]
    fn test_invalid_argument_is_permanent() {
        let err = OpenAIError::InvalidArgument("bad".to_string());
        assert_eq!(classify_error(&err), FailureClass::Permanent);
    }
}
