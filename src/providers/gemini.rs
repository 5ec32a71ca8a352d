//! Google Gemini provider implementation for Saanra
//!
//! Sends the question and the attached image to the Gemini
//! `generateContent` REST endpoint and returns the text of the first
//! candidate.

use crate::attachment::AttachedImage;
use crate::config::GeminiConfig;
use crate::error::{Result, SaanraError};
use crate::providers::VisionProvider;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API provider
///
/// # Examples
///
/// ```
/// use saanra::config::GeminiConfig;
/// use saanra::providers::GeminiProvider;
///
/// let config = GeminiConfig {
///     api_key: Some("test-key".to_string()),
///     ..GeminiConfig::default()
/// };
/// let provider = GeminiProvider::new(config).unwrap();
/// assert_eq!(provider.model(), "gemini-2.5-flash");
/// ```
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
}

/// One turn of content
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Text or inline binary part
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Response from `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Errors
    ///
    /// Returns `SaanraError::MissingCredentials` when no API key is configured,
    /// or a provider error if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SaanraError::MissingCredentials("gemini".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("saanra/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SaanraError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized Gemini provider: model={}", config.model);

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Get the configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(image: &AttachedImage, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![
                    GeminiPart {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                    GeminiPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type().to_string(),
                            data: image.to_base64(),
                        }),
                    },
                ],
            }],
        }
    }

    /// Concatenated text parts of the first candidate
    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| SaanraError::Provider("Gemini returned no candidates".to_string()))?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SaanraError::Provider(format!(
                "Gemini returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
            .into());
        }

        Ok(text)
    }
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn describe(&self, image: &AttachedImage, prompt: &str) -> Result<String> {
        let request = Self::build_request(image, prompt);

        tracing::debug!(
            "Sending Gemini request: model={}, image={} ({} bytes)",
            self.config.model,
            image.file_name(),
            image.bytes().len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                SaanraError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(SaanraError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            SaanraError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        Self::extract_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::png_attachment;

    fn keyed_config() -> GeminiConfig {
        GeminiConfig {
            api_key: Some("test-key".to_string()),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn test_gemini_requires_api_key() {
        assert!(GeminiProvider::new(GeminiConfig::default()).is_err());
        let blank = GeminiConfig {
            api_key: Some("  ".to_string()),
            ..GeminiConfig::default()
        };
        assert!(GeminiProvider::new(blank).is_err());
    }

    #[test]
    fn test_endpoint_uses_model_and_trims_base() {
        let config = GeminiConfig {
            api_base: "http://localhost:9999/".to_string(),
            ..keyed_config()
        };
        let provider = GeminiProvider::new(config).unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_carries_prompt_then_inline_image() {
        let image = png_attachment();
        let request = GeminiProvider::build_request(&image, "what is this?");
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "what is this?");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], image.to_base64());
        assert!(parts[0].get("inlineData").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"a "},{"text":"cat"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(GeminiProvider::extract_text(response).unwrap(), "a cat");
    }

    #[test]
    fn test_extract_text_rejects_blocked_response() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
        )
        .unwrap();
        let err = GeminiProvider::extract_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(GeminiProvider::extract_text(empty).is_err());
    }
}
