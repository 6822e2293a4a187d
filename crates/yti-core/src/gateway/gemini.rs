use std::thread;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;

use crate::GatewayError;
use crate::http::{default_agent, retry_delay, should_retry};

use super::{AUDIO_STANDUP_PROMPT, DEFAULT_GEMINI_MODEL, StandupProvider, TEXT_STANDUP_PROMPT};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_RETRIES: usize = 2;

/// Cloud standup provider using the Google Generative Language API.
pub struct GeminiProvider {
    model: String,
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl GeminiProvider {
    pub fn new(model: Option<&str>, api_key: Option<&str>) -> Result<Self, GatewayError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| GatewayError::Failed("Gemini API key not set".into()))?
            .to_string();
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Ok(Self {
            model: model
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or(DEFAULT_GEMINI_MODEL)
                .to_string(),
            base_url,
            api_key,
            agent: default_agent(),
        })
    }

    fn build_audio_request_body(audio: &[u8], mime_type: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {"text": AUDIO_STANDUP_PROMPT},
                    {"inlineData": {"mimeType": mime_type, "data": BASE64.encode(audio)}},
                ],
            }],
            "generationConfig": {
                "temperature": 0.2,
                "responseMimeType": "application/json",
            },
        })
    }

    fn build_text_request_body(text: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {"text": TEXT_STANDUP_PROMPT},
                    {"text": text},
                ],
            }],
            "generationConfig": {
                "temperature": 0.2,
                "responseMimeType": "application/json",
            },
        })
    }

    /// Concatenated text of the first candidate's parts. Missing candidates
    /// or parts collapse to an empty string; the envelope parser downstream
    /// treats that like any other unusable output.
    fn parse_response(body: &str) -> Result<String, GatewayError> {
        let response: GeminiResponse = serde_json::from_str(body)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let parts = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts)
            .unwrap_or_default();
        let text = parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<String>();
        Ok(text.trim().to_string())
    }

    fn generate(&self, body: serde_json::Value) -> Result<String, GatewayError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let mut last_error: Option<ureq::Error> = None;

        for attempt in 0..=MAX_RETRIES {
            let response = self
                .agent
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .send_json(body.clone());

            match response {
                Ok(resp) => {
                    let raw = resp
                        .into_body()
                        .read_to_string()
                        .map_err(|e| GatewayError::Network(format!("{e}")))?;
                    return Self::parse_response(raw.trim());
                }
                Err(err) => {
                    let retry = should_retry(&err);
                    last_error = Some(err);
                    if retry && attempt < MAX_RETRIES {
                        thread::sleep(retry_delay(attempt));
                        continue;
                    }
                    break;
                }
            }
        }

        Err(GatewayError::Network(
            last_error
                .map(|err| err.to_string())
                .unwrap_or_else(|| "gemini request failed".to_string()),
        ))
    }
}

impl StandupProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn structure_audio(&self, audio: &[u8], mime_type: &str) -> Result<String, GatewayError> {
        self.generate(Self::build_audio_request_body(audio, mime_type))
    }

    fn structure_text(&self, text: &str) -> Result<String, GatewayError> {
        self.generate(Self::build_text_request_body(text))
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::GeminiProvider;

    #[test]
    fn parse_response_joins_candidate_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"today\":"},{"text":"[]}"}]}}]}"#;
        let text = GeminiProvider::parse_response(body).unwrap();
        assert_eq!(text, "{\"today\":[]}");
    }

    #[test]
    fn parse_response_tolerates_missing_candidates() {
        assert_eq!(GeminiProvider::parse_response("{}").unwrap(), "");
        assert_eq!(
            GeminiProvider::parse_response(r#"{"candidates":[{}]}"#).unwrap(),
            ""
        );
    }

    #[test]
    fn parse_response_rejects_non_json() {
        assert!(GeminiProvider::parse_response("<html>").is_err());
    }

    #[test]
    fn audio_request_body_inlines_data() {
        let body = GeminiProvider::build_audio_request_body(b"abc", "audio/wav");
        let inline = body
            .pointer("/contents/0/parts/1/inlineData")
            .expect("inlineData part");
        assert_eq!(
            inline.get("mimeType").and_then(|value| value.as_str()),
            Some("audio/wav")
        );
        assert_eq!(
            inline.get("data").and_then(|value| value.as_str()),
            Some("YWJj")
        );
        let config = body
            .pointer("/generationConfig/responseMimeType")
            .and_then(|value| value.as_str());
        assert_eq!(config, Some("application/json"));
    }

    #[test]
    fn text_request_body_carries_prompt_and_text() {
        let body = GeminiProvider::build_text_request_body("fixed the login bug");
        let prompt = body
            .pointer("/contents/0/parts/0/text")
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        assert!(prompt.contains("daily standup"));
        assert_eq!(
            body.pointer("/contents/0/parts/1/text")
                .and_then(|value| value.as_str()),
            Some("fixed the login bug")
        );
    }

    #[test]
    fn new_requires_api_key() {
        assert!(GeminiProvider::new(None, None).is_err());
        assert!(GeminiProvider::new(None, Some("   ")).is_err());
    }
}
