pub mod gemini;

use crate::GatewayError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

pub(crate) const AUDIO_STANDUP_PROMPT: &str = r#"You are formatting a developer daily standup.
Analyze the audio and produce JSON only with these keys:
{
  "rawTranscript": "string",
  "yesterday": ["string"],
  "today": ["string"],
  "impediments": ["string"]
}

Rules:
- Keep output concise and action oriented.
- Remove filler words.
- If no impediments are mentioned, set impediments to ["None"].
- If section markers are missing, infer from context.
- Do not include markdown.
- Do not include extra keys."#;

pub(crate) const TEXT_STANDUP_PROMPT: &str = r#"You are formatting a developer daily standup.
The user has typed a casual, conversational description of their work.
Analyze the text and produce JSON only with these keys:
{
  "rawTranscript": "string",
  "yesterday": ["string"],
  "today": ["string"],
  "impediments": ["string"]
}

Rules:
- "rawTranscript" should be the original text the user provided.
- Keep output concise and action oriented.
- Remove filler words.
- If no impediments are mentioned, set impediments to ["None"].
- If section markers are missing, infer from context.
- Do not include markdown.
- Do not include extra keys."#;

/// Gateway to an external generative-language model that turns a status
/// update into loosely structured JSON text. Whatever comes back is handed
/// to the envelope parser untrusted.
pub trait StandupProvider: Send {
    fn name(&self) -> &'static str;

    /// Structure a spoken update from a finite audio blob plus its MIME type.
    fn structure_audio(&self, audio: &[u8], mime_type: &str) -> Result<String, GatewayError>;

    /// Structure a typed update.
    fn structure_text(&self, text: &str) -> Result<String, GatewayError>;
}

/// Create a standup provider by name.
///
/// - `"gemini"` requires an API key; `model` selects the Gemini model name
///   (defaults to `gemini-2.0-flash`).
pub fn create_standup_provider(
    provider: &str,
    model: Option<&str>,
    api_key: Option<&str>,
) -> Result<Box<dyn StandupProvider>, GatewayError> {
    match provider {
        "gemini" => Ok(Box::new(gemini::GeminiProvider::new(model, api_key)?)),
        other => Err(GatewayError::Failed(format!(
            "unknown standup provider: {other}"
        ))),
    }
}
