use crate::envelope::parse_model_envelope;
use crate::normalize::normalize_sections;
use crate::render::{format_standup, to_markdown};
use crate::types::StandupSections;

/// The fully processed result of one ingestion: canonical sections plus both
/// rendered forms. Identifiers and timestamps are the caller's concern, which
/// keeps this path deterministic and free of I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredStandup {
    pub raw_transcript: String,
    pub sections: StandupSections,
    pub formatted_text: String,
    pub markdown_content: String,
}

/// Run raw model output through the whole pipeline: envelope parse, section
/// normalization, and both renderers.
///
/// `default_transcript` stands in when the model supplied no usable
/// transcript: the typed text for the text pipeline, a fixed "no speech"
/// marker for the audio pipeline. It also feeds the normalizer's
/// transcript-to-today fallback, so a completely unparseable model response
/// still produces a non-blank standup.
pub fn structure_model_output(
    model_text: &str,
    default_transcript: &str,
    display_name: &str,
    date_iso: &str,
) -> StructuredStandup {
    let envelope = parse_model_envelope(model_text);
    let raw_transcript = envelope
        .raw_transcript
        .unwrap_or_else(|| default_transcript.to_string());
    let sections = normalize_sections(&envelope.sections, &raw_transcript);
    let formatted_text = format_standup(display_name, &sections);
    let markdown_content = to_markdown(date_iso, &formatted_text);
    StructuredStandup {
        raw_transcript,
        sections,
        formatted_text,
        markdown_content,
    }
}
