use std::collections::HashSet;

use crate::types::{PartialSections, SectionName, StandupSections};

const FILLER_WORDS: [&str; 6] = ["basically", "just", "like", "um", "uh", "so yeah"];

const LEADING_SUBJECTS: [&str; 2] = ["i", "we"];

const AUXILIARY_VERBS: [&str; 9] = [
    "was",
    "were",
    "am",
    "are",
    "have",
    "had",
    "did",
    "currently",
    "will",
];

const BLOCKER_NEGATIONS: [&str; 5] = [
    "no impediments",
    "no blockers",
    "none",
    "nothing blocking",
    "not blocked",
];

const UI_PHRASES: [&str; 4] = [
    "worked on ui",
    "worked on the ui",
    "working on ui",
    "working on the ui",
];

const ACRONYMS: [&str; 11] = [
    "ui", "pr", "api", "qa", "sdk", "ios", "android", "db", "sql", "ci", "cd",
];

/// Build the complete, invariant-respecting sections from the parser's
/// partial output plus the raw transcript.
///
/// Absent sections collapse to empty here and nowhere earlier. When both
/// `yesterday` and `today` come out empty but a transcript exists, the full
/// transcript is run through the bullet transform as a `today` candidate so
/// the rendered output is never fully blank. `impediments` always ends up
/// with at least one entry.
pub fn normalize_sections(input: &PartialSections, raw_transcript: &str) -> StandupSections {
    let mut result = StandupSections {
        yesterday: assemble_section(input.yesterday.as_deref(), SectionName::Yesterday),
        today: assemble_section(input.today.as_deref(), SectionName::Today),
        impediments: assemble_section(input.impediments.as_deref(), SectionName::Impediments),
    };

    if result.yesterday.is_empty() && result.today.is_empty() && !raw_transcript.trim().is_empty() {
        if let Some(fallback) = normalize_bullet(raw_transcript, SectionName::Today) {
            result.today.push(fallback);
        }
    }

    if result.impediments.is_empty() {
        result.impediments.push("None".to_string());
    }

    result
}

/// Clean one candidate bullet. Returns `None` when nothing survives.
///
/// The rule order is fixed: whitespace collapse, filler removal, leading
/// first-person subject strip, domain special cases, sentence case, acronym
/// normalization. The stripping patterns convert first-person narrative into
/// the action-log style standups use.
pub fn normalize_bullet(value: &str, section: SectionName) -> Option<String> {
    let mut next = collapse_whitespace(value);
    if next.is_empty() {
        return None;
    }

    for filler in FILLER_WORDS {
        next = replace_whole_word_ci(&next, filler, " ");
    }

    next = strip_leading_subject(&next);
    next = collapse_whitespace(&next);
    if next.is_empty() {
        return None;
    }

    if section == SectionName::Impediments
        && BLOCKER_NEGATIONS
            .iter()
            .any(|phrase| contains_whole_word_ci(&next, phrase))
    {
        return Some("None".to_string());
    }

    if UI_PHRASES
        .iter()
        .any(|phrase| contains_whole_word_ci(&next, phrase))
    {
        return Some("Refactored UI".to_string());
    }

    if let Some(rest) = strip_prefix_ci(&next, "working on ") {
        next = format!("Advance {}", rest.trim());
    } else if let Some(rest) = strip_prefix_ci(&next, "helping with ") {
        next = format!("Assist with {}", rest.trim());
    }

    next = sentence_case(&next);
    for acronym in ACRONYMS {
        next = replace_whole_word_ci(&next, acronym, &acronym.to_uppercase());
    }
    Some(next)
}

fn assemble_section(source: Option<&[String]>, section: SectionName) -> Vec<String> {
    let cleaned: Vec<String> = source
        .unwrap_or(&[])
        .iter()
        .filter_map(|item| normalize_bullet(item, section))
        .collect();
    dedupe_case_insensitive(cleaned)
}

/// Stable case-insensitive dedupe: first occurrence wins, order kept.
fn dedupe_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut output = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.to_lowercase()) {
            output.push(item);
        }
    }
    output
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sentence_case(value: &str) -> String {
    let clean = value.trim();
    let mut chars = clean.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip a leading subject pronoun, first with a following auxiliary verb and
/// then bare. The two passes run in sequence, so "I was I think done" loses
/// both "I was" and the trailing bare "I".
fn strip_leading_subject(text: &str) -> String {
    let after_clause = strip_subject_auxiliary(text).unwrap_or(text);
    strip_leading_token_ci(after_clause, &LEADING_SUBJECTS)
        .unwrap_or(after_clause)
        .to_string()
}

fn strip_subject_auxiliary(text: &str) -> Option<&str> {
    let rest = strip_leading_token_ci(text, &LEADING_SUBJECTS)?;
    strip_leading_token_ci(rest, &AUXILIARY_VERBS)
}

/// Strip one leading word from a fixed vocabulary together with the
/// whitespace run that must follow it. The whitespace requirement keeps a
/// final bare word ("I was") intact for the caller's shorter pattern.
fn strip_leading_token_ci<'a>(text: &'a str, words: &[&str]) -> Option<&'a str> {
    for word in words {
        if let Some(rest) = strip_prefix_ci(text, word) {
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                return Some(trimmed);
            }
        }
    }
    None
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

// ASCII word boundary in the sense of the rule vocabulary: the tables are
// all ASCII, so alphanumerics plus underscore delimit a word.
fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn boundary_before(text: &str, index: usize) -> bool {
    !text[..index].chars().next_back().is_some_and(is_word_char)
}

fn boundary_after(text: &str, index: usize) -> bool {
    !text[index..].chars().next().is_some_and(is_word_char)
}

fn match_at_ci(text: &str, index: usize, word: &str) -> bool {
    index + word.len() <= text.len()
        && text.is_char_boundary(index + word.len())
        && text[index..index + word.len()].eq_ignore_ascii_case(word)
        && boundary_before(text, index)
        && boundary_after(text, index + word.len())
}

fn contains_whole_word_ci(text: &str, word: &str) -> bool {
    text.char_indices().any(|(i, _)| match_at_ci(text, i, word))
}

/// Replace every word-bounded, case-insensitive occurrence of `word`.
/// Spaces inside `word` are matched literally, so multi-word phrases work
/// after whitespace collapse.
fn replace_whole_word_ci(text: &str, word: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if match_at_ci(text, i, word) {
            out.push_str(replacement);
            i += word.len();
            continue;
        }
        match text[i..].chars().next() {
            Some(ch) => {
                out.push(ch);
                i += ch.len_utf8();
            }
            None => break,
        }
    }
    out
}
