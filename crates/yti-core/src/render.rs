use crate::types::StandupSections;

/// Render the canonical plain-text form: display name, then the three
/// sections under `Y:`/`T:`/`I:` headers with `* ` bullets. Trimmed, exactly
/// one trailing newline.
pub fn format_standup(display_name: &str, sections: &StandupSections) -> String {
    let mut lines: Vec<String> = vec![
        display_name.to_string(),
        String::new(),
        "Y:".to_string(),
        String::new(),
    ];
    push_bullets(&mut lines, &sections.yesterday);
    lines.extend([String::new(), "T:".to_string(), String::new()]);
    push_bullets(&mut lines, &sections.today);
    lines.extend([String::new(), "I:".to_string(), String::new()]);
    push_bullets(&mut lines, &sections.impediments);
    format!("{}\n", lines.join("\n").trim())
}

/// Wrap the plain-text rendering in the markdown artifact format.
pub fn to_markdown(date_iso: &str, formatted_text: &str) -> String {
    format!("# Daily Standup - {date_iso}\n\n{}\n", formatted_text.trim())
}

/// Deterministic artifact name for a given calendar date.
pub fn markdown_file_name(date_iso: &str) -> String {
    format!("{date_iso}_yti.md")
}

// Render-time safety net: the normalizer guarantees non-empty impediments,
// but an empty section still renders as "* None" rather than a bare header.
fn push_bullets(lines: &mut Vec<String>, items: &[String]) {
    if items.is_empty() {
        lines.push("* None".to_string());
        return;
    }
    for item in items {
        lines.push(format!("* {item}"));
    }
}
