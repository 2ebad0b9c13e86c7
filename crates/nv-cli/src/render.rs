//! Text rendering of note lists.  All truncation and paging lives here.

use std::fmt::Write as _;

use nv_store::NoteEntry;

use crate::settings::CliSettings;

const ELLIPSIS: &str = "...";

pub fn render_notes(owner_label: &str, entries: &[NoteEntry], settings: &CliSettings) -> String {
    if entries.is_empty() {
        return "You have no notes stored yet. Use `nv-cli add` to create one!\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{owner_label}'s notes");
    for entry in entries.iter().take(settings.display_limit) {
        let _ = writeln!(out, "ID #{}: {}", entry.id, entry.title);
        match &entry.content {
            Ok(content) => {
                for line in preview(content, settings.preview_chars).lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
            Err(e) => {
                let _ = writeln!(out, "    <could not decrypt: {e}>");
            }
        }
    }
    if entries.len() > settings.display_limit {
        let _ = writeln!(
            out,
            "Showing first {} notes. More notes exist.",
            settings.display_limit
        );
    }
    out
}

/// Cut `content` to at most `max_chars` characters, ending in "..." when cut.
pub fn preview(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut cut: String = content.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    cut
}
