use serde::{Deserialize, Serialize};
use std::path::Path;

/// One line of first-page layout: its text and average font size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLine(pub String, pub f32);

/// Pick a display title for a document.
///
/// Preference order: the largest-font layout line (first one wins on ties),
/// then the first non-blank line of the text, then the file name with its
/// extension stripped and underscores turned into spaces.
pub fn resolve_title(layout: &[LayoutLine], text: &str, filename: &str) -> String {
    let largest = layout.iter().fold(None::<&LayoutLine>, |best, line| match best {
        Some(best) if best.1 >= line.1 => Some(best),
        _ => Some(line),
    });
    if let Some(line) = largest {
        let candidate = line.0.trim();
        if !candidate.is_empty() {
            return candidate.to_string();
        }
    }

    if let Some(first) = text.lines().map(str::trim).find(|l| !l.is_empty()) {
        return first.to_string();
    }

    title_from_filename(filename)
}

fn title_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    stem.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, size: f32) -> LayoutLine { LayoutLine(text.to_string(), size) }

    #[test]
    fn largest_font_wins() {
        let layout = vec![line("Header", 9.0), line("  Big Title  ", 24.0), line("Body", 11.0)];
        assert_eq!(resolve_title(&layout, "ignored", "x.pdf"), "Big Title");
    }

    #[test]
    fn first_of_equal_sizes_wins() {
        let layout = vec![line("First", 20.0), line("Second", 20.0)];
        assert_eq!(resolve_title(&layout, "", "x.pdf"), "First");
    }

    #[test]
    fn blank_layout_falls_back_to_text() {
        let layout = vec![line("   ", 30.0), line("Smaller", 10.0)];
        assert_eq!(resolve_title(&layout, "\n\n  Intro line \nmore", "x.pdf"), "Intro line");
    }

    #[test]
    fn falls_back_to_filename() {
        assert_eq!(resolve_title(&[], "  \n \n", "annual_report_2023.pdf"), "annual report 2023");
        assert_eq!(resolve_title(&[], "", "notes"), "notes");
    }
}
