//! Turning recognized text into candidate names.

use crate::domain::{Name, merge_names};

const BULLETS: &[char] = &['-', '*', '•', '·', '–', '—', '+', '>'];

/// Extracts candidate names from OCR output, one per line.
///
/// List bullets and leading numbering (`1.`, `2)`, `3 -`) are stripped,
/// lines without a single letter are dropped, and lines that derive the
/// same key collapse into one candidate.
#[must_use]
pub fn candidate_names(text: &str) -> Vec<Name> {
    let lines = text
        .lines()
        .map(strip_list_marker)
        .filter(|line| line.chars().any(char::is_alphabetic));
    merge_names(&[], lines)
}

fn strip_list_marker(line: &str) -> &str {
    let mut line = line.trim();
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() < line.len()
        && let Some(stripped) = rest.trim_start().strip_prefix(['.', ')', ':', '-'])
    {
        line = stripped;
    }
    line.trim_start_matches(BULLETS).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raws(text: &str) -> Vec<String> {
        candidate_names(text).into_iter().map(|n| n.raw).collect()
    }

    #[test]
    fn strips_bullets_and_numbering() {
        let text = "1. Ada Lovelace\n2) Bea Smith\n- Cid\n• Dora\n10 - Emil";
        assert_eq!(
            raws(text),
            ["Ada Lovelace", "Bea Smith", "Cid", "Dora", "Emil"]
        );
    }

    #[test]
    fn drops_lines_without_letters() {
        assert_eq!(raws("  \n123\n--\n|| ..\nAda\n"), ["Ada"]);
    }

    #[test]
    fn collapses_same_key_lines() {
        let names = candidate_names("Anna Nováková\nanna   novakova\n");
        assert_eq!(names.len(), 1);
        assert_eq!(names.first().map(|n| n.key.as_str()), Some("anna-novakova"));
    }

    #[test]
    fn keeps_digits_inside_names() {
        assert_eq!(raws("Team 4a"), ["Team 4a"]);
    }
}
