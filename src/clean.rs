//! Noise removal for recognized or captioned text.

use std::sync::LazyLock;

use regex::Regex;

static MUSIC_NOTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"♪.*?♪").unwrap());

static NOISE_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\[(music|musique|applause|applaudissements|laughter|rire|cheering|acclamations|inaudible).*?\]",
    )
    .unwrap()
});

// Whole-line stage directions such as "(rires)".
static STAGE_DIRECTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\(.*?\)$").unwrap());

/// Strip music markers and bracketed non-speech annotations.
///
/// Returns an empty string when nothing but a parenthesized stage direction
/// remains, so callers can drop the fragment.
pub fn clean(text: &str) -> String {
    let text = MUSIC_NOTES.replace_all(text, "");
    let text = NOISE_TAGS.replace_all(&text, "");
    let text = text.trim();

    if STAGE_DIRECTION.is_match(text) {
        return String::new();
    }

    text.to_string()
}
