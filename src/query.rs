//! Transcript normalization
//!
//! Turns a raw "play X by Y" utterance into the two-field search string
//! published to the query topic. Best-effort: malformed input degrades
//! to whole-text-as-subject, never an error.

/// Delimiter separating the subject from the qualifier in an utterance.
const QUALIFIER_DELIMITER: &[u8] = b" by ";

/// Normalize a raw transcript into a search query.
///
/// 1. Trim whitespace and strip one leading "play" verb (with or
///    without a trailing comma).
/// 2. Strip surrounding commas and periods.
/// 3. Split on the first case-insensitive " by " into subject and
///    qualifier; no delimiter means the whole text is the subject.
/// 4. Capitalize each whitespace-separated token and join the two
///    fields with a single space.
pub fn normalize_transcript(raw: &str) -> String {
    let text = strip_leading_verb(raw.trim());
    let text = text.trim_matches(|c: char| c == ',' || c == '.' || c.is_whitespace());

    let (subject, qualifier) = match find_qualifier_split(text) {
        Some(idx) => (
            title_case(&text[..idx]),
            title_case(&text[idx + QUALIFIER_DELIMITER.len()..]),
        ),
        None => (title_case(text), String::new()),
    };

    let parts: Vec<String> = [subject, qualifier]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect();
    parts.join(" ")
}

/// Strip a single leading "play" command verb, case-insensitively,
/// together with the comma/whitespace that follows it. "playing" and
/// other words that merely start with the verb are left alone.
fn strip_leading_verb(text: &str) -> &str {
    const VERB: &str = "play";
    let Some(prefix) = text.get(..VERB.len()) else {
        return text;
    };
    if !prefix.eq_ignore_ascii_case(VERB) {
        return text;
    }
    let rest = &text[VERB.len()..];
    match rest.chars().next() {
        None => "",
        Some(' ') | Some(',') | Some('.') => rest.trim_start_matches([' ', ',', '.']),
        Some(_) => text,
    }
}

/// Byte offset of the first case-insensitive " by " in `text`.
///
/// The delimiter is pure ASCII and bounded by spaces, so a byte-window
/// scan is exact and the returned offset always lands on a char
/// boundary.
fn find_qualifier_split(text: &str) -> Option<usize> {
    text.as_bytes()
        .windows(QUALIFIER_DELIMITER.len())
        .position(|window| window.eq_ignore_ascii_case(QUALIFIER_DELIMITER))
}

/// Uppercase the first character of each whitespace-separated token and
/// lowercase the rest. Apostrophes are not token boundaries, so
/// "don't" becomes "Don't" rather than "Don'T".
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
