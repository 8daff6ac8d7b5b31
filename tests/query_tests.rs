use voice_station::normalize_transcript;

#[test]
fn test_full_utterance() {
    assert_eq!(
        normalize_transcript("Play Thunderstruck by AC/DC"),
        "Thunderstruck Ac/dc"
    );
}

#[test]
fn test_verb_with_comma_and_apostrophes() {
    assert_eq!(
        normalize_transcript("play, don't stop believin' by journey"),
        "Don't Stop Believin' Journey"
    );
}

#[test]
fn test_no_verb_no_delimiter() {
    assert_eq!(normalize_transcript("hello world"), "Hello World");
}

#[test]
fn test_empty_input() {
    assert_eq!(normalize_transcript(""), "");
}

#[test]
fn test_whitespace_only() {
    assert_eq!(normalize_transcript("   "), "");
}

#[test]
fn test_verb_only() {
    assert_eq!(normalize_transcript("play"), "");
    assert_eq!(normalize_transcript("PLAY"), "");
}

#[test]
fn test_verb_prefix_words_kept() {
    // "playing" merely starts with the verb and must survive.
    assert_eq!(normalize_transcript("playing with fire"), "Playing With Fire");
}

#[test]
fn test_verb_case_insensitive() {
    assert_eq!(normalize_transcript("PLAY SOMETHING"), "Something");
    assert_eq!(normalize_transcript("pLaY something"), "Something");
}

#[test]
fn test_trailing_punctuation_stripped() {
    assert_eq!(
        normalize_transcript("play hotel california by the eagles."),
        "Hotel California The Eagles"
    );
}

#[test]
fn test_delimiter_case_insensitive() {
    assert_eq!(normalize_transcript("love me BY someone"), "Love Me Someone");
}

#[test]
fn test_surrounding_whitespace() {
    assert_eq!(normalize_transcript("  play  shake it off  "), "Shake It Off");
}

#[test]
fn test_first_delimiter_wins() {
    // The heuristic splits on the first " by "; later occurrences stay
    // in the qualifier.
    assert_eq!(
        normalize_transcript("play stand by me by ben e king"),
        "Stand Me By Ben E King"
    );
}

#[test]
fn test_recasing_is_per_token() {
    assert_eq!(
        normalize_transcript("play BOHEMIAN RHAPSODY by QUEEN"),
        "Bohemian Rhapsody Queen"
    );
}
