//! # Hashtag Tokenizer
//!
//! Extracts `#`-prefixed tokens from a line of free text. A hashtag is a `#`
//! that sits at the start of the line or right after whitespace, followed by
//! one or more ASCII letters, digits or underscores. Matching is
//! non-overlapping and left-to-right; the same tag appearing twice yields two
//! tokens. Case is preserved exactly as seen — `#Rust` and `#rust` are
//! distinct keys on purpose.

use regex::Regex;
use static_init::dynamic;

// The anchor group is consumed rather than looked behind, which is fine:
// an anchor character can never start a token, so the match set is the same.
#[dynamic]
static HASHTAG_RE: Regex =
    Regex::new(r"(^|\s)(#[A-Za-z0-9_]+)").expect("hashtag pattern must compile");

/// Returns every hashtag occurrence in `line`, leading `#` included,
/// duplicates kept, in left-to-right order.
///
/// The input does not need to be well-formed record data; extraction works on
/// raw text and is independent of structured parsing.
pub fn extract_hashtags(line: &str) -> Vec<String> {
    HASHTAG_RE
        .captures_iter(line)
        .map(|caps| caps[2].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::extract_hashtags;

    #[test]
    fn extracts_one_token_per_occurrence() {
        let tags = extract_hashtags("intro #rust text #Tokio more #rust");
        assert_eq!(tags, vec!["#rust", "#Tokio", "#rust"]);
    }

    #[test]
    fn preserves_case_as_seen() {
        let tags = extract_hashtags("#Rust #rust #RUST");
        assert_eq!(tags, vec!["#Rust", "#rust", "#RUST"]);
    }

    #[test]
    fn line_without_hashtags_yields_empty() {
        assert!(extract_hashtags("no hashtags here").is_empty());
    }

    #[test]
    fn hash_inside_a_word_is_not_a_hashtag() {
        assert!(extract_hashtags("word#notahashtag").is_empty());
    }

    #[test]
    fn hashtag_at_start_of_line_matches() {
        assert_eq!(extract_hashtags("#first then text"), vec!["#first"]);
    }

    #[test]
    fn token_stops_at_non_word_characters() {
        assert_eq!(extract_hashtags("end #tag! and #a#b"), vec!["#tag", "#a"]);
    }

    #[test]
    fn whitespace_variants_anchor_the_match() {
        assert_eq!(extract_hashtags("a\t#tab b\u{a0}#nbsp"), vec!["#tab", "#nbsp"]);
    }

    #[test]
    fn bare_hash_is_not_a_token() {
        assert!(extract_hashtags("just a # alone").is_empty());
    }

    #[test]
    fn works_on_raw_json_text() {
        let line = r#"{"data":{"text":"shipped it #hashtag1 #hashtag2"}}"#;
        assert_eq!(extract_hashtags(line), vec!["#hashtag1", "#hashtag2"]);
    }
}
