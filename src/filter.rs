//! Content moderation for chirp bodies.

const BLOCKED_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

const REPLACEMENT: &str = "****";

/// Replace blocked words with `****`.
///
/// Words are split on single spaces and compared case-insensitively. A word
/// with punctuation attached ("Fornax!") is left alone.
pub fn filter_profanity(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if BLOCKED_WORDS.contains(&lower.as_str()) {
                REPLACEMENT
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_blocked_words() {
        assert_eq!(
            filter_profanity("This is a kerfuffle opinion I need to share with the world"),
            "This is a **** opinion I need to share with the world"
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            filter_profanity("I hear Mastodon is better than Chirpy. sharbert I need to migrate"),
            "I hear Mastodon is better than Chirpy. **** I need to migrate"
        );
        assert_eq!(filter_profanity("FORNAX Kerfuffle"), "**** ****");
    }

    #[test]
    fn test_punctuation_prevents_match() {
        assert_eq!(filter_profanity("Sharbert! fornax."), "Sharbert! fornax.");
    }

    #[test]
    fn test_preserves_spacing() {
        assert_eq!(filter_profanity("a  fornax "), "a  **** ");
        assert_eq!(filter_profanity(""), "");
    }
}
