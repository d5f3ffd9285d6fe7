/// An immutable, 0-indexed sequence of words taken from one document.
///
/// Every word is non-empty and made of alphanumeric characters only, so two
/// windows join to the same group string exactly when their word slices are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordSequence {
    words: Vec<String>,
}

impl WordSequence {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.words
    }

    /// Words in `[start, start + size)`.
    ///
    /// Panics when the window runs past the end of the sequence.
    pub fn window(&self, start: usize, size: usize) -> &[String] {
        let end = start
            .checked_add(size)
            .filter(|&end| end <= self.words.len())
            .unwrap_or_else(|| {
                panic!(
                    "window [{start}, {start}+{size}) out of bounds for {} words",
                    self.words.len()
                )
            });
        &self.words[start..end]
    }

    /// The group string of a window: its words joined by a single space.
    pub fn group(&self, start: usize, size: usize) -> String {
        self.window(start, size).join(" ")
    }
}

/// Split raw text on whitespace and strip every non-alphanumeric character
/// from each piece. Pieces left empty (pure punctuation) are discarded.
pub fn tokenize(text: &str) -> WordSequence {
    let words = text
        .split_whitespace()
        .map(|token| token.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect();
    WordSequence { words }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_punctuation() {
        let words = tokenize("Hello, world! It's 2024.");
        assert_eq!(words.as_slice(), ["Hello", "world", "Its", "2024"]);
    }

    #[test]
    fn test_drops_punctuation_only_tokens() {
        let words = tokenize("one -- two *** three ...");
        assert_eq!(words.as_slice(), ["one", "two", "three"]);
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \n\t  ").is_empty());
    }

    #[test]
    fn test_keeps_case_and_unicode_letters() {
        let words = tokenize("Café  naïve\nCAFÉ");
        assert_eq!(words.as_slice(), ["Café", "naïve", "CAFÉ"]);
    }

    #[test]
    fn test_group_joins_with_single_space() {
        let words = tokenize("a  b\n\nc d");
        assert_eq!(words.group(1, 3), "b c d");
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_window_past_end_panics() {
        let words = tokenize("a b c");
        words.window(1, 3);
    }
}
