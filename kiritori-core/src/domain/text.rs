//! UTF-8 offset helpers shared by the resolvers and the chunk builder

/// Moves `pos` back to the nearest character boundary at or before it
pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut pos = pos;
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Moves `pos` forward to the nearest character boundary at or after it
pub fn ceil_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut pos = pos;
    while !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

/// Counts whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_on_ascii_are_identity() {
        let text = "hello";
        for i in 0..=text.len() {
            assert_eq!(floor_char_boundary(text, i), i);
            assert_eq!(ceil_char_boundary(text, i), i);
        }
    }

    #[test]
    fn test_boundaries_inside_multibyte() {
        // "世" occupies bytes 1..4
        let text = "a世b";
        assert_eq!(floor_char_boundary(text, 2), 1);
        assert_eq!(floor_char_boundary(text, 3), 1);
        assert_eq!(ceil_char_boundary(text, 2), 4);
        assert_eq!(ceil_char_boundary(text, 3), 4);
    }

    #[test]
    fn test_boundaries_past_end_clamp() {
        let text = "abc";
        assert_eq!(floor_char_boundary(text, 10), 3);
        assert_eq!(ceil_char_boundary(text, 10), 3);
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\nthree "), 3);
        assert_eq!(word_count(""), 0);
    }
}
