//! Script direction classification for assembled text.
//!
//! A coarse single-block heuristic: text is treated as right-to-left when any
//! character falls in the Arabic Unicode block (U+0600–U+06FF). This is
//! deliberately not full bidi analysis, and deliberately does not cover other
//! RTL scripts such as Hebrew. The export tests pin this behaviour, so
//! broadening the range is a contract change, not a cleanup.

/// True when `text` contains any character in U+0600..=U+06FF.
///
/// Pure and O(len); returns on the first match.
pub fn is_right_to_left(text: &str) -> bool {
    text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin_text_is_ltr() {
        assert!(!is_right_to_left("hello"));
    }

    #[test]
    fn arabic_text_is_rtl() {
        assert!(is_right_to_left("\u{627}\u{644}\u{633}\u{644}\u{627}\u{645}"));
    }

    #[test]
    fn empty_text_is_ltr() {
        assert!(!is_right_to_left(""));
    }

    #[test]
    fn one_arabic_char_in_latin_text_flips_the_flag() {
        assert!(is_right_to_left("invoice \u{661}"));
    }

    #[test]
    fn hebrew_is_outside_the_examined_block() {
        // Known limitation, preserved on purpose.
        assert!(!is_right_to_left("\u{5e9}\u{5dc}\u{5d5}\u{5dd}"));
    }

    #[test]
    fn block_boundaries_are_inclusive() {
        assert!(is_right_to_left("\u{600}"));
        assert!(is_right_to_left("\u{6ff}"));
        assert!(!is_right_to_left("\u{5ff}"));
        assert!(!is_right_to_left("\u{700}"));
    }
}
