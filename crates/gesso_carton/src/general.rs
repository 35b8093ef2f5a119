//! Character helpers shared by the scanners and the linter.

/// Whitespace as understood by the markup scanner.
#[inline]
pub const fn is_markup_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\n' | b'\t' | b'\r' | b'\x0C')
}

/// Line terminators recognized when splitting source into lines.
#[inline]
pub const fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Pluralization suffix for counted units in messages.
#[inline]
pub const fn plural_suffix(count: u32) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_whitespace() {
        assert!(is_markup_whitespace(b' '));
        assert!(is_markup_whitespace(b'\t'));
        assert!(!is_markup_whitespace(b'a'));
    }

    #[test]
    fn test_plural_suffix() {
        assert_eq!(plural_suffix(1), "");
        assert_eq!(plural_suffix(0), "s");
        assert_eq!(plural_suffix(4), "s");
    }
}
