//! Tag tables for the mini-program markup dialect.

use phf::phf_set;

/// Elements that never have children or an end tag.
static VOID_TAGS: phf::Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "image", "import",
    "include", "input", "link", "meta", "param", "source", "track", "wbr",
};

/// Elements whose content is opaque text.
static RAW_TEXT_TAGS: phf::Set<&'static str> = phf_set! {
    "style",
};

/// Elements whose content is text only (no child elements).
static RCDATA_TAGS: phf::Set<&'static str> = phf_set! {
    "textarea", "title",
};

/// Check if a tag is a void element
#[inline]
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag)
}

/// Check if a tag holds raw text
#[inline]
pub fn is_raw_text_tag(tag: &str) -> bool {
    RAW_TEXT_TAGS.contains(tag)
}

/// Check if a tag holds RCDATA text
#[inline]
pub fn is_rcdata_tag(tag: &str) -> bool {
    RCDATA_TAGS.contains(tag)
}

/// Default set of elements whose content must not be re-indented.
pub const DEFAULT_PREFORMATTED_TAGS: &[&str] = &["pre", "textarea"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_tables() {
        assert!(is_void_tag("input"));
        assert!(is_void_tag("import"));
        assert!(!is_void_tag("view"));
        assert!(is_raw_text_tag("style"));
        assert!(is_rcdata_tag("textarea"));
        assert!(!is_rcdata_tag("text"));
    }
}
