//! Markup stripping for free-text input.
//!
//! Every free-text field crossing the trust boundary passes through
//! [`strip_markup`] before validation. This is defense against stored markup
//! injection, not a full HTML sanitizer: `<script>` and `<style>` elements
//! are removed together with their content, any remaining tags are stripped,
//! and the result is whitespace-trimmed.

use regex::Regex;
use std::sync::LazyLock;

/// Matches `<script>`/`<style>` elements including their content.
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>")
        .expect("block element pattern")
});

/// Matches any remaining markup tag.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

/// Strip markup from untrusted free text.
///
/// # Examples
///
/// ```
/// use sprout_core::sanitize::strip_markup;
///
/// assert_eq!(strip_markup("<script>alert(1)</script>Hello"), "Hello");
/// assert_eq!(strip_markup("Hi <b>there</b>"), "Hi there");
/// ```
pub fn strip_markup(input: &str) -> String {
    let without_blocks = BLOCK_RE.replace_all(input, "");
    let without_tags = TAG_RE.replace_all(&without_blocks, "");
    without_tags.trim().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_script_with_content() {
        assert_eq!(strip_markup("<script>alert(1)</script>Hello"), "Hello");
    }

    #[test]
    fn test_strip_style_with_content() {
        assert_eq!(strip_markup("<style>p { color: red }</style>Note"), "Note");
    }

    #[test]
    fn test_strip_plain_tags_keeps_text() {
        assert_eq!(strip_markup("Hi <b>there</b>"), "Hi there");
        assert_eq!(strip_markup("<p>Mia</p>"), "Mia");
    }

    #[test]
    fn test_strip_script_with_attributes() {
        assert_eq!(
            strip_markup("<script type=\"text/javascript\">steal()</script>ok"),
            "ok"
        );
    }

    #[test]
    fn test_unclosed_script_tag_is_stripped() {
        // Without a closing tag the element match fails; the opening tag is
        // still removed by the tag pass.
        assert_eq!(strip_markup("<script>alert(1)"), "alert(1)");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(strip_markup("<SCRIPT>x()</SCRIPT>Safe"), "Safe");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(strip_markup("  padded  "), "padded");
        assert_eq!(strip_markup("<b> spaced </b>"), "spaced");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip_markup("Mia's 3rd notebook"), "Mia's 3rd notebook");
    }

    #[test]
    fn test_bare_angle_bracket_survives() {
        // "<" with no closing ">" is not a tag.
        assert_eq!(strip_markup("3 < 5"), "3 < 5");
    }

    #[test]
    fn test_empty_and_markup_only_become_empty() {
        assert_eq!(strip_markup(""), "");
        assert_eq!(strip_markup("<b></b>"), "");
        assert_eq!(strip_markup("<script>x</script>"), "");
    }

    // ------------------------------------------------------------------------
    // Structural properties
    // ------------------------------------------------------------------------

    proptest! {
        #[test]
        fn prop_never_grows(input in ".{0,256}") {
            prop_assert!(strip_markup(&input).len() <= input.len());
        }

        #[test]
        fn prop_idempotent(input in ".{0,256}") {
            let once = strip_markup(&input);
            prop_assert_eq!(strip_markup(&once), once.clone());
        }

        #[test]
        fn prop_no_complete_tag_remains(input in ".{0,256}") {
            let cleaned = strip_markup(&input);
            prop_assert!(!TAG_RE.is_match(&cleaned));
        }
    }
}
