//! Markup sanitization for messages shown in rendered reports
//!
//! Messages coming back from the index backend end up inside the job status
//! text, which the CMS admin UI renders as HTML. Everything drawn from indexed
//! data must pass through [`encode_markup`] before it is embedded there.

/// Neutralize control characters and encode markup-significant characters
///
/// Control characters (including newlines and tabs) become a single space so a
/// message stays on one line of the report; `& < > " ' /` are HTML-encoded.
pub fn encode_markup(message: &str) -> String {
    let flattened: String = message
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    tera::escape_html(&flattened)
}

/// Encode an optional message, treating a missing message as empty
pub fn encode_optional_markup(message: Option<&str>) -> String {
    message.map(encode_markup).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_tags_are_encoded() {
        let encoded = encode_markup("<script>alert('x')</script>");
        assert!(!encoded.contains("<script>"));
        assert!(encoded.contains("&lt;script&gt;"));
        assert!(encoded.contains("&#x27;x&#x27;"));
    }

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(encode_markup("slow item"), "slow item");
    }

    #[test]
    fn test_control_characters_are_flattened() {
        assert_eq!(encode_markup("line one\nline\ttwo\u{7}"), "line one line two ");
    }

    #[test]
    fn test_ampersand_is_encoded_once() {
        assert_eq!(encode_markup("a & b"), "a &amp; b");
    }

    #[test]
    fn test_missing_message_becomes_empty() {
        assert_eq!(encode_optional_markup(None), "");
        assert_eq!(encode_optional_markup(Some("<b>")), "&lt;b&gt;");
    }
}
