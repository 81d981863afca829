use std::borrow::Cow;

/// Ellipsis string used for truncation
pub const ELLIPSIS: &str = "...";
/// Number of characters the ellipsis occupies
const ELLIPSIS_LEN: usize = 3;

/// Truncates a string to at most `max_chars` Unicode scalar values.
///
/// Characters are counted, not bytes or terminal columns: Mastodon's status
/// limit is a character limit, and a CJK character counts as one.
///
/// If truncation is necessary, the first `max_chars - 3` characters are kept
/// and "..." is appended, so the result is exactly `max_chars` characters.
///
/// # Returns
///
/// - If the string fits, `Cow::Borrowed(s)` (no allocation)
/// - If `max_chars <= 3`, the first `max_chars` characters without ellipsis
/// - Otherwise `Cow::Owned` with truncated text and "..." appended
///
/// # Examples
///
/// ```
/// use rsstoot::util::truncate_chars;
///
/// assert_eq!(truncate_chars("Short", 10), "Short");
/// assert_eq!(truncate_chars("Hello World", 8), "Hello...");
/// assert_eq!(truncate_chars("你好世界你好", 5), "你好...");
/// assert_eq!(truncate_chars("Test", 2), "Te");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> Cow<'_, str> {
    // Byte offset of the character at index `max_chars`, if there is one
    let Some((overflow_at, _)) = s.char_indices().nth(max_chars) else {
        return Cow::Borrowed(s);
    };

    if max_chars <= ELLIPSIS_LEN {
        return Cow::Owned(s[..overflow_at].to_string());
    }

    let keep = max_chars - ELLIPSIS_LEN;
    let cut = s
        .char_indices()
        .nth(keep)
        .map(|(idx, _)| idx)
        .unwrap_or(overflow_at);

    Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ascii_truncation() {
        assert_eq!(truncate_chars("Hello World", 8), "Hello...");
        assert_eq!(truncate_chars("Short", 10), "Short");
    }

    #[test]
    fn test_exact_fit_is_borrowed() {
        let result = truncate_chars("12345", 5);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, "12345");
    }

    #[test]
    fn test_cjk_counts_characters_not_bytes() {
        // 6 chars, 18 bytes
        assert_eq!(truncate_chars("日本語テスト", 6), "日本語テスト");
        assert_eq!(truncate_chars("日本語テスト", 5), "日本...");
    }

    #[test]
    fn test_narrow_limits() {
        assert_eq!(truncate_chars("Test", 0), "");
        assert_eq!(truncate_chars("Test", 1), "T");
        assert_eq!(truncate_chars("Test", 3), "Tes");
        assert_eq!(truncate_chars("Testing", 4), "T...");
        assert_eq!(truncate_chars("", 0), "");
    }

    #[test]
    fn test_six_hundred_chars_capped_at_five_hundred() {
        let body: String = (0..600).map(|i| (b'a' + (i % 26) as u8) as char).collect();
        let result = truncate_chars(&body, 500);
        assert_eq!(result.chars().count(), 500);
        assert!(result.ends_with("..."));
        assert_eq!(&result[..497], &body[..497]);
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_limit(s in "\\PC{0,80}", max in 0usize..64) {
            let out = truncate_chars(&s, max);
            prop_assert!(out.chars().count() <= max);
            if s.chars().count() <= max {
                prop_assert_eq!(out.as_ref(), s.as_str());
            } else {
                prop_assert_eq!(out.chars().count(), max);
            }
        }

        #[test]
        fn prop_truncated_keeps_prefix(s in "\\PC{10,80}", max in 4usize..10) {
            let out = truncate_chars(&s, max);
            let kept: String = s.chars().take(max - 3).collect();
            prop_assert!(out.starts_with(&kept));
            prop_assert!(out.ends_with(ELLIPSIS));
        }
    }
}
