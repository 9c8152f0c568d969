//! Slug and article-length helpers

/// Maximum stored slug length
pub const MAX_SLUG_LEN: usize = 120;

/// Words per minute used for reading time estimates
const WORDS_PER_MINUTE: usize = 250;

/// Floor for reading time estimates (minutes)
const MIN_READING_TIME: i64 = 3;

/// Turn a title into a URL slug
///
/// Runs of characters outside `[a-z0-9]` collapse to a single `-`;
/// leading and trailing dashes are removed.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Clean a model-proposed slug
///
/// Lowercases, drops everything outside `[a-z0-9-]`, truncates to
/// [`MAX_SLUG_LEN`] characters.
pub fn sanitize_slug(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .take(MAX_SLUG_LEN)
        .collect()
}

/// Append a base36 millisecond timestamp to make a slug unique
pub fn dedupe_suffix(slug: &str, unix_millis: u64) -> String {
    format!("{}-{}", slug, to_base36(unix_millis))
}

/// Lowercase base36 rendering (matches `Number.prototype.toString(36)`)
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

/// Count whitespace-separated words
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Estimated reading time in minutes (never below 3)
pub fn reading_time(content: &str) -> i64 {
    let words = word_count(content);
    let minutes = words.div_ceil(WORDS_PER_MINUTE) as i64;
    minutes.max(MIN_READING_TIME)
}

/// Split a comma-separated tag string into trimmed, non-empty tags
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Best SIP Plans 2026: Top 10!"), "best-sip-plans-2026-top-10");
        assert_eq!(slugify("  --Hello   World--  "), "hello-world");
        assert_eq!(slugify("₹ Budget"), "budget");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_sanitize_slug() {
        assert_eq!(sanitize_slug("Top-Movies_2026!"), "top-movies2026");
        assert_eq!(sanitize_slug("a b c"), "abc");
        let long = "x".repeat(300);
        assert_eq!(sanitize_slug(&long).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_dedupe_suffix() {
        assert_eq!(dedupe_suffix("my-post", 36), "my-post-10");
    }

    #[test]
    fn test_reading_time_floor_and_rounding() {
        assert_eq!(reading_time(""), 3);
        assert_eq!(reading_time(&"word ".repeat(250)), 3);
        assert_eq!(reading_time(&"word ".repeat(1000)), 4);
        assert_eq!(reading_time(&"word ".repeat(1001)), 5);
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("a, b ,, c"), vec!["a", "b", "c"]);
        assert!(split_tags("").is_empty());
    }
}
