//! Query sanitization and intent classification
//!
//! Everything downstream of this module only ever sees the sanitized form
//! of a query. The raw form is never logged or echoed back to the caller.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::MAX_QUERY_LEN;

/// Tag-like substrings, stripped before the character deny-set is applied.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").expect("valid regex"));

/// Character deny-set. Deliberately blunt: it also strips characters that
/// appear in legitimate queries (currency symbols, parentheses in math
/// expressions). That trade-off is carried on purpose; see DESIGN.md before
/// changing it.
static DENY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>{}()\[\]\\/;`'"|&*%$^#@!~=+]"#).expect("valid regex"));

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Currency-conversion shapes like "cad to usd" or "convert 100 cad to usd".
/// Such phrases would otherwise trip the word-count question rule.
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(convert\s+)?(\d+\s+)?[a-z]{3}\s*(in|to|into)\s*[a-z]{3}$").expect("valid regex")
});

/// Sanitize a raw query string.
///
/// Steps, in order, each total and side-effect-free: truncate to
/// [`MAX_QUERY_LEN`] characters, strip tag-like substrings, strip the
/// character deny-set, collapse whitespace runs, trim. The result may
/// legitimately be empty.
pub fn sanitize(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(r) => r,
        None => return String::new(),
    };

    let truncated: String = raw.chars().take(MAX_QUERY_LEN).collect();
    let stripped = TAG_RE.replace_all(&truncated, "");
    let stripped = DENY_RE.replace_all(&stripped, "");
    let collapsed = WHITESPACE_RE.replace_all(&stripped, " ");

    collapsed.trim().to_string()
}

/// The routing intent detected for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    /// A search phrase best served by a general-purpose engine.
    Keyword,
    /// A natural-language question best served by an answer engine.
    Question,
}

/// Classify a sanitized query as a keyword phrase or a question.
///
/// Pure function of its input. Precedence, in this exact order:
/// 1. Currency-conversion shapes are always keywords, overriding every
///    later rule.
/// 2. A query is a question if it ends with `?`, starts with a question
///    word followed by a space, or has more than 3 whitespace tokens.
/// 3. Everything else, including the empty query, is a keyword.
pub fn classify(sanitized: &str) -> QueryIntent {
    let q = sanitized.trim().to_lowercase();

    if q.is_empty() {
        return QueryIntent::Keyword;
    }

    if CURRENCY_RE.is_match(&q) {
        return QueryIntent::Keyword;
    }

    const QUESTION_WORDS: [&str; 6] = ["who", "what", "when", "where", "why", "how"];

    let is_question = q.ends_with('?')
        || QUESTION_WORDS
            .iter()
            .any(|w| q.starts_with(&format!("{} ", w)))
        || q.split_whitespace().count() > 3;

    if is_question {
        QueryIntent::Question
    } else {
        QueryIntent::Keyword
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_tags() {
        assert_eq!(sanitize(Some("<script>alert1</script>rust")), "alert1rust");
        assert_eq!(sanitize(Some("hello <b>world")), "hello world");
    }

    #[test]
    fn test_sanitize_strips_deny_set() {
        let dirty = r#"a<b>c{d}e(f)g[h]i\j/k;l`m'n"o|p&q*r%s$t^u#v@w!x~y=z+0"#;
        let clean = sanitize(Some(dirty));
        for c in "<>{}()[]\\/;`'\"|&*%$^#@!~=+".chars() {
            assert!(!clean.contains(c), "deny-set char {:?} survived", c);
        }
    }

    #[test]
    fn test_sanitize_bounds_length() {
        let long = "a".repeat(5000);
        assert_eq!(sanitize(Some(long.as_str())).len(), 1000);
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(sanitize(Some("  rust \t\n  lang  ")), "rust lang");
    }

    #[test]
    fn test_sanitize_absent_input() {
        assert_eq!(sanitize(None), "");
        assert_eq!(sanitize(Some("")), "");
    }

    #[test]
    fn test_sanitize_keeps_question_mark() {
        // '?' is not in the deny-set; the classifier depends on it.
        assert_eq!(sanitize(Some("what time is it?")), "what time is it?");
    }

    #[test]
    fn test_classify_question_word() {
        assert_eq!(classify("how to bake bread"), QueryIntent::Question);
        assert_eq!(classify("what time is it?"), QueryIntent::Question);
        assert_eq!(classify("where is zanzibar"), QueryIntent::Question);
    }

    #[test]
    fn test_classify_question_mark() {
        assert_eq!(classify("rust borrow checker?"), QueryIntent::Question);
    }

    #[test]
    fn test_classify_word_count() {
        assert_eq!(
            classify("best pizza near me tonight"),
            QueryIntent::Question
        );
        assert_eq!(classify("best pizza"), QueryIntent::Keyword);
    }

    #[test]
    fn test_classify_currency_override() {
        // These would be questions by word count without the override.
        assert_eq!(classify("cad to usd"), QueryIntent::Keyword);
        assert_eq!(classify("convert 100 cad to usd"), QueryIntent::Keyword);
        assert_eq!(classify("100 eur into gbp"), QueryIntent::Keyword);
    }

    #[test]
    fn test_classify_uppercase_currency() {
        // Caller lowercases; classify does too, so either form works.
        assert_eq!(classify("CAD to USD"), QueryIntent::Keyword);
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify(""), QueryIntent::Keyword);
        assert_eq!(classify("   "), QueryIntent::Keyword);
    }
}
