//! Text, URL, and tag cleanup primitives.
//!
//! Every write into the document store funnels through these functions, so
//! they are deliberately lenient: malformed input degrades to an empty
//! value rather than an error. All of them are idempotent.

use std::sync::LazyLock;

use regex::Regex;

static RUN_OF_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("static regex"));
static OTHER_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t\r\x0b\x0c]+").expect("static regex"));
static SPACE_AFTER_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n +").expect("static regex"));
static SPACE_BEFORE_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +\n").expect("static regex"));
static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));
static ANY_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static DOMAIN_SHAPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9\-.]*[a-zA-Z0-9]\.[a-zA-Z]{2,}").expect("static regex")
});
static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[a-zA-Z0-9]([a-zA-Z0-9\-.]*[a-zA-Z0-9])?\.[a-zA-Z]{2,}([/?].*)?$")
        .expect("static regex")
});

/// Collapses whitespace runs while preserving paragraph structure.
///
/// Trims the ends, folds tabs and repeated spaces into a single space,
/// strips spaces adjacent to newlines, and caps consecutive newlines at
/// two. Idempotent: applying it twice yields the same string.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let text = text.trim();
    let text = OTHER_WHITESPACE.replace_all(text, " ");
    let text = RUN_OF_SPACES.replace_all(&text, " ");
    let text = SPACE_AFTER_NEWLINE.replace_all(&text, "\n");
    let text = SPACE_BEFORE_NEWLINE.replace_all(&text, "\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Strips whitespace from a URL and prefixes `https://` when the remainder
/// is domain-shaped or starts with `www.`.
///
/// Anything else (including the empty string) passes through unchanged, so
/// [`validate_url`] can still reject it with a useful message.
#[must_use]
pub fn clean_url(url: &str) -> String {
    let url = ANY_WHITESPACE.replace_all(url.trim(), "").into_owned();
    if url.is_empty() {
        return url;
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return url;
    }
    if DOMAIN_SHAPED.is_match(&url) || url.starts_with("www.") {
        return format!("https://{url}");
    }
    url
}

/// Checks that a non-empty URL has an `http(s)://` scheme and a plausible
/// host. The empty string is valid — absence of a link is allowed.
///
/// Returns `Ok(())` or a human-readable description of the problem.
pub fn validate_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Ok(());
    }
    if URL_SHAPE.is_match(url) {
        Ok(())
    } else {
        Err(format!(
            "URL must start with http:// or https:// and contain a valid domain: {url}"
        ))
    }
}

/// Cleans each tag with [`clean_text`] and drops the ones that end up
/// empty. First-seen order is preserved; duplicates are kept here and
/// collapsed only during aggregate tag-set computation.
#[must_use]
pub fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| clean_text(tag))
        .filter(|tag| !tag.is_empty())
        .collect()
}
