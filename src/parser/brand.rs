use std::sync::LazyLock;

use regex::Regex;

use crate::profile::{non_empty, RawFieldBundle};

// Separator followed by anything up to the end: "Acme - Home", "Acme | Blog".
static SEPARATOR_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-|–]\s*.+$").unwrap());
static LEGAL_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(Inc\.|LLC|Ltd\.|Limited|Corporation|Corp\.)$").unwrap()
});

/// Brand name from the first usable candidate, cleaned up.
pub fn derive(raw: &RawFieldBundle) -> Option<String> {
    let candidate = candidate(raw)?;
    non_empty(&clean(&candidate))
}

/// logo → h1 → title before '|' → title before '-'.
fn candidate(raw: &RawFieldBundle) -> Option<String> {
    let title = raw.title.as_deref().unwrap_or("");
    [
        raw.logo_text.clone(),
        raw.h1_text.clone(),
        title.split('|').next().and_then(non_empty),
        title.split('-').next().and_then(non_empty),
    ]
    .into_iter()
    .flatten()
    .find(|c| !c.is_empty())
}

/// Strip a trailing "- tail"/"| tail", then a trailing legal-entity suffix.
pub fn clean(name: &str) -> String {
    let no_tail = SEPARATOR_TAIL_RE.replace(name, "");
    LEGAL_SUFFIX_RE.replace(&no_tail, "").trim().to_string()
}
