//! Response normalization: raw model text → title/content pair.

/// Characters of the originating query kept in an artifact title.
pub const TITLE_QUERY_CHARS: usize = 50;

/// Shaped model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub title: Option<String>,
    pub content: String,
}

/// Trim `raw` and, when the kind has a title label, derive the title from
/// `query`. Empty content is valid. Idempotent on already-trimmed content.
pub fn normalize(raw: &str, title_label: Option<&str>, query: &str) -> Normalized {
    Normalized {
        title: title_label.map(|label| title_for(label, query)),
        content: raw.trim().to_string(),
    }
}

/// `label` followed by at most [`TITLE_QUERY_CHARS`] characters of `query`.
pub fn title_for(label: &str, query: &str) -> String {
    let prefix: String = query.chars().take(TITLE_QUERY_CHARS).collect();
    format!("{label}{prefix}")
}
