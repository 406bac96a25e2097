//! Media link discovery and filename derivation.

use std::collections::HashSet;

use crate::page::ThreadPage;

/// Recognized video extensions. Matching is on the end of the raw address string.
pub const MEDIA_EXTENSIONS: [&str; 2] = [".mp4", ".webm"];

pub fn is_media_link(href: &str) -> bool {
    MEDIA_EXTENSIONS.iter().any(|ext| href.ends_with(ext))
}

/// Returns the absolute address for a media anchor, or `None` for anything else.
/// Protocol-relative addresses (`//host/path`) get an `https:` scheme.
pub fn normalize_link(href: &str) -> Option<String> {
    if !is_media_link(href) {
        return None;
    }
    if href.starts_with("//") {
        Some(format!("https:{href}"))
    } else {
        Some(href.to_string())
    }
}

/// Collects the distinct media addresses linked from `page`.
///
/// Deduplication is by exact string value only. The set has no meaningful order.
pub fn extract_media_links(page: &dyn ThreadPage) -> HashSet<String> {
    page.link_targets()
        .iter()
        .filter_map(|href| normalize_link(href))
        .collect()
}

/// Local filename for `url`: the raw tail after the final `/`, as written in the link.
///
/// Nothing is decoded or re-encoded and the query stays part of the name, so
/// addresses that differ only in their query get distinct files. Returns `None`
/// for an empty tail, `.` or `..`.
pub fn filename_from_url(url: &str) -> Option<&str> {
    let tail = url.rsplit('/').next()?;
    match tail {
        "" | "." | ".." => None,
        name => Some(name),
    }
}
