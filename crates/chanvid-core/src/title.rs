//! Thread title extraction and folder-name sanitization.

use crate::page::ThreadPage;

/// Folder name used when the page has no usable `<title>`.
pub const UNTITLED: &str = "Untitled";

/// Separator between board name, thread subject and site name in imageboard titles
/// (e.g. `"/wsg/ - Some Subject - 4chan"`).
pub const TITLE_SEPARATOR: &str = " - ";

/// Replaces every character outside `[A-Za-z0-9 _-]` with `_`.
///
/// One character in, one character out: the length in chars and the position of
/// every allowed character are preserved.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == ' ' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Derives the sanitized folder name from the raw `<title>` text.
///
/// Takes the second `" - "` segment when there is one, the whole title otherwise,
/// and `"Untitled"` when there is no title at all (or nothing is left).
///
/// One exception to the second-segment rule: when that segment is a board tag
/// such as `/b/` and another segment follows, the following segment is used.
/// `"4chan - /b/ - Random Thread Title"` names the folder `Random Thread Title`,
/// not `_b_`.
pub fn extract_title(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return UNTITLED.to_string();
    };
    let parts: Vec<&str> = raw.split(TITLE_SEPARATOR).collect();
    let chosen = match parts.as_slice() {
        [_, board, subject, ..] if is_board_tag(board) => *subject,
        [_, second, ..] => *second,
        _ => raw,
    };
    let sanitized = sanitize_title(chosen);
    if sanitized.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        sanitized
    }
}

/// `/b/`, `/wsg/` and the like.
fn is_board_tag(segment: &str) -> bool {
    let s = segment.trim();
    s.len() >= 3
        && s.starts_with('/')
        && s.ends_with('/')
        && s[1..s.len() - 1].chars().all(|c| c.is_ascii_alphanumeric())
}

/// Folder name for a rendered thread page.
pub fn thread_title(page: &dyn ThreadPage) -> String {
    extract_title(page.title_text().as_deref())
}
