//! Where each fetched item lands on disk.
//!
//! Two policies exist:
//! - [`DestinationPolicy::Shared`] sends every item to one fixed path. The
//!   last writer wins; writes go through a partial file and a rename, so the
//!   path always holds one complete body.
//! - [`DestinationPolicy::PerItem`] derives a distinct, sanitised file name
//!   from the item index and the last URL path segment.

use std::path::{Path, PathBuf};

/// Byte budget for the sanitised segment. File names are capped at 255
/// bytes; the partial name adds `.`, an index prefix of up to 21 bytes, a
/// 32-hex tag and `.part` around it.
const MAX_NAME_BYTES: usize = 180;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationPolicy {
    Shared(PathBuf),
    PerItem { dir: PathBuf },
}

impl DestinationPolicy {
    /// Returns the destination path for item `index` fetched from `url`.
    pub fn resolve(&self, index: usize, url: &str) -> PathBuf {
        match self {
            DestinationPolicy::Shared(path) => path.clone(),
            DestinationPolicy::PerItem { dir } => {
                dir.join(format!("{:03}-{}", index, sanitise_filename(url)))
            }
        }
    }
}

/// Characters that are safe in a filename on macOS, Linux and Windows.
fn is_safe_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')' | '+' | ',' | '@' | '~')
}

/// Last non-empty path segment of `url`, ignoring query and fragment.
fn filename_from_url(url: &str) -> String {
    let without_query = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .trim();
    let path = without_query
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map(|(_, p)| p).unwrap_or(""))
        .unwrap_or(without_query);
    path.rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("")
        .to_string()
}

/// Turns the last URL segment into a flat, traversal-free file name.
pub fn sanitise_filename(url: &str) -> String {
    let raw = filename_from_url(url);

    let name: String = raw
        .chars()
        .map(|c| if is_safe_char(c) { c } else { '_' })
        .collect();
    let name = collapse_underscores(&name);
    let name = name.trim_matches(|c| c == '_' || c == '.');
    let name = truncate_to_bytes(name, MAX_NAME_BYTES);
    let name = name.trim_end_matches(|c| c == '_' || c == '.');

    if name.is_empty() {
        return "download".to_string();
    }
    name.to_string()
}

/// Cuts `s` to at most `max_bytes` UTF-8 bytes on a char boundary.
fn truncate_to_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push(c);
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out
}

/// Sibling path used while a body is still being written.
pub(crate) fn partial_path(destination: &Path, tag: &str) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());
    destination.with_file_name(format!(".{}.{}.part", name, tag))
}
