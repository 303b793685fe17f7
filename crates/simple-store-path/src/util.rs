use crate::types::{Key, Path, Segment, WILDCARD};

/// Separator used by dot-delimited paths.
pub const SEPARATOR: char = '.';

/// Parse a dot-delimited path.
///
/// The empty string is the root path. `*` becomes [`Segment::Wildcard`];
/// every other step is kept verbatim as a name, digits included.
pub fn parse_path(path: &str) -> Path {
    if path.is_empty() {
        return Path::root();
    }
    path.split(SEPARATOR).map(Segment::from).collect()
}

/// Renders a segment for pattern indexing.
///
/// Numeric indices are not stable registration keys, so they render as the
/// wildcard. Predicates have no literal form and yield `None`.
pub fn pattern_key(segment: &Segment) -> Option<&str> {
    match segment {
        Segment::Key(Key::Name(name)) => Some(name),
        Segment::Key(Key::Index(_)) | Segment::Wildcard => Some(WILDCARD),
        Segment::Predicate(_) => None,
    }
}

/// Format a path as dot-delimited text. Predicates render as JSON.
pub fn format_path(path: &Path) -> String {
    path.segments()
        .iter()
        .map(|segment| match segment {
            Segment::Key(key) => key.to_string(),
            Segment::Wildcard => WILDCARD.to_string(),
            Segment::Predicate(p) => p.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Format a path the way the listener registry indexes it.
pub fn format_pattern(path: &Path) -> String {
    path.segments()
        .iter()
        .map(|segment| match segment {
            Segment::Predicate(p) => p.to_string(),
            other => pattern_key(other).unwrap_or_default().to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Format a concrete path as dot-delimited text.
pub fn format_concrete(path: &[Key]) -> String {
    path.iter()
        .map(Key::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Check if a string represents a valid non-negative integer array index.
pub fn is_valid_index(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|&b| b.is_ascii_digit())
}
