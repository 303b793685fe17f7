use serde_json::Value;

use crate::find::{bind_segment, child, child_mut};
use crate::types::{Key, Path, Segment};

/// Get the value at `path`, resolving predicates against `state`.
///
/// Returns `None` if any step is missing.
pub fn get<'a>(state: &'a Value, path: &Path) -> Option<&'a Value> {
    walk(state, path.segments())
}

/// Get the value at the first `depth` segments of `path`.
pub fn get_depth<'a>(state: &'a Value, path: &Path, depth: usize) -> Option<&'a Value> {
    let segments = path.segments();
    walk(state, &segments[..depth.min(segments.len())])
}

fn walk<'a>(state: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    let mut current = state;
    for segment in segments {
        let key = bind_segment(current, segment)?;
        current = child(current, &key)?;
    }
    Some(current)
}

/// Get a value by concrete path.
pub fn get_concrete<'a>(state: &'a Value, path: &[Key]) -> Option<&'a Value> {
    let mut current = state;
    for key in path {
        current = child(current, key)?;
    }
    Some(current)
}

/// Get a mutable reference to a value by concrete path.
pub fn get_concrete_mut<'a>(state: &'a mut Value, path: &[Key]) -> Option<&'a mut Value> {
    let mut current = state;
    for key in path {
        current = child_mut(current, key)?;
    }
    Some(current)
}
