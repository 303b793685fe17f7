use serde_json::Value;

use crate::types::{ConcretePath, Key, Path, Predicate, Resolution, Segment, WILDCARD};
use crate::util::format_path;
use crate::PathError;

/// Index of the first element of `array` matching `predicate`.
pub fn find_index(array: &[Value], predicate: &Predicate) -> Option<usize> {
    array.iter().position(|item| predicate.matches(item))
}

/// Turns one segment into a literal key against `container`.
///
/// Predicates bind to the first matching element; `*` outside a pattern is
/// just a property named `*`. Returns `None` when the segment cannot name
/// anything in this container.
pub fn bind_segment(container: &Value, segment: &Segment) -> Option<Key> {
    match (container, segment) {
        (Value::Array(arr), Segment::Predicate(p)) => find_index(arr, p).map(Key::Index),
        (Value::Array(_), Segment::Key(key)) => key.as_index().map(Key::Index),
        (Value::Object(_), Segment::Key(Key::Name(name))) => Some(Key::Name(name.clone())),
        (Value::Object(_), Segment::Key(Key::Index(i))) => Some(Key::Name(i.to_string())),
        (Value::Object(_), Segment::Wildcard) => Some(Key::Name(WILDCARD.to_string())),
        _ => None,
    }
}

pub(crate) fn child<'a>(container: &'a Value, key: &Key) -> Option<&'a Value> {
    match container {
        Value::Array(arr) => arr.get(key.as_index()?),
        Value::Object(map) => map.get(&key.to_literal()),
        _ => None,
    }
}

pub(crate) fn child_mut<'a>(container: &'a mut Value, key: &Key) -> Option<&'a mut Value> {
    match container {
        Value::Array(arr) => arr.get_mut(key.as_index()?),
        Value::Object(map) => map.get_mut(&key.to_literal()),
        _ => None,
    }
}

/// Resolve `path` against `state` for reading.
///
/// Never fails: the walk stops at the first segment that names nothing and
/// reports the keys resolved up to that point.
pub fn resolve(state: &Value, path: &Path) -> Resolution {
    let mut concrete = ConcretePath::with_capacity(path.len());
    let mut current = state;
    for segment in path.segments() {
        let Some(key) = bind_segment(current, segment) else {
            return Resolution { concrete, complete: false };
        };
        let Some(next) = child(current, &key) else {
            return Resolution { concrete, complete: false };
        };
        concrete.push(key);
        current = next;
    }
    Resolution { concrete, complete: true }
}

/// Resolve `path` against `state` for writing.
///
/// Every segment but the last must lead to an existing value. The last one
/// only has to be nameable in its container, so a new object key or the
/// slot just past the end of an array are valid targets.
///
/// # Errors
///
/// - `PathError::NoMatch` - a predicate matched no element
/// - `PathError::NotFound` - an intermediate value is missing
/// - `PathError::NotContainer` - a step goes through a scalar
/// - `PathError::InvalidIndex` - a non-numeric key addresses an array
pub fn resolve_strict(state: &Value, path: &Path) -> Result<ConcretePath, PathError> {
    let mut concrete = ConcretePath::with_capacity(path.len());
    let mut current = state;
    let last = path.len().saturating_sub(1);
    for (depth, segment) in path.segments().iter().enumerate() {
        let key = match bind_segment(current, segment) {
            Some(key) => key,
            None => return Err(strict_miss(current, segment, path)),
        };
        if depth == last {
            concrete.push(key);
            break;
        }
        current = child(current, &key).ok_or_else(|| PathError::NotFound {
            path: format_path(path),
        })?;
        concrete.push(key);
    }
    Ok(concrete)
}

fn strict_miss(container: &Value, segment: &Segment, path: &Path) -> PathError {
    let path = format_path(path);
    match (container, segment) {
        (Value::Array(_), Segment::Predicate(_)) => PathError::NoMatch { path },
        (Value::Array(_), _) => PathError::InvalidIndex { path },
        (Value::Object(_), Segment::Predicate(_)) => PathError::NoMatch { path },
        _ => PathError::NotContainer { path },
    }
}
