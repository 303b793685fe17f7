use std::mem;

use serde_json::Value;

use crate::find::resolve_strict;
use crate::get::get_concrete_mut;
use crate::types::{Path, Replaced};
use crate::util::format_path;
use crate::PathError;

/// Write `value` at `path` and return what it replaced.
///
/// The empty path replaces the whole state. Otherwise the path is resolved
/// against the current state (predicates bind to content, which may be the
/// very thing being replaced), the old value is taken out of its slot, and
/// the new one is put in. An array accepts a write at its length, which
/// appends.
///
/// # Errors
///
/// Everything [`resolve_strict`] reports, plus
/// `PathError::IndexOutOfBounds` for an array index past the length.
pub fn set(state: &mut Value, path: &Path, value: Value) -> Result<Replaced, PathError> {
    if path.is_empty() {
        let old = mem::replace(state, value);
        return Ok(Replaced {
            old_value: Some(old),
            path: Vec::new(),
        });
    }

    let concrete = resolve_strict(state, path)?;
    let Some((last, parent_path)) = concrete.split_last() else {
        return Err(PathError::NoParent);
    };
    let parent = get_concrete_mut(state, parent_path).ok_or_else(|| PathError::NotFound {
        path: format_path(path),
    })?;

    let old_value = match parent {
        Value::Object(map) => map.insert(last.to_literal(), value),
        Value::Array(arr) => {
            let index = last.as_index().ok_or_else(|| PathError::InvalidIndex {
                path: format_path(path),
            })?;
            if index < arr.len() {
                Some(mem::replace(&mut arr[index], value))
            } else if index == arr.len() {
                arr.push(value);
                None
            } else {
                return Err(PathError::IndexOutOfBounds {
                    path: format_path(path),
                    index,
                });
            }
        }
        _ => {
            return Err(PathError::NotContainer {
                path: format_path(path),
            })
        }
    };

    Ok(Replaced {
        old_value,
        path: concrete,
    })
}
