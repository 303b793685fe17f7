//! Path specs for the simple store.
//!
//! A [`Path`] is an ordered list of [`Segment`]s: object keys, array indices,
//! the `*` wildcard, or [`Predicate`]s that pick an array element by its
//! fields instead of its position. Resolving a path against a state tree
//! yields a concrete path made only of [`Key`]s.
//!
//! # Example
//!
//! ```
//! use simple_store_path::{get, resolve, set, Key, Path, Segment};
//! use serde_json::json;
//!
//! let mut state = json!({"p": [{"id": 1}, {"id": 2, "name": "n"}]});
//!
//! // Dot paths
//! assert_eq!(get(&state, &Path::from("p.0.id")), Some(&json!(1)));
//!
//! // Predicate segments resolve to the first matching element
//! let path = Path::new(vec!["p".into(), Segment::predicate(json!({"id": 2})).unwrap(), "name".into()]);
//! let resolved = resolve(&state, &path);
//! assert_eq!(resolved.concrete, vec![Key::from("p"), Key::Index(1), Key::from("name")]);
//!
//! let replaced = set(&mut state, &path, json!("n2")).unwrap();
//! assert_eq!(replaced.old_value, Some(json!("n")));
//! ```

use thiserror::Error;

pub mod types;
pub use types::{ConcretePath, Key, Path, Predicate, Replaced, Resolution, Segment, WILDCARD};

mod find;
pub use find::{bind_segment, find_index, resolve, resolve_strict};

mod get;
pub use get::{get, get_concrete, get_concrete_mut, get_depth};

mod set;
pub use set::set;

mod util;
pub use util::{
    format_concrete, format_path, format_pattern, is_valid_index, parse_path, pattern_key, SEPARATOR,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path not found: {path}")]
    NotFound { path: String },
    #[error("no element matches predicate in {path}")]
    NoMatch { path: String },
    #[error("cannot step into a scalar at {path}")]
    NotContainer { path: String },
    #[error("invalid array index in {path}")]
    InvalidIndex { path: String },
    #[error("index {index} out of bounds in {path}")]
    IndexOutOfBounds { path: String, index: usize },
    #[error("root path has no parent")]
    NoParent,
}
