//! Type definitions for store paths.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Literal wildcard segment in dot-delimited paths.
pub const WILDCARD: &str = "*";

/// A literal step in a path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    /// The key as an array index, if it is one or parses as one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(name) if crate::util::is_valid_index(name) => name.parse().ok(),
            Key::Name(_) => None,
        }
    }

    /// String form used for literal lookups (`1` and `"1"` collide on purpose).
    pub fn to_literal(&self) -> String {
        match self {
            Key::Index(i) => i.to_string(),
            Key::Name(name) => name.clone(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

/// A partial field query matched against array elements.
///
/// An element matches when every field of the predicate is present on the
/// element with an equal value. Two predicates are equal when their field
/// maps are equal, regardless of where they were built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate(Map<String, Value>);

impl Predicate {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Builds a predicate from a JSON object. Returns `None` for non-objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Tests `candidate` field by field.
    pub fn matches(&self, candidate: &Value) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let Value::Object(item) = candidate else {
            return false;
        };
        self.0
            .iter()
            .all(|(field, expected)| item.get(field) == Some(expected))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object key or array index.
    Key(Key),
    /// Any key or index at this depth.
    Wildcard,
    /// First array element matching the predicate.
    Predicate(Predicate),
}

impl Segment {
    pub fn name(name: impl Into<String>) -> Self {
        Segment::Key(Key::Name(name.into()))
    }

    pub fn index(index: usize) -> Self {
        Segment::Key(Key::Index(index))
    }

    pub fn wildcard() -> Self {
        Segment::Wildcard
    }

    /// Predicate segment from a JSON object. `None` for any other value.
    pub fn predicate(fields: Value) -> Option<Self> {
        Predicate::from_value(fields).map(Segment::Predicate)
    }

    pub fn as_key(&self) -> Option<&Key> {
        match self {
            Segment::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl From<Key> for Segment {
    fn from(key: Key) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::index(index)
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        if name == WILDCARD {
            Segment::Wildcard
        } else {
            Segment::name(name)
        }
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Segment::from(name.as_str())
    }
}

impl From<Predicate> for Segment {
    fn from(predicate: Predicate) -> Self {
        Segment::Predicate(predicate)
    }
}

/// A path that has been resolved against a state snapshot.
pub type ConcretePath = Vec<Key>;

/// Ordered sequence of segments addressing a location in a state tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Splits off the last segment. `None` for the root path.
    pub fn split_last(&self) -> Option<(&Segment, &[Segment])> {
        self.segments.split_last()
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        crate::util::parse_path(path)
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        crate::util::parse_path(&path)
    }
}

impl From<&String> for Path {
    fn from(path: &String) -> Self {
        crate::util::parse_path(path)
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl From<&[Key]> for Path {
    fn from(keys: &[Key]) -> Self {
        Self {
            segments: keys.iter().cloned().map(Segment::Key).collect(),
        }
    }
}

impl From<Vec<Key>> for Path {
    fn from(keys: Vec<Key>) -> Self {
        Self {
            segments: keys.into_iter().map(Segment::Key).collect(),
        }
    }
}

impl From<&Path> for Path {
    fn from(path: &Path) -> Self {
        path.clone()
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::util::format_path(self))
    }
}

/// Outcome of a lenient resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Keys resolved so far.
    pub concrete: ConcretePath,
    /// `false` when the walk stopped early on a missing key or unmatched
    /// predicate.
    pub complete: bool,
}

/// The slot a `set` replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Replaced {
    /// What occupied the slot before the write. `None` if it was empty.
    pub old_value: Option<Value>,
    /// Concrete path the write went to.
    pub path: ConcretePath,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_predicate_matches_subset_of_fields() {
        let p = Predicate::from_value(json!({"id": 2})).unwrap();
        assert!(p.matches(&json!({"id": 2, "name": "n"})));
        assert!(!p.matches(&json!({"id": 1})));
        assert!(!p.matches(&json!({"name": "n"})));
        assert!(!p.matches(&json!(2)));
    }

    #[test]
    fn test_empty_predicate_matches_anything() {
        let p = Predicate::default();
        assert!(p.matches(&json!(1)));
        assert!(p.matches(&json!({})));
    }

    #[test]
    fn test_predicate_equality_is_by_value() {
        let a = Predicate::from_value(json!({"id": 2, "k": "v"})).unwrap();
        let b = Predicate::from_value(json!({"k": "v", "id": 2})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_literal_form() {
        assert_eq!(Key::Index(3).to_literal(), "3");
        assert_eq!(Key::from("3").as_index(), Some(3));
        assert_eq!(Key::from("x").as_index(), None);
    }

    #[test]
    fn test_predicate_segment_needs_an_object() {
        assert!(Segment::predicate(json!(2)).is_none());
        assert!(Segment::predicate(json!(null)).is_none());
        assert!(Segment::predicate(json!([{"id": 2}])).is_none());
        assert!(matches!(
            Segment::predicate(json!({"id": 2})),
            Some(Segment::Predicate(_))
        ));
    }

    #[test]
    fn test_segment_from_wildcard_str() {
        assert_eq!(Segment::from("*"), Segment::Wildcard);
        assert_eq!(Segment::from("a"), Segment::name("a"));
    }

    #[test]
    fn test_key_serializes_untagged() {
        let keys = vec![Key::from("p"), Key::Index(1)];
        assert_eq!(serde_json::to_value(&keys).unwrap(), json!(["p", 1]));
    }
}
