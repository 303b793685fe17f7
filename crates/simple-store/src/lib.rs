//! simple-store: an observable JSON state tree.
//!
//! State is a [`serde_json::Value`]. Reads and writes are addressed by
//! [`Path`]s made of object keys, array indices and [`Predicate`]s that pick
//! array elements by their fields. Every write is diffed against the value it
//! replaced, and each resulting [`ChangeEvent`] is dispatched to the
//! listeners registered on a matching path pattern.
//!
//! Listener patterns may use `*` (or any numeric index) to match every key
//! at a depth, and predicates to match only elements with the given fields.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use serde_json::json;
//! use simple_store::{Listener, Path, Segment, SimpleStore};
//!
//! let mut store = SimpleStore::new(json!({"people": [{"id": 1, "name": "Ann"}]}));
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! let seen = log.clone();
//! let ann = Path::new(vec!["people".into(), Segment::predicate(json!({"id": 1})).unwrap(), "name".into()]);
//! store.on("change", ann.clone(), Listener::new(move |_, payload| {
//!     let event = payload.as_change().unwrap();
//!     seen.borrow_mut().push(event.new_value.clone().unwrap());
//! }));
//!
//! store.set(ann, json!("Anna")).unwrap();
//! store.add_item("people", json!({"id": 2, "name": "Bob"}), None).unwrap();
//!
//! assert_eq!(*log.borrow(), vec![json!("Anna")]);
//! assert_eq!(store.get("people.1.name"), Some(&json!("Bob")));
//! ```

pub mod diff;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod listener;
pub mod options;
pub mod registry;
pub mod store;

pub use diff::{diff, ChangeEmitter, DiffOptions, SimpleDiff};
pub use error::StoreError;
pub use event::{ChangeEvent, ChangeKind, Payload};
pub use listener::Listener;
pub use options::StoreOptions;
pub use registry::{EventScope, ListenerRegistry};
pub use store::{ItemRef, SimpleStore};

pub use simple_store_path::{ConcretePath, Key, Path, PathError, Predicate, Segment};
