#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;
use simple_store::{ChangeEvent, Key, Listener, Path, Segment};

/// Counts calls.
pub fn counter() -> (Rc<Cell<usize>>, Listener) {
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    let listener = Listener::new(move |_, _| seen.set(seen.get() + 1));
    (count, listener)
}

/// Records every change event it hears.
pub fn recorder() -> (Rc<RefCell<Vec<ChangeEvent>>>, Listener) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let seen = log.clone();
    let listener = Listener::new(move |_, payload| {
        if let Some(event) = payload.as_change() {
            seen.borrow_mut().push(event.clone());
        }
    });
    (log, listener)
}

pub fn keys(items: &[&str]) -> Vec<Key> {
    items.iter().map(|&item| Key::from(item)).collect()
}

/// `prefix` followed by a predicate segment and then `suffix`.
pub fn pred_path(prefix: &str, fields: Value, suffix: &[&str]) -> Path {
    let mut segments: Vec<Segment> = prefix.split('.').map(Segment::from).collect();
    segments.push(Segment::predicate(fields).unwrap());
    segments.extend(suffix.iter().map(|&s| Segment::from(s)));
    Path::new(segments)
}
