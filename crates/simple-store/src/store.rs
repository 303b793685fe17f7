//! The observable store.

use serde_json::Value;
use simple_store_path::{
    bind_segment, find_index, format_concrete, format_path, get, get_concrete, resolve, ConcretePath,
    Key, Path, PathError, Predicate, Replaced, Segment,
};

use crate::diff::{ChangeEmitter, DiffOptions, SimpleDiff};
use crate::dispatch;
use crate::error::StoreError;
use crate::event::{ChangeEvent, Payload};
use crate::listener::Listener;
use crate::options::StoreOptions;
use crate::registry::{EventScope, ListenerRegistry};

/// Addresses one element of an array: by position or by content.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemRef {
    Index(usize),
    Match(Predicate),
}

impl ItemRef {
    /// Match the first element carrying every field of `fields`. `None`
    /// unless `fields` is an object.
    pub fn matching(fields: Value) -> Option<Self> {
        Predicate::from_value(fields).map(ItemRef::Match)
    }
}

impl From<usize> for ItemRef {
    fn from(index: usize) -> Self {
        ItemRef::Index(index)
    }
}

impl From<Predicate> for ItemRef {
    fn from(predicate: Predicate) -> Self {
        ItemRef::Match(predicate)
    }
}

/// A JSON state tree with path-addressed reads and writes, and listeners
/// that hear about every change.
///
/// Every write goes through [`SimpleStore::set`]: the path is resolved, the
/// slot is replaced, the change emitter compares the old and new values, and
/// each change event is dispatched to matching listeners before `set`
/// returns. Structural helpers (`remove`, `add_item`, ...) build a modified
/// copy of the container and `set` it, so they notify the same way.
///
/// Writes are not rolled back: if the emitter fails, the state keeps the new
/// value, the events found so far are still dispatched, and the error is
/// returned.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use serde_json::json;
/// use simple_store::{Listener, SimpleStore};
///
/// let mut store = SimpleStore::new(json!({"a": {"b": "x"}}));
/// let calls = Rc::new(Cell::new(0));
/// let seen = calls.clone();
/// store.on("change", "a.b", Listener::new(move |_, payload| {
///     let event = payload.as_change().unwrap();
///     assert_eq!(event.old_value, Some(json!("x")));
///     seen.set(seen.get() + 1);
/// }));
///
/// store.set("a.b", json!("y")).unwrap();
/// assert_eq!(calls.get(), 1);
/// assert_eq!(store.get("a.b"), Some(&json!("y")));
/// ```
pub struct SimpleStore {
    state: Value,
    options: StoreOptions,
    registry: ListenerRegistry,
    emitter: Box<dyn ChangeEmitter>,
}

impl Default for SimpleStore {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl std::fmt::Debug for SimpleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleStore")
            .field("state", &self.state)
            .field("options", &self.options)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl SimpleStore {
    pub fn new(state: Value) -> Self {
        Self::with_options(state, StoreOptions::default())
    }

    pub fn with_options(state: Value, options: StoreOptions) -> Self {
        Self {
            state,
            options,
            registry: ListenerRegistry::new(),
            emitter: Box::new(SimpleDiff),
        }
    }

    /// Replace the change emitter.
    pub fn with_emitter(mut self, emitter: impl ChangeEmitter + 'static) -> Self {
        self.emitter = Box::new(emitter);
        self
    }

    pub fn state(&self) -> &Value {
        &self.state
    }

    pub fn into_state(self) -> Value {
        self.state
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Value at `path`, or `None` if anything along the way is missing.
    pub fn get(&self, path: impl Into<Path>) -> Option<&Value> {
        get(&self.state, &path.into())
    }

    /// First element of the array at `path` matching `predicate`.
    pub fn get_item(&self, path: impl Into<Path>, predicate: &Predicate) -> Option<&Value> {
        match self.get(path)? {
            Value::Array(items) => items.get(find_index(items, predicate)?),
            _ => None,
        }
    }

    /// Index of the first element of the array at `path` matching
    /// `predicate`.
    pub fn get_index(&self, path: impl Into<Path>, predicate: &Predicate) -> Option<usize> {
        match self.get(path)? {
            Value::Array(items) => find_index(items, predicate),
            _ => None,
        }
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Write `value` at `path` and notify listeners.
    pub fn set(&mut self, path: impl Into<Path>, value: Value) -> Result<&mut Self, StoreError> {
        let path = path.into();
        log::debug!("set '{}'", format_path(&path));
        let replaced = simple_store_path::set(&mut self.state, &path, value)?;
        self.notify(replaced)?;
        Ok(self)
    }

    /// Replace the whole state and notify listeners.
    pub fn set_root(&mut self, value: Value) -> Result<&mut Self, StoreError> {
        self.set(Path::root(), value)
    }

    /// Delete the key or element at `path` by writing a copy of its parent
    /// without it.
    pub fn remove(&mut self, path: impl Into<Path>) -> Result<&mut Self, StoreError> {
        let path = path.into();
        let (last, parent_segments) = path.split_last().ok_or(PathError::NoParent)?;
        let parent_path = Path::new(parent_segments.to_vec());
        let parent = get(&self.state, &parent_path).ok_or_else(|| PathError::NotFound {
            path: format_path(&path),
        })?;

        let key = bind_segment(parent, last);
        if key.is_none() && matches!(last, Segment::Predicate(_)) {
            return Err(StoreError::ItemNotFound {
                path: format_path(&parent_path),
            });
        }

        let mut copy = parent.clone();
        match (&mut copy, key) {
            (Value::Object(map), Some(key)) => {
                map.remove(&key.to_literal());
            }
            (Value::Array(items), Some(Key::Index(index))) if index < items.len() => {
                items.remove(index);
            }
            _ => {}
        }
        self.set(parent_path, copy)
    }

    /// Insert `item` into the array at `path`, at `index` or at the end.
    /// An index past the end appends.
    pub fn add_item(
        &mut self,
        path: impl Into<Path>,
        item: Value,
        index: Option<usize>,
    ) -> Result<&mut Self, StoreError> {
        let path = path.into();
        let mut items = self.array_copy(&path)?;
        match index {
            Some(index) => items.insert(index.min(items.len()), item),
            None => items.push(item),
        }
        self.set(path, Value::Array(items))
    }

    /// Remove one element of the array at `path`. An index past the end
    /// leaves the array as it is.
    ///
    /// # Errors
    ///
    /// `StoreError::ItemNotFound` when a predicate matches nothing.
    pub fn remove_item(
        &mut self,
        path: impl Into<Path>,
        item: impl Into<ItemRef>,
    ) -> Result<&mut Self, StoreError> {
        let path = path.into();
        let mut items = self.array_copy(&path)?;
        let index = self.item_index(&path, &items, item.into())?;
        if index < items.len() {
            items.remove(index);
        }
        self.set(path, Value::Array(items))
    }

    /// Move one element of the array at `path` to position `to`.
    ///
    /// Out-of-range positions are clamped to the last element. Moving an
    /// element onto itself does nothing and notifies nobody.
    ///
    /// # Errors
    ///
    /// `StoreError::ItemNotFound` when `from` is a predicate matching nothing.
    pub fn move_item(
        &mut self,
        path: impl Into<Path>,
        from: impl Into<ItemRef>,
        to: usize,
    ) -> Result<&mut Self, StoreError> {
        let path = path.into();
        let mut items = self.array_copy(&path)?;
        let from = self.item_index(&path, &items, from.into())?;
        let Some(last) = items.len().checked_sub(1) else {
            return Ok(self);
        };
        let (from, to) = (from.min(last), to.min(last));
        if from == to {
            return Ok(self);
        }
        let item = items.remove(from);
        items.insert(to, item);
        self.set(path, Value::Array(items))
    }

    fn array_copy(&self, path: &Path) -> Result<Vec<Value>, StoreError> {
        match get(&self.state, path) {
            Some(Value::Array(items)) => Ok(items.clone()),
            _ => Err(StoreError::NotArray {
                path: format_path(path),
            }),
        }
    }

    fn item_index(&self, path: &Path, items: &[Value], item: ItemRef) -> Result<usize, StoreError> {
        match item {
            ItemRef::Index(index) => Ok(index),
            ItemRef::Match(predicate) => {
                find_index(items, &predicate).ok_or_else(|| StoreError::ItemNotFound {
                    path: format_path(path),
                })
            }
        }
    }

    fn notify(&mut self, replaced: Replaced) -> Result<(), StoreError> {
        let Replaced { old_value, path } = replaced;
        let options = DiffOptions {
            old_path: path.clone(),
            new_path: path,
            id_prop: self.options.id_prop.clone(),
        };
        let mut events = Vec::new();
        let new_value = get_concrete(&self.state, &options.new_path);
        let mut sink = |event: ChangeEvent| events.push(event);
        let result = self
            .emitter
            .emit(old_value.as_ref(), new_value, &options, &mut sink);
        for event in &events {
            self.trigger_event(event);
        }
        if let Err(err) = &result {
            log::warn!(
                "change emitter failed at '{}': {err}",
                format_concrete(&options.new_path)
            );
        }
        result
    }

    // ── Listeners ─────────────────────────────────────────────────────────

    /// Listen for each whitespace-separated event type at `path`.
    ///
    /// The path is a pattern: `*` and numeric indices match any key at their
    /// depth, predicates match array elements by content.
    pub fn on(&mut self, event_types: &str, path: impl Into<Path>, listener: Listener) -> &mut Self {
        self.registry.register(event_types, &path.into(), listener);
        self
    }

    /// Listen for each event type wherever it happens.
    pub fn on_any(&mut self, event_types: &str, listener: Listener) -> &mut Self {
        self.registry.register_any(event_types, listener);
        self
    }

    /// Stop listening at `path`: only `listener` if given, otherwise every
    /// listener registered exactly there.
    pub fn off(
        &mut self,
        event_types: &str,
        path: impl Into<Path>,
        listener: Option<&Listener>,
    ) -> &mut Self {
        self.registry
            .unregister(EventScope::Types(event_types), Some(&path.into()), listener);
        self
    }

    /// Like [`SimpleStore::off`] for every event type.
    pub fn off_path(&mut self, path: impl Into<Path>, listener: Option<&Listener>) -> &mut Self {
        self.registry
            .unregister(EventScope::All, Some(&path.into()), listener);
        self
    }

    /// Drop every listener of each event type.
    pub fn off_events(&mut self, event_types: &str) -> &mut Self {
        self.registry
            .unregister(EventScope::Types(event_types), None, None);
        self
    }

    /// Remove a listener registered with [`SimpleStore::on_any`].
    pub fn off_any(&mut self, event_types: &str, listener: &Listener) -> &mut Self {
        self.registry
            .unregister(EventScope::Types(event_types), None, Some(listener));
        self
    }

    /// Drop every listener.
    pub fn off_all(&mut self) -> &mut Self {
        self.registry.unregister(EventScope::All, None, None);
        self
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Dispatch a custom event. Listeners receive `Payload::Args(args)`.
    ///
    /// Predicate segments in `path` are resolved against the current state.
    /// A path that does not fully resolve reaches no listener.
    pub fn trigger(&mut self, event_type: &str, path: impl Into<Path>, args: Vec<Value>) -> &mut Self {
        let path = path.into();
        match self.dispatch_path(&path) {
            Some(concrete) => self.dispatch(event_type, &concrete, &Payload::Args(args)),
            None => log::debug!("trigger {event_type}: '{}' does not resolve", format_path(&path)),
        }
        self
    }

    /// Dispatch a change event on its type and new path.
    pub fn trigger_event(&mut self, event: &ChangeEvent) -> &mut Self {
        self.dispatch(event.event_type(), event.path(), &Payload::Change(event.clone()));
        self
    }

    fn dispatch_path(&self, path: &Path) -> Option<ConcretePath> {
        let keys: Option<ConcretePath> = path
            .segments()
            .iter()
            .map(|segment| segment.as_key().cloned())
            .collect();
        if keys.is_some() {
            return keys;
        }
        let resolution = resolve(&self.state, path);
        resolution.complete.then_some(resolution.concrete)
    }

    fn dispatch(&mut self, event_type: &str, path: &[Key], payload: &Payload) {
        let listeners = dispatch::collect(&self.registry, event_type, path, &self.state);
        if listeners.is_empty() {
            return;
        }
        log::debug!(
            "dispatch {event_type} at '{}' to {} listener(s)",
            format_concrete(path),
            listeners.len()
        );
        for listener in &listeners {
            listener.call(self, payload);
        }
    }
}
