//! Change detection: turn an old/new pair of values into change events.
//!
//! The store calls a [`ChangeEmitter`] after every write with the value that
//! used to be in the slot and the value now in it. [`SimpleDiff`] is the
//! default emitter.

use serde_json::{Map, Value};
use simple_store_path::{ConcretePath, Key};

use crate::error::StoreError;
use crate::event::{ChangeEvent, ChangeKind};

/// Where the compared values live, plus emitter settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffOptions {
    /// Path of the old value in the old state.
    pub old_path: ConcretePath,
    /// Path of the new value in the new state.
    pub new_path: ConcretePath,
    /// Field that identifies array elements, see [`crate::StoreOptions`].
    pub id_prop: String,
}

impl DiffOptions {
    pub fn at(path: ConcretePath) -> Self {
        Self {
            old_path: path.clone(),
            new_path: path,
            id_prop: "id".to_string(),
        }
    }
}

/// Compares two subtrees and reports what changed through `sink`.
///
/// `None` stands for an absent value (a key that did not exist before the
/// write, for example).
pub trait ChangeEmitter {
    fn emit(
        &self,
        old: Option<&Value>,
        new: Option<&Value>,
        options: &DiffOptions,
        sink: &mut dyn FnMut(ChangeEvent),
    ) -> Result<(), StoreError>;
}

/// Structural diff over JSON values.
///
/// - Scalars, or values of different shape: one `change` when unequal.
/// - Objects: `remove` for dropped keys, `add` for new keys, recursion into
///   shared keys.
/// - Arrays: elements are paired by the id field (or by equality when they
///   have none). Unpaired old elements produce `remove-item`, unpaired new
///   ones `add-item`, and paired ones that ended up elsewhere `move-item`.
///   Paired elements are then diffed with their old and new indices.
///
/// Item events form an edit script: applied in order to the old array they
/// give the new array's order. `remove-item` and `move-item` indices refer
/// to the array as edited so far; `add-item` and the target of `move-item`
/// are final positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleDiff;

impl ChangeEmitter for SimpleDiff {
    fn emit(
        &self,
        old: Option<&Value>,
        new: Option<&Value>,
        options: &DiffOptions,
        sink: &mut dyn FnMut(ChangeEvent),
    ) -> Result<(), StoreError> {
        let mut differ = Differ {
            id_prop: &options.id_prop,
            sink,
        };
        differ.diff_at_path(&options.old_path, &options.new_path, old, new);
        Ok(())
    }
}

/// Collect the events [`SimpleDiff`] finds between `old` and `new`.
pub fn diff(old: Option<&Value>, new: Option<&Value>, options: &DiffOptions) -> Vec<ChangeEvent> {
    let mut events = Vec::new();
    // SimpleDiff has no failure path.
    let _ = SimpleDiff.emit(old, new, options, &mut |event: ChangeEvent| events.push(event));
    events
}

struct Differ<'a, 's> {
    id_prop: &'a str,
    sink: &'s mut dyn FnMut(ChangeEvent),
}

impl Differ<'_, '_> {
    fn diff_at_path(
        &mut self,
        old_path: &[Key],
        new_path: &[Key],
        old: Option<&Value>,
        new: Option<&Value>,
    ) {
        if old == new {
            return;
        }
        match (old, new) {
            (Some(Value::Object(o)), Some(Value::Object(n))) => {
                self.diff_obj(old_path, new_path, o, n)
            }
            (Some(Value::Array(o)), Some(Value::Array(n))) => self.diff_arr(old_path, new_path, o, n),
            _ => (self.sink)(
                ChangeEvent::new(ChangeKind::Change, old_path, new_path)
                    .with_values(old.cloned(), new.cloned()),
            ),
        }
    }

    fn diff_obj(
        &mut self,
        old_path: &[Key],
        new_path: &[Key],
        old: &Map<String, Value>,
        new: &Map<String, Value>,
    ) {
        for (key, value) in old {
            if !new.contains_key(key) {
                let (op, np) = (child(old_path, key.as_str()), child(new_path, key.as_str()));
                (self.sink)(
                    ChangeEvent::new(ChangeKind::Remove, &op, &np)
                        .with_values(Some(value.clone()), None),
                );
            }
        }
        for (key, value) in new {
            let (op, np) = (child(old_path, key.as_str()), child(new_path, key.as_str()));
            match old.get(key) {
                None => (self.sink)(
                    ChangeEvent::new(ChangeKind::Add, &op, &np).with_values(None, Some(value.clone())),
                ),
                Some(prev) => self.diff_at_path(&op, &np, Some(prev), Some(value)),
            }
        }
    }

    fn diff_arr(&mut self, old_path: &[Key], new_path: &[Key], old: &[Value], new: &[Value]) {
        // new index -> old index
        let mut pairs: Vec<Option<usize>> = vec![None; new.len()];
        let mut paired_old = vec![false; old.len()];
        for (i, item) in old.iter().enumerate() {
            let found = (0..new.len()).find(|&j| pairs[j].is_none() && self.same_item(item, &new[j]));
            if let Some(j) = found {
                pairs[j] = Some(i);
                paired_old[i] = true;
            }
        }

        // Working copy of the old array: Some(old index) or None for an
        // element added by the script.
        let mut working: Vec<Option<usize>> = Vec::with_capacity(new.len());
        for (i, item) in old.iter().enumerate() {
            if paired_old[i] {
                working.push(Some(i));
            } else {
                (self.sink)(
                    ChangeEvent::new(ChangeKind::RemoveItem, old_path, new_path)
                        .with_values(Some(item.clone()), None)
                        .with_indices(Some(working.len()), None),
                );
            }
        }

        for (j, item) in new.iter().enumerate() {
            match pairs[j] {
                None => {
                    working.insert(j, None);
                    (self.sink)(
                        ChangeEvent::new(ChangeKind::AddItem, old_path, new_path)
                            .with_values(None, Some(item.clone()))
                            .with_indices(None, Some(j)),
                    );
                }
                Some(i) => {
                    let Some(pos) = working.iter().position(|slot| *slot == Some(i)) else {
                        continue;
                    };
                    if pos != j {
                        let slot = working.remove(pos);
                        working.insert(j, slot);
                        (self.sink)(
                            ChangeEvent::new(ChangeKind::MoveItem, old_path, new_path)
                                .with_values(Some(old[i].clone()), Some(item.clone()))
                                .with_indices(Some(pos), Some(j)),
                        );
                    }
                }
            }
        }

        for (j, pair) in pairs.iter().enumerate() {
            if let Some(i) = *pair {
                let op = child(old_path, i);
                let np = child(new_path, j);
                self.diff_at_path(&op, &np, Some(&old[i]), Some(&new[j]));
            }
        }
    }

    /// Elements are the same item when both carry equal id fields, or, when
    /// the old element has no id, when they are equal.
    fn same_item(&self, old: &Value, new: &Value) -> bool {
        match (old.get(self.id_prop), new.get(self.id_prop)) {
            (Some(a), Some(b)) => a == b,
            (None, _) => old == new,
            (Some(_), None) => false,
        }
    }
}

fn child(path: &[Key], key: impl Into<Key>) -> ConcretePath {
    let mut out = path.to_vec();
    out.push(key.into());
    out
}
