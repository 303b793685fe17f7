//! Matching a concrete path against the listener registry.
//!
//! The walk is depth first. At each depth it tries, independently:
//!
//! 1. the literal child named by the path key,
//! 2. the wildcard child,
//! 3. the first rule whose predicate matches the live value at that depth.
//!
//! One path can therefore reach several listener lists. Rules are tried in
//! registration order and only the first match is followed, so overlapping
//! predicates resolve to whichever was registered first.

use serde_json::Value;
use simple_store_path::{get_concrete, Key};

use crate::listener::Listener;
use crate::registry::{ListenerRegistry, TrieNode};

/// Listeners that should hear `event_type` at `path`, in invocation order.
///
/// `state` is the snapshot predicates are tested against. Listeners are
/// cloned out so the caller can invoke them while mutating the registry.
pub fn collect(
    registry: &ListenerRegistry,
    event_type: &str,
    path: &[Key],
    state: &Value,
) -> Vec<Listener> {
    let Some(trie) = registry.trie(event_type) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    walk(&trie.root, path, 0, state, &mut out);
    out.extend(trie.any.iter().cloned());
    out
}

fn walk(node: &TrieNode, path: &[Key], depth: usize, state: &Value, out: &mut Vec<Listener>) {
    if depth == path.len() {
        if let Some(listeners) = &node.listeners {
            out.extend(listeners.iter().cloned());
        }
        return;
    }

    if let Some(child) = node.children.get(&path[depth].to_literal()) {
        walk(child, path, depth + 1, state, out);
    }

    if let Some(child) = &node.wildcard {
        walk(child, path, depth + 1, state, out);
    }

    if node.rules.is_empty() {
        return;
    }
    // The element the predicate is tested against; skip if it is gone.
    let Some(value) = get_concrete(state, &path[..=depth]) else {
        return;
    };
    if let Some(rule) = node.rules.iter().find(|rule| rule.predicate.matches(value)) {
        walk(&rule.node, path, depth + 1, state, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use simple_store_path::{Path, Segment};

    fn noop() -> Listener {
        Listener::new(|_, _| {})
    }

    fn names(items: &[&str]) -> Vec<Key> {
        items.iter().map(|&name| Key::from(name)).collect()
    }

    #[test]
    fn test_literal_match() {
        let mut reg = ListenerRegistry::new();
        let l = noop();
        reg.register("change", &Path::from("a.b"), l.clone());
        let found = collect(&reg, "change", &names(&["a", "b"]), &json!({}));
        assert_eq!(found.len(), 1);
        assert!(found[0].ptr_eq(&l));
        assert!(collect(&reg, "change", &names(&["a"]), &json!({})).is_empty());
        assert!(collect(&reg, "add", &names(&["a", "b"]), &json!({})).is_empty());
    }

    #[test]
    fn test_literal_and_wildcard_both_fire() {
        let mut reg = ListenerRegistry::new();
        reg.register("change", &Path::from("a.b"), noop());
        reg.register("change", &Path::from("a.*"), noop());
        reg.register("change", &Path::from("*.*"), noop());
        let found = collect(&reg, "change", &names(&["a", "b"]), &json!({}));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_index_keys_hit_numeric_literals() {
        let mut reg = ListenerRegistry::new();
        reg.register("change", &Path::from("list.1"), noop());
        let path = vec![Key::from("list"), Key::Index(1)];
        assert_eq!(collect(&reg, "change", &path, &json!({})).len(), 1);
    }

    #[test]
    fn test_rule_branch_uses_live_value() {
        let mut reg = ListenerRegistry::new();
        let pattern = Path::new(vec!["p".into(), Segment::predicate(json!({"id": 2})).unwrap(), "name".into()]);
        reg.register("change", &pattern, noop());
        let state = json!({"p": [{"id": 1}, {"id": 2, "name": "n"}]});

        let hit = vec![Key::from("p"), Key::Index(1), Key::from("name")];
        assert_eq!(collect(&reg, "change", &hit, &state).len(), 1);

        let miss = vec![Key::from("p"), Key::Index(0), Key::from("name")];
        assert!(collect(&reg, "change", &miss, &state).is_empty());

        // Element absent from the snapshot: the rule branch is skipped
        let gone = vec![Key::from("p"), Key::Index(7), Key::from("name")];
        assert!(collect(&reg, "change", &gone, &state).is_empty());
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mut reg = ListenerRegistry::new();
        let first = noop();
        let second = noop();
        reg.register("change", &Path::new(vec!["p".into(), Segment::predicate(json!({"a": 1})).unwrap()]), first.clone());
        reg.register("change", &Path::new(vec!["p".into(), Segment::predicate(json!({"b": 2})).unwrap()]), second);
        let state = json!({"p": [{"a": 1, "b": 2}]});
        let found = collect(&reg, "change", &[Key::from("p"), Key::Index(0)], &state);
        assert_eq!(found.len(), 1);
        assert!(found[0].ptr_eq(&first));
    }

    #[test]
    fn test_any_listeners_come_last() {
        let mut reg = ListenerRegistry::new();
        let any = noop();
        let exact = noop();
        reg.register_any("change", any.clone());
        reg.register("change", &Path::from("x"), exact.clone());
        let found = collect(&reg, "change", &names(&["x"]), &json!({}));
        assert_eq!(found.len(), 2);
        assert!(found[0].ptr_eq(&exact));
        assert!(found[1].ptr_eq(&any));
    }

    #[test]
    fn test_root_pattern_matches_root_path_only() {
        let mut reg = ListenerRegistry::new();
        reg.register("change", &Path::root(), noop());
        assert_eq!(collect(&reg, "change", &[], &json!({})).len(), 1);
        assert!(collect(&reg, "change", &names(&["a"]), &json!({})).is_empty());
    }
}
