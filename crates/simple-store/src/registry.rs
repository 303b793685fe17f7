//! Pattern-indexed listener registry.
//!
//! Each event type owns a trie. A node branches three ways:
//!
//! - literal children keyed by object key,
//! - one wildcard child (`*`, and every numeric index in a pattern),
//! - a list of rules, each a [`Predicate`] with its own subtree.
//!
//! Rules have no hashable identity, so they are kept in a list and found
//! again by comparing predicates field by field. Registering an equal
//! predicate twice lands on the same node.

use indexmap::IndexMap;
use simple_store_path::{format_pattern, pattern_key, Path, Predicate, Segment, WILDCARD};

use crate::listener::Listener;

#[derive(Debug, Default)]
pub(crate) struct TrieNode {
    pub(crate) children: IndexMap<String, TrieNode>,
    pub(crate) wildcard: Option<Box<TrieNode>>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) listeners: Option<Vec<Listener>>,
}

#[derive(Debug)]
pub(crate) struct Rule {
    pub(crate) predicate: Predicate,
    pub(crate) node: TrieNode,
}

impl TrieNode {
    fn child(&self, segment: &Segment) -> Option<&TrieNode> {
        match segment {
            Segment::Predicate(p) => self
                .rules
                .iter()
                .find(|rule| &rule.predicate == p)
                .map(|rule| &rule.node),
            other => match pattern_key(other)? {
                WILDCARD => self.wildcard.as_deref(),
                key => self.children.get(key),
            },
        }
    }

    fn child_mut(&mut self, segment: &Segment) -> Option<&mut TrieNode> {
        match segment {
            Segment::Predicate(p) => self
                .rules
                .iter_mut()
                .find(|rule| &rule.predicate == p)
                .map(|rule| &mut rule.node),
            other => match pattern_key(other)? {
                WILDCARD => self.wildcard.as_deref_mut(),
                key => self.children.get_mut(key),
            },
        }
    }

    fn child_or_insert(&mut self, segment: &Segment) -> &mut TrieNode {
        if let Segment::Predicate(p) = segment {
            let pos = match self.rules.iter().position(|rule| &rule.predicate == p) {
                Some(pos) => pos,
                None => {
                    self.rules.push(Rule {
                        predicate: p.clone(),
                        node: TrieNode::default(),
                    });
                    self.rules.len() - 1
                }
            };
            return &mut self.rules[pos].node;
        }
        match pattern_key(segment).unwrap_or(WILDCARD) {
            WILDCARD => self.wildcard.get_or_insert_with(Box::default).as_mut(),
            key => self.children.entry(key.to_string()).or_default(),
        }
    }

    fn find(&self, path: &Path) -> Option<&TrieNode> {
        let mut node = self;
        for segment in path.segments() {
            node = node.child(segment)?;
        }
        Some(node)
    }

    fn find_mut(&mut self, path: &Path) -> Option<&mut TrieNode> {
        let mut node = self;
        for segment in path.segments() {
            node = node.child_mut(segment)?;
        }
        Some(node)
    }

    fn count_nodes(&self) -> usize {
        1 + self.children.values().map(TrieNode::count_nodes).sum::<usize>()
            + self.wildcard.as_ref().map_or(0, |node| node.count_nodes())
            + self.rules.iter().map(|rule| rule.node.count_nodes()).sum::<usize>()
    }

    fn count_listeners(&self) -> usize {
        self.listeners.as_ref().map_or(0, Vec::len)
            + self.children.values().map(TrieNode::count_listeners).sum::<usize>()
            + self.wildcard.as_ref().map_or(0, |node| node.count_listeners())
            + self.rules.iter().map(|rule| rule.node.count_listeners()).sum::<usize>()
    }
}

/// Everything registered for one event type.
#[derive(Debug, Default)]
pub(crate) struct EventTrie {
    pub(crate) root: TrieNode,
    /// Listeners registered without a path; they hear every dispatch.
    pub(crate) any: Vec<Listener>,
}

impl EventTrie {
    fn remove(&mut self, path: &Path, listener: Option<&Listener>) {
        let Some(node) = self.root.find_mut(path) else {
            return;
        };
        match listener {
            None => node.listeners = None,
            Some(target) => {
                if let Some(list) = node.listeners.as_mut() {
                    list.retain(|l| !l.ptr_eq(target));
                }
            }
        }
    }
}

/// Which event types an `unregister` call applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope<'a> {
    /// Every event type known to the registry.
    All,
    /// Whitespace-separated event type names.
    Types(&'a str),
}

/// Listener tries for every event type.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    events: IndexMap<String, EventTrie>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for each whitespace-separated event type at the
    /// node reached by `path`, creating nodes as needed.
    pub fn register(&mut self, event_types: &str, path: &Path, listener: Listener) {
        for event_type in event_types.split_whitespace() {
            let trie = self.events.entry(event_type.to_string()).or_default();
            let mut node = &mut trie.root;
            for segment in path.segments() {
                node = node.child_or_insert(segment);
            }
            node.listeners
                .get_or_insert_with(Vec::new)
                .push(listener.clone());
            log::trace!("registered {event_type} listener at '{}'", format_pattern(path));
        }
    }

    /// Register `listener` for every dispatch of each event type, whatever
    /// the path.
    pub fn register_any(&mut self, event_types: &str, listener: Listener) {
        for event_type in event_types.split_whitespace() {
            let trie = self.events.entry(event_type.to_string()).or_default();
            trie.any.push(listener.clone());
            log::trace!("registered {event_type} listener for any path");
        }
    }

    /// Remove registrations. Never fails; unknown types, unreachable paths
    /// and unknown listeners are ignored.
    ///
    /// | scope   | path | listener | effect |
    /// |---------|------|----------|--------|
    /// | `All`   | no   | no       | clear the registry |
    /// | `All`   | yes  | any      | apply the path form to every event type |
    /// | `Types` | no   | no       | drop those event types |
    /// | any     | no   | yes      | remove the listener from the any-path lists |
    /// | `Types` | yes  | no       | clear the listener list at that node |
    /// | `Types` | yes  | yes      | remove every occurrence of the listener at that node |
    pub fn unregister(
        &mut self,
        scope: EventScope<'_>,
        path: Option<&Path>,
        listener: Option<&Listener>,
    ) {
        match (scope, path, listener) {
            (EventScope::All, None, None) => {
                self.events.clear();
                log::trace!("cleared all listeners");
            }
            (EventScope::All, None, Some(target)) => {
                for trie in self.events.values_mut() {
                    trie.any.retain(|l| !l.ptr_eq(target));
                }
            }
            (EventScope::All, Some(path), listener) => {
                for trie in self.events.values_mut() {
                    trie.remove(path, listener);
                }
            }
            (EventScope::Types(types), None, None) => {
                for event_type in types.split_whitespace() {
                    self.events.shift_remove(event_type);
                }
            }
            (EventScope::Types(types), None, Some(target)) => {
                for event_type in types.split_whitespace() {
                    if let Some(trie) = self.events.get_mut(event_type) {
                        trie.any.retain(|l| !l.ptr_eq(target));
                    }
                }
            }
            (EventScope::Types(types), Some(path), listener) => {
                for event_type in types.split_whitespace() {
                    if let Some(trie) = self.events.get_mut(event_type) {
                        trie.remove(path, listener);
                    }
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event types with a trie, in first-registration order.
    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    /// Listeners stored exactly at `path` for `event_type`.
    pub fn listeners_at(&self, event_type: &str, path: &Path) -> usize {
        self.events
            .get(event_type)
            .and_then(|trie| trie.root.find(path))
            .and_then(|node| node.listeners.as_ref())
            .map_or(0, Vec::len)
    }

    /// All listeners of `event_type`, any-path listeners included.
    pub fn listener_count(&self, event_type: &str) -> usize {
        self.events
            .get(event_type)
            .map_or(0, |trie| trie.root.count_listeners() + trie.any.len())
    }

    /// Trie nodes of `event_type`, root included.
    pub fn node_count(&self, event_type: &str) -> usize {
        self.events
            .get(event_type)
            .map_or(0, |trie| trie.root.count_nodes())
    }

    pub(crate) fn trie(&self, event_type: &str) -> Option<&EventTrie> {
        self.events.get(event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop() -> Listener {
        Listener::new(|_, _| {})
    }

    fn pred_path(fields: serde_json::Value) -> Path {
        Path::new(vec!["p".into(), Segment::predicate(fields).unwrap()])
    }

    #[test]
    fn test_register_multiple_event_types() {
        let mut reg = ListenerRegistry::new();
        reg.register("change  add-item", &Path::from("a.b"), noop());
        assert_eq!(reg.event_types().collect::<Vec<_>>(), vec!["change", "add-item"]);
        assert_eq!(reg.listeners_at("change", &Path::from("a.b")), 1);
        assert_eq!(reg.listeners_at("add-item", &Path::from("a.b")), 1);
        // root, a, b
        assert_eq!(reg.node_count("change"), 3);
    }

    #[test]
    fn test_indices_share_the_wildcard_node() {
        let mut reg = ListenerRegistry::new();
        reg.register("change", &Path::from("p.*.name"), noop());
        reg.register(
            "change",
            &Path::new(vec!["p".into(), Segment::index(4), "name".into()]),
            noop(),
        );
        assert_eq!(reg.node_count("change"), 4);
        assert_eq!(reg.listeners_at("change", &Path::from("p.*.name")), 2);
    }

    #[test]
    fn test_equal_predicates_reuse_rule() {
        let mut reg = ListenerRegistry::new();
        reg.register("change", &pred_path(json!({"id": 2})), noop());
        reg.register("change", &pred_path(json!({"id": 2})), noop());
        reg.register("change", &pred_path(json!({"id": 3})), noop());
        // root, p, {id:2}, {id:3}
        assert_eq!(reg.node_count("change"), 4);
        assert_eq!(reg.listeners_at("change", &pred_path(json!({"id": 2}))), 2);
    }

    #[test]
    fn test_unregister_clear_node() {
        let mut reg = ListenerRegistry::new();
        let keep = noop();
        reg.register("change", &pred_path(json!({"id": 2})), noop());
        reg.register("change", &pred_path(json!({"id": 2})), noop());
        reg.register("change", &Path::from("p"), keep);
        reg.unregister(EventScope::Types("change"), Some(&pred_path(json!({"id": 2}))), None);
        assert_eq!(reg.listeners_at("change", &pred_path(json!({"id": 2}))), 0);
        assert_eq!(reg.listener_count("change"), 1);
    }

    #[test]
    fn test_unregister_listener_removes_all_occurrences() {
        let mut reg = ListenerRegistry::new();
        let l = noop();
        let other = noop();
        let path = Path::from("a");
        reg.register("change", &path, l.clone());
        reg.register("change", &path, other);
        reg.register("change", &path, l.clone());
        reg.unregister(EventScope::Types("change"), Some(&path), Some(&l));
        assert_eq!(reg.listeners_at("change", &path), 1);
    }

    #[test]
    fn test_unregister_path_across_event_types() {
        let mut reg = ListenerRegistry::new();
        let path = Path::from("a");
        reg.register("change add", &path, noop());
        reg.register("remove", &Path::from("b"), noop());
        reg.unregister(EventScope::All, Some(&path), None);
        assert_eq!(reg.listener_count("change"), 0);
        assert_eq!(reg.listener_count("add"), 0);
        assert_eq!(reg.listener_count("remove"), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut reg = ListenerRegistry::new();
        reg.unregister(EventScope::Types("change"), Some(&Path::from("x.y")), None);
        reg.register("change", &Path::from("a"), noop());
        reg.unregister(EventScope::Types("change"), Some(&Path::from("x.y")), None);
        reg.unregister(EventScope::Types("nope"), None, None);
        reg.unregister(EventScope::Types("change"), Some(&Path::from("a")), Some(&noop()));
        assert_eq!(reg.listener_count("change"), 1);
    }

    #[test]
    fn test_unregister_event_types_and_all() {
        let mut reg = ListenerRegistry::new();
        let any = noop();
        reg.register("change add", &Path::from("a"), noop());
        reg.register_any("change", any.clone());
        reg.unregister(EventScope::Types("change"), None, Some(&any));
        assert_eq!(reg.listener_count("change"), 1);
        reg.unregister(EventScope::Types("change"), None, None);
        assert_eq!(reg.event_types().collect::<Vec<_>>(), vec!["add"]);
        reg.unregister(EventScope::All, None, None);
        assert!(reg.is_empty());
    }
}
