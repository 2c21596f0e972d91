//! Keyed List Reconciler
//!
//! A [`KeyedList`] renders one host node per item of an array and keeps the
//! nodes in sync as the array changes. It runs as an [`Effect`]: reading the
//! source (and a reactive array's version cell) subscribes it, so any
//! structural change re-runs the reconciliation at the next flush.
//!
//! # Algorithm
//!
//! 1. Evaluate the source. Anything that is not an array is reported and the
//!    previous rendering is kept.
//! 2. Compute a key per item (key function, or the positional index). Keys
//!    map to positions with the last occurrence winning, so duplicates never
//!    crash the diff.
//! 3. Old instances whose key is gone are removed (node detached, cleanup
//!    run). Surviving instances are reused and their item/index cells
//!    refreshed. Remaining items instantiate the template.
//! 4. New nodes are inserted after their predecessor in the final order (or
//!    right after the anchor). One lock-step pass over the final order and
//!    the host's sibling chain then moves every node that is out of place.
//!
//! Changing an item's key is a remove plus an add.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use super::host::HostTree;
use super::Rendered;
use crate::data::{wrap, Value};
use crate::error::{Error, Result};
use crate::reactive::{untrack, Effect, ErrorContext, Observable, Runtime};

/// Identity of a list item across renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListKey {
    Int(i64),
    /// Non-integral number, by bit pattern.
    Number(u64),
    Str(Rc<str>),
    Bool(bool),
    Null,
    Undefined,
    /// Object or array, by allocation.
    Identity(usize),
}

impl ListKey {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Undefined => ListKey::Undefined,
            Value::Null => ListKey::Null,
            Value::Bool(b) => ListKey::Bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => ListKey::Int(*n as i64),
            Value::Number(n) => ListKey::Number(n.to_bits()),
            Value::String(s) => ListKey::Str(s.clone()),
            other => ListKey::Identity(other.identity().unwrap_or_default()),
        }
    }

    fn index(index: usize) -> Self {
        ListKey::Int(index as i64)
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListKey::Int(n) => write!(f, "{n}"),
            ListKey::Number(bits) => write!(f, "{}", f64::from_bits(*bits)),
            ListKey::Str(s) => write!(f, "{s:?}"),
            ListKey::Bool(b) => write!(f, "{b}"),
            ListKey::Null => f.write_str("null"),
            ListKey::Undefined => f.write_str("undefined"),
            ListKey::Identity(addr) => write!(f, "#{addr:x}"),
        }
    }
}

/// Computes the key of `item` at `index`.
pub type KeyFn = Rc<dyn Fn(&Value, usize) -> Result<Value>>;

/// Per-instance reactive context handed to the template.
///
/// The item and index cells are refreshed when the instance is reused at a
/// new position or for a new item with the same key.
#[derive(Clone, Debug)]
pub struct ItemContext {
    pub key: ListKey,
    pub item: Observable<Value>,
    pub index: Observable<usize>,
}

/// Result of diffing two key sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff {
    /// Keys only in the old sequence, in old order.
    pub removed: Vec<ListKey>,
    /// Keys only in the new sequence, in new order.
    pub added: Vec<ListKey>,
    /// Keys present in both, in new order.
    pub reused: Vec<ListKey>,
}

/// Partition keys into removed, added and reused. Each distinct key is
/// reported once.
pub fn diff_keys(old: &[ListKey], new: &[ListKey]) -> KeyDiff {
    let old_set: HashSet<&ListKey> = old.iter().collect();
    let new_set: HashSet<&ListKey> = new.iter().collect();
    let mut diff = KeyDiff::default();

    let mut seen = HashSet::new();
    for key in old {
        if !new_set.contains(key) && seen.insert(key) {
            diff.removed.push(key.clone());
        }
    }

    let mut seen = HashSet::new();
    for key in new {
        if !seen.insert(key) {
            continue;
        }
        if old_set.contains(key) {
            diff.reused.push(key.clone());
        } else {
            diff.added.push(key.clone());
        }
    }
    diff
}

/// Counts from the most recent reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub added: usize,
    pub removed: usize,
    pub reused: usize,
    pub moved: usize,
}

struct Instance<N> {
    key: ListKey,
    node: N,
    context: ItemContext,
    cleanup: Option<Box<dyn FnOnce()>>,
}

type Template<N> = Box<dyn Fn(&ItemContext) -> Rendered<N>>;

struct ListState<H: HostTree> {
    runtime: Runtime,
    host: Rc<H>,
    anchor: H::Node,
    source: Box<dyn Fn() -> Value>,
    key_fn: Option<KeyFn>,
    template: Template<H::Node>,
    instances: RefCell<Vec<Instance<H::Node>>>,
    stats: Cell<ReconcileStats>,
    context: ErrorContext,
}

impl<H: HostTree> ListState<H> {
    fn update(&self) {
        let Some(items) = self.read_source() else {
            return;
        };
        let keys = self.compute_keys(&items);
        untrack(|| self.reconcile(items, keys));
    }

    fn read_source(&self) -> Option<Vec<Value>> {
        match (self.source)() {
            Value::LiveArray(arr) => Some(arr.to_vec()),
            Value::Array(arr) => Some(
                arr.to_vec()
                    .into_iter()
                    .map(|v| wrap(&self.runtime, v))
                    .collect(),
            ),
            other => {
                let error = Error::NotAList {
                    found: other.type_name(),
                };
                tracing::warn!(%error, "keeping previous list rendering");
                None
            }
        }
    }

    fn compute_keys(&self, items: &[Value]) -> Vec<ListKey> {
        let keys: Vec<ListKey> = items
            .iter()
            .enumerate()
            .map(|(index, item)| match &self.key_fn {
                None => ListKey::index(index),
                Some(key_fn) => match self.key_for(key_fn, item, index) {
                    Ok(key) => ListKey::from_value(&key),
                    Err(err) => {
                        let error = Error::KeyFallback {
                            index,
                            reason: err.to_string(),
                        };
                        tracing::warn!(%error, "using positional key");
                        ListKey::index(index)
                    }
                },
            })
            .collect();

        if self.runtime.config().warn_on_duplicate_keys {
            let mut seen = HashSet::new();
            for key in &keys {
                if !seen.insert(key) {
                    tracing::warn!(key = %key, "duplicate list key; last occurrence wins");
                }
            }
        }
        keys
    }

    /// Run the key function for one item. A panic is reported through the
    /// boundary and becomes an error, so only this item loses its key.
    fn key_for(&self, key_fn: &KeyFn, item: &Value, index: usize) -> Result<Value> {
        let context = self.context.clone().with_expression("<key>");
        self.runtime
            .boundary()
            .guard(&context, || key_fn(item, index))
            .unwrap_or_else(|| {
                Err(Error::Panicked {
                    message: "key function panicked".to_string(),
                })
            })
    }

    fn reconcile(&self, items: Vec<Value>, keys: Vec<ListKey>) {
        let Some(parent) = self.host.parent(&self.anchor) else {
            tracing::warn!("list anchor is detached; skipping reconcile");
            return;
        };

        let old = std::mem::take(&mut *self.instances.borrow_mut());
        let old_keys: Vec<ListKey> = old.iter().map(|inst| inst.key.clone()).collect();
        let diff = diff_keys(&old_keys, &keys);
        let survivors: HashSet<&ListKey> = diff.reused.iter().collect();

        let old_winner: HashMap<&ListKey, usize> =
            old_keys.iter().enumerate().map(|(i, key)| (key, i)).collect();
        let new_winner: HashMap<&ListKey, usize> =
            keys.iter().enumerate().map(|(i, key)| (key, i)).collect();

        let mut stats = ReconcileStats::default();

        // Removals.
        let mut reusable: HashMap<ListKey, Instance<H::Node>> = HashMap::new();
        for (i, instance) in old.into_iter().enumerate() {
            let wins = old_winner.get(&instance.key) == Some(&i);
            if wins && survivors.contains(&instance.key) {
                reusable.insert(instance.key.clone(), instance);
            } else {
                self.destroy(instance);
                stats.removed += 1;
            }
        }

        // Final order, reusing by key.
        let mut next: Vec<Instance<H::Node>> = Vec::with_capacity(items.len());
        let mut fresh = Vec::new();
        for (index, (item, key)) in items.into_iter().zip(keys.iter()).enumerate() {
            let reused = if new_winner.get(key) == Some(&index) {
                reusable.remove(key)
            } else {
                None
            };
            match reused {
                Some(instance) => {
                    instance.context.item.set(item);
                    instance.context.index.set(next.len());
                    stats.reused += 1;
                    next.push(instance);
                }
                None => {
                    if let Some(instance) = self.instantiate(key.clone(), item, next.len()) {
                        fresh.push(next.len());
                        next.push(instance);
                        stats.added += 1;
                    }
                }
            }
        }

        // Additions, after their final predecessor.
        for position in fresh {
            let previous = match position {
                0 => &self.anchor,
                _ => &next[position - 1].node,
            };
            let reference = self.host.next_sibling(previous);
            self.host
                .insert_before(&parent, &next[position].node, reference.as_ref());
        }

        // Lock-step positional pass.
        let mut cursor = self.host.next_sibling(&self.anchor);
        for instance in &next {
            if cursor.as_ref() == Some(&instance.node) {
                cursor = self.host.next_sibling(&instance.node);
            } else {
                self.host
                    .insert_before(&parent, &instance.node, cursor.as_ref());
                stats.moved += 1;
            }
        }

        tracing::debug!(
            added = stats.added,
            removed = stats.removed,
            reused = stats.reused,
            moved = stats.moved,
            "list reconciled"
        );
        *self.instances.borrow_mut() = next;
        self.stats.set(stats);
    }

    fn instantiate(&self, key: ListKey, item: Value, index: usize) -> Option<Instance<H::Node>> {
        let context = ItemContext {
            key: key.clone(),
            item: Observable::new(item),
            index: Observable::new(index),
        };
        let rendered = self
            .runtime
            .boundary()
            .guard(&self.context, || (self.template)(&context))?;
        Some(Instance {
            key,
            node: rendered.node,
            context,
            cleanup: rendered.cleanup,
        })
    }

    fn destroy(&self, instance: Instance<H::Node>) {
        self.host.remove(&instance.node);
        if let Some(cleanup) = instance.cleanup {
            self.runtime.boundary().guard(&self.context, cleanup);
        }
    }
}

/// A list region bound to an array source.
pub struct KeyedList<H: HostTree + 'static> {
    state: Rc<ListState<H>>,
    effect: Effect,
}

impl<H: HostTree + 'static> KeyedList<H> {
    /// Mount a list keyed by position, rendered right after `anchor`.
    pub fn mount<S, T>(runtime: &Runtime, host: Rc<H>, anchor: H::Node, source: S, template: T) -> Self
    where
        S: Fn() -> Value + 'static,
        T: Fn(&ItemContext) -> Rendered<H::Node> + 'static,
    {
        Self::build(runtime, host, anchor, Box::new(source), None, Box::new(template))
    }

    /// Mount a list whose items are identified by `key_fn`.
    pub fn mount_keyed<S, K, T>(
        runtime: &Runtime,
        host: Rc<H>,
        anchor: H::Node,
        source: S,
        key_fn: K,
        template: T,
    ) -> Self
    where
        S: Fn() -> Value + 'static,
        K: Fn(&Value, usize) -> Result<Value> + 'static,
        T: Fn(&ItemContext) -> Rendered<H::Node> + 'static,
    {
        Self::build(
            runtime,
            host,
            anchor,
            Box::new(source),
            Some(Rc::new(key_fn)),
            Box::new(template),
        )
    }

    fn build(
        runtime: &Runtime,
        host: Rc<H>,
        anchor: H::Node,
        source: Box<dyn Fn() -> Value>,
        key_fn: Option<KeyFn>,
        template: Template<H::Node>,
    ) -> Self {
        let context = ErrorContext::named("keyed-list").with_element(format!("{anchor:?}"));
        let state = Rc::new(ListState {
            runtime: runtime.clone(),
            host,
            anchor,
            source,
            key_fn,
            template,
            instances: RefCell::new(Vec::new()),
            stats: Cell::new(ReconcileStats::default()),
            context: context.clone(),
        });

        let body = state.clone();
        let effect = Effect::with_context(runtime, context, move || body.update());
        Self { state, effect }
    }

    /// Stop reacting, remove every node and run every cleanup. Idempotent.
    pub fn stop(&self) {
        self.effect.stop();
        let instances = std::mem::take(&mut *self.state.instances.borrow_mut());
        for instance in instances {
            self.state.destroy(instance);
        }
    }

    pub fn is_active(&self) -> bool {
        self.effect.is_active()
    }

    pub fn len(&self) -> usize {
        self.state.instances.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of the rendered instances, in order.
    pub fn keys(&self) -> Vec<ListKey> {
        self.state
            .instances
            .borrow()
            .iter()
            .map(|inst| inst.key.clone())
            .collect()
    }

    /// Rendered nodes, in order.
    pub fn nodes(&self) -> Vec<H::Node> {
        self.state
            .instances
            .borrow()
            .iter()
            .map(|inst| inst.node.clone())
            .collect()
    }

    /// Context of the instance at `position`.
    pub fn item_context(&self, position: usize) -> Option<ItemContext> {
        self.state
            .instances
            .borrow()
            .get(position)
            .map(|inst| inst.context.clone())
    }

    pub fn last_stats(&self) -> ReconcileStats {
        self.state.stats.get()
    }

    /// The effect driving this list.
    pub fn effect(&self) -> &Effect {
        &self.effect
    }
}

impl<H: HostTree + 'static> fmt::Debug for KeyedList<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedList")
            .field("anchor", &self.state.anchor)
            .field("len", &self.len())
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Array, Object, ReactiveArray};
    use crate::render::{MemoryTree, NodeId};

    struct Fixture {
        rt: Runtime,
        tree: Rc<MemoryTree>,
        root: NodeId,
        anchor: NodeId,
    }

    fn fixture() -> Fixture {
        let rt = Runtime::new();
        let tree = Rc::new(MemoryTree::new());
        let root = tree.create_element("ul");
        let anchor = tree.create_placeholder("each");
        tree.append_child(root, anchor);
        Fixture {
            rt,
            tree,
            root,
            anchor,
        }
    }

    fn text_template(tree: &Rc<MemoryTree>) -> impl Fn(&ItemContext) -> Rendered<NodeId> {
        let tree = tree.clone();
        move |ctx: &ItemContext| Rendered::new(tree.create_text(&ctx.item.get_untracked().to_string()))
    }

    fn by_value(item: &Value, _index: usize) -> Result<Value> {
        Ok(item.clone())
    }

    fn live(rt: &Runtime, items: &[i32]) -> ReactiveArray {
        ReactiveArray::new(rt, items.iter().copied().collect())
    }

    #[test]
    fn diff_partitions_keys() {
        let old = [ListKey::Int(1), ListKey::Int(2), ListKey::Int(3)];
        let new = [ListKey::Int(2), ListKey::Int(3), ListKey::Int(4)];

        let diff = diff_keys(&old, &new);
        assert_eq!(diff.removed, vec![ListKey::Int(1)]);
        assert_eq!(diff.added, vec![ListKey::Int(4)]);
        assert_eq!(diff.reused, vec![ListKey::Int(2), ListKey::Int(3)]);
    }

    #[test]
    fn diff_reports_duplicates_once() {
        let old = [ListKey::Int(1), ListKey::Int(1)];
        let new = [ListKey::Int(2), ListKey::Int(2), ListKey::Int(1)];

        let diff = diff_keys(&old, &new);
        assert!(diff.removed.is_empty());
        assert_eq!(diff.added, vec![ListKey::Int(2)]);
        assert_eq!(diff.reused, vec![ListKey::Int(1)]);
    }

    #[test]
    fn keys_from_values() {
        assert_eq!(ListKey::from_value(&Value::from(3.0)), ListKey::Int(3));
        assert_eq!(ListKey::from_value(&Value::from("a")), ListKey::Str("a".into()));
        assert!(matches!(ListKey::from_value(&Value::from(0.5)), ListKey::Number(_)));

        let obj = Object::new();
        assert_eq!(
            ListKey::from_value(&Value::from(obj.clone())),
            ListKey::from_value(&Value::from(obj))
        );
    }

    #[test]
    fn initial_render_follows_anchor() {
        let fx = fixture();
        let arr = live(&fx.rt, &[1, 2, 3]);
        let source = arr.clone();

        let list = KeyedList::mount_keyed(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || Value::from(source.clone()),
            by_value,
            text_template(&fx.tree),
        );

        assert_eq!(fx.tree.labels(fx.root), vec!["<each>", "1", "2", "3"]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.last_stats().added, 3);
    }

    #[test]
    fn reverse_moves_nodes_without_recreating() {
        let fx = fixture();
        let arr = live(&fx.rt, &[1, 2, 3]);
        let source = arr.clone();
        let list = KeyedList::mount_keyed(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || Value::from(source.clone()),
            by_value,
            text_template(&fx.tree),
        );
        let before = list.nodes();

        arr.reverse();
        fx.rt.flush_sync();

        assert_eq!(fx.tree.labels(fx.root), vec!["<each>", "3", "2", "1"]);
        let after = list.nodes();
        assert_eq!(after, vec![before[2], before[1], before[0]]);
        let stats = list.last_stats();
        assert_eq!((stats.added, stats.removed, stats.reused), (0, 0, 3));
        assert_eq!(stats.moved, 2);
    }

    #[test]
    fn region_stays_before_trailing_siblings() {
        let fx = fixture();
        let footer = fx.tree.create_text("footer");
        fx.tree.append_child(fx.root, footer);
        let arr = live(&fx.rt, &[1]);
        let source = arr.clone();
        let _list = KeyedList::mount_keyed(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || Value::from(source.clone()),
            by_value,
            text_template(&fx.tree),
        );

        arr.unshift(0);
        arr.push(2);
        fx.rt.flush_sync();

        assert_eq!(
            fx.tree.labels(fx.root),
            vec!["<each>", "0", "1", "2", "footer"]
        );
    }

    #[test]
    fn positional_list_refreshes_item_cells() {
        let fx = fixture();
        let arr = live(&fx.rt, &[1, 2, 3]);
        let source = arr.clone();
        let (tree, rt) = (fx.tree.clone(), fx.rt.clone());

        let list = KeyedList::mount(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || Value::from(source.clone()),
            move |ctx: &ItemContext| {
                let node = tree.create_text("");
                let (t, item) = (tree.clone(), ctx.item.clone());
                let binding = rt.effect(move || t.set_text(node, &item.get().to_string()));
                Rendered::new(node).with_cleanup(move || binding.stop())
            },
        );

        arr.set(0, 10).unwrap();
        fx.rt.flush_sync();

        assert_eq!(fx.tree.labels(fx.root), vec!["<each>", "10", "2", "3"]);
        assert_eq!(list.last_stats().reused, 3);
    }

    #[test]
    fn non_array_source_keeps_rendering() {
        let fx = fixture();
        let source = Observable::new(Value::from(Array::from_vec(vec![1.into(), 2.into()])));
        let s = source.clone();
        let list = KeyedList::mount_keyed(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || s.get(),
            by_value,
            text_template(&fx.tree),
        );

        source.set(Value::from("not a list"));
        fx.rt.flush_sync();

        assert_eq!(fx.tree.labels(fx.root), vec!["<each>", "1", "2"]);
        assert!(list.is_active());
    }

    #[test]
    fn key_errors_fall_back_to_index() {
        let fx = fixture();
        let arr = ReactiveArray::new(&fx.rt, Array::from_vec(vec!["a".into(), 5.into(), "c".into()]));
        let source = arr.clone();

        let list = KeyedList::mount_keyed(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || Value::from(source.clone()),
            |item, _| match item.as_str() {
                Some(_) => Ok(item.clone()),
                None => Err(Error::Eval {
                    expression: "item.id".into(),
                    reason: "not a string".into(),
                }),
            },
            text_template(&fx.tree),
        );

        assert_eq!(
            list.keys(),
            vec![ListKey::Str("a".into()), ListKey::Int(1), ListKey::Str("c".into())]
        );
    }

    #[test]
    fn panicking_key_fn_falls_back_to_index() {
        let fx = fixture();
        fx.rt.boundary().set_handler(|_, _| {});
        let arr = ReactiveArray::new(&fx.rt, Array::from_vec(vec!["a".into(), "b".into()]));
        let source = arr.clone();

        let list = KeyedList::mount_keyed(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || Value::from(source.clone()),
            |item, _| {
                assert!(*item != Value::from("c"), "bad key");
                Ok(item.clone())
            },
            text_template(&fx.tree),
        );

        arr.push("c");
        fx.rt.flush_sync();

        assert_eq!(fx.tree.labels(fx.root), vec!["<each>", "a", "b", "c"]);
        assert_eq!(
            list.keys(),
            vec![ListKey::Str("a".into()), ListKey::Str("b".into()), ListKey::Int(2)]
        );
        assert!(list.is_active());
    }

    #[test]
    fn duplicate_keys_do_not_crash() {
        let fx = fixture();
        let arr = live(&fx.rt, &[1, 1, 2]);
        let source = arr.clone();
        let list = KeyedList::mount_keyed(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || Value::from(source.clone()),
            by_value,
            text_template(&fx.tree),
        );
        assert_eq!(list.len(), 3);

        arr.shift();
        fx.rt.flush_sync();
        assert_eq!(fx.tree.labels(fx.root), vec!["<each>", "1", "2"]);
    }

    #[test]
    fn cleanups_run_on_remove_and_stop() {
        let fx = fixture();
        let arr = live(&fx.rt, &[1, 2, 3]);
        let source = arr.clone();
        let cleaned = Rc::new(Cell::new(0));
        let (tree, c) = (fx.tree.clone(), cleaned.clone());

        let list = KeyedList::mount_keyed(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || Value::from(source.clone()),
            by_value,
            move |ctx: &ItemContext| {
                let c = c.clone();
                Rendered::new(tree.create_text(&ctx.item.get_untracked().to_string()))
                    .with_cleanup(move || c.set(c.get() + 1))
            },
        );

        arr.pop();
        fx.rt.flush_sync();
        assert_eq!(cleaned.get(), 1);

        list.stop();
        list.stop();
        assert_eq!(cleaned.get(), 3);
        assert_eq!(fx.tree.labels(fx.root), vec!["<each>"]);

        arr.push(9);
        fx.rt.flush_sync();
        assert_eq!(fx.tree.labels(fx.root), vec!["<each>"]);
    }

    #[test]
    fn panicking_template_skips_item() {
        let fx = fixture();
        fx.rt.boundary().set_handler(|_, _| {});
        let arr = live(&fx.rt, &[1, 2, 3]);
        let source = arr.clone();
        let tree = fx.tree.clone();

        let list = KeyedList::mount_keyed(
            &fx.rt,
            fx.tree.clone(),
            fx.anchor,
            move || Value::from(source.clone()),
            by_value,
            move |ctx: &ItemContext| {
                let item = ctx.item.get_untracked();
                assert!(item != Value::from(2), "cannot render two");
                Rendered::new(tree.create_text(&item.to_string()))
            },
        );

        assert_eq!(list.len(), 2);
        assert_eq!(fx.tree.labels(fx.root), vec!["<each>", "1", "3"]);
    }
}
