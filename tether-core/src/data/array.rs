//! Raw arrays and their reactive wrapper.
//!
//! Arrays are notified more coarsely than objects. Structural mutation goes
//! through a closed set of operations ([`ArrayOp`]); each one updates the
//! length cell, bumps the version cell by exactly one and publishes an
//! [`ArrayChange`] describing what happened. Consumers that only care that
//! *something* changed (list rendering) depend on the version cell.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use smallvec::{smallvec, SmallVec};

use super::{wrap, Gettable, Settable, Value};
use crate::error::{Error, Result};
use crate::reactive::{Observable, Runtime, SameValue};

/// Largest assignable index. Lengths go up to `MAX_INDEX + 1`.
pub const MAX_INDEX: usize = u32::MAX as usize - 1;

/// Ordering used by [`ArrayOp::Sort`]. Receives raw (unwrapped) values.
pub type Comparator = Rc<dyn Fn(&Value, &Value) -> Ordering>;

/// A structural array mutation.
#[derive(Clone)]
pub enum ArrayOp {
    /// Add items at the end (`push`).
    Append(Vec<Value>),
    /// Add items at the front (`unshift`).
    Prepend(Vec<Value>),
    /// Remove the first item (`shift`).
    RemovePrefix,
    /// Remove the last item (`pop`).
    RemoveSuffix,
    /// Remove `delete_count` items at `start` and insert `items` there.
    Splice {
        start: usize,
        delete_count: usize,
        items: Vec<Value>,
    },
    /// Reorder by the comparator, or by string order with `undefined` last.
    Sort(Option<Comparator>),
    Reverse,
}

impl ArrayOp {
    pub fn method(&self) -> ArrayMethod {
        match self {
            ArrayOp::Append(_) => ArrayMethod::Push,
            ArrayOp::Prepend(_) => ArrayMethod::Unshift,
            ArrayOp::RemovePrefix => ArrayMethod::Shift,
            ArrayOp::RemoveSuffix => ArrayMethod::Pop,
            ArrayOp::Splice { .. } => ArrayMethod::Splice,
            ArrayOp::Sort(_) => ArrayMethod::Sort,
            ArrayOp::Reverse => ArrayMethod::Reverse,
        }
    }

    fn args(&self) -> SmallVec<[Value; 4]> {
        match self {
            ArrayOp::Append(items) | ArrayOp::Prepend(items) => items.iter().cloned().collect(),
            ArrayOp::Splice {
                start,
                delete_count,
                items,
            } => {
                let mut args: SmallVec<[Value; 4]> =
                    smallvec![Value::from(*start), Value::from(*delete_count)];
                args.extend(items.iter().cloned());
                args
            }
            ArrayOp::RemovePrefix | ArrayOp::RemoveSuffix | ArrayOp::Sort(_) | ArrayOp::Reverse => {
                SmallVec::new()
            }
        }
    }

    fn into_raw(self) -> Self {
        let to_raw = |items: Vec<Value>| -> Vec<Value> {
            items.into_iter().map(Value::into_raw).collect()
        };
        match self {
            ArrayOp::Append(items) => ArrayOp::Append(to_raw(items)),
            ArrayOp::Prepend(items) => ArrayOp::Prepend(to_raw(items)),
            ArrayOp::Splice {
                start,
                delete_count,
                items,
            } => ArrayOp::Splice {
                start,
                delete_count,
                items: to_raw(items),
            },
            other => other,
        }
    }
}

impl fmt::Debug for ArrayOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayOp::Append(items) => f.debug_tuple("Append").field(items).finish(),
            ArrayOp::Prepend(items) => f.debug_tuple("Prepend").field(items).finish(),
            ArrayOp::RemovePrefix => f.write_str("RemovePrefix"),
            ArrayOp::RemoveSuffix => f.write_str("RemoveSuffix"),
            ArrayOp::Splice {
                start,
                delete_count,
                items,
            } => f
                .debug_struct("Splice")
                .field("start", start)
                .field("delete_count", delete_count)
                .field("items", items)
                .finish(),
            ArrayOp::Sort(cmp) => write!(f, "Sort({})", if cmp.is_some() { "custom" } else { "default" }),
            ArrayOp::Reverse => f.write_str("Reverse"),
        }
    }
}

/// The mutating method an [`ArrayOp`] corresponds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayMethod {
    Push,
    Pop,
    Shift,
    Unshift,
    Splice,
    Sort,
    Reverse,
}

impl ArrayMethod {
    pub fn kind(self) -> ChangeKind {
        match self {
            ArrayMethod::Push | ArrayMethod::Unshift => ChangeKind::Add,
            ArrayMethod::Pop | ArrayMethod::Shift => ChangeKind::Remove,
            ArrayMethod::Splice => ChangeKind::Splice,
            ArrayMethod::Sort | ArrayMethod::Reverse => ChangeKind::Reorder,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArrayMethod::Push => "push",
            ArrayMethod::Pop => "pop",
            ArrayMethod::Shift => "shift",
            ArrayMethod::Unshift => "unshift",
            ArrayMethod::Splice => "splice",
            ArrayMethod::Sort => "sort",
            ArrayMethod::Reverse => "reverse",
        }
    }
}

impl fmt::Display for ArrayMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a structural mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Add,
    Remove,
    Splice,
    Reorder,
}

/// Published on the change cell after every [`ArrayOp`].
#[derive(Debug, Clone)]
pub struct ArrayChange {
    pub kind: ChangeKind,
    pub method: ArrayMethod,
    /// Raw arguments of the operation.
    pub args: SmallVec<[Value; 4]>,
    pub old_length: usize,
    pub new_length: usize,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

pub(crate) struct ArrayData {
    items: Vec<Value>,
    observer: Option<Rc<ArrayObserver>>,
}

/// A shared, non-reactive array.
#[derive(Clone)]
pub struct Array(pub(crate) Rc<RefCell<ArrayData>>);

impl Array {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(ArrayData {
            items: items.into_iter().map(Value::into_raw).collect(),
            observer: None,
        })))
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().items.get(index).cloned()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().items.clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().items.is_empty()
    }

    /// Whether a reactive wrapper has been attached to this array.
    pub fn is_observed(&self) -> bool {
        self.0.borrow().observer.is_some()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.borrow().items.iter()).finish()
    }
}

/// Per-array reactive state.
pub(crate) struct ArrayObserver {
    runtime: Runtime,
    index_cells: RefCell<BTreeMap<usize, Observable<Value>>>,
    length: Observable<usize>,
    version: Observable<u64>,
    change: Observable<Option<Rc<ArrayChange>>>,
}

/// A reactive view of an [`Array`].
#[derive(Clone)]
pub struct ReactiveArray {
    raw: Array,
    observer: Rc<ArrayObserver>,
}

impl ReactiveArray {
    /// Wrap `raw`, reusing the existing observer if it was wrapped before.
    pub fn new(runtime: &Runtime, raw: Array) -> Self {
        let existing = raw.0.borrow().observer.clone();
        let observer = match existing {
            Some(observer) => observer,
            None => {
                let observer = Rc::new(ArrayObserver {
                    runtime: runtime.clone(),
                    index_cells: RefCell::new(BTreeMap::new()),
                    length: Observable::new(raw.len()),
                    version: Observable::new(0),
                    change: Observable::new(None),
                });
                raw.0.borrow_mut().observer = Some(observer.clone());
                observer
            }
        };
        Self { raw, observer }
    }

    pub fn raw(&self) -> &Array {
        &self.raw
    }

    pub fn runtime(&self) -> &Runtime {
        &self.observer.runtime
    }

    /// Apply a structural mutation and notify. Returns the removed items
    /// (raw).
    pub fn apply(&self, op: ArrayOp) -> Vec<Value> {
        let op = op.into_raw();
        let method = op.method();
        let args = op.args();
        let old_length = self.raw.len();

        let removed = match op {
            ArrayOp::Sort(comparator) => {
                // Sort a copy so the comparator may read the array.
                let mut items = self.raw.to_vec();
                match comparator {
                    Some(comparator) => items.sort_by(|a, b| comparator(a, b)),
                    None => items.sort_by(default_order),
                }
                self.raw.0.borrow_mut().items = items;
                Vec::new()
            }
            ArrayOp::Append(values) => {
                self.raw.0.borrow_mut().items.extend(values);
                Vec::new()
            }
            ArrayOp::Prepend(values) => {
                self.raw.0.borrow_mut().items.splice(0..0, values);
                Vec::new()
            }
            ArrayOp::RemoveSuffix => self.raw.0.borrow_mut().items.pop().into_iter().collect(),
            ArrayOp::RemovePrefix => {
                let mut data = self.raw.0.borrow_mut();
                if data.items.is_empty() {
                    Vec::new()
                } else {
                    vec![data.items.remove(0)]
                }
            }
            ArrayOp::Splice {
                start,
                delete_count,
                items,
            } => {
                let mut data = self.raw.0.borrow_mut();
                let len = data.items.len();
                let start = start.min(len);
                let end = start + delete_count.min(len - start);
                let removed: Vec<Value> = data.items.splice(start..end, items).collect();
                removed
            }
            ArrayOp::Reverse => {
                self.raw.0.borrow_mut().items.reverse();
                Vec::new()
            }
        };

        let new_length = self.raw.len();
        self.observer.length.set(new_length);
        self.observer.version.update(|v| v + 1);

        tracing::trace!(%method, old_length, new_length, "array mutated");
        self.observer.change.set(Some(Rc::new(ArrayChange {
            kind: method.kind(),
            method,
            args,
            old_length,
            new_length,
            timestamp: now_millis(),
        })));
        self.refresh_index_cells();

        removed
    }

    /// Append `value`, returning the new length.
    pub fn push(&self, value: impl Into<Value>) -> usize {
        self.apply(ArrayOp::Append(vec![value.into()]));
        self.raw.len()
    }

    /// Append every item, returning the new length.
    pub fn extend<I, V>(&self, values: I) -> usize
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.apply(ArrayOp::Append(values.into_iter().map(Into::into).collect()));
        self.raw.len()
    }

    /// Remove and return the last item (`undefined` when empty).
    pub fn pop(&self) -> Value {
        let removed = self.apply(ArrayOp::RemoveSuffix);
        self.first_wrapped(removed)
    }

    /// Remove and return the first item (`undefined` when empty).
    pub fn shift(&self) -> Value {
        let removed = self.apply(ArrayOp::RemovePrefix);
        self.first_wrapped(removed)
    }

    /// Insert `value` at the front, returning the new length.
    pub fn unshift(&self, value: impl Into<Value>) -> usize {
        self.apply(ArrayOp::Prepend(vec![value.into()]));
        self.raw.len()
    }

    /// Replace `delete_count` items at `start` with `items`, returning the
    /// removed items.
    pub fn splice(&self, start: usize, delete_count: usize, items: Vec<Value>) -> Vec<Value> {
        self.apply(ArrayOp::Splice {
            start,
            delete_count,
            items,
        })
        .into_iter()
        .map(|v| wrap(&self.observer.runtime, v))
        .collect()
    }

    /// Sort by string order with `undefined` last.
    pub fn sort(&self) {
        self.apply(ArrayOp::Sort(None));
    }

    pub fn sort_by<F>(&self, compare: F)
    where
        F: Fn(&Value, &Value) -> Ordering + 'static,
    {
        self.apply(ArrayOp::Sort(Some(Rc::new(compare))));
    }

    pub fn reverse(&self) {
        self.apply(ArrayOp::Reverse);
    }

    /// Read the item at `index`, tracking that index.
    pub fn get(&self, index: usize) -> Value {
        let value = self.index_cell(index).get();
        wrap(&self.observer.runtime, value)
    }

    /// Write the item at `index`. Writing past the end extends the array
    /// with `undefined`. Indices above [`MAX_INDEX`] are rejected.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        if index > MAX_INDEX {
            tracing::warn!(index, "array index out of range");
            return Err(Error::IndexOutOfRange { index });
        }
        let value = value.into().into_raw();
        let (changed, extended) = {
            let mut data = self.raw.0.borrow_mut();
            let extended = index >= data.items.len();
            if extended {
                data.items.resize(index + 1, Value::Undefined);
            }
            let changed = extended || !data.items[index].same_value(&value);
            data.items[index] = value.clone();
            (changed, extended)
        };

        if !changed {
            return Ok(());
        }
        self.index_cell(index).set(value);
        if extended {
            self.observer.length.set(self.raw.len());
        }
        self.observer.version.update(|v| v + 1);
        Ok(())
    }

    /// Truncate or extend (with `undefined`) to `len`.
    pub fn set_len(&self, len: usize) -> Result<()> {
        if len > MAX_INDEX + 1 {
            tracing::warn!(len, "array length out of range");
            return Err(Error::IndexOutOfRange { index: len });
        }
        {
            let mut data = self.raw.0.borrow_mut();
            if data.items.len() == len {
                return Ok(());
            }
            data.items.resize(len, Value::Undefined);
        }
        self.observer.length.set(len);
        self.observer.version.update(|v| v + 1);
        self.refresh_index_cells();
        Ok(())
    }

    /// Current length, tracked.
    pub fn len(&self) -> usize {
        self.observer.length.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Structural version, tracked. Increases by one per mutation.
    pub fn version(&self) -> u64 {
        self.observer.version.get()
    }

    /// The most recent structural change, tracked.
    pub fn last_change(&self) -> Option<Rc<ArrayChange>> {
        self.observer.change.get()
    }

    /// All items, wrapped. Tracks the version cell.
    pub fn to_vec(&self) -> Vec<Value> {
        self.observer.version.track();
        self.raw
            .to_vec()
            .into_iter()
            .map(|v| wrap(&self.observer.runtime, v))
            .collect()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.raw.ptr_eq(&other.raw)
    }

    fn first_wrapped(&self, removed: Vec<Value>) -> Value {
        removed
            .into_iter()
            .next()
            .map(|v| wrap(&self.observer.runtime, v))
            .unwrap_or_default()
    }

    fn index_cell(&self, index: usize) -> Observable<Value> {
        let existing = self.observer.index_cells.borrow().get(&index).cloned();
        if let Some(cell) = existing {
            return cell;
        }
        let cell = Observable::new(self.raw.get(index).unwrap_or_default());
        self.observer
            .index_cells
            .borrow_mut()
            .insert(index, cell.clone());
        cell
    }

    fn refresh_index_cells(&self) {
        let cells: Vec<(usize, Observable<Value>)> = self
            .observer
            .index_cells
            .borrow()
            .iter()
            .map(|(i, cell)| (*i, cell.clone()))
            .collect();
        for (index, cell) in cells {
            cell.set(self.raw.get(index).unwrap_or_default());
        }
    }
}

/// String order by UTF-16 code units, with `undefined` sorted last.
fn default_order(a: &Value, b: &Value) -> Ordering {
    match (a.is_undefined(), b.is_undefined()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let (a, b) = (a.to_string(), b.to_string());
            a.encode_utf16().cmp(b.encode_utf16())
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl PartialEq for ReactiveArray {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ReactiveArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveArray")
            .field("len", &self.raw.len())
            .field("version", &self.observer.version.get_untracked())
            .finish()
    }
}

impl Gettable<usize> for ReactiveArray {
    fn get(&self, index: &usize) -> Value {
        ReactiveArray::get(self, *index)
    }
}

impl Settable<usize> for ReactiveArray {
    fn set(&self, index: &usize, value: Value) -> Result<()> {
        ReactiveArray::set(self, *index, value)
    }

    /// Leaves a hole (`undefined`); the length is unchanged.
    fn delete(&self, index: &usize) -> bool {
        if *index >= self.raw.len() {
            return false;
        }
        ReactiveArray::set(self, *index, Value::Undefined).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Object;
    use std::cell::Cell;

    fn numbers(rt: &Runtime, items: &[i32]) -> ReactiveArray {
        ReactiveArray::new(rt, items.iter().copied().collect())
    }

    fn as_numbers(arr: &ReactiveArray) -> Vec<f64> {
        arr.raw().to_vec().iter().filter_map(Value::as_f64).collect()
    }

    #[test]
    fn version_increments_once_per_operation() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[3, 1, 2]);
        assert_eq!(arr.version(), 0);

        arr.push(4);
        arr.pop();
        arr.sort();
        arr.reverse();
        arr.splice(0, 0, vec![]);
        arr.shift();
        arr.unshift(9);

        assert_eq!(arr.version(), 7);
    }

    #[test]
    fn pop_on_empty_still_bumps_version() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[]);

        assert_eq!(arr.pop(), Value::Undefined);
        assert_eq!(arr.shift(), Value::Undefined);
        assert_eq!(arr.version(), 2);
        assert_eq!(arr.len(), 0);
    }

    #[test]
    fn methods_return_what_they_remove() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[1, 2, 3, 4, 5]);

        assert_eq!(arr.push(6), 6);
        assert_eq!(arr.pop(), Value::from(6));
        assert_eq!(arr.shift(), Value::from(1));
        assert_eq!(arr.unshift(0), 5);

        let removed = arr.splice(1, 2, vec![Value::from(7)]);
        assert_eq!(removed, vec![Value::from(2), Value::from(3)]);
        assert_eq!(as_numbers(&arr), vec![0.0, 7.0, 4.0, 5.0]);
    }

    #[test]
    fn splice_clamps_out_of_range() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[1, 2]);

        let removed = arr.splice(1, 10, vec![]);
        assert_eq!(removed.len(), 1);
        arr.splice(99, 0, vec![Value::from(3)]);
        assert_eq!(as_numbers(&arr), vec![1.0, 3.0]);
    }

    #[test]
    fn change_event_describes_operation() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[1]);
        assert!(arr.last_change().is_none());

        arr.extend([2, 3, 4]);
        let change = arr.last_change().expect("change recorded");
        assert_eq!(change.kind, ChangeKind::Add);
        assert_eq!(change.method, ArrayMethod::Push);
        assert_eq!(change.args.len(), 3);
        assert_eq!((change.old_length, change.new_length), (1, 4));

        arr.sort();
        let change = arr.last_change().expect("change recorded");
        assert_eq!(change.kind, ChangeKind::Reorder);
        assert_eq!(change.old_length, change.new_length);
    }

    #[test]
    fn default_sort_is_string_order_with_undefined_last() {
        let rt = Runtime::new();
        let arr = ReactiveArray::new(
            &rt,
            Array::from_vec(vec![10.into(), Value::Undefined, 9.into(), 1.into()]),
        );

        arr.sort();
        let items = arr.raw().to_vec();
        assert_eq!(items[0], Value::from(1));
        assert_eq!(items[1], Value::from(10));
        assert_eq!(items[2], Value::from(9));
        assert!(items[3].is_undefined());
    }

    #[test]
    fn sort_by_uses_comparator() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[10, 9, 1]);

        arr.sort_by(|a, b| {
            let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
            a.total_cmp(&b)
        });
        assert_eq!(as_numbers(&arr), vec![1.0, 9.0, 10.0]);
    }

    #[test]
    fn sort_reruns_version_readers_but_not_length_readers() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[2, 1]);
        let length_runs = Rc::new(Cell::new(0));
        let version_runs = Rc::new(Cell::new(0));

        let (a, r) = (arr.clone(), length_runs.clone());
        let _by_length = rt.effect(move || {
            a.len();
            r.set(r.get() + 1);
        });
        let (a, r) = (arr.clone(), version_runs.clone());
        let _by_version = rt.effect(move || {
            a.version();
            r.set(r.get() + 1);
        });

        arr.sort();
        rt.flush_sync();
        assert_eq!(length_runs.get(), 1);
        assert_eq!(version_runs.get(), 2);
    }

    #[test]
    fn index_cells_follow_structural_changes() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[1, 2, 3]);
        let first = Rc::new(RefCell::new(Value::Null));

        let (a, f) = (arr.clone(), first.clone());
        let _effect = rt.effect(move || *f.borrow_mut() = a.get(0));
        assert_eq!(*first.borrow(), Value::from(1));

        arr.shift();
        rt.flush_sync();
        assert_eq!(*first.borrow(), Value::from(2));
    }

    #[test]
    fn index_write_past_end_extends() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[1]);

        arr.set(3, "x").unwrap();
        assert_eq!(arr.len(), 4);
        assert!(arr.get(2).is_undefined());
        assert_eq!(arr.get(3), Value::from("x"));
        assert_eq!(arr.version(), 1);

        // Same value: nothing changes.
        arr.set(3, "x").unwrap();
        assert_eq!(arr.version(), 1);
    }

    #[test]
    fn set_len_truncates_and_notifies() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[1, 2, 3]);
        let last = arr.clone();
        let third = Rc::new(RefCell::new(Value::Null));
        let t = third.clone();
        let _effect = rt.effect(move || *t.borrow_mut() = last.get(2));

        arr.set_len(1).unwrap();
        rt.flush_sync();
        assert!(third.borrow().is_undefined());
        assert_eq!(arr.version(), 1);

        arr.set_len(1).unwrap();
        assert_eq!(arr.version(), 1);
    }

    #[test]
    fn huge_indices_are_rejected() {
        let rt = Runtime::new();
        let arr = numbers(&rt, &[1, 2]);

        assert!(matches!(
            arr.set(usize::MAX, 0),
            Err(Error::IndexOutOfRange { index: usize::MAX })
        ));
        assert!(matches!(arr.set(MAX_INDEX + 1, 0), Err(Error::IndexOutOfRange { .. })));
        assert!(matches!(arr.set_len(usize::MAX), Err(Error::IndexOutOfRange { .. })));
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.version(), 0);
    }

    #[test]
    fn default_sort_compares_utf16_units() {
        let rt = Runtime::new();
        let arr = ReactiveArray::new(
            &rt,
            Array::from_vec(vec!["\u{FF61}".into(), "\u{1F600}".into()]),
        );

        arr.sort();
        assert_eq!(arr.get(0), Value::from("\u{1F600}"));
        assert_eq!(arr.get(1), Value::from("\u{FF61}"));
    }

    #[test]
    fn nested_items_are_wrapped_and_stored_raw() {
        let rt = Runtime::new();
        let arr = ReactiveArray::new(&rt, Array::new());
        let item = crate::data::ReactiveObject::new(&rt, Object::new().with("id", 1));

        arr.push(item.clone());
        assert!(matches!(arr.raw().get(0), Some(Value::Object(_))));
        assert_eq!(arr.get(0), Value::from(item));
        assert!(arr.to_vec()[0].is_reactive());
    }

    #[test]
    fn wrapping_twice_shares_version() {
        let rt = Runtime::new();
        let raw: Array = [1, 2].into_iter().collect();
        let a = ReactiveArray::new(&rt, raw.clone());
        let b = ReactiveArray::new(&rt, raw);

        a.push(3);
        assert_eq!(b.version(), 1);
        assert_eq!(a, b);
    }
}
