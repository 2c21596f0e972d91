//! Raw objects and their reactive wrapper.
//!
//! A raw [`Object`] is a shared, insertion-ordered map of properties. Each
//! property is either plain data or a derived accessor (a getter that
//! receives the wrapped object as `this`).
//!
//! [`ReactiveObject`] turns property access into cell access. The
//! per-property cells live in an observer attached to the raw allocation,
//! so wrapping the same raw object twice yields wrappers that share every
//! cell, and the cells go away together with the object.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{wrap, Gettable, Settable, Value};
use crate::error::{Error, Result};
use crate::reactive::{untrack, ErrorContext, Memo, Observable, Runtime, SameValue};

/// A derived accessor: computes a property from the wrapped object.
pub type Getter = Rc<dyn Fn(&ReactiveObject) -> Value>;

/// One property slot of a raw object.
#[derive(Clone)]
pub enum Property {
    Data(Value),
    Derived(Getter),
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Data(value) => f.debug_tuple("Data").field(value).finish(),
            Property::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

pub(crate) struct ObjectData {
    props: IndexMap<String, Property>,
    observer: Option<Rc<ObjectObserver>>,
}

/// A shared, non-reactive object.
///
/// Mutating a raw object directly bypasses reactivity; go through a
/// [`ReactiveObject`] to notify dependents.
#[derive(Clone)]
pub struct Object(pub(crate) Rc<RefCell<ObjectData>>);

impl Object {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(ObjectData {
            props: IndexMap::new(),
            observer: None,
        })))
    }

    /// Builder-style insert.
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style getter definition.
    pub fn with_getter<F>(self, key: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&ReactiveObject) -> Value + 'static,
    {
        self.define_getter(key, getter);
        self
    }

    /// Store a data property, returning the previous data value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let previous = self
            .0
            .borrow_mut()
            .props
            .insert(key.into(), Property::Data(value.into().into_raw()));
        match previous {
            Some(Property::Data(value)) => Some(value),
            _ => None,
        }
    }

    /// Declare a derived accessor property.
    pub fn define_getter<F>(&self, key: impl Into<String>, getter: F)
    where
        F: Fn(&ReactiveObject) -> Value + 'static,
    {
        self.0
            .borrow_mut()
            .props
            .insert(key.into(), Property::Derived(Rc::new(getter)));
    }

    /// The raw data value of `key`. Derived and missing properties yield
    /// `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.0.borrow().props.get(key) {
            Some(Property::Data(value)) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn property(&self, key: &str) -> Option<Property> {
        self.0.borrow().props.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().props.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().props.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().props.is_empty()
    }

    /// Whether a reactive wrapper has been attached to this object.
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

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Per-object reactive state.
pub(crate) struct ObjectObserver {
    runtime: Runtime,
    cells: RefCell<HashMap<String, Observable<Value>>>,
    derived: RefCell<HashMap<String, Memo<Value>>>,
    /// Bumped whenever a key is added or removed.
    shape: Observable<u64>,
}

impl ObjectObserver {
    fn new(runtime: &Runtime) -> Self {
        Self {
            runtime: runtime.clone(),
            cells: RefCell::new(HashMap::new()),
            derived: RefCell::new(HashMap::new()),
            shape: Observable::new(0),
        }
    }
}

/// A reactive view of an [`Object`].
///
/// Reads inside a computation subscribe it to the property read; writes
/// notify exactly the computations that read the written property. Nested
/// objects and arrays come back wrapped.
#[derive(Clone)]
pub struct ReactiveObject {
    raw: Object,
    observer: Rc<ObjectObserver>,
}

impl ReactiveObject {
    /// Wrap `raw`. Wrapping an object that already has a wrapper returns a
    /// wrapper sharing the existing cells (it keeps its original runtime).
    pub fn new(runtime: &Runtime, raw: Object) -> Self {
        let existing = raw.0.borrow().observer.clone();
        let observer = match existing {
            Some(observer) => observer,
            None => {
                let observer = Rc::new(ObjectObserver::new(runtime));
                raw.0.borrow_mut().observer = Some(observer.clone());
                observer
            }
        };
        Self { raw, observer }
    }

    fn from_data(data: Rc<RefCell<ObjectData>>) -> Option<Self> {
        let observer = data.borrow().observer.clone()?;
        Some(Self {
            raw: Object(data),
            observer,
        })
    }

    /// The wrapped raw object.
    pub fn raw(&self) -> &Object {
        &self.raw
    }

    pub fn runtime(&self) -> &Runtime {
        &self.observer.runtime
    }

    /// Read a property, tracking it.
    pub fn get(&self, key: &str) -> Value {
        let property = self.raw.property(key);
        let value = match property {
            Some(Property::Derived(getter)) => self.derived(key, getter).get(),
            Some(Property::Data(raw)) => self.cell(key, raw).get(),
            None => self.cell(key, Value::Undefined).get(),
        };
        wrap(&self.observer.runtime, value)
    }

    /// Read a property without tracking it.
    pub fn get_untracked(&self, key: &str) -> Value {
        untrack(|| self.get(key))
    }

    /// Write a property. Dependents are notified only if the value changed
    /// by identity. Assigning to a derived property is rejected.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into().into_raw();

        let (changed, added) = {
            let mut data = self.raw.0.borrow_mut();
            if let Some(Property::Derived(_)) = data.props.get(key) {
                tracing::warn!(key, "assignment to derived property ignored");
                return Err(Error::ReadOnlyDerivation {
                    key: key.to_string(),
                });
            }
            let previous = data
                .props
                .insert(key.to_string(), Property::Data(value.clone()));
            match previous {
                Some(Property::Data(old)) => (!old.same_value(&value), false),
                _ => (true, true),
            }
        };

        if changed {
            self.cell(key, Value::Undefined).set(value);
        }
        if added {
            self.observer.shape.update(|v| v + 1);
        }
        Ok(())
    }

    /// Remove a property. Returns whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.raw.0.borrow_mut().props.shift_remove(key);
        let Some(removed) = removed else {
            return false;
        };

        if let Property::Derived(_) = removed {
            let memo = self.observer.derived.borrow_mut().remove(key);
            if let Some(memo) = memo {
                memo.retire(Value::Undefined);
            }
        }

        let cell = self.observer.cells.borrow().get(key).cloned();
        if let Some(cell) = cell {
            cell.set(Value::Undefined);
        }
        self.observer.shape.update(|v| v + 1);
        true
    }

    /// Whether the property exists. Tracks additions and removals.
    pub fn has(&self, key: &str) -> bool {
        self.observer.shape.track();
        self.raw.contains_key(key)
    }

    /// Property names in insertion order. Tracks additions and removals.
    pub fn keys(&self) -> Vec<String> {
        self.observer.shape.track();
        self.raw.keys()
    }

    /// Number of property cells allocated so far.
    pub fn cell_count(&self) -> usize {
        self.observer.cells.borrow().len()
    }

    /// Whether both wrappers view the same raw object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.raw.ptr_eq(&other.raw)
    }

    fn cell(&self, key: &str, init: Value) -> Observable<Value> {
        let existing = self.observer.cells.borrow().get(key).cloned();
        if let Some(cell) = existing {
            return cell;
        }
        let cell = Observable::new(init);
        self.observer
            .cells
            .borrow_mut()
            .insert(key.to_string(), cell.clone());
        cell
    }

    fn derived(&self, key: &str, getter: Getter) -> Memo<Value> {
        let existing = self.observer.derived.borrow().get(key).cloned();
        if let Some(memo) = existing {
            return memo;
        }

        // The memo lives inside the object's observer; hold the object weakly.
        let weak = Rc::downgrade(&self.raw.0);
        let context = ErrorContext::named(key.to_string()).with_expression("<getter>");
        let memo = Memo::with_context(&self.observer.runtime, context, move || {
            weak.upgrade()
                .and_then(ReactiveObject::from_data)
                .map(|this| getter(&this))
                .unwrap_or_default()
        });
        self.observer
            .derived
            .borrow_mut()
            .insert(key.to_string(), memo.clone());
        memo
    }
}

impl PartialEq for ReactiveObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveObject")
            .field("keys", &self.raw.keys())
            .field("cells", &self.cell_count())
            .finish()
    }
}

impl Gettable<str> for ReactiveObject {
    fn get(&self, key: &str) -> Value {
        ReactiveObject::get(self, key)
    }
}

impl Settable<str> for ReactiveObject {
    fn set(&self, key: &str, value: Value) -> Result<()> {
        ReactiveObject::set(self, key, value)
    }

    fn delete(&self, key: &str) -> bool {
        ReactiveObject::delete(self, key)
    }
}
