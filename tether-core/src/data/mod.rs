//! Dynamic data model and the reactive wrappers over it.
//!
//! Plain data lives in [`Value`]s; [`wrap`] turns objects and arrays into
//! [`ReactiveObject`] / [`ReactiveArray`] views whose property reads and
//! writes go through observable cells.

mod array;
mod object;
mod value;

pub use array::{
    Array, ArrayChange, ArrayMethod, ArrayOp, ChangeKind, Comparator, ReactiveArray, MAX_INDEX,
};
pub use object::{Getter, Object, Property, ReactiveObject};
pub use value::Value;

use crate::error::Result;
use crate::reactive::Runtime;

/// Wrap a value for reactive access.
///
/// Objects and arrays get a reactive view (reusing the existing one if the
/// raw value was wrapped before). Wrappers and primitives are returned
/// unchanged, so `wrap(wrap(x))` is `wrap(x)`.
pub fn wrap(runtime: &Runtime, value: Value) -> Value {
    match value {
        Value::Array(arr) => Value::LiveArray(ReactiveArray::new(runtime, arr)),
        Value::Object(obj) => Value::LiveObject(ReactiveObject::new(runtime, obj)),
        other => other,
    }
}

/// Tracked read access by key.
pub trait Gettable<K: ?Sized> {
    fn get(&self, key: &K) -> Value;
}

/// Write access by key. Writes notify dependents when the value changes.
pub trait Settable<K: ?Sized> {
    fn set(&self, key: &K, value: Value) -> Result<()>;

    /// Remove the entry. Returns whether it existed.
    fn delete(&self, key: &K) -> bool;
}
