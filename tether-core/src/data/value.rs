//! The dynamic value model wrapped by the reactive layer.

use std::fmt;
use std::rc::Rc;

use super::array::{Array, ReactiveArray};
use super::object::{Object, ReactiveObject};
use crate::reactive::SameValue;

/// Nesting limit for `Display`, so self-referential arrays terminate.
const DISPLAY_DEPTH: usize = 16;

/// A dynamically typed value.
///
/// `Object` and `Array` are shared raw handles. `LiveObject` and `LiveArray`
/// are reactive wrappers around such handles; raw storage never contains
/// them (writes through a wrapper store [`Value::into_raw`]).
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Object(Object),
    Array(Array),
    LiveObject(ReactiveObject),
    LiveArray(ReactiveArray),
}

impl Value {
    /// Name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) | Value::LiveObject(_) => "object",
            Value::Array(_) | Value::LiveArray(_) => "array",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Objects and arrays, raw or wrapped.
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Object(_) | Value::Array(_) | Value::LiveObject(_) | Value::LiveArray(_)
        )
    }

    /// Whether the value is list-shaped (a raw or wrapped array).
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_) | Value::LiveArray(_))
    }

    /// Whether the value is a reactive wrapper.
    pub fn is_reactive(&self) -> bool {
        matches!(self, Value::LiveObject(_) | Value::LiveArray(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(&**s),
            _ => None,
        }
    }

    pub fn as_reactive_object(&self) -> Option<&ReactiveObject> {
        match self {
            Value::LiveObject(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_reactive_array(&self) -> Option<&ReactiveArray> {
        match self {
            Value::LiveArray(arr) => Some(arr),
            _ => None,
        }
    }

    /// Truthiness: `undefined`, `null`, `false`, `0`, `NaN` and `""` are
    /// falsy, everything else is truthy.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Strip a reactive wrapper, yielding the raw handle it wraps.
    pub fn into_raw(self) -> Value {
        match self {
            Value::LiveObject(obj) => Value::Object(obj.raw().clone()),
            Value::LiveArray(arr) => Value::Array(arr.raw().clone()),
            other => other,
        }
    }

    /// Address of the underlying allocation for object-like values.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(obj) => Some(obj.addr()),
            Value::LiveObject(obj) => Some(obj.raw().addr()),
            Value::Array(arr) => Some(arr.addr()),
            Value::LiveArray(arr) => Some(arr.raw().addr()),
            _ => None,
        }
    }

    fn write_display(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write_number(f, *n),
            Value::String(s) => f.write_str(s),
            Value::Object(_) | Value::LiveObject(_) => f.write_str("[object Object]"),
            Value::Array(_) | Value::LiveArray(_) => {
                if depth >= DISPLAY_DEPTH {
                    return f.write_str("...");
                }
                let items = match self {
                    Value::Array(arr) => arr.to_vec(),
                    Value::LiveArray(arr) => arr.raw().to_vec(),
                    _ => Vec::new(),
                };
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_nullish() {
                        item.write_display(f, depth + 1)?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl SameValue for Value {
    fn same_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => match (self.identity(), other.identity()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same_value(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_display(f, 0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Object(obj) => write!(f, "Object({} props)", obj.len()),
            Value::Array(arr) => write!(f, "Array(len {})", arr.len()),
            Value::LiveObject(obj) => write!(f, "LiveObject({} props)", obj.raw().len()),
            Value::LiveArray(arr) => write!(f, "LiveArray(len {})", arr.raw().len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

macro_rules! value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f64)
                }
            }
        )*
    };
}

value_from_int!(i32, i64, u32, u64, usize);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<Array> for Value {
    fn from(arr: Array) -> Self {
        Value::Array(arr)
    }
}

impl From<ReactiveObject> for Value {
    fn from(obj: ReactiveObject) -> Self {
        Value::LiveObject(obj)
    }
}

impl From<ReactiveArray> for Value {
    fn from(arr: ReactiveArray) -> Self {
        Value::LiveArray(arr)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::Array(Array::from_vec(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(map) => {
                let obj = Object::new();
                for (key, value) in map {
                    obj.insert(key, Value::from(value));
                }
                Value::Object(obj)
            }
        }
    }
}
