//! View-to-model writes for two-way bindings.

use super::eval::{has_own, member, split_path};
use crate::data::Value;
use crate::error::{Error, Result};
use crate::reactive::untrack;

/// Assign `value` at a dotted `path`, resolved against the innermost scope
/// that owns the path's first segment.
///
/// The write goes through the reactive wrapper, so dependents are notified.
/// Nothing is validated beyond the path resolving to an assignable place.
pub fn write_path(scopes: &[Value], path: &str, value: impl Into<Value>) -> Result<()> {
    let value = value.into();
    untrack(|| {
        let unresolved = || Error::UnresolvedPath {
            path: path.to_string(),
        };
        let segments = split_path(path.trim()).ok_or_else(unresolved)?;
        let (last, parents) = segments.split_last().ok_or_else(unresolved)?;

        let first = parents.first().unwrap_or(last);
        let owner = scopes
            .iter()
            .rev()
            .find(|scope| has_own(scope, first, false))
            .ok_or_else(unresolved)?;

        let mut target = owner.clone();
        for segment in parents {
            target = member(&target, segment);
        }

        tracing::trace!(path, "writing through model path");
        match &target {
            Value::LiveObject(obj) => obj.set(last, value),
            Value::LiveArray(arr) => {
                let index = last.parse::<usize>().map_err(|_| unresolved())?;
                arr.set(index, value)
            }
            Value::Object(obj) => {
                obj.insert(*last, value);
                Ok(())
            }
            _ => Err(unresolved()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{wrap, Array, Object};
    use crate::reactive::Runtime;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn writes_notify_readers() {
        let rt = Runtime::new();
        let form = wrap(&rt, Object::new().with("user", Object::new().with("name", "ada")).into());
        let scopes = vec![form.clone()];
        let seen = Rc::new(RefCell::new(String::new()));

        let (f, s) = (form.clone(), seen.clone());
        let _effect = rt.effect(move || {
            let user = f.as_reactive_object().map(|o| o.get("user")).unwrap_or_default();
            let name = user.as_reactive_object().map(|u| u.get("name")).unwrap_or_default();
            *s.borrow_mut() = name.to_string();
        });

        write_path(&scopes, "user.name", "grace").unwrap();
        rt.flush_sync();
        assert_eq!(*seen.borrow(), "grace");
    }

    #[test]
    fn resolves_against_owning_scope() {
        let rt = Runtime::new();
        let outer = wrap(&rt, Object::new().with("count", 1).into());
        let inner = wrap(&rt, Object::new().with("item", "x").into());
        let scopes = vec![outer.clone(), inner.clone()];

        write_path(&scopes, "count", 2).unwrap();

        let outer = outer.as_reactive_object().expect("object");
        let inner = inner.as_reactive_object().expect("object");
        assert_eq!(outer.get("count"), Value::from(2));
        assert!(!inner.raw().contains_key("count"));
    }

    #[test]
    fn array_indices_are_assignable() {
        let rt = Runtime::new();
        let state = wrap(
            &rt,
            Object::new()
                .with("rows", Array::from_vec(vec!["a".into(), "b".into()]))
                .into(),
        );

        write_path(&[state.clone()], "rows.1", "B").unwrap();
        let rows = state.as_reactive_object().expect("object").get("rows");
        assert_eq!(rows.as_reactive_array().expect("array").get(1), Value::from("B"));
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let rt = Runtime::new();
        let state = wrap(&rt, Object::new().with("rows", Array::from_vec(vec!["a".into()])).into());

        let result = write_path(&[state.clone()], "rows.18446744073709551615", "x");
        assert!(matches!(result, Err(Error::IndexOutOfRange { .. })));

        let rows = state.as_reactive_object().expect("object").get("rows");
        assert_eq!(rows.as_reactive_array().expect("array").len(), 1);
    }

    #[test]
    fn unresolved_paths_are_errors() {
        let rt = Runtime::new();
        let scopes = vec![wrap(&rt, Object::new().with("n", 1).into())];

        assert!(matches!(write_path(&scopes, "missing", 1), Err(Error::UnresolvedPath { .. })));
        assert!(matches!(write_path(&scopes, "n.deeper", 1), Err(Error::UnresolvedPath { .. })));
        assert!(matches!(write_path(&scopes, "", 1), Err(Error::UnresolvedPath { .. })));
    }
}
