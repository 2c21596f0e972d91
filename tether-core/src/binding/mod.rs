//! Bindings between reactive data and a host.
//!
//! A markup parser (outside this crate) produces [`BindingDescriptor`]s. A
//! property binding re-evaluates its expression inside an [`Effect`] and
//! hands the result to the host; an event binding evaluates its expression
//! when the host fires the event. [`write_path`] is the view-to-model half
//! of a two-way binding.

mod eval;
mod model;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use eval::{evaluate_or_undefined, Evaluator, PathEvaluator};
pub use model::write_path;

use crate::data::{Object, Value};
use crate::reactive::{untrack, Effect, ErrorContext, Runtime};

/// What a binding does with its expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    /// Keep a host property in sync with the expression's value.
    Property,
    /// Evaluate the expression when the host fires the event.
    Event,
}

/// One binding as produced by a markup parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDescriptor {
    pub name: String,
    pub expression: String,
    pub kind: BindingKind,
}

impl BindingDescriptor {
    pub fn property(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            kind: BindingKind::Property,
        }
    }

    pub fn event(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            kind: BindingKind::Event,
        }
    }

    fn error_context(&self) -> ErrorContext {
        ErrorContext::named(self.name.clone()).with_expression(self.expression.clone())
    }
}

/// Bind a host property: evaluate the descriptor's expression inside an
/// effect and pass every result to `apply`.
///
/// Evaluation errors are logged and applied as `undefined`. `apply` itself
/// runs untracked.
pub fn bind_property<A>(
    runtime: &Runtime,
    evaluator: Rc<dyn Evaluator>,
    descriptor: &BindingDescriptor,
    scopes: Vec<Value>,
    apply: A,
) -> Effect
where
    A: Fn(Value) + 'static,
{
    if descriptor.kind != BindingKind::Property {
        tracing::warn!(binding = %descriptor.name, "event binding bound as a property");
    }

    let expression = descriptor.expression.clone();
    Effect::with_context(runtime, descriptor.error_context(), move || {
        let value = evaluate_or_undefined(evaluator.as_ref(), &expression, &scopes);
        untrack(|| apply(value));
    })
}

/// Build an event handler for the descriptor. The handler evaluates the
/// expression with an extra innermost scope holding `$event`, untracked and
/// inside the runtime's error boundary, and returns the result (`undefined`
/// on failure).
pub fn bind_event(
    runtime: &Runtime,
    evaluator: Rc<dyn Evaluator>,
    descriptor: &BindingDescriptor,
    scopes: Vec<Value>,
) -> impl Fn(Value) -> Value {
    let boundary = runtime.boundary().clone();
    let context = descriptor.error_context();
    let expression = descriptor.expression.clone();

    move |event: Value| {
        let mut frame = scopes.clone();
        frame.push(Value::from(Object::new().with("$event", event)));
        untrack(|| {
            boundary
                .guard(&context, || {
                    evaluate_or_undefined(evaluator.as_ref(), &expression, &frame)
                })
                .unwrap_or_default()
        })
    }
}
