//! Error Boundary
//!
//! Every computation body and binding update runs inside an [`ErrorBoundary`]
//! so that one failing computation never halts the rest of the graph. A panic
//! is caught, converted into [`Error::Panicked`] and handed to the configured
//! handler together with an [`ErrorContext`] describing where it happened.
//! A handler that panics itself is caught and logged.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::error::Error;

/// Structured metadata about the computation that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Host element the binding belongs to, if known.
    pub element: Option<String>,
    /// Source expression being evaluated.
    pub expression: Option<String>,
    /// Binding or computation name.
    pub binding: Option<String>,
}

impl ErrorContext {
    /// Context naming only a binding/computation.
    pub fn named(binding: impl Into<String>) -> Self {
        Self {
            binding: Some(binding.into()),
            ..Self::default()
        }
    }

    /// Attach an expression.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    /// Attach a host element description.
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(binding) = &self.binding {
            parts.push(format!("binding={binding}"));
        }
        if let Some(expression) = &self.expression {
            parts.push(format!("expression={expression:?}"));
        }
        if let Some(element) = &self.element {
            parts.push(format!("element={element}"));
        }
        if parts.is_empty() {
            f.write_str("<anonymous>")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

type Handler = Rc<dyn Fn(&Error, &ErrorContext)>;

/// Catches failures of individual computations and reports them.
pub struct ErrorBoundary {
    handler: RefCell<Option<Handler>>,
}

impl ErrorBoundary {
    /// A boundary that logs failures with `tracing`.
    pub fn new() -> Self {
        Self {
            handler: RefCell::new(None),
        }
    }

    /// Replace the failure handler.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&Error, &ErrorContext) + 'static,
    {
        *self.handler.borrow_mut() = Some(Rc::new(handler));
    }

    /// Restore the default logging handler.
    pub fn clear_handler(&self) {
        *self.handler.borrow_mut() = None;
    }

    /// Run `f`, returning `None` if it panicked.
    pub fn guard<R>(&self, context: &ErrorContext, f: impl FnOnce() -> R) -> Option<R> {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => Some(value),
            Err(payload) => {
                let error = Error::Panicked {
                    message: panic_message(payload.as_ref()),
                };
                self.report(&error, context);
                None
            }
        }
    }

    /// Wrap `f` so that every call runs inside this boundary.
    pub fn wrap<F>(self: &Rc<Self>, f: F, context: ErrorContext) -> impl Fn()
    where
        F: Fn() + 'static,
    {
        let boundary = Rc::clone(self);
        move || {
            boundary.guard(&context, &f);
        }
    }

    /// Hand an error to the handler. The handler's own panic is logged and
    /// swallowed.
    pub fn report(&self, error: &Error, context: &ErrorContext) {
        let handler = self.handler.borrow().clone();
        let Some(handler) = handler else {
            tracing::error!(%context, %error, "computation failed");
            return;
        };

        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| handler(error, context))) {
            tracing::error!(
                %context,
                %error,
                handler_panic = %panic_message(payload.as_ref()),
                "error handler panicked"
            );
        }
    }
}

impl Default for ErrorBoundary {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ErrorBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorBoundary")
            .field("custom_handler", &self.handler.borrow().is_some())
            .finish()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
