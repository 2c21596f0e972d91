//! Tether Core
//!
//! This crate provides the core runtime for the Tether reactive
//! data-binding engine. It implements:
//!
//! - Reactive primitives (observable cells, memos, effects)
//! - Frame-batched scheduling of re-runs
//! - Reactive wrappers over a dynamic object/array data model
//! - Keyed list reconciliation and conditional regions over a host tree
//! - Property and event bindings driven by an expression evaluator
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Core reactive primitives, dependency tracking and scheduling
//! - `data`: The dynamic value model and its reactive wrappers
//! - `render`: Host tree contract, keyed lists and conditional regions
//! - `binding`: Binding descriptors, expression evaluation, two-way writes
//! - `config`, `error`: Runtime configuration and the shared error type
//!
//! Everything is single-threaded: engine types are built on `Rc`/`RefCell`
//! and are not `Send`.
//!
//! # Example
//!
//! ```rust,ignore
//! use tether_core::data::{wrap, Object};
//! use tether_core::reactive::Runtime;
//!
//! let rt = Runtime::new();
//! let state = wrap(&rt, Object::new().with("count", 0).into());
//! let state = state.as_reactive_object().unwrap().clone();
//!
//! let s = state.clone();
//! let _effect = rt.effect(move || {
//!     println!("Count: {}", s.get("count"));
//! });
//!
//! state.set("count", 5)?;
//! rt.flush_sync(); // prints: "Count: 5"
//! ```

pub mod binding;
pub mod config;
pub mod data;
pub mod error;
pub mod reactive;
pub mod render;

pub use config::RuntimeConfig;
pub use data::{wrap, Value};
pub use error::{Error, Result};
pub use reactive::{Effect, Memo, Observable, Runtime};
