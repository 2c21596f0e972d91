//! A region that shows a single node while a condition holds.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::host::HostTree;
use super::Rendered;
use crate::reactive::{untrack, Effect, ErrorContext, Runtime};

struct Mounted<N> {
    node: N,
    cleanup: Option<Box<dyn FnOnce()>>,
}

struct ConditionalState<H: HostTree> {
    runtime: Runtime,
    host: Rc<H>,
    anchor: H::Node,
    template: Box<dyn Fn() -> Rendered<H::Node>>,
    mounted: RefCell<Option<Mounted<H::Node>>>,
    context: ErrorContext,
}

impl<H: HostTree> ConditionalState<H> {
    fn apply(&self, show: bool) {
        let is_mounted = self.mounted.borrow().is_some();
        match (show, is_mounted) {
            (true, false) => self.mount(),
            (false, true) => self.unmount(),
            _ => {}
        }
    }

    fn mount(&self) {
        let Some(parent) = self.host.parent(&self.anchor) else {
            tracing::warn!("conditional anchor is detached; nothing mounted");
            return;
        };
        let Some(rendered) = self
            .runtime
            .boundary()
            .guard(&self.context, || (self.template)())
        else {
            return;
        };

        let reference = self.host.next_sibling(&self.anchor);
        self.host
            .insert_before(&parent, &rendered.node, reference.as_ref());
        *self.mounted.borrow_mut() = Some(Mounted {
            node: rendered.node,
            cleanup: rendered.cleanup,
        });
    }

    fn unmount(&self) {
        let Some(mounted) = self.mounted.borrow_mut().take() else {
            return;
        };
        self.host.remove(&mounted.node);
        if let Some(cleanup) = mounted.cleanup {
            self.runtime.boundary().guard(&self.context, cleanup);
        }
    }
}

/// A region holding the template's node right after `anchor` while the
/// condition is true.
pub struct Conditional<H: HostTree + 'static> {
    state: Rc<ConditionalState<H>>,
    effect: Effect,
}

impl<H: HostTree + 'static> Conditional<H> {
    pub fn mount<C, T>(runtime: &Runtime, host: Rc<H>, anchor: H::Node, condition: C, template: T) -> Self
    where
        C: Fn() -> bool + 'static,
        T: Fn() -> Rendered<H::Node> + 'static,
    {
        let context = ErrorContext::named("conditional").with_element(format!("{anchor:?}"));
        let state = Rc::new(ConditionalState {
            runtime: runtime.clone(),
            host,
            anchor,
            template: Box::new(template),
            mounted: RefCell::new(None),
            context: context.clone(),
        });

        let body = state.clone();
        let effect = Effect::with_context(runtime, context, move || {
            let show = condition();
            untrack(|| body.apply(show));
        });
        Self { state, effect }
    }

    pub fn is_mounted(&self) -> bool {
        self.state.mounted.borrow().is_some()
    }

    /// The mounted node, if any.
    pub fn node(&self) -> Option<H::Node> {
        self.state.mounted.borrow().as_ref().map(|m| m.node.clone())
    }

    /// Stop reacting and unmount. Idempotent.
    pub fn stop(&self) {
        self.effect.stop();
        self.state.unmount();
    }
}

impl<H: HostTree + 'static> fmt::Debug for Conditional<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conditional")
            .field("anchor", &self.state.anchor)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Observable;
    use crate::render::{MemoryTree, NodeId};
    use std::cell::Cell;

    #[test]
    fn toggles_node_after_anchor() {
        let rt = Runtime::new();
        let tree = Rc::new(MemoryTree::new());
        let root = tree.create_element("div");
        let anchor = tree.create_placeholder("if");
        let tail = tree.create_text("tail");
        tree.append_child(root, anchor);
        tree.append_child(root, tail);

        let visible = Observable::new(false);
        let cleaned = Rc::new(Cell::new(0));
        let (v, t, c) = (visible.clone(), tree.clone(), cleaned.clone());
        let region = Conditional::mount(&rt, tree.clone(), anchor, move || v.get(), move || {
            let c = c.clone();
            Rendered::new(t.create_text("shown")).with_cleanup(move || c.set(c.get() + 1))
        });
        assert!(!region.is_mounted());

        visible.set(true);
        rt.flush_sync();
        assert_eq!(tree.labels(root), vec!["<if>", "shown", "tail"]);
        let node: Option<NodeId> = region.node();
        assert!(node.is_some());

        visible.set(false);
        rt.flush_sync();
        assert_eq!(tree.labels(root), vec!["<if>", "tail"]);
        assert_eq!(cleaned.get(), 1);

        visible.set(true);
        rt.flush_sync();
        region.stop();
        region.stop();
        assert_eq!(tree.labels(root), vec!["<if>", "tail"]);
        assert_eq!(cleaned.get(), 2);
    }
}
