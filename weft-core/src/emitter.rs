// weft-core/src/emitter.rs
use std::cell::RefCell;
use std::rc::Rc;

/// Identifies one subscription on an [`EventSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Anything listeners can be attached to: observables and DOM nodes.
pub trait EventSource {
    type Event: 'static;

    fn subscribe(&self, event: &str, callback: Rc<dyn Fn(&Self::Event)>) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
}

/// A handle that detaches one listener.
///
/// Revoking is idempotent: the first call detaches, later calls do nothing.
#[derive(Clone, Default)]
pub struct Revoker {
    inner: Rc<RefCell<Option<Box<dyn FnOnce()>>>>,
}

impl Revoker {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Some(Box::new(f)))),
        }
    }

    pub fn revoke(&self) {
        // Take the closure out first so the detach itself may touch this handle.
        let f = self.inner.borrow_mut().take();
        if let Some(f) = f {
            f();
        }
    }

    pub fn is_revoked(&self) -> bool {
        self.inner.borrow().is_none()
    }
}

impl std::fmt::Debug for Revoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Revoker")
            .field("revoked", &self.is_revoked())
            .finish()
    }
}

#[derive(Default)]
struct EmitterInner {
    subscriptions: RefCell<Vec<Revoker>>,
    destroy_hooks: RefCell<Vec<Box<dyn FnOnce()>>>,
}

/// Owns listener subscriptions so a component can sever all of them at once.
///
/// Subscriptions keep their source alive until revoked; a component that is
/// dropped without [`Emitter::destroy`] leaks its listeners.
#[derive(Clone, Default)]
pub struct Emitter {
    inner: Rc<EmitterInner>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `callback` to `event` on `source` and track the subscription.
    pub fn listen_to<S, F>(&self, source: &S, event: &str, callback: F) -> Revoker
    where
        S: EventSource + Clone + 'static,
        F: Fn(&S::Event) + 'static,
    {
        let id = source.subscribe(event, Rc::new(callback));
        let src = source.clone();
        let revoker = Revoker::new(move || src.unsubscribe(id));

        let mut subs = self.inner.subscriptions.borrow_mut();
        subs.retain(|r| !r.is_revoked());
        subs.push(revoker.clone());
        revoker
    }

    /// Revoke every subscription made through this emitter.
    pub fn stop_listening(&self) {
        let subs = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
        if !subs.is_empty() {
            tracing::trace!(count = subs.len(), "emitter stop listening");
        }
        for revoker in subs {
            revoker.revoke();
        }
    }

    /// Number of subscriptions that have not been revoked yet.
    pub fn live_count(&self) -> usize {
        self.inner
            .subscriptions
            .borrow()
            .iter()
            .filter(|r| !r.is_revoked())
            .count()
    }

    /// Register a hook to run when the owner is destroyed.
    pub fn before_destroy(&self, f: impl FnOnce() + 'static) {
        self.inner.destroy_hooks.borrow_mut().push(Box::new(f));
    }

    /// Run destroy hooks in registration order, then stop listening.
    pub fn destroy(&self) {
        let hooks = std::mem::take(&mut *self.inner.destroy_hooks.borrow_mut());
        for hook in hooks {
            hook();
        }
        self.stop_listening();
    }

    pub fn ptr_eq(&self, other: &Emitter) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("live", &self.live_count())
            .finish()
    }
}
