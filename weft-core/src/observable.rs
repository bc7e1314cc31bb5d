// weft-core/src/observable.rs

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::emitter::{EventSource, ListenerId};
use crate::value::Value;

/// An event delivered to observable listeners.
pub struct EventInfo {
    name: String,
    data: Rc<dyn Any>,
}

impl EventInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Downcast the payload the event was fired with.
    pub fn data<T: 'static>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }
}

/// Payload of every `change:<property>` event.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub property: String,
    pub value: Value,
    pub old_value: Value,
}

struct Listener {
    id: ListenerId,
    event: String,
    callback: Rc<dyn Fn(&EventInfo)>,
    active: Rc<Cell<bool>>,
}

#[derive(Default)]
struct ObservableInner {
    props: RefCell<HashMap<String, Value>>,
    listeners: RefCell<Vec<Listener>>,
    next_id: Cell<u64>,
}

/// A key/value store that announces property changes.
///
/// Cloning yields another handle to the same store. Notifications are
/// synchronous: `set()` returns after every listener has run.
#[derive(Clone, Default)]
pub struct Observable {
    inner: Rc<ObservableInner>,
}

impl Observable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style initial value; does not notify.
    pub fn with(self, property: &str, value: impl Into<Value>) -> Self {
        self.inner
            .props
            .borrow_mut()
            .insert(property.to_string(), value.into());
        self
    }

    /// Current value, `Value::Undefined` when never set.
    pub fn get(&self, property: &str) -> Value {
        self.inner
            .props
            .borrow()
            .get(property)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has(&self, property: &str) -> bool {
        self.inner.props.borrow().contains_key(property)
    }

    /// Assign a property and fire `change:<property>` if the value differs.
    pub fn set(&self, property: &str, value: impl Into<Value>) {
        let value = value.into();
        let old_value = self
            .inner
            .props
            .borrow_mut()
            .insert(property.to_string(), value.clone())
            .unwrap_or_default();
        if old_value == value {
            return;
        }
        self.fire(
            &format!("change:{property}"),
            PropertyChange {
                property: property.to_string(),
                value,
                old_value,
            },
        );
    }

    pub fn on(&self, event: &str, callback: impl Fn(&EventInfo) + 'static) -> ListenerId {
        self.on_rc(event, Rc::new(callback))
    }

    fn on_rc(&self, event: &str, callback: Rc<dyn Fn(&EventInfo)>) -> ListenerId {
        let id = ListenerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner.listeners.borrow_mut().push(Listener {
            id,
            event: event.to_string(),
            callback,
            active: Rc::new(Cell::new(true)),
        });
        id
    }

    pub fn off(&self, id: ListenerId) {
        self.inner.listeners.borrow_mut().retain(|l| {
            if l.id == id {
                l.active.set(false);
                false
            } else {
                true
            }
        });
    }

    /// Fire `event` with `payload`, calling listeners in subscription order.
    pub fn fire<T: Any>(&self, event: &str, payload: T) {
        // Snapshot so callbacks may subscribe, unsubscribe or set re-entrantly.
        let targets: Vec<(Rc<dyn Fn(&EventInfo)>, Rc<Cell<bool>>)> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event)
            .map(|l| (l.callback.clone(), l.active.clone()))
            .collect();
        if targets.is_empty() {
            return;
        }
        tracing::trace!(event, listeners = targets.len(), "observable fire");

        let info = EventInfo {
            name: event.to_string(),
            data: Rc::new(payload),
        };
        for (callback, active) in targets {
            if active.get() {
                callback(&info);
            }
        }
    }

    /// Listeners currently subscribed to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event == event)
            .count()
    }

    pub fn total_listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub fn ptr_eq(&self, other: &Observable) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl EventSource for Observable {
    type Event = EventInfo;

    fn subscribe(&self, event: &str, callback: Rc<dyn Fn(&EventInfo)>) -> ListenerId {
        self.on_rc(event, callback)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.off(id);
    }
}

impl std::fmt::Debug for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("props", &self.inner.props.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}
