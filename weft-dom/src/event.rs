use std::cell::Cell;
use std::rc::Rc;

use crate::node::Node;

/// A native DOM event as seen by listeners.
///
/// Clones share the propagation flag, so a listener holding a clone can
/// still stop propagation of the event being dispatched.
#[derive(Clone)]
pub struct DomEvent {
    event_type: String,
    bubbles: bool,
    target: Option<Node>,
    current_target: Option<Node>,
    stopped: Rc<Cell<bool>>,
}

impl DomEvent {
    /// A bubbling event.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles: true,
            target: None,
            current_target: None,
            stopped: Rc::new(Cell::new(false)),
        }
    }

    pub fn non_bubbling(event_type: impl Into<String>) -> Self {
        Self {
            bubbles: false,
            ..Self::new(event_type)
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    /// The node the event was dispatched on.
    pub fn target(&self) -> Option<&Node> {
        self.target.as_ref()
    }

    /// The node whose listener is currently running.
    pub fn current_target(&self) -> Option<&Node> {
        self.current_target.as_ref()
    }

    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl std::fmt::Debug for DomEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomEvent")
            .field("type", &self.event_type)
            .field("target", &self.target)
            .field("bubbles", &self.bubbles)
            .finish()
    }
}

/// Deliver `event` to `target` and, if it bubbles, to each ancestor.
pub(crate) fn dispatch(target: &Node, mut event: DomEvent) -> DomEvent {
    event.target = Some(target.clone());

    let mut path = vec![target.clone()];
    if event.bubbles {
        let mut cur = target.parent_node();
        while let Some(p) = cur {
            cur = p.parent_node();
            path.push(p);
        }
    }

    for node in path {
        let listeners = node.listeners_for(&event.event_type);
        if listeners.is_empty() {
            continue;
        }
        tracing::trace!(event = %event.event_type, node = ?node, count = listeners.len(), "dispatch");
        event.current_target = Some(node.clone());
        for (callback, active) in listeners {
            if active.get() {
                callback(&event);
            }
        }
        if event.is_propagation_stopped() {
            break;
        }
    }

    event.current_target = None;
    event
}
