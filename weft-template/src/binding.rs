use std::rc::Rc;

use tracing::trace;
use weft_core::{Emitter, Observable, Revoker, Value};
use weft_dom::{DomEvent, Node};
use weft_style::SelectorList;

/// Transform applied to a bound property before it reaches the DOM.
pub type BindingCallback = Rc<dyn Fn(&Value, &Node) -> Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind {
    /// Pass the property value through.
    To,
    /// `false` when the property is falsy, otherwise `value_if_true` (or `true`).
    If { value_if_true: Option<Value> },
}

/// Links one attribute, style property or text node to a property of an
/// [`Observable`]. The emitter owns the resulting listener.
#[derive(Clone)]
pub struct TemplateBinding {
    observable: Observable,
    emitter: Emitter,
    attribute: String,
    kind: BindingKind,
    callback: Option<BindingCallback>,
}

impl TemplateBinding {
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn kind(&self) -> &BindingKind {
        &self.kind
    }

    pub fn observable(&self) -> &Observable {
        &self.observable
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub(crate) fn is_if(&self) -> bool {
        matches!(self.kind, BindingKind::If { .. })
    }

    /// Current value for `node`, after the callback and the `if` rule.
    pub fn value(&self, node: &Node) -> Value {
        let raw = self.observable.get(&self.attribute);
        let value = match &self.callback {
            Some(callback) => callback(&raw, node),
            None => raw,
        };
        match &self.kind {
            BindingKind::To => value,
            BindingKind::If { value_if_true } => {
                if value.is_falsy() {
                    Value::Bool(false)
                } else {
                    value_if_true.clone().unwrap_or(Value::Bool(true))
                }
            }
        }
    }

    /// Run `on_change` whenever the bound property changes.
    pub(crate) fn activate(&self, on_change: Rc<dyn Fn()>) -> Revoker {
        let attribute = self.attribute.clone();
        self.emitter.listen_to(
            &self.observable,
            &format!("change:{}", self.attribute),
            move |_| {
                trace!(attribute = %attribute, "binding recompute");
                on_change();
            },
        )
    }
}

impl std::fmt::Debug for TemplateBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateBinding")
            .field("attribute", &self.attribute)
            .field("kind", &self.kind)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[derive(Clone)]
pub enum ListenerAction {
    /// Re-fire the DOM event on the observable under this name.
    Emit(String),
    Callback(Rc<dyn Fn(&DomEvent)>),
}

/// What happens when a DOM event reaches a template listener.
#[derive(Clone)]
pub struct ListenerBinding {
    observable: Observable,
    emitter: Emitter,
    action: ListenerAction,
}

impl ListenerBinding {
    pub fn action(&self) -> &ListenerAction {
        &self.action
    }

    pub(crate) fn activate(
        &self,
        node: &Node,
        event: &str,
        selector: Option<Rc<SelectorList>>,
    ) -> Revoker {
        let observable = self.observable.clone();
        let action = self.action.clone();
        self.emitter.listen_to(node, event, move |evt: &DomEvent| {
            if let Some(selector) = &selector {
                if !evt.target().is_some_and(|t| t.matches_list(selector)) {
                    return;
                }
            }
            match &action {
                ListenerAction::Emit(name) => {
                    trace!(event = evt.event_type(), emit = %name, "template listener");
                    observable.fire(name, evt.clone());
                }
                ListenerAction::Callback(callback) => callback(evt),
            }
        })
    }
}

impl From<TemplateBinding> for ListenerBinding {
    fn from(binding: TemplateBinding) -> Self {
        ListenerBinding {
            observable: binding.observable,
            emitter: binding.emitter,
            action: ListenerAction::Emit(binding.attribute),
        }
    }
}

impl std::fmt::Debug for ListenerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match &self.action {
            ListenerAction::Emit(name) => format!("emit {name}"),
            ListenerAction::Callback(_) => "callback".to_string(),
        };
        f.debug_struct("ListenerBinding")
            .field("action", &action)
            .finish()
    }
}

/// Factory returned by [`Template::bind`](crate::Template::bind).
#[derive(Clone, Debug)]
pub struct BindChain {
    observable: Observable,
    emitter: Emitter,
}

impl BindChain {
    pub fn new(observable: &Observable, emitter: &Emitter) -> Self {
        Self {
            observable: observable.clone(),
            emitter: emitter.clone(),
        }
    }

    fn binding(
        &self,
        attribute: &str,
        kind: BindingKind,
        callback: Option<BindingCallback>,
    ) -> TemplateBinding {
        TemplateBinding {
            observable: self.observable.clone(),
            emitter: self.emitter.clone(),
            attribute: attribute.to_string(),
            kind,
            callback,
        }
    }

    /// Track `attribute` as is. In an `on(..)` position this names the
    /// event fired on the observable instead.
    pub fn to(&self, attribute: &str) -> TemplateBinding {
        self.binding(attribute, BindingKind::To, None)
    }

    pub fn to_with(
        &self,
        attribute: &str,
        callback: impl Fn(&Value, &Node) -> Value + 'static,
    ) -> TemplateBinding {
        self.binding(attribute, BindingKind::To, Some(Rc::new(callback)))
    }

    /// A falsy `value_if_true` means plain `true`.
    pub fn if_(&self, attribute: &str, value_if_true: impl Into<Value>) -> TemplateBinding {
        self.binding(attribute, if_kind(value_if_true.into()), None)
    }

    pub fn if_with(
        &self,
        attribute: &str,
        value_if_true: impl Into<Value>,
        callback: impl Fn(&Value, &Node) -> Value + 'static,
    ) -> TemplateBinding {
        self.binding(
            attribute,
            if_kind(value_if_true.into()),
            Some(Rc::new(callback)),
        )
    }

    /// Call `callback` with the native event.
    pub fn to_callback(&self, callback: impl Fn(&DomEvent) + 'static) -> ListenerBinding {
        ListenerBinding {
            observable: self.observable.clone(),
            emitter: self.emitter.clone(),
            action: ListenerAction::Callback(Rc::new(callback)),
        }
    }
}

fn if_kind(value: Value) -> BindingKind {
    BindingKind::If {
        value_if_true: value.is_truthy().then_some(value),
    }
}
