use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use weft_core::{EventSource, ListenerId};
use weft_style::{Declarations, Element, OpaqueElement, SelectorError, SelectorList};

use crate::event::{self, DomEvent};
use crate::serialize;

pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// A single attribute on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

enum NodeData {
    Element {
        namespace: String,
        tag: String,
        attrs: RefCell<Vec<Attr>>,
    },
    Text(RefCell<String>),
    Fragment,
}

type Callback = Rc<dyn Fn(&DomEvent)>;

struct DomListener {
    id: ListenerId,
    event_type: String,
    callback: Callback,
    active: Rc<Cell<bool>>,
}

struct NodeInner {
    data: NodeData,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Node>>,
    listeners: RefCell<Vec<DomListener>>,
    next_listener: Cell<u64>,
}

/// A handle to a live DOM node. Clones refer to the same node.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl Node {
    fn from_data(data: NodeData) -> Node {
        Node(Rc::new(NodeInner {
            data,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        }))
    }

    /// An element in the XHTML namespace.
    pub fn element(tag: &str) -> Node {
        Node::element_ns(XHTML_NAMESPACE, tag)
    }

    pub fn element_ns(namespace: &str, tag: &str) -> Node {
        Node::from_data(NodeData::Element {
            namespace: namespace.to_string(),
            tag: tag.to_string(),
            attrs: RefCell::new(Vec::new()),
        })
    }

    pub fn text(data: &str) -> Node {
        Node::from_data(NodeData::Text(RefCell::new(data.to_string())))
    }

    pub fn fragment() -> Node {
        Node::from_data(NodeData::Fragment)
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.data, NodeData::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.data, NodeData::Text(_))
    }

    pub fn is_fragment(&self) -> bool {
        matches!(self.0.data, NodeData::Fragment)
    }

    pub fn tag_name(&self) -> Option<&str> {
        match &self.0.data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn namespace_uri(&self) -> Option<&str> {
        match &self.0.data {
            NodeData::Element { namespace, .. } => Some(namespace),
            _ => None,
        }
    }

    // ---- tree -------------------------------------------------------------

    pub fn parent_node(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    pub fn child_nodes(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    pub fn child(&self, index: usize) -> Option<Node> {
        self.0.children.borrow().get(index).cloned()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.child(0)
    }

    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent_node()?;
        let children = parent.0.children.borrow();
        children.iter().position(|c| c.ptr_eq(self))
    }

    pub fn append_child(&self, child: &Node) {
        self.insert_before(child, None);
    }

    /// Insert `child` before `reference`, or at the end when `reference` is
    /// `None` or not a child of this node. Fragments donate their children.
    pub fn insert_before(&self, child: &Node, reference: Option<&Node>) {
        if self.is_text() {
            tracing::warn!(node = ?self, "text nodes cannot have children");
            return;
        }
        if child.is_fragment() {
            let moved = std::mem::take(&mut *child.0.children.borrow_mut());
            for kid in moved {
                *kid.0.parent.borrow_mut() = Weak::new();
                self.insert_before(&kid, reference);
            }
            return;
        }

        child.remove();
        let mut children = self.0.children.borrow_mut();
        let idx = reference
            .and_then(|r| children.iter().position(|c| c.ptr_eq(r)))
            .unwrap_or(children.len());
        children.insert(idx, child.clone());
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
    }

    /// Returns false when `child` is not a child of this node.
    pub fn remove_child(&self, child: &Node) -> bool {
        let removed = {
            let mut children = self.0.children.borrow_mut();
            let before = children.len();
            children.retain(|c| !c.ptr_eq(child));
            before != children.len()
        };
        if removed {
            *child.0.parent.borrow_mut() = Weak::new();
        }
        removed
    }

    /// Detach from the parent, if any.
    pub fn remove(&self) {
        if let Some(parent) = self.parent_node() {
            parent.remove_child(self);
        }
    }

    // ---- attributes -------------------------------------------------------

    fn attrs(&self) -> Option<&RefCell<Vec<Attr>>> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        let attrs = self.attrs()?.borrow();
        attrs.iter().find(|a| a.name == name).map(|a| a.value.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let Some(attrs) = self.attrs() else { return };
        let mut attrs = attrs.borrow_mut();
        match attrs.iter_mut().find(|a| a.name == name) {
            Some(a) => a.value = value.to_string(),
            None => attrs.push(Attr {
                namespace: None,
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        if let Some(attrs) = self.attrs() {
            let mut attrs = attrs.borrow_mut();
            if let Some(idx) = attrs.iter().position(|a| a.name == name) {
                attrs.remove(idx);
            }
        }
    }

    pub fn get_attribute_ns(&self, namespace: Option<&str>, name: &str) -> Option<String> {
        let attrs = self.attrs()?.borrow();
        attrs
            .iter()
            .find(|a| a.namespace.as_deref() == namespace && a.name == name)
            .map(|a| a.value.clone())
    }

    pub fn set_attribute_ns(&self, namespace: Option<&str>, name: &str, value: &str) {
        let Some(attrs) = self.attrs() else { return };
        let mut attrs = attrs.borrow_mut();
        match attrs
            .iter_mut()
            .find(|a| a.namespace.as_deref() == namespace && a.name == name)
        {
            Some(a) => a.value = value.to_string(),
            None => attrs.push(Attr {
                namespace: namespace.map(str::to_string),
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn remove_attribute_ns(&self, namespace: Option<&str>, name: &str) {
        if let Some(attrs) = self.attrs() {
            attrs
                .borrow_mut()
                .retain(|a| !(a.namespace.as_deref() == namespace && a.name == name));
        }
    }

    pub fn attributes(&self) -> Vec<Attr> {
        self.attrs().map(|a| a.borrow().clone()).unwrap_or_default()
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes().into_iter().map(|a| a.name).collect()
    }

    // ---- text -------------------------------------------------------------

    /// Text data for text nodes, concatenated descendant text otherwise.
    pub fn text_content(&self) -> String {
        match &self.0.data {
            NodeData::Text(data) => data.borrow().clone(),
            _ => self
                .0
                .children
                .borrow()
                .iter()
                .map(Node::text_content)
                .collect(),
        }
    }

    /// On elements, replaces all children with a single text node (or none).
    pub fn set_text_content(&self, text: &str) {
        match &self.0.data {
            NodeData::Text(data) => *data.borrow_mut() = text.to_string(),
            _ => {
                let old = std::mem::take(&mut *self.0.children.borrow_mut());
                for kid in old {
                    *kid.0.parent.borrow_mut() = Weak::new();
                }
                if !text.is_empty() {
                    self.append_child(&Node::text(text));
                }
            }
        }
    }

    // ---- inline style -----------------------------------------------------

    pub fn style_property(&self, name: &str) -> Option<String> {
        let style = self.get_attribute("style")?;
        Declarations::parse(&style).get(name).map(str::to_string)
    }

    pub fn set_style_property(&self, name: &str, value: &str) {
        let mut decls = Declarations::parse(&self.get_attribute("style").unwrap_or_default());
        decls.set(name, value);
        self.set_attribute("style", &decls.to_css_string());
    }

    /// Removing the last declaration drops the `style` attribute.
    pub fn remove_style_property(&self, name: &str) {
        let Some(style) = self.get_attribute("style") else {
            return;
        };
        let mut decls = Declarations::parse(&style);
        if decls.remove(name) {
            if decls.is_empty() {
                self.remove_attribute("style");
            } else {
                self.set_attribute("style", &decls.to_css_string());
            }
        }
    }

    // ---- events -----------------------------------------------------------

    pub fn add_event_listener(
        &self,
        event_type: &str,
        callback: impl Fn(&DomEvent) + 'static,
    ) -> ListenerId {
        self.add_listener_rc(event_type, Rc::new(callback))
    }

    fn add_listener_rc(&self, event_type: &str, callback: Callback) -> ListenerId {
        let id = ListenerId(self.0.next_listener.get());
        self.0.next_listener.set(id.0 + 1);
        self.0.listeners.borrow_mut().push(DomListener {
            id,
            event_type: event_type.to_string(),
            callback,
            active: Rc::new(Cell::new(true)),
        });
        id
    }

    pub fn remove_event_listener(&self, id: ListenerId) {
        self.0.listeners.borrow_mut().retain(|l| {
            if l.id == id {
                l.active.set(false);
                false
            } else {
                true
            }
        });
    }

    /// Number of listeners attached directly to this node.
    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }

    pub(crate) fn listeners_for(&self, event_type: &str) -> Vec<(Callback, Rc<Cell<bool>>)> {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.event_type == event_type)
            .map(|l| (l.callback.clone(), l.active.clone()))
            .collect()
    }

    pub fn dispatch_event(&self, event: DomEvent) -> DomEvent {
        event::dispatch(self, event)
    }

    pub fn click(&self) -> DomEvent {
        self.dispatch_event(DomEvent::new("click"))
    }

    // ---- selectors and serialization ---------------------------------------

    pub fn matches(&self, selector: &str) -> Result<bool, SelectorError> {
        let list = SelectorList::parse(selector)?;
        Ok(self.matches_list(&list))
    }

    pub fn matches_list(&self, list: &SelectorList) -> bool {
        self.is_element() && list.matches(self)
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        serialize::write_node(self, &mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.0.children.borrow().iter() {
            serialize::write_node(child, &mut out);
        }
        out
    }
}

impl Element for Node {
    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(&*self.0)
    }

    fn local_name(&self) -> String {
        self.tag_name().unwrap_or_default().to_string()
    }

    fn namespace(&self) -> String {
        self.namespace_uri().unwrap_or_default().to_string()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn parent_element(&self) -> Option<Self> {
        self.parent_node().filter(Node::is_element)
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        let parent = self.parent_node()?;
        let index = self.index_in_parent()?;
        let siblings = parent.0.children.borrow();
        siblings[..index].iter().rev().find(|n| n.is_element()).cloned()
    }

    fn next_sibling_element(&self) -> Option<Self> {
        let parent = self.parent_node()?;
        let index = self.index_in_parent()?;
        let siblings = parent.0.children.borrow();
        siblings[index + 1..].iter().find(|n| n.is_element()).cloned()
    }

    fn is_empty(&self) -> bool {
        self.0
            .children
            .borrow()
            .iter()
            .all(|child| child.is_text() && child.text_content().is_empty())
    }
}

impl EventSource for Node {
    type Event = DomEvent;

    fn subscribe(&self, event: &str, callback: Rc<dyn Fn(&DomEvent)>) -> ListenerId {
        self.add_listener_rc(event, callback)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.remove_event_listener(id);
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0.data {
            NodeData::Element { tag, .. } => write!(f, "<{tag}>"),
            NodeData::Text(data) => write!(f, "#text {:?}", data.borrow()),
            NodeData::Fragment => f.write_str("#document-fragment"),
        }
    }
}
