use std::cell::RefCell;
use std::rc::Rc;

use tracing::{trace, warn};
use weft_dom::Node;

use crate::error::Result;
use crate::template::mount_component;
use crate::view::Component;

/// A live set of child components under one parent node.
///
/// A template only mounts the members present at render time; the
/// collection keeps the DOM in sync after that.
pub trait ChildCollection {
    /// `anchor` is the first node rendered after this collection's members,
    /// where members go while the collection has none mounted.
    fn set_parent(&self, parent: &Node, anchor: Option<&Node>);
    fn members(&self) -> Vec<Rc<dyn Component>>;
}

/// Ordered components mounted into a parent element.
#[derive(Default)]
pub struct ViewCollection {
    members: RefCell<Vec<Rc<dyn Component>>>,
    parent: RefCell<Option<Node>>,
    anchor: RefCell<Option<Node>>,
}

impl ViewCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent(&self) -> Option<Node> {
        self.parent.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Rc<dyn Component>> {
        self.members.borrow().get(index).cloned()
    }

    pub fn add(&self, component: Rc<dyn Component>) -> Result<()> {
        self.add_at(self.len(), component)
    }

    /// Insert at `index`, rendering the component first if needed. Indexes
    /// past the end append.
    pub fn add_at(&self, index: usize, component: Rc<dyn Component>) -> Result<()> {
        let len = self.len();
        let index = if index > len {
            warn!(index, len, "add_at past the end of the collection, appending");
            len
        } else {
            index
        };

        let element = mount_component(component.as_ref())?;
        self.members.borrow_mut().insert(index, component);

        if let Some(parent) = self.parent() {
            let reference = self.reference_for(index, &parent);
            trace!(index, "mount collection member");
            parent.insert_before(&element, reference.as_ref());
        }
        Ok(())
    }

    /// The node a member at `index` must be inserted before.
    fn reference_for(&self, index: usize, parent: &Node) -> Option<Node> {
        let members = self.members.borrow();
        let mounted = |member: &Rc<dyn Component>| {
            member
                .element()
                .filter(|el| el.parent_node().is_some_and(|p| p.ptr_eq(parent)))
        };
        if let Some(next) = members.iter().skip(index + 1).find_map(&mounted) {
            return Some(next);
        }
        match members[..index].iter().rev().find_map(&mounted) {
            Some(previous) => previous
                .index_in_parent()
                .and_then(|i| parent.child(i + 1)),
            None => self
                .anchor
                .borrow()
                .clone()
                .filter(|anchor| anchor.parent_node().is_some_and(|p| p.ptr_eq(parent))),
        }
    }

    /// Remove and detach the member at `index`.
    pub fn remove(&self, index: usize) -> Option<Rc<dyn Component>> {
        let len = self.len();
        if index >= len {
            warn!(index, len, "remove past the end of the collection");
            return None;
        }
        let member = self.members.borrow_mut().remove(index);
        self.detach(member.as_ref());
        Some(member)
    }

    pub fn clear(&self) {
        let members = std::mem::take(&mut *self.members.borrow_mut());
        for member in &members {
            self.detach(member.as_ref());
        }
    }

    fn detach(&self, member: &dyn Component) {
        let (Some(parent), Some(element)) = (self.parent(), member.element()) else {
            return;
        };
        if !parent.remove_child(&element) {
            trace!(element = ?element, "collection member was not under its parent");
        }
    }

    /// Destroy every member and forget the parent.
    pub fn destroy(&self) {
        let members = std::mem::take(&mut *self.members.borrow_mut());
        for member in members {
            member.destroy();
        }
        *self.parent.borrow_mut() = None;
        *self.anchor.borrow_mut() = None;
    }
}

impl ChildCollection for ViewCollection {
    fn set_parent(&self, parent: &Node, anchor: Option<&Node>) {
        *self.parent.borrow_mut() = Some(parent.clone());
        *self.anchor.borrow_mut() = anchor.cloned();
    }

    fn members(&self) -> Vec<Rc<dyn Component>> {
        self.members.borrow().clone()
    }
}

impl std::fmt::Debug for ViewCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewCollection")
            .field("len", &self.len())
            .field("parent", &self.parent())
            .finish()
    }
}
