use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, warn};
use weft_core::{Emitter, Observable};
use weft_dom::Node;

use crate::binding::BindChain;
use crate::collection::ViewCollection;
use crate::definition::Definition;
use crate::error::{Result, TemplateError};
use crate::template::Template;

/// What a template needs from a component it mounts as a child.
pub trait Component {
    fn is_rendered(&self) -> bool;
    fn render(&self) -> Result<()>;
    /// The root element, available once rendered.
    fn element(&self) -> Option<Node>;
    fn destroy(&self) {}
}

/// A component built from one template, with its own state and listener
/// lifetime.
pub struct View {
    state: Observable,
    emitter: Emitter,
    template: RefCell<Option<Template>>,
    element: RefCell<Option<Node>>,
    rendered: Cell<bool>,
    collections: RefCell<Vec<Rc<ViewCollection>>>,
}

impl Default for View {
    fn default() -> Self {
        Self::with_state(Observable::new())
    }
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: Observable) -> Self {
        View {
            state,
            emitter: Emitter::new(),
            template: RefCell::new(None),
            element: RefCell::new(None),
            rendered: Cell::new(false),
            collections: RefCell::new(Vec::new()),
        }
    }

    pub fn state(&self) -> &Observable {
        &self.state
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Bindings to this view's state, owned by this view's emitter.
    pub fn bind_template(&self) -> BindChain {
        Template::bind(&self.state, &self.emitter)
    }

    /// Replaces any previous template. Has no effect once rendered.
    pub fn set_template(&self, definition: impl Into<Definition>) -> Template {
        let template = Template::new(definition);
        if self.rendered.get() {
            warn!("set_template on a rendered view is ignored");
            return template;
        }
        *self.template.borrow_mut() = Some(template.clone());
        template
    }

    pub fn template(&self) -> Option<Template> {
        self.template.borrow().clone()
    }

    /// A collection destroyed together with this view.
    pub fn create_collection(&self) -> Rc<ViewCollection> {
        let collection = Rc::new(ViewCollection::new());
        self.collections.borrow_mut().push(collection.clone());
        collection
    }

    pub fn render(&self) -> Result<()> {
        if self.rendered.get() {
            return Err(TemplateError::AlreadyRendered);
        }
        let template = self.template();
        if let Some(template) = template {
            let element = template.render()?;
            *self.element.borrow_mut() = Some(element);
        }
        self.rendered.set(true);
        Ok(())
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered.get()
    }

    pub fn element(&self) -> Option<Node> {
        self.element.borrow().clone()
    }

    /// Sever every listener this view owns, then destroy its collections and
    /// the child views of its template.
    pub fn destroy(&self) {
        debug!(element = ?self.element(), "destroy view");
        self.emitter.destroy();

        let collections = std::mem::take(&mut *self.collections.borrow_mut());
        for collection in collections {
            collection.destroy();
        }
        if let Some(template) = self.template() {
            for child in template.get_views() {
                child.destroy();
            }
        }
    }
}

impl Component for View {
    fn is_rendered(&self) -> bool {
        View::is_rendered(self)
    }

    fn render(&self) -> Result<()> {
        View::render(self)
    }

    fn element(&self) -> Option<Node> {
        View::element(self)
    }

    fn destroy(&self) {
        View::destroy(self)
    }
}

impl std::fmt::Debug for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("element", &self.element())
            .field("rendered", &self.rendered.get())
            .field("emitter", &self.emitter)
            .finish()
    }
}
