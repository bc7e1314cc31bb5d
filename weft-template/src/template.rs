use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace};
use weft_core::{Emitter, Observable, Revoker, Value};
use weft_dom::{Node, XHTML_NAMESPACE};
use weft_style::{Declarations, SelectorList};

use crate::binding::{BindChain, ListenerBinding};
use crate::collection::ChildCollection;
use crate::definition::{Child, Chunk, Definition, Schema, StyleMap};
use crate::error::{Result, TemplateError};
use crate::view::Component;

/// Attributes whose existing value is kept, not replaced, on apply.
const EXTENDABLE: &[&str] = &["class", "style"];

#[derive(Clone)]
enum TemplateChild {
    Template(Template),
    Component(Rc<dyn Component>),
    Collection(Rc<dyn ChildCollection>),
    Node(Node),
}

#[derive(Clone, Default)]
struct Normalized {
    tag: Option<String>,
    ns: Option<String>,
    text: Option<Schema>,
    attributes: Vec<(String, Schema)>,
    listeners: Vec<(String, Vec<ListenerBinding>)>,
    children: Vec<TemplateChild>,
}

impl Normalized {
    fn from_definition(def: Definition) -> Self {
        let children = def
            .children
            .into_iter()
            .map(|child| match child {
                Child::Definition(d) => TemplateChild::Template(Template::new(d)),
                Child::Template(t) => TemplateChild::Template(t),
                Child::Component(c) => TemplateChild::Component(c),
                Child::Collection(c) => TemplateChild::Collection(c),
                Child::Node(n) => TemplateChild::Node(n),
            })
            .collect();
        Normalized {
            tag: def.tag,
            ns: def.ns,
            text: def.text,
            attributes: def.attributes,
            listeners: def.on,
            children,
        }
    }

    fn summary(&self) -> String {
        let mut out = String::from("{");
        if let Some(tag) = &self.tag {
            out.push_str(&format!(" tag: {tag:?}"));
        }
        if let Some(text) = &self.text {
            out.push_str(&format!(" text: {} chunk(s)", text.chunks().len()));
        }
        if !self.attributes.is_empty() {
            let names: Vec<&str> = self.attributes.iter().map(|(n, _)| n.as_str()).collect();
            out.push_str(&format!(" attributes: [{}]", names.join(", ")));
        }
        if !self.listeners.is_empty() {
            let keys: Vec<&str> = self.listeners.iter().map(|(k, _)| k.as_str()).collect();
            out.push_str(&format!(" on: [{}]", keys.join(", ")));
        }
        if !self.children.is_empty() {
            out.push_str(&format!(" children: {}", self.children.len()));
        }
        out.push_str(" }");
        out
    }
}

/// Original attribute value, `None` when the attribute was absent.
struct SavedAttr {
    ns: Option<String>,
    name: String,
    value: Option<String>,
}

/// What a render or apply pass did to one node, mirroring the DOM tree.
#[derive(Default)]
struct RevertRecord {
    text: Option<String>,
    attributes: Vec<SavedAttr>,
    bindings: Vec<Vec<Revoker>>,
    children: Vec<RevertRecord>,
}

impl RevertRecord {
    fn revoke_all(&self) {
        for group in &self.bindings {
            for revoker in group {
                revoker.revoke();
            }
        }
        for child in &self.children {
            child.revoke_all();
        }
    }

    fn restore(self, node: &Node) {
        for group in &self.bindings {
            for revoker in group {
                revoker.revoke();
            }
        }
        if let Some(text) = self.text {
            node.set_text_content(&text);
            return;
        }
        for saved in self.attributes {
            match saved.value {
                Some(value) => node.set_attribute_ns(saved.ns.as_deref(), &saved.name, &value),
                None => node.remove_attribute_ns(saved.ns.as_deref(), &saved.name),
            }
        }
        for (index, child) in self.children.into_iter().enumerate() {
            match node.child(index) {
                Some(dom) => child.restore(&dom),
                None => child.revoke_all(),
            }
        }
    }
}

struct Applied {
    node: Node,
    record: RevertRecord,
}

struct TemplateInner {
    def: RefCell<Normalized>,
    rendered: Cell<bool>,
    applied: RefCell<Option<Applied>>,
}

/// A compiled definition that renders into DOM nodes and keeps them in sync
/// with observable state.
///
/// `Template` is a handle: clones share the same definition and lifecycle,
/// which is how a template nested in several places stays one template.
#[derive(Clone)]
pub struct Template {
    inner: Rc<TemplateInner>,
}

impl Template {
    pub fn new(definition: impl Into<Definition>) -> Self {
        Template {
            inner: Rc::new(TemplateInner {
                def: RefCell::new(Normalized::from_definition(definition.into())),
                rendered: Cell::new(false),
                applied: RefCell::new(None),
            }),
        }
    }

    /// Binding factory for `observable`, with listeners owned by `emitter`.
    pub fn bind(observable: &Observable, emitter: &Emitter) -> BindChain {
        BindChain::new(observable, emitter)
    }

    pub fn is_rendered(&self) -> bool {
        self.inner.rendered.get()
    }

    pub fn ptr_eq(&self, other: &Template) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Build a fresh DOM tree. A template renders at most once.
    pub fn render(&self) -> Result<Node> {
        if self.is_rendered() {
            return Err(TemplateError::AlreadyRendered);
        }
        self.validate_fresh("root", &mut vec![self.clone()])?;
        debug!(template = %self.inner.def.borrow().summary(), "render");

        let mut record = RevertRecord::default();
        match self.render_node(None, &mut record, "root") {
            Ok(node) => Ok(node),
            Err(err) => {
                record.revoke_all();
                Err(err)
            }
        }
    }

    /// Graft this template onto an existing node and remember how to undo it.
    pub fn apply(&self, node: &Node) -> Result<Node> {
        if self.inner.applied.borrow().is_some() {
            return Err(TemplateError::AlreadyApplied);
        }
        self.validate_apply(node, "root")?;
        debug!(template = %self.inner.def.borrow().summary(), node = ?node, "apply");

        let mut record = RevertRecord::default();
        if let Err(err) = self.render_node(Some(node), &mut record, "root") {
            record.restore(node);
            return Err(err);
        }
        *self.inner.applied.borrow_mut() = Some(Applied {
            node: node.clone(),
            record,
        });
        Ok(node.clone())
    }

    /// Undo [`apply`](Self::apply) on the same node: detach every listener
    /// and restore the original text and attributes.
    pub fn revert(&self, node: &Node) -> Result<()> {
        let applied = self.inner.applied.borrow_mut().take();
        match applied {
            Some(applied) if applied.node.ptr_eq(node) => {
                debug!(node = ?node, "revert");
                applied.record.restore(node);
                Ok(())
            }
            Some(applied) => {
                *self.inner.applied.borrow_mut() = Some(applied);
                Err(TemplateError::RevertWithoutApply)
            }
            None => Err(TemplateError::RevertWithoutApply),
        }
    }

    /// Merge `definition` into this template. Only unrendered templates can
    /// be extended.
    pub fn extend(&self, definition: impl Into<Definition>) -> Result<()> {
        let ext = Normalized::from_definition(definition.into());
        self.check_extend(&ext)?;
        debug!(template = %self.inner.def.borrow().summary(), extension = %ext.summary(), "extend");
        self.merge(ext);
        Ok(())
    }

    /// Every component reachable through the definition, depth first.
    /// Collections are not searched.
    pub fn get_views(&self) -> Vec<Rc<dyn Component>> {
        let mut views = Vec::new();
        self.collect_views(&mut views);
        views
    }

    fn collect_views(&self, views: &mut Vec<Rc<dyn Component>>) {
        for child in &self.inner.def.borrow().children {
            match child {
                TemplateChild::Component(c) => views.push(c.clone()),
                TemplateChild::Template(t) => t.collect_views(views),
                TemplateChild::Collection(_) | TemplateChild::Node(_) => {}
            }
        }
    }

    // ---- validation --------------------------------------------------------

    /// `seen` holds every template already placed in the tree being
    /// validated; a handle may occupy one position only.
    fn validate_fresh(&self, path: &str, seen: &mut Vec<Template>) -> Result<()> {
        let def = self.inner.def.borrow();
        if def.tag.is_some() == def.text.is_some() {
            return Err(TemplateError::MalformedDefinition {
                definition: def.summary(),
            });
        }
        validate_entries(&def)?;
        for (index, child) in def.children.iter().enumerate() {
            if let TemplateChild::Template(t) = child {
                if t.is_rendered() || seen.iter().any(|s| s.ptr_eq(t)) {
                    return Err(TemplateError::AlreadyRendered);
                }
                seen.push(t.clone());
                t.validate_fresh(&child_path(path, index), seen)?;
            }
        }
        Ok(())
    }

    fn validate_apply(&self, node: &Node, path: &str) -> Result<()> {
        let def = self.inner.def.borrow();
        if def.tag.is_some() && def.text.is_some() {
            return Err(TemplateError::MalformedDefinition {
                definition: def.summary(),
            });
        }
        if def.text.is_some() {
            if !node.is_text() {
                return Err(TemplateError::NodeKindMismatch {
                    path: path.to_string(),
                    expected: "a text",
                });
            }
            return Ok(());
        }
        if !node.is_element() {
            return Err(TemplateError::NodeKindMismatch {
                path: path.to_string(),
                expected: "an element",
            });
        }
        validate_entries(&def)?;

        for (index, child) in def.children.iter().enumerate() {
            let kind = match child {
                TemplateChild::Template(_) | TemplateChild::Collection(_) => continue,
                TemplateChild::Component(_) => "component",
                TemplateChild::Node(_) => "raw node",
            };
            return Err(TemplateError::UnsupportedApplyChild {
                path: child_path(path, index),
                kind,
            });
        }
        let expected = template_child_count(&def);
        let actual = node.child_count();
        if expected != actual {
            return Err(TemplateError::ChildrenMismatch {
                path: path.to_string(),
                expected,
                actual,
            });
        }

        let mut dom_index = 0;
        for (index, child) in def.children.iter().enumerate() {
            if let TemplateChild::Template(t) = child {
                let Some(dom) = node.child(dom_index) else {
                    return Err(TemplateError::ChildrenMismatch {
                        path: path.to_string(),
                        expected,
                        actual,
                    });
                };
                t.validate_apply(&dom, &child_path(path, index))?;
                dom_index += 1;
            }
        }
        Ok(())
    }

    // ---- rendering ---------------------------------------------------------

    /// Render into `target` when applying, or into a new node.
    fn render_node(
        &self,
        target: Option<&Node>,
        record: &mut RevertRecord,
        path: &str,
    ) -> Result<Node> {
        if target.is_none() && self.is_rendered() {
            return Err(TemplateError::AlreadyRendered);
        }
        let def = self.inner.def.borrow();
        let node = if def.text.is_some() {
            render_text(&def, target, record)
        } else {
            render_element(&def, target, record, path)?
        };
        if target.is_none() {
            self.inner.rendered.set(true);
        }
        Ok(node)
    }

    // ---- extend ------------------------------------------------------------

    fn check_extend(&self, ext: &Normalized) -> Result<()> {
        if self.is_rendered() {
            return Err(TemplateError::ExtendRendered);
        }
        if ext.children.is_empty() {
            return Ok(());
        }
        let def = self.inner.def.borrow();
        if def.children.len() != ext.children.len() {
            return Err(TemplateError::ExtendChildrenMismatch {
                expected: def.children.len(),
                actual: ext.children.len(),
            });
        }
        for (mine, theirs) in def.children.iter().zip(&ext.children) {
            match (mine, theirs) {
                (TemplateChild::Template(a), TemplateChild::Template(b)) => {
                    let other = b.inner.def.borrow().clone();
                    a.check_extend(&other)?;
                }
                _ => {
                    return Err(TemplateError::MalformedDefinition {
                        definition: format!(
                            "{}: only nested definitions can be extended",
                            def.summary()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn merge(&self, ext: Normalized) {
        let mut nested = Vec::new();
        {
            let mut guard = self.inner.def.borrow_mut();
            let def = &mut *guard;
            for (name, schema) in ext.attributes {
                match def.attributes.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, existing)) => existing.append(schema),
                    None => def.attributes.push((name, schema)),
                }
            }
            if let Some(text) = ext.text {
                def.text.get_or_insert_with(Schema::new).append(text);
            }
            for (key, bindings) in ext.listeners {
                match def.listeners.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, existing)) => existing.extend(bindings),
                    None => def.listeners.push((key, bindings)),
                }
            }
            for (mine, theirs) in def.children.iter().zip(ext.children) {
                if let (TemplateChild::Template(a), TemplateChild::Template(b)) = (mine, theirs) {
                    let other = b.inner.def.borrow().clone();
                    nested.push((a.clone(), other));
                }
            }
        }
        for (template, other) in nested {
            template.merge(other);
        }
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("definition", &self.inner.def.borrow().summary())
            .field("rendered", &self.is_rendered())
            .field("applied", &self.inner.applied.borrow().is_some())
            .finish()
    }
}

fn child_path(parent: &str, index: usize) -> String {
    format!("{parent}/{index}")
}

/// DOM children an applied definition claims: one per nested template.
fn template_child_count(def: &Normalized) -> usize {
    def.children
        .iter()
        .filter(|child| matches!(child, TemplateChild::Template(_)))
        .count()
}

/// Checks shared by render and apply: listener selectors and style maps.
fn validate_entries(def: &Normalized) -> Result<()> {
    for (key, _) in &def.listeners {
        parse_listener_key(key)?;
    }
    for (name, schema) in &def.attributes {
        if name == "style" {
            if let Some(Err(reason)) = style_map(schema) {
                return Err(TemplateError::MalformedDefinition {
                    definition: format!("{}: {reason}", def.summary()),
                });
            }
        }
    }
    Ok(())
}

fn parse_listener_key(key: &str) -> Result<(String, Option<Rc<SelectorList>>)> {
    match key.split_once('@') {
        Some((event, selector)) => {
            let list = SelectorList::parse(selector).map_err(|source| {
                TemplateError::InvalidSelector {
                    key: key.to_string(),
                    source,
                }
            })?;
            Ok((event.to_string(), Some(Rc::new(list))))
        }
        None => Ok((key.to_string(), None)),
    }
}

fn render_text(def: &Normalized, target: Option<&Node>, record: &mut RevertRecord) -> Node {
    let node = match target {
        Some(node) => {
            record.text = Some(node.text_content());
            node.clone()
        }
        None => Node::text(""),
    };
    let chunks = def
        .text
        .as_ref()
        .map(|schema| flatten(schema.chunks()))
        .unwrap_or_default();
    if chunks.iter().any(is_binding) {
        record
            .bindings
            .push(bind_group(chunks, Updater::Text(node.clone())));
    } else {
        let text: String = chunks
            .iter()
            .map(|chunk| chunk_value(chunk, &node))
            .filter(Value::is_truthy)
            .map(|value| value.to_dom_string())
            .collect();
        node.set_text_content(&text);
    }
    node
}

fn render_element(
    def: &Normalized,
    target: Option<&Node>,
    record: &mut RevertRecord,
    path: &str,
) -> Result<Node> {
    let applying = target.is_some();
    let node = match (target, &def.tag) {
        (Some(node), _) => node.clone(),
        (None, Some(tag)) => Node::element_ns(def.ns.as_deref().unwrap_or(XHTML_NAMESPACE), tag),
        (None, None) => {
            return Err(TemplateError::MalformedDefinition {
                definition: def.summary(),
            });
        }
    };
    render_attributes(def, &node, applying, record)?;
    render_children(def, &node, applying, record, path)?;
    render_listeners(def, &node, record)?;
    Ok(node)
}

fn render_attributes(
    def: &Normalized,
    node: &Node,
    applying: bool,
    record: &mut RevertRecord,
) -> Result<()> {
    for (name, schema) in &def.attributes {
        if name == "style" {
            if let Some(styles) = style_map(schema) {
                let styles = styles.map_err(|reason| TemplateError::MalformedDefinition {
                    definition: format!("{}: {reason}", def.summary()),
                })?;
                if applying {
                    record.attributes.push(SavedAttr {
                        ns: None,
                        name: name.clone(),
                        value: node.get_attribute("style"),
                    });
                }
                render_style_map(styles, node, record);
                continue;
            }
        }

        let (ns, mut chunks) = split_namespace(schema);
        if applying {
            let current = node.get_attribute_ns(ns.as_deref(), name);
            if let Some(current) = &current {
                if EXTENDABLE.contains(&name.as_str()) {
                    chunks.insert(0, Chunk::Static(Value::Str(extended_prefix(name, current))));
                }
            }
            record.attributes.push(SavedAttr {
                ns: ns.clone(),
                name: name.clone(),
                value: current,
            });
        }

        let updater = Updater::Attribute {
            node: node.clone(),
            ns,
            name: name.clone(),
        };
        if chunks.iter().any(is_binding) {
            record.bindings.push(bind_group(chunks, updater));
        } else {
            let value = evaluate(&chunks, node);
            if value.is_truthy() {
                updater.set(&value);
            }
        }
    }
    Ok(())
}

/// An existing inline style gets its declaration terminated so appended
/// declarations stay separate.
fn extended_prefix(name: &str, current: &str) -> String {
    let trimmed = current.trim_end();
    if name == "style" && !trimmed.is_empty() && !trimmed.ends_with(';') {
        format!("{trimmed};")
    } else {
        current.to_string()
    }
}

/// Each property is its own binding group and never touches its siblings.
fn render_style_map(styles: StyleMap, node: &Node, record: &mut RevertRecord) {
    for (property, schema) in styles {
        let chunks = flatten(schema.chunks());
        let updater = Updater::Style {
            node: node.clone(),
            property,
        };
        if chunks.iter().any(is_binding) {
            record.bindings.push(bind_group(chunks, updater));
        } else {
            let value = evaluate(&chunks, node);
            if value.is_truthy() {
                updater.set(&value);
            }
        }
    }
}

fn render_children(
    def: &Normalized,
    node: &Node,
    applying: bool,
    record: &mut RevertRecord,
    path: &str,
) -> Result<()> {
    if applying {
        let mut dom_index = 0;
        for (index, child) in def.children.iter().enumerate() {
            match child {
                TemplateChild::Template(template) => {
                    let dom = node.child(dom_index).ok_or_else(|| TemplateError::ChildrenMismatch {
                        path: path.to_string(),
                        expected: template_child_count(def),
                        actual: node.child_count(),
                    })?;
                    dom_index += 1;
                    let mut child_record = RevertRecord::default();
                    let result =
                        template.render_node(Some(&dom), &mut child_record, &child_path(path, index));
                    record.children.push(child_record);
                    result?;
                }
                TemplateChild::Collection(_) => {}
                TemplateChild::Component(_) => {
                    return Err(TemplateError::UnsupportedApplyChild {
                        path: child_path(path, index),
                        kind: "component",
                    });
                }
                TemplateChild::Node(_) => {
                    return Err(TemplateError::UnsupportedApplyChild {
                        path: child_path(path, index),
                        kind: "raw node",
                    });
                }
            }
        }
        return Ok(());
    }

    let mut mount = ChildMount::default();
    for (index, child) in def.children.iter().enumerate() {
        match child {
            TemplateChild::Collection(collection) => {
                for member in collection.members() {
                    mount.push(&mount_component(member.as_ref())?);
                }
                mount.collection(collection);
            }
            TemplateChild::Component(component) => {
                mount.push(&mount_component(component.as_ref())?);
            }
            TemplateChild::Node(raw) => mount.push(raw),
            TemplateChild::Template(template) => {
                let mut child_record = RevertRecord::default();
                let result = template.render_node(None, &mut child_record, &child_path(path, index));
                record.children.push(child_record);
                mount.push(&result?);
            }
        }
    }
    mount.finish(node);
    Ok(())
}

/// Fresh children gathered in a fragment, and the collections still waiting
/// for the node that follows them.
#[derive(Default)]
struct ChildMount {
    fragment: Option<Node>,
    collections: Vec<(Rc<dyn ChildCollection>, Option<Node>)>,
    unanchored: usize,
}

impl ChildMount {
    fn push(&mut self, child: &Node) {
        for (_, anchor) in &mut self.collections[self.unanchored..] {
            *anchor = Some(child.clone());
        }
        self.unanchored = self.collections.len();
        self.fragment.get_or_insert_with(Node::fragment).append_child(child);
    }

    fn collection(&mut self, collection: &Rc<dyn ChildCollection>) {
        self.collections.push((collection.clone(), None));
    }

    fn finish(self, parent: &Node) {
        if let Some(fragment) = self.fragment {
            parent.append_child(&fragment);
        }
        for (collection, anchor) in self.collections {
            collection.set_parent(parent, anchor.as_ref());
        }
    }
}

pub(crate) fn mount_component(component: &dyn Component) -> Result<Node> {
    if !component.is_rendered() {
        component.render()?;
    }
    component.element().ok_or(TemplateError::ComponentNotRendered)
}

fn render_listeners(def: &Normalized, node: &Node, record: &mut RevertRecord) -> Result<()> {
    for (key, bindings) in &def.listeners {
        let (event, selector) = parse_listener_key(key)?;
        let revokers = bindings
            .iter()
            .map(|binding| binding.activate(node, &event, selector.clone()))
            .collect();
        record.bindings.push(revokers);
    }
    Ok(())
}

// ---- value schemas ---------------------------------------------------------

/// Where a binding group writes its value.
enum Updater {
    Text(Node),
    Attribute {
        node: Node,
        ns: Option<String>,
        name: String,
    },
    Style {
        node: Node,
        property: String,
    },
}

impl Updater {
    fn node(&self) -> &Node {
        match self {
            Updater::Text(node) => node,
            Updater::Attribute { node, .. } | Updater::Style { node, .. } => node,
        }
    }

    fn set(&self, value: &Value) {
        let value = value.to_dom_string();
        match self {
            Updater::Text(node) => node.set_text_content(&value),
            Updater::Attribute { node, ns, name } => {
                node.set_attribute_ns(ns.as_deref(), name, &value)
            }
            Updater::Style { node, property } => node.set_style_property(property, &value),
        }
    }

    fn remove(&self) {
        match self {
            Updater::Text(node) => node.set_text_content(""),
            Updater::Attribute { node, ns, name } => node.remove_attribute_ns(ns.as_deref(), name),
            Updater::Style { node, property } => node.remove_style_property(property),
        }
    }
}

/// Write the current value now and again whenever a bound property changes.
fn bind_group(chunks: Vec<Chunk>, updater: Updater) -> Vec<Revoker> {
    let chunks = Rc::new(chunks);
    let updater = Rc::new(updater);
    let sync: Rc<dyn Fn()> = {
        let chunks = chunks.clone();
        let updater = updater.clone();
        Rc::new(move || sync_value(&chunks, &updater))
    };
    sync();
    chunks
        .iter()
        .filter_map(|chunk| match chunk {
            Chunk::Binding(binding) => Some(binding.activate(sync.clone())),
            _ => None,
        })
        .collect()
}

fn sync_value(chunks: &[Chunk], updater: &Updater) {
    let value = evaluate(chunks, updater.node());
    trace!(value = %value, "sync");
    if value.is_falsy() {
        updater.remove();
    } else {
        updater.set(&value);
    }
}

/// A lone `if` binding is the value; anything else is space-joined.
fn evaluate(chunks: &[Chunk], node: &Node) -> Value {
    if let [Chunk::Binding(binding)] = chunks {
        if binding.is_if() {
            return binding.value(node);
        }
    }
    chunks
        .iter()
        .map(|chunk| chunk_value(chunk, node))
        .fold(Value::Undefined, join_values)
}

fn chunk_value(chunk: &Chunk, node: &Node) -> Value {
    match chunk {
        Chunk::Static(value) => value.clone(),
        Chunk::Binding(binding) => binding.value(node),
        Chunk::Namespaced { value, .. } => evaluate(value.chunks(), node),
        Chunk::Styles(_) => Value::Undefined,
    }
}

/// Skip falsy values and put one space between the rest, unless whitespace
/// is already there.
fn join_values(acc: Value, next: Value) -> Value {
    if next.is_falsy() {
        return acc;
    }
    if acc.is_falsy() {
        return next;
    }
    let (head, tail) = (acc.to_dom_string(), next.to_dom_string());
    if head.ends_with(char::is_whitespace) || tail.starts_with(char::is_whitespace) {
        Value::Str(head + &tail)
    } else {
        Value::Str(format!("{head} {tail}"))
    }
}

fn is_binding(chunk: &Chunk) -> bool {
    matches!(chunk, Chunk::Binding(_))
}

/// Inline nested namespaced values.
fn flatten(chunks: &[Chunk]) -> Vec<Chunk> {
    let mut out = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        match chunk {
            Chunk::Namespaced { value, .. } => out.extend(flatten(value.chunks())),
            other => out.push(other.clone()),
        }
    }
    out
}

/// The namespace of an attribute comes from its first chunk.
fn split_namespace(schema: &Schema) -> (Option<String>, Vec<Chunk>) {
    match schema.chunks().first() {
        Some(Chunk::Namespaced { ns, .. }) => (Some(ns.clone()), flatten(schema.chunks())),
        _ => (None, flatten(schema.chunks())),
    }
}

/// `None` for a plain `style` string, otherwise the per-property map with
/// static declaration strings folded in.
fn style_map(schema: &Schema) -> Option<std::result::Result<StyleMap, String>> {
    if !schema.chunks().iter().any(|c| matches!(c, Chunk::Styles(_))) {
        return None;
    }
    let mut map: StyleMap = Vec::new();
    let mut put = |property: &str, value: Schema| match map.iter_mut().find(|(p, _)| *p == property) {
        Some((_, existing)) => existing.append(value),
        None => map.push((property.to_string(), value)),
    };
    for chunk in schema.chunks() {
        match chunk {
            Chunk::Styles(properties) => {
                for (property, value) in properties {
                    put(property, value.clone());
                }
            }
            Chunk::Static(value) if value.is_falsy() => {}
            Chunk::Static(value) => {
                for (property, value) in Declarations::parse(&value.to_dom_string()).iter() {
                    put(property, Schema::from(value));
                }
            }
            Chunk::Binding(binding) => {
                return Some(Err(format!(
                    "binding to `{}` mixed into a style map",
                    binding.attribute()
                )));
            }
            Chunk::Namespaced { .. } => {
                return Some(Err("namespaced value mixed into a style map".to_string()));
            }
        }
    }
    Some(Ok(map))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joining_skips_falsy_and_doubles() {
        let join = |values: Vec<Value>| values.into_iter().fold(Value::Undefined, join_values);
        assert_eq!(
            join(vec!["a".into(), Value::Null, "b".into()]),
            Value::from("a b")
        );
        assert_eq!(join(vec!["Value: ".into(), 0.into()]), Value::from("Value: 0"));
        assert_eq!(join(vec![Value::Bool(false), Value::Undefined]), Value::Undefined);
        assert_eq!(join(vec![5.into()]), Value::Int(5));
    }

    #[test]
    fn style_strings_fold_into_the_map() {
        let schema = Schema::from("top: 1px; color: red")
            .push(Chunk::Styles(vec![("color".to_string(), Schema::from("blue"))]));
        let map = style_map(&schema).unwrap().unwrap();
        let names: Vec<&str> = map.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(names, vec!["top", "color"]);
        assert_eq!(map[1].1.chunks().len(), 2);
    }

    #[test]
    fn namespace_comes_from_first_chunk() {
        let schema = Schema::namespaced("urn:x", "a").push("b");
        let (ns, chunks) = split_namespace(&schema);
        assert_eq!(ns.as_deref(), Some("urn:x"));
        assert_eq!(chunks.len(), 2);
    }
}
