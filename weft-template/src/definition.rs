use std::rc::Rc;

use weft_core::Value;
use weft_dom::Node;

use crate::binding::{ListenerBinding, TemplateBinding};
use crate::collection::{ChildCollection, ViewCollection};
use crate::template::Template;
use crate::view::{Component, View};

/// CSS property name to value schema, in declaration order.
pub type StyleMap = Vec<(String, Schema)>;

/// One piece of a value schema.
#[derive(Clone, Debug)]
pub enum Chunk {
    Static(Value),
    Binding(TemplateBinding),
    /// Only meaningful as the first chunk of an attribute schema.
    Namespaced { ns: String, value: Schema },
    /// Only meaningful in the `style` attribute.
    Styles(StyleMap),
}

/// An ordered list of chunks whose values are joined into one attribute,
/// style property or text value.
#[derive(Clone, Debug, Default)]
pub struct Schema(Vec<Chunk>);

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespaced(ns: &str, value: impl Into<Schema>) -> Self {
        Schema(vec![Chunk::Namespaced {
            ns: ns.to_string(),
            value: value.into(),
        }])
    }

    pub fn push(mut self, chunk: impl Into<Chunk>) -> Self {
        self.0.push(chunk.into());
        self
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_binding(&self) -> bool {
        self.0.iter().any(|chunk| match chunk {
            Chunk::Binding(_) => true,
            Chunk::Namespaced { value, .. } => value.has_binding(),
            Chunk::Styles(map) => map.iter().any(|(_, v)| v.has_binding()),
            Chunk::Static(_) => false,
        })
    }

    pub(crate) fn append(&mut self, other: Schema) {
        self.0.extend(other.0);
    }
}

/// Build a [`Schema`] from mixed static values and bindings.
///
/// ```ignore
/// Definition::text(schema!["Value: ", bind.to("count")])
/// ```
#[macro_export]
macro_rules! schema {
    ($($chunk:expr),* $(,)?) => {
        $crate::Schema::from(vec![$($crate::Chunk::from($chunk)),*])
    };
}

macro_rules! chunk_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Chunk {
                fn from(v: $ty) -> Self {
                    Chunk::Static(Value::from(v))
                }
            }

            impl From<$ty> for Schema {
                fn from(v: $ty) -> Self {
                    Schema(vec![Chunk::from(v)])
                }
            }
        )*
    };
}

chunk_from!(&str, String, &String, bool, i32, i64, f64);

impl From<Value> for Chunk {
    fn from(v: Value) -> Self {
        Chunk::Static(v)
    }
}

impl From<Value> for Schema {
    fn from(v: Value) -> Self {
        Schema(vec![Chunk::Static(v)])
    }
}

impl From<TemplateBinding> for Chunk {
    fn from(b: TemplateBinding) -> Self {
        Chunk::Binding(b)
    }
}

impl From<TemplateBinding> for Schema {
    fn from(b: TemplateBinding) -> Self {
        Schema(vec![Chunk::Binding(b)])
    }
}

impl From<Chunk> for Schema {
    fn from(c: Chunk) -> Self {
        Schema(vec![c])
    }
}

impl From<Vec<Chunk>> for Schema {
    fn from(v: Vec<Chunk>) -> Self {
        Schema(v)
    }
}

impl From<Vec<&str>> for Schema {
    fn from(v: Vec<&str>) -> Self {
        Schema(v.into_iter().map(Chunk::from).collect())
    }
}

/// Anything that can sit in a definition's children list.
#[derive(Clone)]
pub enum Child {
    Definition(Definition),
    Template(Template),
    Component(Rc<dyn Component>),
    Collection(Rc<dyn ChildCollection>),
    Node(Node),
}

impl Child {
    pub fn component(component: Rc<dyn Component>) -> Self {
        Child::Component(component)
    }

    pub fn collection(collection: Rc<dyn ChildCollection>) -> Self {
        Child::Collection(collection)
    }
}

impl From<Definition> for Child {
    fn from(d: Definition) -> Self {
        Child::Definition(d)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Definition(Definition::text(text))
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Definition(Definition::text(text))
    }
}

impl From<Template> for Child {
    fn from(t: Template) -> Self {
        Child::Template(t)
    }
}

impl From<Node> for Child {
    fn from(n: Node) -> Self {
        Child::Node(n)
    }
}

impl From<Rc<View>> for Child {
    fn from(v: Rc<View>) -> Self {
        Child::Component(v)
    }
}

impl From<Rc<ViewCollection>> for Child {
    fn from(c: Rc<ViewCollection>) -> Self {
        Child::Collection(c)
    }
}

/// The ergonomic input a [`Template`] is built from.
///
/// Element definitions carry a tag, text definitions carry text chunks.
/// Definitions with neither can still be applied to an existing element or
/// used to extend a template.
#[derive(Clone, Default)]
pub struct Definition {
    pub(crate) tag: Option<String>,
    pub(crate) ns: Option<String>,
    pub(crate) text: Option<Schema>,
    pub(crate) attributes: Vec<(String, Schema)>,
    pub(crate) on: Vec<(String, Vec<ListenerBinding>)>,
    pub(crate) children: Vec<Child>,
}

impl Definition {
    /// Neither element nor text.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_string()),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<Schema>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Element namespace, XHTML when unset.
    pub fn ns(mut self, ns: &str) -> Self {
        self.ns = Some(ns.to_string());
        self
    }

    /// Add to an attribute schema. Repeated names append chunks.
    pub fn attr(mut self, name: &str, value: impl Into<Schema>) -> Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, schema)) => schema.append(value),
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    pub fn attr_ns(self, ns: &str, name: &str, value: impl Into<Schema>) -> Self {
        self.attr(name, Schema::namespaced(ns, value))
    }

    /// Set one property of the `style` attribute, which then renders
    /// property by property instead of as a single string.
    pub fn style(mut self, property: &str, value: impl Into<Schema>) -> Self {
        let value = value.into();
        let idx = match self.attributes.iter().position(|(n, _)| n == "style") {
            Some(idx) => idx,
            None => {
                self.attributes.push(("style".to_string(), Schema::new()));
                self.attributes.len() - 1
            }
        };
        let chunks = &mut self.attributes[idx].1.0;
        if !matches!(chunks.last(), Some(Chunk::Styles(_))) {
            chunks.push(Chunk::Styles(Vec::new()));
        }
        if let Some(Chunk::Styles(map)) = chunks.last_mut() {
            match map.iter_mut().find(|(p, _)| p == property) {
                Some((_, schema)) => schema.append(value),
                None => map.push((property.to_string(), value)),
            }
        }
        self
    }

    /// Listen for `key`, either `"event"` or `"event@selector"`.
    pub fn on(mut self, key: &str, binding: impl Into<ListenerBinding>) -> Self {
        let binding = binding.into();
        match self.on.iter_mut().find(|(k, _)| k == key) {
            Some((_, list)) => list.push(binding),
            None => self.on.push((key.to_string(), vec![binding])),
        }
        self
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Set text chunks regardless of whether a tag is set.
    pub fn with_text(mut self, text: impl Into<Schema>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl From<&str> for Definition {
    fn from(text: &str) -> Self {
        Definition::text(text)
    }
}

impl From<String> for Definition {
    fn from(text: String) -> Self {
        Definition::text(text)
    }
}
