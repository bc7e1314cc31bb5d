//! A small in-memory DOM: element, text and fragment nodes with attributes,
//! inline style, bubbling events and selector matching.

mod event;
mod node;
mod serialize;

pub use event::DomEvent;
pub use node::{Attr, Node, SVG_NAMESPACE, XHTML_NAMESPACE, XLINK_NAMESPACE};
pub use weft_style::SelectorError;

/// A static description of a DOM tree, handy for building fixtures.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element {
        tag: String,
        props: Props,
        children: Vec<VNode>,
    },
    Text(String),
}

/// Ordered element attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub attrs: Vec<(String, String)>,
}

impl Props {
    pub fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    pub fn set(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        let (k, v) = (k.into(), v.into());
        match self.attrs.iter_mut().find(|(name, _)| *name == k) {
            Some(slot) => slot.1 = v,
            None => self.attrs.push((k, v)),
        }
        self
    }

    pub fn get(&self, k: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name == k)
            .map(|(_, v)| v.as_str())
    }
}

// Allow concise props creation
impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::default()
    }
}
impl From<Vec<(&str, &str)>> for Props {
    fn from(v: Vec<(&str, &str)>) -> Self {
        let mut p = Props::new();
        for (k, v) in v {
            p = p.set(k, v);
        }
        p
    }
}

impl VNode {
    /// Build live DOM nodes for this description.
    pub fn mount(&self) -> Node {
        match self {
            VNode::Text(t) => Node::text(t),
            VNode::Element {
                tag,
                props,
                children,
            } => {
                let el = Node::element(tag);
                for (k, v) in &props.attrs {
                    el.set_attribute(k, v);
                }
                for child in children {
                    el.append_child(&child.mount());
                }
                el
            }
        }
    }
}

pub fn h(tag: impl Into<String>, props: impl Into<Props>, children: Vec<VNode>) -> VNode {
    VNode::Element {
        tag: tag.into(),
        props: props.into(),
        children,
    }
}
pub fn text(t: impl Into<String>) -> VNode {
    VNode::Text(t.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_tree() {
        let node = h(
            "div",
            vec![("class", "app")],
            vec![text("hello"), h("span", (), vec![text("world")])],
        );
        if let VNode::Element {
            tag,
            props,
            children,
        } = &node
        {
            assert_eq!(tag, "div");
            assert_eq!(props.get("class"), Some("app"));
            assert_eq!(children.len(), 2);
        } else {
            panic!("expected element");
        }

        let live = node.mount();
        assert_eq!(
            live.outer_html(),
            "<div class=\"app\">hello<span>world</span></div>"
        );
    }
}
