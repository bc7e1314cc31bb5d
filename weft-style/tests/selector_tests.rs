use std::collections::HashMap;
use std::rc::Rc;

use weft_style::{Element, OpaqueElement, SelectorError, SelectorList};

// A tiny owned tree so selectors can be exercised without a DOM.
#[derive(Clone, Debug)]
struct El(Rc<ElData>);

#[derive(Debug)]
struct ElData {
    tag: &'static str,
    attrs: HashMap<&'static str, &'static str>,
    parent: Option<El>,
}

impl El {
    fn new(tag: &'static str, attrs: &[(&'static str, &'static str)], parent: Option<&El>) -> El {
        El(Rc::new(ElData {
            tag,
            attrs: attrs.iter().copied().collect(),
            parent: parent.cloned(),
        }))
    }
}

impl Element for El {
    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(&*self.0)
    }
    fn local_name(&self) -> String {
        self.0.tag.to_string()
    }
    fn namespace(&self) -> String {
        "http://www.w3.org/1999/xhtml".to_string()
    }
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.attrs.get(name).map(|v| v.to_string())
    }
    fn parent_element(&self) -> Option<Self> {
        self.0.parent.clone()
    }
    fn prev_sibling_element(&self) -> Option<Self> {
        None
    }
    fn next_sibling_element(&self) -> Option<Self> {
        None
    }
    fn is_empty(&self) -> bool {
        true
    }
}

#[test]
fn compound_type_and_class() {
    let sel = SelectorList::parse("button.action").unwrap();
    let button = El::new("button", &[("class", "ck action")], None);
    let span = El::new("span", &[("class", "action")], None);
    assert!(sel.matches(&button));
    assert!(!sel.matches(&span));
}

#[test]
fn id_and_attribute_selectors() {
    let el = El::new("input", &[("id", "name"), ("type", "text"), ("rel", "a b")], None);
    assert!(SelectorList::parse("#name").unwrap().matches(&el));
    assert!(SelectorList::parse("[type]").unwrap().matches(&el));
    assert!(SelectorList::parse("[type=text]").unwrap().matches(&el));
    assert!(SelectorList::parse("input[type=\"text\"]").unwrap().matches(&el));
    assert!(SelectorList::parse("[rel~=b]").unwrap().matches(&el));
    assert!(!SelectorList::parse("[type=checkbox]").unwrap().matches(&el));
}

#[test]
fn descendant_and_child_combinators() {
    let root = El::new("div", &[("class", "toolbar")], None);
    let group = El::new("section", &[], Some(&root));
    let button = El::new("button", &[], Some(&group));

    assert!(SelectorList::parse(".toolbar button").unwrap().matches(&button));
    assert!(SelectorList::parse("section > button").unwrap().matches(&button));
    assert!(!SelectorList::parse(".toolbar > button").unwrap().matches(&button));
}

#[test]
fn selector_lists_match_any() {
    let el = El::new("span", &[], None);
    assert!(SelectorList::parse("button, span").unwrap().matches(&el));
    assert!(SelectorList::parse("*").unwrap().matches(&el));
}

#[test]
fn negation_and_attribute_operators() {
    let el = El::new("a", &[("href", "https://x.test/doc.pdf"), ("class", "Nav")], None);
    assert!(SelectorList::parse("a:not(.active)").unwrap().matches(&el));
    assert!(!SelectorList::parse("a:not([href])").unwrap().matches(&el));
    assert!(SelectorList::parse("[href^=https]").unwrap().matches(&el));
    assert!(SelectorList::parse("[href$=\".pdf\"]").unwrap().matches(&el));
    assert!(SelectorList::parse("[class=nav i]").unwrap().matches(&el));
    assert!(!SelectorList::parse(".nav").unwrap().matches(&el));
}

#[test]
fn keeps_its_source_text() {
    assert_eq!(SelectorList::parse("li > a, b").unwrap().as_str(), "li > a, b");
}

#[test]
fn rejects_bad_input() {
    assert!(matches!(
        SelectorList::parse("a:hover"),
        Err(SelectorError::Unsupported { .. })
    ));
    assert!(matches!(
        SelectorList::parse("p::before"),
        Err(SelectorError::Unsupported { .. })
    ));
    assert!(matches!(SelectorList::parse(""), Err(SelectorError::Syntax { .. })));
    assert!(matches!(SelectorList::parse("a >"), Err(SelectorError::Syntax { .. })));
    assert!(matches!(SelectorList::parse("a,"), Err(SelectorError::Syntax { .. })));
}
