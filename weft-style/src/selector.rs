use std::fmt;

use cssparser::{CowRcStr, ParseErrorKind, Parser, ParserInput, ToCss, serialize_identifier};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::context::{MatchingContext, MatchingMode, QuirksMode};
use selectors::matching::{self, ElementSelectorFlags};
use selectors::parser::SelectorParseErrorKind;
use thiserror::Error;

pub use selectors::OpaqueElement;

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("invalid selector `{selector}`: {reason}")]
    Syntax { selector: String, reason: String },
    #[error("unsupported {what} in selector `{selector}`")]
    Unsupported { selector: String, what: String },
}

/// The view of an element a selector needs in order to match it.
pub trait Element: Clone + fmt::Debug {
    /// Identity of the underlying element; equal for clones of one handle.
    fn opaque(&self) -> OpaqueElement;
    fn local_name(&self) -> String;
    fn namespace(&self) -> String;
    fn attribute(&self, name: &str) -> Option<String>;
    fn parent_element(&self) -> Option<Self>;
    fn prev_sibling_element(&self) -> Option<Self>;
    fn next_sibling_element(&self) -> Option<Self>;
    /// No element children and no non-empty text, as `:empty` sees it.
    fn is_empty(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
struct WeftSelectors;

/// Names, classes, ids and namespace urls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
struct CssIdent(String);

impl<'a> From<&'a str> for CssIdent {
    fn from(s: &'a str) -> Self {
        CssIdent(s.to_string())
    }
}

impl AsRef<str> for CssIdent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssIdent {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        serialize_identifier(&self.0, dest)
    }
}

/// The right-hand side of `[attr=value]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
struct CssValue(String);

impl<'a> From<&'a str> for CssValue {
    fn from(s: &'a str) -> Self {
        CssValue(s.to_string())
    }
}

impl AsRef<str> for CssValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ToCss for CssValue {
    fn to_css<W: fmt::Write>(&self, dest: &mut W) -> fmt::Result {
        use std::fmt::Write;
        write!(cssparser::CssStringWriter::new(dest), "{}", &self.0)
    }
}

/// The DOM has no user-action state, so no non-structural pseudo-class
/// ever parses.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PseudoClass {}

impl selectors::parser::NonTSPseudoClass for PseudoClass {
    type Impl = WeftSelectors;

    fn is_active_or_hover(&self) -> bool {
        match *self {}
    }

    fn is_user_action_state(&self) -> bool {
        match *self {}
    }
}

impl ToCss for PseudoClass {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PseudoElement {}

impl selectors::parser::PseudoElement for PseudoElement {
    type Impl = WeftSelectors;
}

impl ToCss for PseudoElement {
    fn to_css<W: fmt::Write>(&self, _dest: &mut W) -> fmt::Result {
        match *self {}
    }
}

impl selectors::SelectorImpl for WeftSelectors {
    type ExtraMatchingData = ();
    type AttrValue = CssValue;
    type Identifier = CssIdent;
    type LocalName = CssIdent;
    type NamespaceUrl = CssIdent;
    type NamespacePrefix = CssIdent;
    type BorrowedNamespaceUrl = CssIdent;
    type BorrowedLocalName = CssIdent;
    type NonTSPseudoClass = PseudoClass;
    type PseudoElement = PseudoElement;
}

struct WeftParser;

impl<'i> selectors::Parser<'i> for WeftParser {
    type Impl = WeftSelectors;
    type Error = SelectorParseErrorKind<'i>;

    fn parse_is_and_where(&self) -> bool {
        true
    }
}

/// Presents an [`Element`] to the `selectors` matching engine.
#[derive(Clone)]
struct Matched<E>(E);

impl<E: Element> fmt::Debug for Matched<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<E: Element> selectors::Element for Matched<E> {
    type Impl = WeftSelectors;

    fn opaque(&self) -> OpaqueElement {
        self.0.opaque()
    }

    fn parent_element(&self) -> Option<Self> {
        self.0.parent_element().map(Matched)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.0.prev_sibling_element().map(Matched)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.0.next_sibling_element().map(Matched)
    }

    fn is_html_element_in_html_document(&self) -> bool {
        self.0.namespace() == XHTML_NAMESPACE
    }

    fn has_local_name(&self, local_name: &CssIdent) -> bool {
        self.0.local_name() == local_name.0
    }

    fn has_namespace(&self, ns: &CssIdent) -> bool {
        self.0.namespace() == ns.0
    }

    fn is_same_type(&self, other: &Self) -> bool {
        self.0.local_name() == other.0.local_name()
            && self.0.namespace() == other.0.namespace()
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&CssIdent>,
        local_name: &CssIdent,
        operation: &AttrSelectorOperation<&CssValue>,
    ) -> bool {
        // Only attributes without a namespace are visible to selectors.
        if let NamespaceConstraint::Specific(url) = ns {
            if !url.0.is_empty() {
                return false;
            }
        }
        self.0
            .attribute(&local_name.0)
            .is_some_and(|value| operation.eval_str(&value))
    }

    fn match_non_ts_pseudo_class<F>(
        &self,
        pc: &PseudoClass,
        _context: &mut MatchingContext<WeftSelectors>,
        _flags_setter: &mut F,
    ) -> bool
    where
        F: FnMut(&Self, ElementSelectorFlags),
    {
        match *pc {}
    }

    fn match_pseudo_element(
        &self,
        pe: &PseudoElement,
        _context: &mut MatchingContext<WeftSelectors>,
    ) -> bool {
        match *pe {}
    }

    fn is_link(&self) -> bool {
        matches!(self.0.local_name().as_str(), "a" | "area" | "link")
            && self.0.attribute("href").is_some()
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &CssIdent, case_sensitivity: CaseSensitivity) -> bool {
        self.0
            .attribute("id")
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &CssIdent, case_sensitivity: CaseSensitivity) -> bool {
        self.0.attribute("class").is_some_and(|classes| {
            classes
                .split_ascii_whitespace()
                .any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
        })
    }

    fn imported_part(&self, _name: &CssIdent) -> Option<CssIdent> {
        None
    }

    fn is_part(&self, _name: &CssIdent) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn is_root(&self) -> bool {
        self.0.parent_element().is_none()
    }
}

/// A comma separated selector list, as accepted by `Element.matches()`.
///
/// Tree-structural pseudo-classes (`:not()`, `:first-child`, `:nth-child()`,
/// `:is()` ...) are supported; state pseudo-classes and pseudo-elements are
/// not.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    source: String,
    selectors: selectors::SelectorList<WeftSelectors>,
}

impl SelectorList {
    pub fn parse(text: &str) -> Result<SelectorList, SelectorError> {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        let selectors = selectors::SelectorList::parse(&WeftParser, &mut parser).map_err(|e| {
            match e.kind {
                ParseErrorKind::Custom(SelectorParseErrorKind::UnsupportedPseudoClassOrElement(
                    name,
                )) => unsupported(text, &name),
                ParseErrorKind::Custom(kind) => SelectorError::Syntax {
                    selector: text.to_string(),
                    reason: format!("{kind:?}"),
                },
                ParseErrorKind::Basic(kind) => SelectorError::Syntax {
                    selector: text.to_string(),
                    reason: format!("{kind:?}"),
                },
            }
        })?;
        Ok(SelectorList {
            source: text.to_string(),
            selectors,
        })
    }

    pub fn matches<E: Element>(&self, el: &E) -> bool {
        let mut context =
            MatchingContext::new(MatchingMode::Normal, None, None, QuirksMode::NoQuirks);
        matching::matches_selector_list(&self.selectors, &Matched(el.clone()), &mut context)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

fn unsupported(selector: &str, name: &CowRcStr<'_>) -> SelectorError {
    SelectorError::Unsupported {
        selector: selector.to_string(),
        what: format!("pseudo-class or pseudo-element `{}`", &**name),
    }
}
