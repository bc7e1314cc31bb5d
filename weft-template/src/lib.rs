//! Declarative templates rendered into the weft DOM and kept in sync with
//! observable state.
//!
//! A [`Definition`] describes elements, text, attributes, listeners and
//! children. [`Template::render`] builds fresh nodes; [`Template::apply`]
//! grafts the same bindings onto existing nodes and [`Template::revert`]
//! undoes that exactly. Values are [`Schema`]s: static chunks and
//! [`TemplateBinding`]s made with [`Template::bind`].

mod binding;
mod collection;
mod definition;
mod error;
mod template;
mod view;

pub use binding::{
    BindChain, BindingCallback, BindingKind, ListenerAction, ListenerBinding, TemplateBinding,
};
pub use collection::{ChildCollection, ViewCollection};
pub use definition::{Child, Chunk, Definition, Schema, StyleMap};
pub use error::{Result, TemplateError};
pub use template::Template;
pub use view::{Component, View};
