//! Inline style declarations and the selector subset used for event delegation.

mod declarations;
mod selector;

pub use declarations::Declarations;
pub use selector::{Element, OpaqueElement, SelectorError, SelectorList};
