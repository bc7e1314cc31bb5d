use thiserror::Error;
use weft_style::SelectorError;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("malformed template definition: {definition}")]
    MalformedDefinition { definition: String },

    #[error("cannot extend a template that has already been rendered")]
    ExtendRendered,

    #[error("template has already been rendered")]
    AlreadyRendered,

    #[error("template is already applied to a node; revert it first")]
    AlreadyApplied,

    #[error("revert called without a matching apply")]
    RevertWithoutApply,

    #[error("children mismatch at {path}: definition has {expected}, node has {actual}")]
    ChildrenMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },

    #[error("extension has {actual} children but the template has {expected}")]
    ExtendChildrenMismatch { expected: usize, actual: usize },

    #[error("node at {path} is not {expected} node")]
    NodeKindMismatch { path: String, expected: &'static str },

    #[error("cannot apply a {kind} child at {path}")]
    UnsupportedApplyChild { path: String, kind: &'static str },

    #[error("invalid listener selector in `{key}`")]
    InvalidSelector {
        key: String,
        #[source]
        source: SelectorError,
    },

    #[error("component has no element after rendering")]
    ComponentNotRendered,
}

pub type Result<T> = std::result::Result<T, TemplateError>;
