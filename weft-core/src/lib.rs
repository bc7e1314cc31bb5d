//! Observable state and listener lifetime primitives shared by the weft crates.

pub mod emitter;
pub mod observable;
pub mod value;

pub use emitter::{Emitter, EventSource, ListenerId, Revoker};
pub use observable::{EventInfo, Observable, PropertyChange};
pub use value::Value;
