//! Data models for the application
//!
//! `document` holds the persisted metadata record, `resource` the wrappers used to
//! publish fetch status and mutation outcomes to the display layer.

mod document;
mod resource;

pub use document::*;
pub use resource::*;
