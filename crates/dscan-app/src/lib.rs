//! DScan application layer
//!
//! Sits between the metadata store and whatever renders the document list:
//! a repository that moves store work off the caller's context, the state
//! controller that publishes the list and one-shot notices, and the document
//! lifecycle (scan import, rename, delete, share) coordinating the metadata
//! store with managed file storage.

pub mod controller;
pub mod executor;
pub mod lifecycle;
pub mod notices;
pub mod repository;
pub mod scanner;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use controller::AppStateController;
pub use executor::BackgroundExecutor;
pub use lifecycle::DocumentLifecycle;
pub use notices::{notice_channel, NoticeReceiver, NoticeSender};
pub use repository::DocumentRepository;
pub use scanner::{DocumentScanner, PathScanner, ScanOutcome};
pub use state::{Action, ViewState};
