//! View state and its reducer.
//!
//! Presentation flags live in one value owned by the controller and change
//! only through [`ViewState::reduce`]. The document list itself is published
//! separately as a [`dscan_core::Resource`].

use dscan_core::DocumentRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub dark_mode: bool,
    pub rename_dialog_open: bool,
    /// Document the rename dialog was opened for.
    pub rename_target: Option<DocumentRecord>,
    /// The live document list has not delivered its first result yet.
    pub list_loading: bool,
    /// Mutations started but not yet finished. Each one clears its own share.
    pub pending_mutations: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetDarkMode(bool),
    OpenRenameDialog(DocumentRecord),
    DismissRenameDialog,
    ListLoading(bool),
    MutationStarted,
    MutationFinished,
}

impl ViewState {
    pub fn with_dark_mode(dark_mode: bool) -> Self {
        Self {
            dark_mode,
            ..Self::default()
        }
    }

    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::SetDarkMode(enabled) => self.dark_mode = enabled,
            Action::OpenRenameDialog(record) => {
                self.rename_dialog_open = true;
                self.rename_target = Some(record);
            }
            Action::DismissRenameDialog => {
                self.rename_dialog_open = false;
                self.rename_target = None;
            }
            Action::ListLoading(loading) => self.list_loading = loading,
            Action::MutationStarted => self.pending_mutations += 1,
            Action::MutationFinished => {
                self.pending_mutations = self.pending_mutations.saturating_sub(1)
            }
        }
        self
    }

    /// Whether any loading indicator should be shown.
    pub fn is_loading(&self) -> bool {
        self.list_loading || self.pending_mutations > 0
    }
}
