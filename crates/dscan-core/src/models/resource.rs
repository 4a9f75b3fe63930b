use serde::{Deserialize, Serialize};

/// Fetch status published to the display layer.
///
/// `Idle` only exists before the first subscription; once loading has started
/// the value moves between `Loading`, `Success`, and `Error` and never returns to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Resource<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource::Idle
    }
}

impl<T> Resource<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Resource::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    /// Payload of a `Success`, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Message of an `Error`, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Resource::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Outcome of a single mutation, delivered once as transient feedback (a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(message) | Notice::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}
