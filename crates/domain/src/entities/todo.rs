//! Todo entity - the single resource managed by the API

use serde::{Deserialize, Serialize};

use crate::value_objects::TodoId;

/// Caller-supplied fields of a todo item
///
/// Used both to create a todo and to overwrite the mutable fields of an
/// existing one. The identifier is never part of a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDraft {
    /// Free text, may be absent
    pub name: Option<String>,
    /// Completion flag
    pub is_complete: bool,
}

impl TodoDraft {
    /// Create a draft with a name
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            is_complete: false,
        }
    }

    /// Set the completion flag
    #[must_use]
    pub fn completed(mut self, is_complete: bool) -> Self {
        self.is_complete = is_complete;
        self
    }
}

/// A todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Store-assigned identifier, immutable after creation
    pub id: TodoId,
    /// Free text, may be absent
    pub name: Option<String>,
    /// Completion flag
    pub is_complete: bool,
}

impl Todo {
    /// Materialize a draft under a store-assigned identifier
    #[must_use]
    pub fn from_draft(id: TodoId, draft: TodoDraft) -> Self {
        Self {
            id,
            name: draft.name,
            is_complete: draft.is_complete,
        }
    }

    /// Copy the mutable fields of a draft onto this todo
    ///
    /// The identifier is left untouched.
    pub fn apply(&mut self, draft: TodoDraft) {
        self.name = draft.name;
        self.is_complete = draft.is_complete;
    }
}
