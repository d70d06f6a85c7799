//! A builder for a `Commit`.
//!
//! The caller must hold the buffer's write lock for the transaction's
//! entire lifetime; `Transaction` itself doesn't take the lock; it just
//! assumes the `&mut Buffer` it was handed proves the caller already has
//! it. Pushing edits is cheap and allocation-free until `commit` actually
//! applies them, mirroring how the original ties edit storage to a save
//! point in the buffer's commit arena that it can roll back by simply not
//! committing.

use crate::buffer::{Buffer, CommitterId};
use crate::edit::Edit;
use crate::error::EditorError;

pub struct Transaction<'a> {
    buffer: &'a mut Buffer,
    edits: Vec<Edit>,
    committer: Option<CommitterId>,
    committed: bool,
}

impl<'a> Transaction<'a> {
    pub fn new(buffer: &'a mut Buffer) -> Self {
        Self {
            buffer,
            edits: Vec::new(),
            committer: None,
            committed: false,
        }
    }

    /// Appends `edit` to the pending commit. Edits are applied in the
    /// order they were pushed.
    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Marks this transaction as coming from `committer`, letting a future
    /// transaction from the same committer whose cursors adjoin this one's
    /// edits (see `Commit::adjoins_cursors`) merge into it instead of
    /// pushing a new undo step.
    pub fn set_committer(&mut self, committer: CommitterId) {
        self.committer = Some(committer);
    }

    pub fn last_edit_value(&self) -> Option<&Edit> {
        self.edits.last()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies the accumulated edits to the buffer as one commit.
    pub fn commit(mut self) -> Result<(), EditorError> {
        let edits = std::mem::take(&mut self.edits);
        let committer = self.committer.take();
        self.committed = true;
        self.buffer.commit(edits, committer)
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.edits.is_empty() {
            tracing::debug!(
                discarded_edits = self.edits.len(),
                "transaction dropped without committing"
            );
        }
    }
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
