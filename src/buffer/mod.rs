//! A buffer: contents plus the commit stack, chronological change log, and
//! token cache that track its edit history.

pub mod mode;

use crate::contents::Contents;
use crate::edit::{Change, Commit, CommitId, Edit, EditKind};
use crate::error::EditorError;
use crate::token_cache::TokenCache;
use mode::Mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u64);

/// Identifies the command that produced a commit, so a later command of the
/// same identity can decide to merge into it (e.g. consecutive
/// self-insert-char keystrokes collapsing into one undo step).
pub type CommitterId = &'static str;

pub struct Buffer {
    pub id: BufferId,
    pub name: String,
    pub read_only: bool,

    contents: Contents,
    commits: Vec<Commit>,
    commit_index: usize,
    commit_id_counter: u64,
    last_committer: Option<CommitterId>,
    changes: Vec<Change>,
    saved_commit_id: Option<CommitId>,
    pub token_cache: TokenCache,
    pub mode: Mode,
}

impl Buffer {
    pub fn new(id: BufferId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            read_only: false,
            contents: Contents::new(),
            commits: Vec::new(),
            commit_index: 0,
            commit_id_counter: 0,
            last_committer: None,
            changes: Vec::new(),
            saved_commit_id: None,
            token_cache: TokenCache::default(),
            mode: Mode::default(),
        }
    }

    pub fn with_bucket_capacity(id: BufferId, name: impl Into<String>, bucket_capacity: usize) -> Self {
        let mut buffer = Self::new(id, name);
        buffer.contents = Contents::with_bucket_capacity(bucket_capacity);
        buffer
    }

    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    fn generate_commit_id(&mut self) -> CommitId {
        let id = CommitId(self.commit_id_counter);
        self.commit_id_counter += 1;
        id
    }

    pub fn current_commit_id(&self) -> Option<CommitId> {
        if self.commit_index == 0 {
            None
        } else {
            Some(self.commits[self.commit_index - 1].id)
        }
    }

    /// The commit a following edit from the same committer would merge
    /// into, if `check_last_committer` says it's eligible.
    pub fn last_commit(&self) -> Option<&Commit> {
        if self.commit_index == 0 {
            None
        } else {
            Some(&self.commits[self.commit_index - 1])
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.current_commit_id() == self.saved_commit_id
    }

    pub fn mark_saved(&mut self) {
        self.saved_commit_id = self.current_commit_id();
    }

    /// Applies `edits` directly to `contents`, in order.
    fn apply_edits(&mut self, edits: &[Edit]) {
        for edit in edits {
            match edit.kind {
                EditKind::Insert => self.contents.insert(edit.position, edit.value.as_bytes()),
                EditKind::Remove => self.contents.remove(edit.position, edit.len()),
            }
        }
    }

    fn apply_edits_reverse(&mut self, edits: &[Edit]) {
        for edit in edits.iter().rev() {
            let inverse = edit.inverse();
            match inverse.kind {
                EditKind::Insert => self.contents.insert(inverse.position, inverse.value.as_bytes()),
                EditKind::Remove => self.contents.remove(inverse.position, inverse.len()),
            }
        }
    }

    /// Pushes and applies a new commit, discarding any undone commits ahead
    /// of `commit_index`. Returns an error without modifying anything if
    /// the buffer is read-only.
    pub fn commit(&mut self, edits: Vec<Edit>, committer: Option<CommitterId>) -> Result<(), EditorError> {
        if self.read_only {
            return Err(EditorError::read_only());
        }
        if edits.is_empty() {
            return Ok(());
        }

        self.apply_edits(&edits);

        let id = self.generate_commit_id();
        let commit = Commit { edits, id };
        self.commits.truncate(self.commit_index);
        self.commits.push(commit.clone());
        self.commit_index = self.commits.len();
        self.changes.push(Change { commit, is_redo: true });
        self.last_committer = committer;
        Ok(())
    }

    /// Returns true if `committer` matches the committer of the most
    /// recent live commit and `cursor_positions` - the *current* cursor
    /// points, not whatever positions were recorded at commit time - sit
    /// exactly where that commit's edits would have left them (see
    /// `Commit::adjoins_cursors`), meaning the caller's next edit should be
    /// folded into the same commit rather than pushing a new one.
    pub fn check_last_committer(&self, committer: CommitterId, cursor_positions: &[u64]) -> bool {
        match &self.last_committer {
            Some(last) if *last == committer => self
                .last_commit()
                .is_some_and(|commit| commit.adjoins_cursors(cursor_positions)),
            _ => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.commit_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.commit_index < self.commits.len()
    }

    /// Pops the top commit off the stack and reverts its edits. Resets
    /// `last_committer` so a following edit always starts a fresh commit.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.commit_index -= 1;
        let commit = self.commits[self.commit_index].clone();
        self.apply_edits_reverse(&commit.edits);
        self.changes.push(Change { commit, is_redo: false });
        self.last_committer = None;
        true
    }

    /// Re-applies the commit most recently undone.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        let commit = self.commits[self.commit_index].clone();
        self.apply_edits(&commit.edits);
        self.commit_index += 1;
        self.changes.push(Change { commit, is_redo: true });
        self.last_committer = None;
        true
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
