//! Incremental tokenizer cache.
//!
//! Re-tokenizing a whole buffer on every keystroke doesn't scale, so the
//! cache keeps a sparse list of checkpoints (`position`, `tokenizer_state`)
//! spaced `token_step` bytes apart. An edit only invalidates the checkpoints
//! whose span it touches; `update` walks those forward from the checkpoint
//! before the edit, re-deriving state until it reconverges with cached
//! checkpoints (or gives up after three checkpoints and truncates the tail,
//! so a pathological edit - e.g. starting a block comment at the top of a
//! huge file - can't stall the caller).

use crate::contents::{Contents, Contents_Iterator};
use crate::edit::{Change, Edit, EditKind};

pub const DEFAULT_TOKEN_STEP: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: u64,
    pub end: u64,
}

/// Supplied by the owning editor front-end; out of scope for this crate's
/// implementation (language grammars are an external concern), but every
/// buffer must have one to drive the token cache.
pub trait Tokenizer: Send + Sync {
    /// Advances `iterator` past the next token and returns it, updating
    /// `state` to reflect the tokenizer's position in e.g. nested comments
    /// or string literals. Returns `None` at end of buffer.
    fn next_token(&self, contents: &Contents, iterator: &mut Contents_Iterator, state: &mut u64) -> Option<Token>;
}

/// A tokenizer that treats the whole buffer as a single token-less span;
/// used for buffers with no language mode and in tests.
pub struct NullTokenizer;

impl Tokenizer for NullTokenizer {
    fn next_token(&self, contents: &Contents, iterator: &mut Contents_Iterator, _state: &mut u64) -> Option<Token> {
        if iterator.at_eob(contents) {
            None
        } else {
            let start = iterator.position;
            *iterator = contents.end();
            Some(Token { start, end: iterator.position })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPoint {
    pub position: u64,
    pub state: u64,
}

#[derive(Debug, Clone)]
pub struct TokenCache {
    token_step: u64,
    change_index: usize,
    check_points: Vec<CheckPoint>,
    ran_to_end: bool,
}

impl TokenCache {
    pub fn new(token_step: u64) -> Self {
        Self {
            token_step,
            change_index: 0,
            check_points: Vec::new(),
            ran_to_end: false,
        }
    }

    pub fn reset(&mut self) {
        self.change_index = 0;
        self.check_points.clear();
        self.ran_to_end = false;
    }

    pub fn check_points(&self) -> &[CheckPoint] {
        &self.check_points
    }

    pub fn change_index(&self) -> usize {
        self.change_index
    }

    pub fn ran_to_end(&self) -> bool {
        self.ran_to_end
    }

    /// Binary-searches for the last checkpoint at or before `position`.
    pub fn find_check_point(&self, position: u64) -> Option<usize> {
        match self.check_points.binary_search_by_key(&position, |cp| cp.position) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        }
    }

    pub fn is_covered(&self, position: u64) -> bool {
        if self.ran_to_end {
            return true;
        }
        let last = self.check_points.last().map(|cp| cp.position).unwrap_or(0);
        position < last + self.token_step
    }

    /// Re-derives checkpoints invalidated by `changes[change_index..]`, in
    /// at most 3 checkpoints of lookahead per dirty span. Returns false if
    /// it had to give up and truncate the cache tail (the caller should
    /// treat this as "made progress, call again").
    pub fn update(&mut self, contents: &Contents, changes: &[Change], tokenizer: &dyn Tokenizer) -> bool {
        let pending = &changes[self.change_index..];
        if pending.is_empty() {
            return true;
        }

        let mut changed = vec![false; self.check_points.len()];
        for i in 1..self.check_points.len() {
            if any_changes_inbetween(pending, self.check_points[i - 1].position, self.check_points[i].position) {
                changed[i] = true;
            }

            let mut pos = self.check_points[i].position;
            crate::edit::position_after_changes(pending, &mut pos);

            if !any_changes_after(pending, self.check_points[i].position) {
                let offset = pos as i64 - self.check_points[i].position as i64;
                for cp in &mut self.check_points[i..] {
                    cp.position = (cp.position as i64 + offset) as u64;
                }
                break;
            }
            self.check_points[i].position = pos;
        }
        self.change_index = changes.len();

        let mut i = 1;
        while i < self.check_points.len() {
            if !changed[i] {
                i += 1;
                continue;
            }

            let mut iterator = contents.iterator_at(self.check_points[i - 1].position);
            let mut end_position = self.check_points[i].position;
            let mut state = self.check_points[i - 1].state;
            let start = i;

            loop {
                if i == start + 3 {
                    self.check_points.truncate(i);
                    self.ran_to_end = false;
                    return false;
                }

                let mut last_token = None;
                while iterator.position < end_position {
                    match tokenizer.next_token(contents, &mut iterator, &mut state) {
                        Some(t) => last_token = Some(t),
                        None => {
                            last_token = None;
                            break;
                        }
                    }
                }

                if last_token.is_none() && iterator.position < end_position {
                    self.check_points.truncate(i);
                    return true;
                }

                if iterator.position != self.check_points[i].position || state != self.check_points[i].state {
                    self.check_points[i].position = iterator.position;
                    self.check_points[i].state = state;
                    i += 1;
                    if i == self.check_points.len() {
                        return true;
                    }
                    end_position = self.check_points[i].position;
                } else {
                    break;
                }
            }
        }

        true
    }

    pub fn generate_check_points_until(&mut self, contents: &Contents, tokenizer: &dyn Tokenizer, position: u64) {
        let (mut state, mut iterator) = if let Some(last) = self.check_points.last() {
            (last.state, contents.iterator_at(last.position))
        } else {
            self.check_points.push(CheckPoint { position: 0, state: 0 });
            (0, contents.start())
        };

        while iterator.position <= position {
            if !self.next_check_point(contents, tokenizer, &mut iterator, &mut state) {
                break;
            }
        }
    }

    /// Advances `iterator`/`state` by tokenizing forward until either
    /// `token_step` bytes have passed (pushing a new checkpoint and
    /// returning true) or end-of-buffer is reached (returning false and
    /// setting `ran_to_end`).
    pub fn next_check_point(&mut self, contents: &Contents, tokenizer: &dyn Tokenizer, iterator: &mut Contents_Iterator, state: &mut u64) -> bool {
        let start_position = iterator.position;
        while !iterator.at_eob(contents) {
            if iterator.position >= start_position + self.token_step {
                self.check_points.push(CheckPoint {
                    position: iterator.position,
                    state: *state,
                });
                return true;
            }
            if tokenizer.next_token(contents, iterator, state).is_none() {
                break;
            }
        }
        self.ran_to_end = true;
        false
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_STEP)
    }
}

fn edit_is_insert(edit: &Edit) -> bool {
    edit.kind == EditKind::Insert
}

fn any_changes_after(changes: &[Change], position: u64) -> bool {
    for change in changes {
        let mut position = position;
        if change.is_redo {
            for edit in &change.commit.edits {
                if edit.position >= position {
                    return true;
                }
                if !edit_is_insert(edit) && edit.position + edit.len() >= position {
                    return true;
                }
                crate::edit::position_after_edits(std::slice::from_ref(edit), &mut position);
            }
        } else {
            for edit in change.commit.edits.iter().rev() {
                if edit.position >= position {
                    return true;
                }
                if edit_is_insert(edit) && edit.position + edit.len() >= position {
                    return true;
                }
                crate::edit::position_before_edits(std::slice::from_ref(edit), &mut position);
            }
        }
    }
    false
}

fn any_changes_inbetween(changes: &[Change], start: u64, end: u64) -> bool {
    for change in changes {
        let (mut start, mut end) = (start, end);
        if change.is_redo {
            for edit in &change.commit.edits {
                let span_end = edit.position + if !edit_is_insert(edit) { edit.len() } else { 0 };
                if edit.position.max(start) <= span_end.min(end) {
                    return true;
                }
                crate::edit::position_after_edits(std::slice::from_ref(edit), &mut start);
                crate::edit::position_after_edits(std::slice::from_ref(edit), &mut end);
            }
        } else {
            for edit in change.commit.edits.iter().rev() {
                let span_end = edit.position + if edit_is_insert(edit) { edit.len() } else { 0 };
                if edit.position.max(start) <= span_end.min(end) {
                    return true;
                }
                crate::edit::position_before_edits(std::slice::from_ref(edit), &mut start);
                crate::edit::position_before_edits(std::slice::from_ref(edit), &mut end);
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "token_cache_tests.rs"]
mod tests;
