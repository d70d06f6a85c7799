//! Single edits, the commits that group them, and the chronological change
//! log built from undo/redo. Also the rebase algorithm that keeps a pending,
//! unmerged edit's position correct as other clients' commits land ahead of
//! it in a buffer's commit stack.

use crate::small_string::SmallString;

/// Which side of `position` an insert lands on when another edit's position
/// exactly coincides with it. Mirrors mag's `AFTER_POSITION`/`BEFORE_POSITION`
/// edit flag: an insert `BeforePosition` pushes a point sitting exactly at
/// `position` forward, since the inserted bytes land before it; `AfterPosition`
/// leaves such a point in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditBoundary {
    BeforePosition,
    AfterPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insert,
    Remove,
}

/// One atomic change to a buffer's contents: insert `value` at `position`,
/// or remove `value.len()` bytes starting at `position` (in which case
/// `value` records what was removed, so the edit can be inverted for undo).
#[derive(Debug, Clone)]
pub struct Edit {
    pub value: SmallString,
    pub position: u64,
    pub kind: EditKind,
    pub boundary: EditBoundary,
}

impl Edit {
    pub fn insert(position: u64, value: impl Into<SmallString>) -> Self {
        Self {
            value: value.into(),
            position,
            kind: EditKind::Insert,
            boundary: EditBoundary::BeforePosition,
        }
    }

    pub fn remove(position: u64, value: impl Into<SmallString>) -> Self {
        Self {
            value: value.into(),
            position,
            kind: EditKind::Remove,
            boundary: EditBoundary::AfterPosition,
        }
    }

    pub fn len(&self) -> u64 {
        self.value.len() as u64
    }

    pub fn is_insert(&self) -> bool {
        self.kind == EditKind::Insert
    }

    /// The edit that undoes this one.
    pub fn inverse(&self) -> Self {
        Self {
            value: self.value.clone(),
            position: self.position,
            kind: match self.kind {
                EditKind::Insert => EditKind::Remove,
                EditKind::Remove => EditKind::Insert,
            },
            boundary: self.boundary,
        }
    }
}

fn position_after_insert_after(position: u64, len: u64, point: &mut u64) {
    if *point > position {
        *point += len;
    }
}

fn position_after_insert_before(position: u64, len: u64, point: &mut u64) {
    if *point >= position {
        *point += len;
    }
}

fn position_after_remove(position: u64, len: u64, point: &mut u64) {
    if *point >= position {
        if *point >= position + len {
            *point -= len;
        } else {
            *point = position;
        }
    }
}

/// Advances `position` forward through the effect of applying `edits` in
/// order, as when a point needs to track a commit being redone.
pub fn position_after_edits(edits: &[Edit], position: &mut u64) {
    for edit in edits {
        match edit.kind {
            EditKind::Insert => match edit.boundary {
                EditBoundary::AfterPosition => {
                    position_after_insert_after(edit.position, edit.len(), position)
                }
                EditBoundary::BeforePosition => {
                    position_after_insert_before(edit.position, edit.len(), position)
                }
            },
            EditKind::Remove => position_after_remove(edit.position, edit.len(), position),
        }
    }
}

/// Pushes `position` backward through the effect of undoing `edits`, walking
/// them in reverse order.
pub fn position_before_edits(edits: &[Edit], position: &mut u64) {
    for edit in edits.iter().rev() {
        match edit.kind {
            EditKind::Insert => position_after_remove(edit.position, edit.len(), position),
            EditKind::Remove => match edit.boundary {
                EditBoundary::AfterPosition => {
                    position_after_insert_after(edit.position, edit.len(), position)
                }
                EditBoundary::BeforePosition => {
                    position_after_insert_before(edit.position, edit.len(), position)
                }
            },
        }
    }
}

/// A unique, monotonically increasing id assigned to each commit pushed onto
/// a buffer's commit stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(pub u64);

/// A set of edits applied together. Think of a git commit: editing the
/// buffer pushes a `Commit` onto the stack, undo pops it, redo re-pushes it.
#[derive(Debug, Clone)]
pub struct Commit {
    pub edits: Vec<Edit>,
    pub id: CommitId,
}

impl Commit {
    /// True if `cursor_positions` is exactly where each of this commit's
    /// edits would have left a cursor that tracked it: right after the
    /// inserted text for an insert, or at the removal point for a remove.
    /// A following keystroke whose cursors satisfy this against the buffer's
    /// most recent commit is the one allowed to fold into it instead of
    /// starting a new undo step.
    pub fn adjoins_cursors(&self, cursor_positions: &[u64]) -> bool {
        self.edits.len() == cursor_positions.len()
            && self.edits.iter().zip(cursor_positions).all(|(edit, &point)| {
                if edit.is_insert() {
                    edit.position + edit.len() == point
                } else {
                    edit.position == point
                }
            })
    }
}

/// A chronological log entry: every undo and every redo appends one,
/// distinct from the commit stack itself. Listeners (a window's cursor
/// tracking, the token cache) replay this log to stay in sync without
/// caring whether a commit is live or has been undone.
#[derive(Debug, Clone)]
pub struct Change {
    pub commit: Commit,
    pub is_redo: bool,
}

impl Change {
    pub fn position_after(&self, position: &mut u64) {
        if self.is_redo {
            position_after_edits(&self.commit.edits, position);
        } else {
            position_before_edits(&self.commit.edits, position);
        }
    }

    pub fn position_before(&self, position: &mut u64) {
        if self.is_redo {
            position_before_edits(&self.commit.edits, position);
        } else {
            position_after_edits(&self.commit.edits, position);
        }
    }
}

pub fn position_after_changes(changes: &[Change], position: &mut u64) {
    for change in changes {
        change.position_after(position);
    }
}

pub fn position_before_changes(changes: &[Change], position: &mut u64) {
    for change in changes.iter().rev() {
        change.position_before(position);
    }
}

/// True if applying `change` actually inserts bytes at `edit`'s position:
/// redoing an insert, or undoing a remove.
fn is_applying_insert(change: &Change, edit: &Edit) -> bool {
    change.is_redo == edit.is_insert()
}

/// How much `current_position` shifts as a result of `previous` being
/// applied by `previous_change`, when `allow_merge_insert` is false (the
/// only mode this crate exercises; merge-insert would let a still-pending
/// insert at the same point interleave with the landed one instead of
/// being pushed wholly before or after it).
fn offset_relative(previous_change: &Change, previous: &Edit, current_position: u64) -> i64 {
    if is_applying_insert(previous_change, previous) {
        if current_position >= previous.position {
            previous.len() as i64
        } else {
            0
        }
    } else if current_position >= previous.position {
        -(previous.len() as i64)
    } else {
        0
    }
}

/// Rebases `unmerged_edit` against one edit from an already-merged change.
/// Returns true if the two conflict (their ranges overlap), in which case
/// the caller should drop the unmerged edit instead of applying it.
fn offset_unmerged_edit_by_merged_edit(merged_change: &Change, merged_edit: &Edit, unmerged_edit: &mut Edit) -> bool {
    let conflicts = if is_applying_insert(merged_change, merged_edit) {
        unmerged_edit.position <= merged_edit.position
            && unmerged_edit.position + unmerged_edit.len() >= merged_edit.position
    } else {
        unmerged_edit.position <= merged_edit.position + merged_edit.len()
            && unmerged_edit.position + unmerged_edit.len() >= merged_edit.position
    };
    if conflicts {
        return true;
    }

    let offset = offset_relative(merged_change, merged_edit, unmerged_edit.position);
    unmerged_edit.position = (unmerged_edit.position as i64 + offset) as u64;
    false
}

/// Rebases `unmerged_edit` against every change in `merged_changes`, in the
/// order those changes actually landed. Returns true if any merged edit's
/// range overlaps the unmerged one, meaning it can no longer be applied
/// cleanly and the caller must discard it.
pub fn offset_unmerged_edit_by_merged_changes(merged_changes: &[Change], unmerged_edit: &mut Edit) -> bool {
    for merged_change in merged_changes {
        let edits = &merged_change.commit.edits;
        if merged_change.is_redo {
            for merged_edit in edits.iter() {
                if offset_unmerged_edit_by_merged_edit(merged_change, merged_edit, unmerged_edit) {
                    return true;
                }
            }
        } else {
            for merged_edit in edits.iter().rev() {
                if offset_unmerged_edit_by_merged_edit(merged_change, merged_edit, unmerged_edit) {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "edit_tests.rs"]
mod tests;
