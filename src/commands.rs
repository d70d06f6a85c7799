//! Editing primitives and the registry that maps a command name to its
//! function pointer. Everything here operates on a `Client`'s selected
//! window; multi-cursor edits are applied in position order with a running
//! byte offset, since `Transaction::push` expects each edit's position to
//! already account for the edits pushed before it.

use crate::buffer::CommitterId;
use crate::client::Client;
use crate::contents::Contents;
use crate::edit::Edit;
use crate::editor::Editor;
use crate::error::{EditorError, Result};
use crate::key::Key;
use crate::transaction::Transaction;
use std::collections::HashMap;

/// A command's signature: the editor (read-only - commands reach buffers
/// through the client's windows, not the editor's buffer table) plus the
/// client whose selected window it acts on, plus the keys that dispatched
/// it.
pub type CommandFn = fn(&Editor, &mut Client, &[Key]) -> Result<()>;

/// Maps command names to their implementations. Built once at `Editor::new`
/// time with the builtins below; a front-end may register more.
pub struct CommandRegistry(HashMap<String, CommandFn>);

impl CommandRegistry {
    pub fn new() -> Self {
        let mut commands = HashMap::new();
        for (name, f) in builtins() {
            commands.insert(name.to_string(), f);
        }
        Self(commands)
    }

    pub fn register(&mut self, name: impl Into<String>, f: CommandFn) {
        self.0.insert(name.into(), f);
    }

    pub fn get(&self, name: &str) -> Option<CommandFn> {
        self.0.get(name).copied()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn builtins() -> Vec<(&'static str, CommandFn)> {
    vec![
        ("save-buffer", save_buffer),
        ("quit", quit),
        ("stop-action", stop_action),
        ("undo", undo),
        ("redo", redo),
        ("delete-backward-char", delete_backward_char),
        ("delete-forward-char", delete_forward_char),
        ("insert-newline", insert_newline),
        ("split-window-vertical", split_window_vertical),
        ("split-window-horizontal", split_window_horizontal),
        ("cycle-window", cycle_window),
    ]
}

const SELF_INSERT_COMMITTER: CommitterId = "self-insert-char";
const DELETE_BACKWARD_COMMITTER: CommitterId = "delete-backward-char";

/// The longest a merged self-insert/delete-backward payload is allowed to
/// grow before a following keystroke starts a fresh undo step instead.
const MERGE_PAYLOAD_LIMIT: usize = 64;

fn word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn chars_mergeable(previous: char, next: char) -> bool {
    previous == next || (word_char(previous) && word_char(next))
}

/// The byte position of the char boundary immediately before `position`,
/// stepping back over any UTF-8 continuation bytes. `Contents` is purely
/// byte-oriented, so every caller that steps by "one character" goes
/// through this instead of subtracting 1.
fn prev_char_boundary(contents: &Contents, position: u64) -> u64 {
    let mut it = contents.iterator_at(position);
    if it.at_bob() {
        return position;
    }
    it.retreat_one(contents);
    while !it.at_bob() && it.get(contents) & 0b1100_0000 == 0b1000_0000 {
        it.retreat_one(contents);
    }
    it.position
}

fn next_char_boundary(contents: &Contents, position: u64) -> u64 {
    let mut it = contents.iterator_at(position);
    if it.at_eob(contents) {
        return position;
    }
    it.advance_one(contents);
    while !it.at_eob(contents) && it.get(contents) & 0b1100_0000 == 0b1000_0000 {
        it.advance_one(contents);
    }
    it.position
}

/// The line-start position for `position`: the byte right after the nearest
/// preceding newline, or the start of the buffer if there is none.
fn line_start(contents: &Contents, position: u64) -> u64 {
    let mut pos = position;
    while pos > 0 {
        let prev = prev_char_boundary(contents, pos);
        if contents.get_once(prev) == b'\n' {
            break;
        }
        pos = prev;
    }
    pos
}

/// The rendered column of `position` on its line, expanding tabs to the next
/// multiple of `tab_width`.
fn visual_column(contents: &Contents, position: u64, tab_width: u32) -> u32 {
    let mut column: u32 = 0;
    let mut pos = line_start(contents, position);
    while pos < position {
        if contents.get_once(pos) == b'\t' {
            column = (column / tab_width + 1) * tab_width;
        } else {
            column += 1;
        }
        pos = next_char_boundary(contents, pos);
    }
    column
}

/// Whether inserting a space at `position` would complete a run of
/// `tab_width` spaces ending on a tab-column boundary, and so should replace
/// that run with a single tab byte.
fn completes_tab_run(contents: &Contents, position: u64, tab_width: u32) -> bool {
    if tab_width <= 1 {
        return false;
    }
    let column = visual_column(contents, position, tab_width);
    if (column + 1) % tab_width != 0 {
        return false;
    }
    let run_len = u64::from(tab_width - 1);
    if u64::from(column) < run_len {
        return false;
    }
    let mut pos = position;
    for _ in 0..run_len {
        let prev = prev_char_boundary(contents, pos);
        if prev == pos || contents.get_once(prev) != b' ' {
            return false;
        }
        pos = prev;
    }
    true
}

/// Inserts `ch` at every cursor in the selected window, merging into the
/// previous commit when it was also a self-insert at the same cursor
/// positions with short, compatible payloads. A space that completes a run
/// of spaces equal to the tab width on a tab-column boundary collapses that
/// run into a single tab byte instead, when tabs are enabled.
pub fn self_insert_char(editor: &Editor, client: &mut Client, ch: char) -> Result<()> {
    let handle = client
        .selected_window()
        .buffer_handle
        .upgrade()
        .ok_or_else(EditorError::buffer_killed)?;
    let mut buffer = handle.lock_writing();
    if buffer.read_only {
        return Err(EditorError::read_only());
    }

    let mut cursor_positions: Vec<u64> = client.selected_window().cursors.iter().map(|c| c.point).collect();
    cursor_positions.sort_unstable();

    if ch == ' ' && !editor.config.expand_tabs {
        let tab_width = editor.config.tab_width;
        let mut offset: i64 = 0;
        let collapses: Vec<bool> = cursor_positions
            .iter()
            .map(|&point| {
                let position = (point as i64 + offset) as u64;
                let collapse = completes_tab_run(buffer.contents(), position, tab_width);
                offset += if collapse { 2 - tab_width as i64 } else { 1 };
                collapse
            })
            .collect();

        if collapses.iter().any(|&collapse| collapse) {
            let mut tx = Transaction::new(&mut buffer);
            let mut offset: i64 = 0;
            for (&point, collapse) in cursor_positions.iter().zip(&collapses) {
                let position = (point as i64 + offset) as u64;
                if *collapse {
                    let run_len = u64::from(tab_width - 1);
                    let start = position - run_len;
                    tx.push(Edit::remove(start, " ".repeat(run_len as usize)));
                    tx.push(Edit::insert(start, "\t"));
                    offset += 2 - tab_width as i64;
                } else {
                    tx.push(Edit::insert(position, " "));
                    offset += 1;
                }
            }
            tx.set_committer(SELF_INSERT_COMMITTER);
            tx.commit()?;
            client.selected_window_mut().update_cursors(&buffer);
            return Ok(());
        }
    }

    let mut inserted = [0u8; 4];
    let ch_str = ch.encode_utf8(&mut inserted);

    let merge_candidate = buffer.check_last_committer(SELF_INSERT_COMMITTER, &cursor_positions).then(|| {
        buffer.last_commit().filter(|commit| {
            commit.edits.iter().all(|edit| {
                edit.is_insert()
                    && edit.value.len() < MERGE_PAYLOAD_LIMIT
                    && edit.value.as_str().chars().next_back().is_some_and(|last| chars_mergeable(last, ch))
            })
        })
    });

    if let Some(Some(commit)) = merge_candidate {
        let previous_edits = commit.edits.clone();
        buffer.undo();
        let mut tx = Transaction::new(&mut buffer);
        let mut offset: i64 = 0;
        for edit in previous_edits {
            let mut value = edit.value.clone();
            value.push_str(ch_str);
            let position = (edit.position as i64 + offset) as u64;
            offset += ch.len_utf8() as i64;
            tx.push(Edit::insert(position, value));
        }
        tx.set_committer(SELF_INSERT_COMMITTER);
        tx.commit()?;
    } else {
        let mut tx = Transaction::new(&mut buffer);
        let mut offset: i64 = 0;
        for &point in &cursor_positions {
            let position = (point as i64 + offset) as u64;
            offset += ch.len_utf8() as i64;
            tx.push(Edit::insert(position, ch_str));
        }
        tx.set_committer(SELF_INSERT_COMMITTER);
        tx.commit()?;
    }

    client.selected_window_mut().update_cursors(&buffer);
    Ok(())
}

fn save_buffer(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    let handle = client
        .selected_window()
        .buffer_handle
        .upgrade()
        .ok_or_else(EditorError::buffer_killed)?;
    let mut buffer = handle.lock_writing();
    buffer.mark_saved();
    let name = buffer.name.clone();
    drop(buffer);
    client.show_message(format!("Wrote {name}"), 0);
    Ok(())
}

fn quit(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    client.queue_quit = true;
    Ok(())
}

/// Clears whatever the most specific piece of transient state is: extra
/// cursors, then an active selection, then the mini-buffer, first
/// applicable wins.
fn stop_action(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    client.key_chain.clear();
    if client.select_mini_buffer {
        client.hide_mini_buffer();
        return Ok(());
    }
    let window = client.selected_window_mut();
    if window.cursors.len() > 1 {
        window.kill_extra_cursors();
    } else if window.selected().has_selection() {
        let cursor = window.selected_mut();
        cursor.mark = cursor.point;
    }
    Ok(())
}

fn undo(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    let handle = client
        .selected_window()
        .buffer_handle
        .upgrade()
        .ok_or_else(EditorError::buffer_killed)?;
    let mut buffer = handle.lock_writing();
    buffer.undo();
    client.selected_window_mut().update_cursors(&buffer);
    Ok(())
}

fn redo(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    let handle = client
        .selected_window()
        .buffer_handle
        .upgrade()
        .ok_or_else(EditorError::buffer_killed)?;
    let mut buffer = handle.lock_writing();
    buffer.redo();
    client.selected_window_mut().update_cursors(&buffer);
    Ok(())
}

/// Removes one character before each cursor. Consecutive backspaces merge
/// into a single undo step the same way consecutive self-inserts do: each
/// new keystroke's removal is computed against the buffer as it stands
/// right now, then folded onto the front of the previous commit's payload
/// once that commit is undone.
fn delete_backward_char(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    let handle = client
        .selected_window()
        .buffer_handle
        .upgrade()
        .ok_or_else(EditorError::buffer_killed)?;
    let mut buffer = handle.lock_writing();
    if buffer.read_only {
        return Err(EditorError::read_only());
    }

    let mut cursor_positions: Vec<u64> = client.selected_window().cursors.iter().map(|c| c.point).collect();
    cursor_positions.sort_unstable();

    let merge_eligible = buffer.check_last_committer(DELETE_BACKWARD_COMMITTER, &cursor_positions)
        && buffer
            .last_commit()
            .is_some_and(|commit| commit.edits.iter().all(|edit| !edit.is_insert() && edit.value.len() < MERGE_PAYLOAD_LIMIT));

    let mut offset: i64 = 0;
    let mut new_edits = Vec::new();
    for &point in &cursor_positions {
        let position = (point as i64 + offset) as u64;
        let start = prev_char_boundary(buffer.contents(), position);
        if start == position {
            continue;
        }
        let removed = buffer.contents().slice(buffer.contents().iterator_at(start), position);
        offset -= (position - start) as i64;
        new_edits.push(Edit::remove(start, removed));
    }
    if new_edits.is_empty() {
        return Ok(());
    }

    if merge_eligible {
        let previous_edits = buffer.last_commit().expect("merge_eligible implies a last commit").edits.clone();
        buffer.undo();
        let mut tx = Transaction::new(&mut buffer);
        for (new_edit, previous_edit) in new_edits.into_iter().zip(previous_edits) {
            let mut value = new_edit.value.clone();
            value.push_str(previous_edit.value.as_str());
            tx.push(Edit::remove(new_edit.position, value));
        }
        tx.set_committer(DELETE_BACKWARD_COMMITTER);
        tx.commit()?;
    } else {
        let mut tx = Transaction::new(&mut buffer);
        for edit in new_edits {
            tx.push(edit);
        }
        tx.set_committer(DELETE_BACKWARD_COMMITTER);
        tx.commit()?;
    }

    client.selected_window_mut().update_cursors(&buffer);
    Ok(())
}

fn delete_forward_char(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    let handle = client
        .selected_window()
        .buffer_handle
        .upgrade()
        .ok_or_else(EditorError::buffer_killed)?;
    let mut buffer = handle.lock_writing();
    if buffer.read_only {
        return Err(EditorError::read_only());
    }

    let mut cursor_positions: Vec<u64> = client.selected_window().cursors.iter().map(|c| c.point).collect();
    cursor_positions.sort_unstable();

    let mut offset: i64 = 0;
    let mut edits = Vec::new();
    for &point in &cursor_positions {
        let position = (point as i64 + offset) as u64;
        let end = next_char_boundary(buffer.contents(), position);
        if end == position {
            continue;
        }
        let removed = buffer.contents().slice(buffer.contents().iterator_at(position), end);
        offset -= (end - position) as i64;
        edits.push(Edit::remove(position, removed));
    }
    if edits.is_empty() {
        return Ok(());
    }
    let mut tx = Transaction::new(&mut buffer);
    for edit in edits {
        tx.push(edit);
    }
    tx.commit()?;

    client.selected_window_mut().update_cursors(&buffer);
    Ok(())
}

fn insert_newline(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    let handle = client
        .selected_window()
        .buffer_handle
        .upgrade()
        .ok_or_else(EditorError::buffer_killed)?;
    let mut buffer = handle.lock_writing();
    if buffer.read_only {
        return Err(EditorError::read_only());
    }

    let mut cursor_positions: Vec<u64> = client.selected_window().cursors.iter().map(|c| c.point).collect();
    cursor_positions.sort_unstable();

    let mut tx = Transaction::new(&mut buffer);
    let mut offset: i64 = 0;
    for &point in &cursor_positions {
        let position = (point as i64 + offset) as u64;
        offset += 1;
        tx.push(Edit::insert(position, "\n"));
    }
    tx.commit()?;

    client.selected_window_mut().update_cursors(&buffer);
    Ok(())
}

fn split_window_vertical(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    let handle = client.window_tree.focused().buffer_handle.clone();
    client.window_tree.split_window(crate::window::SplitDirection::Vertical, handle);
    Ok(())
}

fn split_window_horizontal(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    let handle = client.window_tree.focused().buffer_handle.clone();
    client.window_tree.split_window(crate::window::SplitDirection::Horizontal, handle);
    Ok(())
}

fn cycle_window(_editor: &Editor, client: &mut Client, _keys: &[Key]) -> Result<()> {
    client.window_tree.cycle_window();
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
