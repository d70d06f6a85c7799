use super::*;
use crate::buffer::{Buffer, BufferId};
use crate::buffer_handle::BufferHandle;
use crate::config::EditorConfig;
use crate::edit::Edit;
use crate::window::Cursor;
use std::sync::Arc;

fn fixture(text: &str) -> (Editor, Client, Arc<BufferHandle>) {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let handle = editor.create_buffer("scratch");
    if !text.is_empty() {
        let mut buffer = handle.lock_writing();
        buffer.commit(vec![Edit::insert(0, text)], None).unwrap();
    }

    let mini = BufferHandle::new(Buffer::new(BufferId(9999), "*mini-buffer*"));
    let messages = BufferHandle::new(Buffer::new(BufferId(9998), "*messages*"));
    let mut client = Client::new(Arc::downgrade(&handle), Arc::downgrade(&mini), messages);
    client.selected_window_mut().cursors[0] = Cursor::at(text.len() as u64);
    (editor, client, handle)
}

#[test]
fn self_insert_char_merges_consecutive_same_char_into_one_undo_step() {
    let (editor, mut client, handle) = fixture("");
    self_insert_char(&editor, &mut client, 'a').unwrap();
    self_insert_char(&editor, &mut client, 'a').unwrap();
    assert_eq!(handle.lock_reading().contents().stringify(), "aa");

    let mut buffer = handle.lock_writing();
    assert!(buffer.undo());
    assert_eq!(buffer.contents().stringify(), "");
}

#[test]
fn self_insert_char_keeps_separate_commits_for_incompatible_chars() {
    let (editor, mut client, handle) = fixture("");
    self_insert_char(&editor, &mut client, ' ').unwrap();
    self_insert_char(&editor, &mut client, 'a').unwrap();

    let mut buffer = handle.lock_writing();
    assert!(buffer.undo());
    assert_eq!(buffer.contents().stringify(), " ");
}

#[test]
fn self_insert_char_collapses_a_completed_space_run_into_a_tab() {
    let (editor, mut client, handle) = fixture("");
    for _ in 0..8 {
        self_insert_char(&editor, &mut client, ' ').unwrap();
    }
    assert_eq!(handle.lock_reading().contents().stringify(), "\t");
}

#[test]
fn self_insert_char_leaves_a_partial_space_run_alone() {
    let (editor, mut client, handle) = fixture("");
    for _ in 0..3 {
        self_insert_char(&editor, &mut client, ' ').unwrap();
    }
    assert_eq!(handle.lock_reading().contents().stringify(), "   ");
}

#[test]
fn delete_backward_char_merges_consecutive_backspaces() {
    let (editor, mut client, handle) = fixture("abc");
    delete_backward_char(&editor, &mut client, &[]).unwrap();
    delete_backward_char(&editor, &mut client, &[]).unwrap();
    assert_eq!(handle.lock_reading().contents().stringify(), "a");

    let mut buffer = handle.lock_writing();
    assert!(buffer.undo());
    assert_eq!(buffer.contents().stringify(), "abc");
}

#[test]
fn delete_backward_char_at_start_of_buffer_is_a_no_op() {
    let (editor, mut client, handle) = fixture("");
    delete_backward_char(&editor, &mut client, &[]).unwrap();
    assert_eq!(handle.lock_reading().contents().stringify(), "");
}

#[test]
fn delete_forward_char_removes_the_char_under_the_cursors() {
    let (editor, mut client, handle) = fixture("abc");
    client.selected_window_mut().cursors[0] = Cursor::at(0);
    delete_forward_char(&editor, &mut client, &[]).unwrap();
    assert_eq!(handle.lock_reading().contents().stringify(), "bc");
}

#[test]
fn undo_and_redo_commands_round_trip() {
    let (editor, mut client, handle) = fixture("");
    self_insert_char(&editor, &mut client, 'x').unwrap();
    undo(&editor, &mut client, &[]).unwrap();
    assert_eq!(handle.lock_reading().contents().stringify(), "");
    redo(&editor, &mut client, &[]).unwrap();
    assert_eq!(handle.lock_reading().contents().stringify(), "x");
}

#[test]
fn stop_action_clears_extra_cursors_first() {
    let (editor, mut client, _handle) = fixture("");
    client.selected_window_mut().cursors.push(Cursor::at(0));
    assert_eq!(client.selected_window().cursors.len(), 2);
    stop_action(&editor, &mut client, &[]).unwrap();
    assert_eq!(client.selected_window().cursors.len(), 1);
}

#[test]
fn stop_action_clears_selection_when_there_is_only_one_cursor() {
    let (editor, mut client, _handle) = fixture("");
    client.selected_window_mut().selected_mut().mark = 5;
    assert!(client.selected_window().selected().has_selection());
    stop_action(&editor, &mut client, &[]).unwrap();
    assert!(!client.selected_window().selected().has_selection());
}

#[test]
fn stop_action_hides_mini_buffer_when_nothing_else_is_set() {
    let (editor, mut client, _handle) = fixture("");
    client.select_mini_buffer = true;
    stop_action(&editor, &mut client, &[]).unwrap();
    assert!(!client.select_mini_buffer);
}

#[test]
fn save_buffer_marks_unchanged_and_posts_a_message() {
    let (editor, mut client, handle) = fixture("");
    self_insert_char(&editor, &mut client, 'x').unwrap();
    assert!(!handle.lock_reading().is_unchanged());

    save_buffer(&editor, &mut client, &[]).unwrap();
    assert!(handle.lock_reading().is_unchanged());
    assert!(client.pending_message.is_some());
}

#[test]
fn quit_sets_the_queue_quit_flag() {
    let (editor, mut client, _handle) = fixture("");
    quit(&editor, &mut client, &[]).unwrap();
    assert!(client.queue_quit);
}

#[test]
fn split_window_vertical_then_cycle_window_wraps_back_to_the_original() {
    let (editor, mut client, _handle) = fixture("");
    let original = client.window_tree.focused_window;

    split_window_vertical(&editor, &mut client, &[]).unwrap();
    assert_ne!(client.window_tree.focused_window, original);

    cycle_window(&editor, &mut client, &[]).unwrap();
    assert_eq!(client.window_tree.focused_window, original);
}
