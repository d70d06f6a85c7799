use super::*;
use crate::edit::Edit;

fn empty_buffer() -> Buffer {
    Buffer::new(BufferId(1), "scratch")
}

#[test]
fn commit_applies_edits_to_contents() {
    let mut buf = empty_buffer();
    buf.commit(vec![Edit::insert(0, "hello")], None).unwrap();
    assert_eq!(buf.contents().stringify(), "hello");
}

#[test]
fn commit_on_read_only_buffer_is_rejected() {
    let mut buf = empty_buffer();
    buf.read_only = true;
    let result = buf.commit(vec![Edit::insert(0, "x")], None);
    assert!(result.is_err());
    assert_eq!(buf.contents().len(), 0);
}

#[test]
fn undo_reverts_the_last_commit() {
    let mut buf = empty_buffer();
    buf.commit(vec![Edit::insert(0, "hello")], None).unwrap();
    assert!(buf.undo());
    assert_eq!(buf.contents().stringify(), "");
    assert!(!buf.can_undo());
}

#[test]
fn redo_reapplies_an_undone_commit() {
    let mut buf = empty_buffer();
    buf.commit(vec![Edit::insert(0, "hello")], None).unwrap();
    buf.undo();
    assert!(buf.redo());
    assert_eq!(buf.contents().stringify(), "hello");
}

#[test]
fn committing_after_undo_discards_the_redo_stack() {
    let mut buf = empty_buffer();
    buf.commit(vec![Edit::insert(0, "hello")], None).unwrap();
    buf.undo();
    buf.commit(vec![Edit::insert(0, "world")], None).unwrap();
    assert!(!buf.can_redo());
    assert_eq!(buf.contents().stringify(), "world");
}

#[test]
fn undo_resets_last_committer_so_merging_stops() {
    let mut buf = empty_buffer();
    buf.commit(vec![Edit::insert(0, "a")], Some("self-insert-char")).unwrap();
    assert!(buf.check_last_committer("self-insert-char", &[1]));
    buf.undo();
    assert!(!buf.check_last_committer("self-insert-char", &[1]));
}

#[test]
fn check_last_committer_matches_identity_and_the_live_cursor_against_the_edit() {
    let mut buf = empty_buffer();
    // Inserting "a" at 0 would leave a tracking cursor at 1, not 0: the
    // check is against where the edit actually lands a cursor now, not
    // against whatever position was recorded when the commit landed.
    buf.commit(vec![Edit::insert(0, "a")], Some("self-insert-char")).unwrap();
    assert!(buf.check_last_committer("self-insert-char", &[1]));
    assert!(!buf.check_last_committer("self-insert-char", &[0]));
    assert!(!buf.check_last_committer("self-insert-char", &[2]));
    assert!(!buf.check_last_committer("delete-backward-char", &[1]));
}

#[test]
fn check_last_committer_matches_a_remove_at_its_own_position() {
    let mut buf = empty_buffer();
    buf.commit(vec![Edit::insert(0, "ab")], None).unwrap();
    buf.commit(vec![Edit::remove(1, "b")], Some("delete-backward-char")).unwrap();
    assert!(buf.check_last_committer("delete-backward-char", &[1]));
    assert!(!buf.check_last_committer("delete-backward-char", &[0]));
}

#[test]
fn is_unchanged_tracks_mark_saved() {
    let mut buf = empty_buffer();
    assert!(buf.is_unchanged());
    buf.commit(vec![Edit::insert(0, "a")], None).unwrap();
    assert!(!buf.is_unchanged());
    buf.mark_saved();
    assert!(buf.is_unchanged());
    buf.commit(vec![Edit::insert(1, "b")], None).unwrap();
    assert!(!buf.is_unchanged());
}

#[test]
fn empty_edit_list_commits_are_a_no_op() {
    let mut buf = empty_buffer();
    buf.commit(vec![], None).unwrap();
    assert!(!buf.can_undo());
}
