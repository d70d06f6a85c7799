use super::*;
use crate::buffer::{Buffer, BufferId};
use crate::buffer_handle::BufferHandle;
use crate::key::{Key, KeyCode, Modifiers};

fn client_for(editor: &mut Editor) -> Client {
    let handle = editor.create_buffer("scratch");
    let mini = BufferHandle::new(Buffer::new(BufferId(9999), "*mini-buffer*"));
    let messages = BufferHandle::new(Buffer::new(BufferId(9998), "*messages*"));
    Client::new(Arc::downgrade(&handle), Arc::downgrade(&mini), messages)
}

#[test]
fn new_builds_a_global_keymap_from_default_bindings() {
    let editor = Editor::new(EditorConfig::default()).unwrap();
    let chain = Key::parse_sequence("C-x C-s").unwrap();
    match editor.global_keymap.lookup(&chain) {
        crate::keymap::KeyLookup::Exact(name) => assert_eq!(name, "save-buffer"),
        other => panic!("expected an exact match, got {other:?}"),
    }
}

#[test]
fn dispatch_key_self_inserts_a_printable_key_with_no_binding() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let mut client = client_for(&mut editor);
    let handle = client.selected_window().buffer_handle.upgrade().unwrap();

    editor.dispatch_key(&mut client, Key::plain('q'));

    assert_eq!(handle.lock_reading().contents().stringify(), "q");
    assert!(client.key_chain.is_empty());
}

#[test]
fn dispatch_key_runs_a_bound_command() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let mut client = client_for(&mut editor);

    for key in Key::parse_sequence("C-x C-c").unwrap() {
        editor.dispatch_key(&mut client, key);
    }

    assert!(client.queue_quit);
    assert!(client.key_chain.is_empty());
}

#[test]
fn dispatch_key_waits_mid_sequence_then_resolves_on_the_next_key() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let mut client = client_for(&mut editor);

    let cx = Key { modifiers: Modifiers { control: true, alt: false, shift: false }, code: KeyCode::Char('x') };
    editor.dispatch_key(&mut client, cx);
    assert_eq!(client.key_chain, vec![cx]);

    let co = Key { modifiers: Modifiers { control: true, alt: false, shift: false }, code: KeyCode::Char('o') };
    editor.dispatch_key(&mut client, co);
    assert!(client.key_chain.is_empty());
}

#[test]
fn dispatch_key_posts_a_message_for_an_undefined_non_printable_key() {
    let mut editor = Editor::new(EditorConfig::default()).unwrap();
    let mut client = client_for(&mut editor);

    let combo = Key { modifiers: Modifiers { control: true, alt: false, shift: false }, code: KeyCode::Up };
    editor.dispatch_key(&mut client, combo);

    assert!(client.pending_message.is_some());
    assert!(client.key_chain.is_empty());
}
