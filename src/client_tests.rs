use super::*;
use crate::buffer::{Buffer, BufferId};
use crate::buffer_handle::BufferHandle;

fn client() -> (Arc<BufferHandle>, Arc<BufferHandle>, Arc<BufferHandle>, Client) {
    let scratch = BufferHandle::new(Buffer::new(BufferId(1), "scratch"));
    let mini = BufferHandle::new(Buffer::new(BufferId(2), "*mini-buffer*"));
    let messages = BufferHandle::new(Buffer::new(BufferId(3), "*messages*"));
    let client = Client::new(Arc::downgrade(&scratch), Arc::downgrade(&mini), messages.clone());
    (scratch, mini, messages, client)
}

#[test]
fn selected_window_is_the_normal_tree_by_default() {
    let (_s, _m, _msgs, client) = client();
    assert_eq!(client.selected_window().id, client.window_tree.focused_window);
}

#[test]
fn selecting_the_mini_buffer_redirects_selected_window() {
    let (_s, _m, _msgs, mut client) = client();
    client.select_mini_buffer = true;
    assert_eq!(client.selected_window().id, WindowId(0));
}

#[test]
fn show_message_then_hide_mini_buffer_clears_completion_cache() {
    let (_s, _m, _msgs, mut client) = client();
    client.mini_buffer_completion_cache.results = vec!["a".to_string()];
    client.show_message("saved", 42);
    assert_eq!(client.pending_message.as_ref().unwrap().text, "saved");
    client.hide_mini_buffer();
    assert!(client.mini_buffer_completion_cache.results.is_empty());
    assert!(!client.select_mini_buffer);
}

#[test]
fn copy_chain_append_moves_entries_in_order() {
    let mut global = CopyChain::default();
    let mut local = CopyChain::default();
    local.push("first");
    local.push("second");
    global.append(&mut local);
    assert!(local.is_empty());
    assert_eq!(global.top().unwrap().as_str(), "second");
    assert_eq!(global.len(), 2);
}

#[test]
fn jump_chain_push_truncates_redo_history() {
    let mut chain = JumpChain::default();
    chain.push(Jump { buffer_id: BufferId(1), position: 0, change_index: 0 });
    chain.push(Jump { buffer_id: BufferId(1), position: 10, change_index: 1 });
    let popped = chain.pop().unwrap();
    assert_eq!(popped.position, 10);
    chain.push(Jump { buffer_id: BufferId(1), position: 20, change_index: 2 });
    assert!(chain.unpop().is_none());
}

#[test]
fn completion_cache_refreshes_only_when_prefix_or_change_index_moves() {
    struct Listing(Vec<&'static str>);
    impl CompletionSource for Listing {
        fn complete(&self, prefix: &str) -> Vec<String> {
            self.0.iter().filter(|s| s.starts_with(prefix)).map(|s| s.to_string()).collect()
        }
    }
    let source = Listing(vec!["alpha", "alphabet", "beta"]);
    let mut cache = CompletionCache::default();
    cache.refresh(&source, "al", 0);
    assert_eq!(cache.results, vec!["alpha", "alphabet"]);
    cache.results.clear();
    cache.refresh(&source, "al", 0);
    assert!(cache.results.is_empty(), "unchanged prefix/change_index must not recompute");
    cache.refresh(&source, "b", 0);
    assert_eq!(cache.results, vec!["beta"]);
}
