//! Per-connection session state: the window tree a client sees, its pending
//! key chain, minibuffer, status message, and the jump/copy history that
//! spans buffers and outlives any one of them.

use crate::buffer::BufferId;
use crate::key::Key;
use crate::small_string::SmallString;
use crate::window::{UnifiedWindow, WindowId, WindowTree};

use crate::buffer_handle::BufferHandle;
use std::sync::{Arc, Weak};

/// A cut/kill history: most recent push is the last element, matching the
/// "top of chain wins" behavior of consecutive paste commands.
#[derive(Debug, Default, Clone)]
pub struct CopyChain {
    entries: Vec<SmallString>,
}

impl CopyChain {
    pub fn push(&mut self, value: impl Into<SmallString>) {
        self.entries.push(value.into());
    }

    pub fn top(&self) -> Option<&SmallString> {
        self.entries.last()
    }

    /// Moves every entry of `other` onto the end of this chain, in order,
    /// leaving `other` empty. Used when a window's local copy chain is
    /// folded into the client's global one on cursor kill.
    pub fn append(&mut self, other: &mut CopyChain) {
        self.entries.append(&mut other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// One recorded position a jump command (go-to-definition, search, etc.)
/// can return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub buffer_id: BufferId,
    pub position: u64,
    pub change_index: usize,
}

/// A back/forward stack of jumps. Pushing past `index` truncates whatever
/// was ahead, the same way committing a new edit truncates redo history.
#[derive(Debug, Default)]
pub struct JumpChain {
    jumps: Vec<Jump>,
    index: usize,
}

impl JumpChain {
    pub fn push(&mut self, jump: Jump) {
        self.jumps.truncate(self.index);
        self.jumps.push(jump);
        self.index = self.jumps.len();
    }

    pub fn pop(&mut self) -> Option<Jump> {
        if self.index > 0 {
            self.index -= 1;
            Some(self.jumps[self.index])
        } else {
            None
        }
    }

    pub fn unpop(&mut self) -> Option<Jump> {
        if self.index + 1 < self.jumps.len() {
            self.index += 1;
            Some(self.jumps[self.index])
        } else {
            None
        }
    }
}

/// A one-line status message shown in the mini-buffer area until replaced
/// or cleared. `posted_at_tick` is whatever monotonic tick counter the
/// editor root is on, so a front-end can fade old messages without this
/// crate depending on wall-clock time.
#[derive(Debug, Clone)]
pub struct PendingMessage {
    pub text: String,
    pub posted_at_tick: u64,
}

/// Reads and writes the host clipboard. An implementation is installed
/// once at startup; this crate only defines the call shape it consumes.
pub trait ClipboardCapability: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, text: &str) -> bool;
}

/// Populates candidate completions for whatever the mini-buffer is
/// currently prompting for (a file path, a buffer name, a command name).
/// Implementations live outside this crate.
pub trait CompletionSource: Send + Sync {
    fn complete(&self, prefix: &str) -> Vec<String>;
}

/// Cached completion results, invalidated when the mini-buffer contents or
/// the watched buffer's change-index move.
#[derive(Debug, Default, Clone)]
pub struct CompletionCache {
    pub results: Vec<String>,
    pub selected: usize,
    last_prefix: String,
    last_change_index: usize,
}

impl CompletionCache {
    /// Recomputes `results` from `source` if `prefix` or `change_index`
    /// moved since the last refresh; otherwise leaves the cache as-is.
    pub fn refresh(&mut self, source: &dyn CompletionSource, prefix: &str, change_index: usize) {
        if prefix == self.last_prefix && change_index == self.last_change_index {
            return;
        }
        self.results = source.complete(prefix);
        self.selected = 0;
        self.last_prefix = prefix.to_string();
        self.last_change_index = change_index;
    }

    pub fn clear(&mut self) {
        *self = CompletionCache::default();
    }
}

/// A single connected session: a window tree, a minibuffer, pending
/// keyboard input, and the per-client history that spans buffers.
pub struct Client {
    pub key_chain: Vec<Key>,
    pub global_copy_chain: CopyChain,
    pub jump_chain: JumpChain,
    pub window_tree: WindowTree,
    pub mini_buffer: UnifiedWindow,
    pub select_mini_buffer: bool,
    pub messages_buffer_handle: Arc<BufferHandle>,
    pub mini_buffer_completion_cache: CompletionCache,
    pub pending_message: Option<PendingMessage>,
    pub queue_quit: bool,
    pub pending_raise: bool,
    /// Name of the last command dispatched, so a following command of a
    /// matching identity can decide to merge into the same undo step.
    pub previous_command: Option<String>,
}

impl Client {
    pub fn new(
        selected_buffer_handle: Weak<BufferHandle>,
        mini_buffer_handle: Weak<BufferHandle>,
        messages_buffer_handle: Arc<BufferHandle>,
    ) -> Self {
        Self {
            key_chain: Vec::new(),
            global_copy_chain: CopyChain::default(),
            jump_chain: JumpChain::default(),
            window_tree: WindowTree::new(selected_buffer_handle),
            mini_buffer: UnifiedWindow::new(WindowId(0), mini_buffer_handle),
            select_mini_buffer: false,
            messages_buffer_handle,
            mini_buffer_completion_cache: CompletionCache::default(),
            pending_message: None,
            queue_quit: false,
            pending_raise: false,
            previous_command: None,
        }
    }

    /// The window receiving keystrokes right now: the mini-buffer if it is
    /// selected, otherwise the focused window in the normal tree.
    pub fn selected_window(&self) -> &UnifiedWindow {
        if self.select_mini_buffer {
            &self.mini_buffer
        } else {
            self.window_tree.focused()
        }
    }

    pub fn selected_window_mut(&mut self) -> &mut UnifiedWindow {
        if self.select_mini_buffer {
            &mut self.mini_buffer
        } else {
            self.window_tree.focused_mut()
        }
    }

    /// Replaces whatever message is showing with `text`, stamped with the
    /// current tick so a front-end can decide when to clear it.
    pub fn show_message(&mut self, text: impl Into<String>, tick: u64) {
        self.pending_message = Some(PendingMessage { text: text.into(), posted_at_tick: tick });
    }

    pub fn clear_message(&mut self) {
        self.pending_message = None;
    }

    pub fn hide_mini_buffer(&mut self) {
        self.select_mini_buffer = false;
        self.mini_buffer_completion_cache.clear();
    }

    /// Schedules the front-end to bring this client's window to the
    /// foreground, e.g. after a background job finishes and wants the
    /// user's attention.
    pub fn raise(&mut self) {
        self.pending_raise = true;
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
