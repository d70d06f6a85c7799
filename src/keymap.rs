//! Binding trees mapping key sequences to command names, and the per-keystroke
//! resolution that tries the completion, mode, and global keymaps in order.
//!
//! A binding is installed by splitting a description such as `"C-x C-s"` into
//! its component keys (see `key.rs`) and walking/creating a node per key,
//! installing the command name at the final node.

use crate::error::EditorError;
use crate::key::Key;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
struct KeyMapNode {
    children: HashMap<Key, KeyMapNode>,
    command: Option<String>,
}

impl KeyMapNode {
    fn bind(&mut self, keys: &[Key], command: String) {
        match keys.split_first() {
            None => self.command = Some(command),
            Some((key, rest)) => self.children.entry(*key).or_default().bind(rest, command),
        }
    }

    fn lookup(&self, keys: &[Key]) -> KeyLookup {
        match keys.split_first() {
            None => match (&self.command, self.children.is_empty()) {
                (Some(command), true) => KeyLookup::Exact(command.clone()),
                (Some(command), false) => KeyLookup::Ambiguous(command.clone()),
                (None, false) => KeyLookup::Prefix,
                (None, true) => KeyLookup::None,
            },
            Some((key, rest)) => match self.children.get(key) {
                Some(child) => child.lookup(rest),
                None => KeyLookup::None,
            },
        }
    }
}

/// Result of walking a keymap with a key chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyLookup {
    /// The chain names exactly one command and nothing longer
    Exact(String),
    /// The chain is a valid prefix of one or more longer bindings
    Prefix,
    /// The chain names a command but is also a prefix of longer bindings
    Ambiguous(String),
    /// The chain matches nothing in this map
    None,
}

/// A binding tree for one scope: the editor's global bindings, a buffer
/// mode's bindings, or a window's completion-session bindings.
#[derive(Debug, Default, Clone)]
pub struct KeyMap {
    root: KeyMapNode,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `description` in the `key.rs` grammar and installs `command`
    /// at the resulting path.
    pub fn bind(&mut self, description: &str, command: impl Into<String>) -> Result<(), EditorError> {
        let keys = Key::parse_sequence(description)?;
        if keys.is_empty() {
            return Err(EditorError::parse_key("empty binding description"));
        }
        self.root.bind(&keys, command.into());
        Ok(())
    }

    pub fn bind_keys(&mut self, keys: &[Key], command: impl Into<String>) {
        self.root.bind(keys, command.into());
    }

    pub fn lookup(&self, chain: &[Key]) -> KeyLookup {
        self.root.lookup(chain)
    }
}

/// What happened when resolving one key chain against the three scoped
/// keymaps tried in order: completion, mode, global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyChainStep {
    /// A command was found; `consumed` keys (from the start of the chain)
    /// belong to it.
    Command { name: String, consumed: usize },
    /// No keymap matches the chain, but at least one says "keep waiting".
    Waiting,
    /// No keymap matches the chain and none are waiting for more keys.
    NoMatch,
}

/// Tries `completion` (if present), then `mode`, then `global`, in that
/// order, returning the first non-`None` result. Mirrors step 2 of the
/// dispatch algorithm: each scope is consulted in full before falling
/// through to the next.
pub fn resolve_key_chain(completion: Option<&KeyMap>, mode: &KeyMap, global: &KeyMap, chain: &[Key]) -> KeyChainStep {
    let mut saw_prefix = false;
    for map in completion.into_iter().chain([mode, global]) {
        match map.lookup(chain) {
            KeyLookup::Exact(name) | KeyLookup::Ambiguous(name) => {
                return KeyChainStep::Command { name, consumed: chain.len() };
            }
            KeyLookup::Prefix => saw_prefix = true,
            KeyLookup::None => {}
        }
    }
    if saw_prefix {
        KeyChainStep::Waiting
    } else {
        KeyChainStep::NoMatch
    }
}

#[cfg(test)]
#[path = "keymap_tests.rs"]
mod tests;
