//! Per-buffer language mode: names the buffer's tokenizer, its own keymap,
//! and a handful of editing parameters that vary by file type (only
//! tab/indent width here; syntax highlighting theme and completion sources
//! are external collaborators).

use crate::keymap::KeyMap;
use crate::token_cache::{NullTokenizer, Tokenizer};
use std::sync::Arc;

#[derive(Clone)]
pub struct Mode {
    pub name: &'static str,
    pub tab_width: u32,
    pub tokenizer: Arc<dyn Tokenizer>,
    pub keymap: KeyMap,
}

impl Mode {
    pub fn new(name: &'static str, tab_width: u32, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { name, tab_width, tokenizer, keymap: KeyMap::new() }
    }

    pub fn fundamental(tab_width: u32) -> Self {
        Self::new("fundamental", tab_width, Arc::new(NullTokenizer))
    }
}

impl Default for Mode {
    fn default() -> Self {
        Self::fundamental(8)
    }
}

impl std::fmt::Debug for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mode").field("name", &self.name).field("tab_width", &self.tab_width).finish()
    }
}
