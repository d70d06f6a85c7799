//! Startup configuration for the editor core

/// Parameters fixed at editor startup and shared by every subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Number of columns a tab character occupies when rendered
    pub tab_width: u32,
    /// Whether inserting a tab expands to spaces instead of a tab byte
    pub expand_tabs: bool,
    /// Capacity in bytes of each bucket in a buffer's `Contents` store
    pub bucket_capacity: usize,
    /// Byte stride between token cache checkpoints
    pub token_step: usize,
    /// Number of async jobs ticked per scheduler pass before yielding
    pub async_tick_budget: usize,
    /// Delay before retrying a job tick that returned STALLED
    pub stall_retry_delay_ms: u64,
    /// Default global keybindings, in `key.rs` grammar, applied at startup
    pub default_bindings: Vec<(String, String)>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 8,
            expand_tabs: false,
            bucket_capacity: 4096,
            token_step: 1024,
            async_tick_budget: 8,
            stall_retry_delay_ms: 10,
            default_bindings: default_bindings(),
        }
    }
}

impl EditorConfig {
    /// Validates invariants that other subsystems assume hold
    pub fn validate(&self) -> Result<(), crate::error::EditorError> {
        use crate::error::{EditorError, ErrorKind};
        if self.tab_width == 0 {
            return Err(EditorError::new(
                ErrorKind::Other,
                "tab_width must be nonzero",
            ));
        }
        if self.bucket_capacity == 0 {
            return Err(EditorError::new(
                ErrorKind::Other,
                "bucket_capacity must be nonzero",
            ));
        }
        if self.token_step == 0 {
            return Err(EditorError::new(
                ErrorKind::Other,
                "token_step must be nonzero",
            ));
        }
        if self.async_tick_budget == 0 {
            return Err(EditorError::new(
                ErrorKind::Other,
                "async_tick_budget must be nonzero",
            ));
        }
        Ok(())
    }
}

fn default_bindings() -> Vec<(String, String)> {
    vec![
        ("C-x C-s".to_string(), "save-buffer".to_string()),
        ("C-x C-c".to_string(), "quit".to_string()),
        ("C-g".to_string(), "stop-action".to_string()),
        ("C-_".to_string(), "undo".to_string()),
        ("C-z".to_string(), "undo".to_string()),
        ("BACKSPACE".to_string(), "delete-backward-char".to_string()),
        ("DELETE".to_string(), "delete-forward-char".to_string()),
        ("ENTER".to_string(), "insert-newline".to_string()),
        ("C-x 2".to_string(), "split-window-vertical".to_string()),
        ("C-x 3".to_string(), "split-window-horizontal".to_string()),
        ("C-x o".to_string(), "cycle-window".to_string()),
    ]
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
