//! The editor root: owns every buffer, the global keymap built from
//! `EditorConfig::default_bindings` at startup, the command registry, and
//! the job scheduler. A front-end drives it by constructing a `Client` per
//! connection and feeding keystrokes through `dispatch_key`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{trace, warn};

use crate::buffer::{Buffer, BufferId};
use crate::buffer_handle::BufferHandle;
use crate::client::Client;
use crate::commands::{self, CommandRegistry};
use crate::config::EditorConfig;
use crate::error::Result;
use crate::job::{syntax_highlight::SyntaxHighlightJob, JobScheduler};
use crate::key::{self, Key};
use crate::keymap::{resolve_key_chain, KeyChainStep, KeyMap};

pub struct Editor {
    pub config: EditorConfig,
    pub buffers: HashMap<BufferId, Arc<BufferHandle>>,
    pub commands: CommandRegistry,
    pub global_keymap: KeyMap,
    pub jobs: JobScheduler,
    next_buffer_id: u64,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.validate()?;

        let mut global_keymap = KeyMap::new();
        for (description, command) in &config.default_bindings {
            global_keymap.bind(description, command.clone())?;
        }

        let jobs = JobScheduler::new(config.async_tick_budget, config.stall_retry_delay_ms);

        Ok(Self {
            config,
            buffers: HashMap::new(),
            commands: CommandRegistry::new(),
            global_keymap,
            jobs,
            next_buffer_id: 1,
        })
    }

    fn alloc_buffer_id(&mut self) -> BufferId {
        let id = BufferId(self.next_buffer_id);
        self.next_buffer_id += 1;
        id
    }

    /// Creates a new buffer, registers it, and spawns its background
    /// syntax-highlight job.
    pub fn create_buffer(&mut self, name: impl Into<String>) -> Arc<BufferHandle> {
        let id = self.alloc_buffer_id();
        let buffer = Buffer::with_bucket_capacity(id, name, self.config.bucket_capacity);
        let handle = BufferHandle::new(buffer);
        self.buffers.insert(id, handle.clone());
        self.jobs.spawn_asynchronous(Box::new(SyntaxHighlightJob::new(Arc::downgrade(&handle))));
        handle
    }

    /// Drops this editor's strong reference to a buffer. Windows and clients
    /// still holding a `Weak<BufferHandle>` notice on their next upgrade.
    pub fn kill_buffer(&mut self, id: BufferId) -> bool {
        self.buffers.remove(&id).is_some()
    }

    pub fn buffer(&self, id: BufferId) -> Option<&Arc<BufferHandle>> {
        self.buffers.get(&id)
    }

    fn selected_mode_keymap(&self, client: &Client) -> KeyMap {
        match client.selected_window().buffer_handle.upgrade() {
            Some(handle) => handle.lock_reading().mode.keymap.clone(),
            None => KeyMap::new(),
        }
    }

    /// Runs one pass of the per-keystroke dispatch algorithm: append the key
    /// to the client's pending chain, repeatedly resolve against the
    /// completion/mode/global keymaps, execute matched commands or
    /// self-insert, and trim the consumed prefix once nothing more matches.
    pub fn dispatch_key(&self, client: &mut Client, key: Key) {
        client.key_chain.push(key);
        let mut cursor = 0;

        while cursor < client.key_chain.len() {
            let chain = &client.key_chain[cursor..];
            let mode_keymap = self.selected_mode_keymap(client);

            match resolve_key_chain(None, &mode_keymap, &self.global_keymap, chain) {
                KeyChainStep::Command { name, consumed } => {
                    let keys: Vec<Key> = client.key_chain[cursor..cursor + consumed].to_vec();
                    self.run_command(client, &name, &keys);
                    cursor += consumed;
                    client.previous_command = Some(name);
                }
                KeyChainStep::Waiting => break,
                KeyChainStep::NoMatch => {
                    let first = chain[0];
                    if let Some(ch) = key::self_insert_char(&first) {
                        if let Err(err) = commands::self_insert_char(self, client, ch) {
                            client.show_message(err.message, 0);
                        }
                        client.previous_command = Some("self-insert-char".to_string());
                    } else {
                        client.show_message(format!("{first} is undefined"), 0);
                    }
                    cursor += 1;
                }
            }
        }

        client.key_chain.drain(..cursor);
    }

    fn run_command(&self, client: &mut Client, name: &str, keys: &[Key]) {
        match self.commands.get(name) {
            Some(f) => {
                trace!(command = name, "dispatching command");
                if let Err(err) = f(self, client, keys) {
                    client.show_message(err.message, 0);
                }
            }
            None => warn!(command = name, "keymap names a command with no registered implementation"),
        }
    }

    /// Ticks every synchronous job once. Call between keystroke dispatches.
    pub fn run_synchronous_pass(&mut self) {
        self.jobs.run_synchronous_pass();
    }

    /// Spawns an asynchronous job watching `handle` weakly.
    pub fn spawn_asynchronous(&mut self, job: Box<dyn crate::job::Job>) {
        self.jobs.spawn_asynchronous(job);
    }

    pub fn push_synchronous(&mut self, job: Box<dyn crate::job::Job>) {
        self.jobs.push_synchronous(job);
    }

    /// Stops every background job and joins its thread, without yet
    /// dropping the buffers those jobs held weak references to.
    pub fn shutdown(&mut self) {
        self.jobs.shutdown();
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod tests;
