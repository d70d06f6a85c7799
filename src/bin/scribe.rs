//! Scribe - a modal, multi-cursor, multi-window text editor
//! Main entry point

use std::path::Path;
use std::sync::Arc;

use tracing_appender::non_blocking::WorkerGuard;

use scribe_core::buffer::{Buffer, BufferId};
use scribe_core::buffer_handle::BufferHandle;
use scribe_core::client::Client;
use scribe_core::config::EditorConfig;
use scribe_core::editor::Editor;

fn configure_logging() -> Option<WorkerGuard> {
    let log_dir = Path::new(".");
    let file_appender = tracing_appender::rolling::never(log_dir, "scribe.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Some(guard),
        Err(_) => None,
    }
}

fn main() {
    let _log_guard = configure_logging();

    let mut editor = match Editor::new(EditorConfig::default()) {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Failed to initialize editor: {e}");
            std::process::exit(1);
        }
    };

    let scratch = editor.create_buffer("scratch");
    let mini_buffer = BufferHandle::new(Buffer::new(BufferId(0), "*mini-buffer*"));
    let messages = BufferHandle::new(Buffer::new(BufferId(0), "*messages*"));
    let mut client = Client::new(Arc::downgrade(&scratch), Arc::downgrade(&mini_buffer), messages);

    // A real front-end drives `editor.dispatch_key` from terminal/GUI input
    // events and calls `editor.run_synchronous_pass()` once per loop
    // iteration; rendering and input are out of scope for this crate.
    client.show_message("scribe ready", 0);
    editor.run_synchronous_pass();
    editor.shutdown();
}
