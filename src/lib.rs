pub mod buffer;
pub mod buffer_handle;
pub mod client;
pub mod commands;
pub mod config;
pub mod contents;
pub mod edit;
pub mod editor;
pub mod error;
pub mod job;
pub mod key;
pub mod keymap;
pub mod small_string;
pub mod token_cache;
pub mod transaction;
pub mod window;
