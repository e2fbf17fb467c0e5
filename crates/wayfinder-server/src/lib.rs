//! Development server with live reload for wayfinder docs.
//!
//! Builds the site once, serves the output directory, and rebuilds on every
//! change to content, templates or stylesheets, telling open pages to reload.

pub mod server;
pub mod watcher;
pub mod websocket;

pub use server::{DevServer, DevServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
pub use websocket::{ReloadHub, ReloadMessage};
