// Library root
// -----------
// This crate exposes the pieces of the `chaindb` binary as a library so
// they can be tested without spawning a process.
//
// Module responsibilities:
// - `store`: the two JSON files in the home directory (host, token).
// - `api`: blocking HTTP client, URL building, headers, error mapping.
// - `commands`: one descriptor per operation and the dispatcher that
//   validates, sends and renders it.
// - `cli`: clap definitions that map onto `commands::Command`.
// - `ui`: spinner, coloured output and the host prompt.
pub mod api;
pub mod cli;
pub mod commands;
pub mod error;
pub mod store;
pub mod ui;

#[cfg(test)]
mod testing;

pub use api::ApiClient;
pub use error::{CliError, CliResult};
