//! Geminal is a terminal-first chat client for Google's Gemini API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns runtime state: the chat collection, the input and
//!   submission gate, on-disk persistence, and completion orchestration.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop that drives user input and display updates.
//! - [`api`] defines the generateContent request/response payloads and the
//!   call that carries them.
//! - [`auth`] resolves the API key from the environment or the system
//!   keyring.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which dispatches into [`ui::chat_loop`] for
//! interactive sessions.

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
