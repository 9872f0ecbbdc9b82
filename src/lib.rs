//! Omnichat is a single-session terminal chat front end.
//!
//! - [`core`] owns the transcript, credential lookup, the completion backend
//!   and the dispatcher that turns one user message into one reply.
//! - [`ui`] renders the full-screen chat view and runs the event loop.
//! - [`cli`] parses arguments and routes into the chat view, one-shot
//!   prompts, key management and configuration commands.
//! - [`api`] defines the chat completion payloads sent to the backend.
//!
//! The binary (`src/main.rs`) calls [`crate::cli::main`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
