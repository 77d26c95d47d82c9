//! # mdview
//!
//! A small desktop viewer that renders a Markdown file as styled HTML.
//!
//! Before the window opens, the shared libraries the GUI backend loads at
//! runtime are checked and, if any are missing, the user is shown the
//! command to install them and offered to run it.
//!
//! # Modules
//!
//! - [`deps`] - Runtime dependency check and installer
//! - [`markdown`] - Markdown to styled HTML
//! - [`html_view`] - Painting the HTML with egui
//! - [`app`] - The viewer window
//! - [`ui`] - Console output and prompts
//! - [`cli`] - Command line arguments
//! - [`error`] - Error types

pub mod app;
pub mod cli;
pub mod deps;
pub mod error;
pub mod html_view;
pub mod markdown;
pub mod ui;

pub use error::{Result, ViewerError};
