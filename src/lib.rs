//! docstack - a local documentation toolchain
//!
//! Serves a markdown documentation tree over HTTP for local preview,
//! combines per-language markdown trees into single documents, and packages
//! the repository into a distributable archive.

pub mod archive;
pub mod classify;
pub mod concat;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod render;
pub mod resolver;
pub mod utils;

// Re-export commonly used items
pub use config::{AppState, ServeConfig};
pub use errors::DocError;
pub use render::RenderDecision;
