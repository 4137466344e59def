//! Composite document assembly and output for docbinder.
//!
//! This crate provides:
//! - [`build_document`] — merge a tutorial title and its ordered,
//!   normalized chapter sections into one print-oriented HTML document
//! - [`safe_file_stem`] / [`write_document`] — on-disk naming and writing
//! - [`Renderer`] — the external HTML→PDF collaborator interface

pub mod assemble;
pub mod output;
pub mod render;

pub use assemble::build_document;
pub use output::{safe_file_stem, write_document};
pub use render::{CommandRenderer, Renderer};
