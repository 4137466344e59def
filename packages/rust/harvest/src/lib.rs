//! Content acquisition for docbinder: fetching, listing discovery,
//! chapter normalization, and concurrent chapter collection.
//!
//! This crate provides:
//! - [`Fetcher`] — HTTP GET with a fixed identity header and timeout
//! - [`scan_category`] / [`scan_chapters`] — listing discovery
//! - [`normalize_content`] — main-content extraction and URL rewriting
//! - [`collect_chapters`] — bounded fan-out/fan-in over a tutorial's
//!   chapters with ordinal-keyed reassembly

pub mod collect;
pub mod fetch;
pub mod normalize;
pub mod scan;

pub use collect::{
    CollectOptions, CollectProgress, CollectReport, SilentCollect, collect_chapters,
};
pub use fetch::{FetchedPage, Fetcher};
pub use normalize::normalize_content;
pub use scan::{scan_category, scan_chapters};
