//! Pipeline orchestration for docbinder.
//!
//! Ties listing discovery, concurrent chapter collection, document
//! assembly, and rendering into per-tutorial and per-run workflows.

pub mod pipeline;

pub use pipeline::{
    OverwriteGate, OverwritePolicy, OverwritePrompt, ProcessOptions, ProgressReporter,
    RunSummary, SilentProgress, TutorialOutcome, process_tutorial, process_tutorials,
};
