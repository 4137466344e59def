//! Per-tutorial and per-run pipeline: chapters → collect → assemble →
//! write → render.
//!
//! Tutorials are processed sequentially; concurrency lives only inside
//! one tutorial's chapter collection. Discovery failures are fatal to
//! their tutorial (there is nothing to assemble without a chapter list)
//! but never to the run; per-chapter failures are handled further down
//! by the collector and only thin out the composite document.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use docbinder_composer::{Renderer, build_document, safe_file_stem, write_document};
use docbinder_harvest::{CollectOptions, CollectProgress, Fetcher, collect_chapters, scan_chapters};
use docbinder_shared::{ChapterFailure, Result, Tutorial};

// ---------------------------------------------------------------------------
// Options and outcomes
// ---------------------------------------------------------------------------

/// Run-scoped processing options, resolved once from config + CLI flags.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Directory receiving composite documents and rendered artifacts.
    pub output_dir: PathBuf,
    /// Chapter collection worker-pool width.
    pub workers: usize,
    /// Whether dropped chapters are surfaced to the operator.
    pub report_failures: bool,
}

/// Result of processing one tutorial.
#[derive(Debug)]
pub struct TutorialOutcome {
    /// Tutorial title.
    pub title: String,
    /// Path of the written composite document.
    pub html_path: PathBuf,
    /// Path of the rendered artifact, when rendering ran.
    pub pdf_path: Option<PathBuf>,
    /// Chapters listed in the table of contents.
    pub chapters_total: usize,
    /// Chapters dropped during collection.
    pub failures: Vec<ChapterFailure>,
}

/// Summary of a run over a list of tutorials.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Tutorials processed to completion.
    pub processed: Vec<TutorialOutcome>,
    /// Tutorials skipped by the overwrite decision.
    pub skipped: usize,
    /// Tutorials that failed fatally (title, reason).
    pub failed: Vec<(String, String)>,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a chapter finishes (success or failure) during collection.
    fn chapter_done(&self, completed: usize, total: usize);
    /// Called when a tutorial completes.
    fn tutorial_done(&self, outcome: &TutorialOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn chapter_done(&self, _completed: usize, _total: usize) {}
    fn tutorial_done(&self, _outcome: &TutorialOutcome) {}
}

/// Adapts a [`ProgressReporter`] to the collector's progress interface.
struct CollectAdapter(Arc<dyn ProgressReporter>);

impl CollectProgress for CollectAdapter {
    fn chapter_done(&self, completed: usize, total: usize) {
        self.0.chapter_done(completed, total);
    }
}

// ---------------------------------------------------------------------------
// Overwrite gating
// ---------------------------------------------------------------------------

/// Overwrite policy for pre-existing rendered artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Overwrite without asking.
    Always,
    /// Skip conflicting tutorials without asking.
    Never,
    /// Ask once per run at the first conflict; the answer applies to
    /// all subsequent conflicts.
    Ask,
}

/// Collaborator answering the single per-run overwrite question.
pub trait OverwritePrompt: Sync {
    /// Return `true` to overwrite all conflicting artifacts this run.
    fn confirm_overwrite_all(&self) -> bool;
}

/// Run-scoped overwrite decision: explicit state passed into each
/// per-tutorial step, resolved at most once.
#[derive(Debug)]
pub struct OverwriteGate {
    policy: OverwritePolicy,
    decided: Option<bool>,
}

impl OverwriteGate {
    pub fn new(policy: OverwritePolicy) -> Self {
        Self {
            policy,
            decided: None,
        }
    }

    /// Whether a conflicting tutorial may be overwritten. For the `Ask`
    /// policy the prompt fires only on the first call.
    pub fn allow(&mut self, prompt: &dyn OverwritePrompt) -> bool {
        match self.policy {
            OverwritePolicy::Always => true,
            OverwritePolicy::Never => false,
            OverwritePolicy::Ask => {
                *self
                    .decided
                    .get_or_insert_with(|| prompt.confirm_overwrite_all())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Process one tutorial end to end.
///
/// The composite document's section order always matches the table of
/// contents returned by the chapter scan, regardless of how the
/// concurrent collection completed.
#[instrument(skip_all, fields(tutorial = %tutorial.title))]
pub async fn process_tutorial(
    fetcher: &Fetcher,
    tutorial: &Tutorial,
    opts: &ProcessOptions,
    renderer: Option<&dyn Renderer>,
    progress: Arc<dyn ProgressReporter>,
) -> Result<TutorialOutcome> {
    progress.phase(&format!("Scanning chapters: {}", tutorial.title));
    let chapters = scan_chapters(fetcher, &tutorial.index_url).await?;

    progress.phase(&format!("Downloading chapters: {}", tutorial.title));
    let collect_opts = CollectOptions {
        workers: opts.workers,
    };
    let report = collect_chapters(
        fetcher,
        &chapters,
        &collect_opts,
        Arc::new(CollectAdapter(Arc::clone(&progress))),
    )
    .await;

    if !report.failures.is_empty() {
        warn!(
            tutorial = %tutorial.title,
            dropped = report.failures.len(),
            total = chapters.len(),
            "some chapters were dropped"
        );
    }

    progress.phase(&format!("Assembling: {}", tutorial.title));
    let html = build_document(&tutorial.title, &report.sections);
    let stem = safe_file_stem(&tutorial.title);
    let html_path = write_document(&opts.output_dir, &stem, &html)?;

    let pdf_path = match renderer {
        Some(r) => {
            progress.phase(&format!("Rendering: {}", tutorial.title));
            Some(r.render(&html_path, &tutorial.index_url)?)
        }
        None => None,
    };

    let outcome = TutorialOutcome {
        title: tutorial.title.clone(),
        html_path,
        pdf_path,
        chapters_total: chapters.len(),
        failures: report.failures,
    };

    info!(
        tutorial = %tutorial.title,
        chapters = outcome.chapters_total,
        dropped = outcome.failures.len(),
        "tutorial processed"
    );

    Ok(outcome)
}

/// Process a list of tutorials sequentially.
///
/// A tutorial that fails fatally (discovery, write, or render error) is
/// logged and skipped; the run always continues to the next one. The
/// overwrite gate is consulted before any network work when the
/// tutorial's rendered artifact already exists.
pub async fn process_tutorials(
    fetcher: &Fetcher,
    tutorials: &[Tutorial],
    opts: &ProcessOptions,
    renderer: Option<&dyn Renderer>,
    gate: &mut OverwriteGate,
    prompt: &dyn OverwritePrompt,
    progress: Arc<dyn ProgressReporter>,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for tutorial in tutorials {
        let stem = safe_file_stem(&tutorial.title);
        let rendered = opts.output_dir.join(format!("{stem}.pdf"));

        if rendered.exists() && !gate.allow(prompt) {
            info!(tutorial = %tutorial.title, "skipping existing artifact");
            summary.skipped += 1;
            continue;
        }

        match process_tutorial(fetcher, tutorial, opts, renderer, Arc::clone(&progress)).await {
            Ok(outcome) => {
                progress.tutorial_done(&outcome);
                summary.processed.push(outcome);
            }
            Err(e) => {
                warn!(tutorial = %tutorial.title, error = %e, "tutorial failed, continuing");
                summary.failed.push((tutorial.title.clone(), e.to_string()));
            }
        }
    }

    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
