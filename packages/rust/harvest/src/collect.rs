//! Concurrent chapter collection: bounded fan-out, ordinal-keyed fan-in.
//!
//! One task per chapter runs fetch → parse → normalize behind a
//! semaphore of fixed width. Tasks complete in arbitrary order; the
//! report is re-sorted by each chapter's ordinal after the join, so
//! output order is always input order minus dropped failures. A failed
//! chapter is recorded and dropped — it never aborts its siblings.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use scraper::Html;
use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use docbinder_shared::{Chapter, ChapterFailure, ChapterSection, Result};

use crate::fetch::Fetcher;
use crate::normalize::normalize_content;

/// Default worker-pool width. A deliberate ceiling to avoid hammering
/// the source server, not a correctness requirement.
const DEFAULT_WORKERS: usize = 5;

/// Options for a collection run.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Maximum in-flight chapter fetches.
    pub workers: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Completion callback, fired once per finished chapter (success or
/// failure) with (completed, total). Observing progress has no effect
/// on ordering guarantees.
pub trait CollectProgress: Send + Sync {
    fn chapter_done(&self, completed: usize, total: usize);
}

/// No-op progress for headless/test usage.
pub struct SilentCollect;

impl CollectProgress for SilentCollect {
    fn chapter_done(&self, _completed: usize, _total: usize) {}
}

/// Outcome of collecting one tutorial's chapters.
#[derive(Debug)]
pub struct CollectReport {
    /// Normalized sections in ordinal order.
    pub sections: Vec<ChapterSection>,
    /// Chapters dropped by per-chapter failures, in ordinal order.
    pub failures: Vec<ChapterFailure>,
}

/// Fetch and normalize all chapters of one tutorial concurrently.
///
/// The sequence of `sections` matches the input `chapters` order
/// exactly, independent of fetch latency or failure of any individual
/// chapter.
#[instrument(skip_all, fields(chapters = chapters.len(), workers = opts.workers))]
pub async fn collect_chapters(
    fetcher: &Fetcher,
    chapters: &[Chapter],
    opts: &CollectOptions,
    progress: Arc<dyn CollectProgress>,
) -> CollectReport {
    let total = chapters.len();
    let semaphore = Arc::new(Semaphore::new(opts.workers.max(1)));
    let completed = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::with_capacity(total);
    for chapter in chapters.iter().cloned() {
        let fetcher = fetcher.clone();
        let semaphore = Arc::clone(&semaphore);
        let completed = Arc::clone(&completed);
        let progress = Arc::clone(&progress);
        let identity = (chapter.ordinal, chapter.title.clone());

        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let outcome = fetch_and_normalize(&fetcher, &chapter).await;
            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            progress.chapter_done(done, total);
            outcome
        });

        handles.push((identity, handle));
    }

    let mut sections = Vec::new();
    let mut failures = Vec::new();

    for ((ordinal, title), handle) in handles {
        match handle.await {
            Ok(Ok(html)) => sections.push(ChapterSection {
                ordinal,
                title,
                html,
            }),
            Ok(Err(e)) => {
                warn!(ordinal, %title, error = %e, "chapter dropped");
                failures.push(ChapterFailure {
                    ordinal,
                    title,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!(ordinal, %title, error = %e, "chapter task failed");
                failures.push(ChapterFailure {
                    ordinal,
                    title,
                    reason: format!("task failed: {e}"),
                });
            }
        }
    }

    // Results are keyed by ordinal; completion order never leaks out.
    sections.sort_by_key(|s| s.ordinal);
    failures.sort_by_key(|f| f.ordinal);

    info!(
        collected = sections.len(),
        dropped = failures.len(),
        "chapter collection complete"
    );

    CollectReport { sections, failures }
}

/// One chapter's pipeline: fetch, parse, normalize.
async fn fetch_and_normalize(fetcher: &Fetcher, chapter: &Chapter) -> Result<String> {
    let page = fetcher.fetch(&chapter.url).await?;
    // The parsed tree is dropped before the next await point.
    let doc = Html::parse_document(&page.body);
    normalize_content(&doc, &page.final_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbinder_shared::FetchConfig;
    use std::sync::Mutex;
    use std::time::Duration;
    use url::Url;

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetchConfig::default()).unwrap()
    }

    fn chapter_body(text: &str) -> String {
        format!(r#"<html><body><div id="mainContent"><p>{text}</p></div></body></html>"#)
    }

    fn chapters_for(server: &wiremock::MockServer, paths: &[(&str, &str)]) -> Vec<Chapter> {
        paths
            .iter()
            .enumerate()
            .map(|(i, (path, title))| Chapter {
                ordinal: i,
                title: (*title).to_string(),
                url: Url::parse(&format!("{}{path}", server.uri())).unwrap(),
            })
            .collect()
    }

    async fn serve_delayed(server: &wiremock::MockServer, path: &str, body: String, delay_ms: u64) {
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(path))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string(body)
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn order_preserved_under_reverse_completion() {
        let server = wiremock::MockServer::start().await;

        // First chapter answers last, last chapter answers first.
        serve_delayed(&server, "/c1.htm", chapter_body("one"), 300).await;
        serve_delayed(&server, "/c2.htm", chapter_body("two"), 150).await;
        serve_delayed(&server, "/c3.htm", chapter_body("three"), 0).await;

        let chapters = chapters_for(&server, &[("/c1.htm", "One"), ("/c2.htm", "Two"), ("/c3.htm", "Three")]);
        let report = collect_chapters(
            &fetcher(),
            &chapters,
            &CollectOptions::default(),
            Arc::new(SilentCollect),
        )
        .await;

        assert!(report.failures.is_empty());
        let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two", "Three"]);
        assert!(report.sections[0].html.contains("one"));
        assert!(report.sections[2].html.contains("three"));
    }

    #[tokio::test]
    async fn failed_chapter_dropped_not_fatal() {
        let server = wiremock::MockServer::start().await;

        serve_delayed(&server, "/c1.htm", chapter_body("one"), 0).await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/c2.htm"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;
        serve_delayed(&server, "/c3.htm", chapter_body("three"), 0).await;

        let chapters = chapters_for(&server, &[("/c1.htm", "One"), ("/c2.htm", "Two"), ("/c3.htm", "Three")]);
        let report = collect_chapters(
            &fetcher(),
            &chapters,
            &CollectOptions::default(),
            Arc::new(SilentCollect),
        )
        .await;

        // Exactly n-1 sections, correct relative order.
        assert_eq!(report.sections.len(), 2);
        assert_eq!(report.sections[0].title, "One");
        assert_eq!(report.sections[1].title, "Three");

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ordinal, 1);
        assert!(report.failures[0].reason.contains("404"));
    }

    #[tokio::test]
    async fn missing_main_content_dropped() {
        let server = wiremock::MockServer::start().await;

        serve_delayed(&server, "/c1.htm", chapter_body("one"), 0).await;
        serve_delayed(
            &server,
            "/c2.htm",
            "<html><body><p>no container</p></body></html>".into(),
            0,
        )
        .await;

        let chapters = chapters_for(&server, &[("/c1.htm", "One"), ("/c2.htm", "Two")]);
        let report = collect_chapters(
            &fetcher(),
            &chapters,
            &CollectOptions::default(),
            Arc::new(SilentCollect),
        )
        .await;

        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("#mainContent"));
    }

    #[tokio::test]
    async fn progress_reports_every_completion() {
        struct Recorder(Mutex<Vec<(usize, usize)>>);
        impl CollectProgress for Recorder {
            fn chapter_done(&self, completed: usize, total: usize) {
                self.0.lock().unwrap().push((completed, total));
            }
        }

        let server = wiremock::MockServer::start().await;
        serve_delayed(&server, "/c1.htm", chapter_body("one"), 0).await;
        serve_delayed(&server, "/c2.htm", chapter_body("two"), 0).await;

        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let chapters = chapters_for(&server, &[("/c1.htm", "One"), ("/c2.htm", "Two")]);
        collect_chapters(
            &fetcher(),
            &chapters,
            &CollectOptions::default(),
            recorder.clone(),
        )
        .await;

        let mut calls = recorder.0.lock().unwrap().clone();
        calls.sort_unstable();
        assert_eq!(calls, vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn empty_chapter_list_yields_empty_report() {
        let report = collect_chapters(
            &fetcher(),
            &[],
            &CollectOptions::default(),
            Arc::new(SilentCollect),
        )
        .await;
        assert!(report.sections.is_empty());
        assert!(report.failures.is_empty());
    }
}
