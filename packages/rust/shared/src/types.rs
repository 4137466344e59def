//! Core domain types for the tutorial harvesting pipeline.

use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A top-level grouping of tutorials on the source site.
///
/// Categories come from static configuration and are immutable for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Small integer id used for menu selection.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Listing page URL.
    pub url: Url,
}

// ---------------------------------------------------------------------------
// Tutorial
// ---------------------------------------------------------------------------

/// One multi-chapter guide, identified by its index page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tutorial {
    /// Display title, taken from the category card heading.
    pub title: String,
    /// Absolute URL of the tutorial's index (table of contents) page.
    pub index_url: Url,
}

// ---------------------------------------------------------------------------
// Chapter
// ---------------------------------------------------------------------------

/// One page within a tutorial, contributing one section to the final
/// document.
///
/// `ordinal` is the chapter's position in its tutorial's table of
/// contents. It is the sort key that restores deterministic order after
/// concurrent fetching and must survive the whole pipeline unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Position in the table of contents (0-based).
    pub ordinal: usize,
    /// Chapter title from the listing anchor text.
    pub title: String,
    /// Absolute URL of the chapter page.
    pub url: Url,
}

// ---------------------------------------------------------------------------
// ChapterSection
// ---------------------------------------------------------------------------

/// A chapter's normalized content, ready for assembly.
///
/// The markup fragment has chrome stripped and every embedded resource
/// reference rewritten to an absolute URL.
#[derive(Debug, Clone)]
pub struct ChapterSection {
    /// Ordinal of the originating chapter.
    pub ordinal: usize,
    /// Chapter title.
    pub title: String,
    /// Sanitized markup fragment with absolute resource URLs.
    pub html: String,
}

/// A chapter that was dropped during collection, with the reason.
#[derive(Debug, Clone)]
pub struct ChapterFailure {
    /// Ordinal of the failed chapter.
    pub ordinal: usize,
    /// Chapter title.
    pub title: String,
    /// Human-readable failure reason.
    pub reason: String,
}
