//! Listing discovery: category page → tutorials, tutorial index → chapters.
//!
//! Both operations share the fetch + parse + select shape. Parsing uses
//! html5ever's tolerant semantics via `scraper`, so missing tags on
//! real-world pages never fail the parse.

use scraper::{Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

use docbinder_shared::{Chapter, Result, Tutorial};

use crate::fetch::Fetcher;

/// Anchor pattern for tutorial cards on a category listing page.
const TUTORIAL_CARD: &str = "div.col-md-3 a[href$='/index.htm']";

/// Title heading inside a tutorial card.
const CARD_TITLE: &str = "h3.lib-content-title";

/// Anchors of the chapter table of contents on a tutorial index page.
const CHAPTER_LINKS: &str = "ul.toc.chapters a";

/// Scan a category listing page for tutorials.
///
/// Tutorials are deduplicated by resolved URL with first-seen order
/// preserved; cards without a recognizable title heading are skipped.
/// A page with no matching cards yields an empty list, not an error.
#[instrument(skip(fetcher), fields(url = %url))]
pub async fn scan_category(fetcher: &Fetcher, url: &Url) -> Result<Vec<Tutorial>> {
    let page = fetcher.fetch(url).await?;
    let doc = Html::parse_document(&page.body);

    let card_sel = Selector::parse(TUTORIAL_CARD).unwrap();
    let title_sel = Selector::parse(CARD_TITLE).unwrap();

    let mut tutorials = Vec::new();
    let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

    for card in doc.select(&card_sel) {
        let Some(heading) = card.select(&title_sel).next() else {
            continue;
        };
        let title = heading.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let Some(href) = card.value().attr("href") else {
            continue;
        };
        // Resolve against the fetched page's own URL, which may differ
        // from the nominal category URL after redirects.
        let index_url = match page.final_url.join(href) {
            Ok(u) => u,
            Err(e) => {
                debug!(href, error = %e, "skipping unresolvable card href");
                continue;
            }
        };

        if !seen.insert(index_url.to_string()) {
            continue;
        }

        tutorials.push(Tutorial { title, index_url });
    }

    if tutorials.is_empty() {
        warn!(%url, "no tutorial cards found on category page");
    } else {
        debug!(count = tutorials.len(), "category scan complete");
    }

    Ok(tutorials)
}

/// Scan a tutorial's index page for its chapters, in document order.
///
/// Each chapter's ordinal is its position in the returned sequence;
/// anchors without an href are skipped. An index page without a chapter
/// list yields an empty list.
#[instrument(skip(fetcher), fields(url = %index_url))]
pub async fn scan_chapters(fetcher: &Fetcher, index_url: &Url) -> Result<Vec<Chapter>> {
    let page = fetcher.fetch(index_url).await?;
    let doc = Html::parse_document(&page.body);

    let link_sel = Selector::parse(CHAPTER_LINKS).unwrap();

    let mut chapters = Vec::new();
    for anchor in doc.select(&link_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let url = match page.final_url.join(href) {
            Ok(u) => u,
            Err(e) => {
                debug!(href, error = %e, "skipping unresolvable chapter href");
                continue;
            }
        };
        let title = anchor.text().collect::<String>().trim().to_string();

        chapters.push(Chapter {
            ordinal: chapters.len(),
            title,
            url,
        });
    }

    debug!(count = chapters.len(), "chapter scan complete");
    Ok(chapters)
}
