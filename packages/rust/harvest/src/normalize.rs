//! Chapter content normalization.
//!
//! Locates the designated main-content container, strips non-content
//! chrome (scripts, styles, in-page navigation, ad regions, cover
//! banners), and rewrites image references to absolute URLs resolved
//! against the chapter's own page URL. Chapters live at different paths,
//! so resolution is per chapter, never per tutorial.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use docbinder_shared::{DocbinderError, Result};

/// Identifier of the single main-content container.
const MAIN_CONTENT: &str = "#mainContent";

/// Subtrees removed from the main content before assembly.
const DENYLIST: &str = "script, style, .tutorial-menu, .library-page-bottom-nav, \
                        .google-right-ad, .bottom-library-ads, .cover";

/// Normalize one chapter page into a sanitized markup fragment.
///
/// Returns `ContentNotFound` if the main container is absent; callers
/// in the collection path treat that as a dropped chapter, not a fatal
/// error. Normalizing already-normalized content is a no-op: absolute
/// image references are left untouched byte for byte.
pub fn normalize_content(doc: &Html, page_url: &Url) -> Result<String> {
    let main_sel = Selector::parse(MAIN_CONTENT).unwrap();
    let Some(main) = doc.select(&main_sel).next() else {
        return Err(DocbinderError::content_not_found(
            page_url.as_str(),
            MAIN_CONTENT,
        ));
    };

    let mut html = main.html();

    // Strip chrome by exact serialized match, same trick the fragment
    // serializer guarantees to round-trip.
    let denylist_sel = Selector::parse(DENYLIST).unwrap();
    for el in main.select(&denylist_sel) {
        html = html.replace(&el.html(), "");
    }

    // Rewrite image references against this chapter's page URL.
    let img_sel = Selector::parse("img").unwrap();
    for img in main.select(&img_sel) {
        if let Some((old_tag, new_tag)) = rewrite_img(img, page_url) {
            html = html.replacen(&old_tag, &new_tag, 1);
        }
    }

    debug!(url = %page_url, bytes = html.len(), "chapter normalized");
    Ok(html)
}

/// Compute the serialized replacement for one `<img>` element, or `None`
/// if it needs no change.
///
/// The effective reference is `src`, falling back to the lazy-load
/// `data-src` attribute. Already-absolute references are left alone,
/// which is what makes normalization idempotent.
fn rewrite_img(img: ElementRef<'_>, page_url: &Url) -> Option<(String, String)> {
    let value = img.value();
    let raw = value.attr("src").or_else(|| value.attr("data-src"))?;

    let abs = page_url.join(raw).ok()?;
    if abs.as_str() == raw {
        return None;
    }

    let old_tag = img.html();
    let new_tag = if value.attr("src").is_some() {
        // Anchor on the attribute boundary: a bare `src="…"` search
        // would also hit inside `data-src="…"` when both carry the
        // same placeholder value.
        old_tag.replacen(
            &format!(" src=\"{raw}\""),
            &format!(" src=\"{}\"", abs.as_str()),
            1,
        )
    } else {
        // Lazy-loaded image: inject a real src, keep data-src as-is.
        old_tag.replacen("<img ", &format!("<img src=\"{}\" ", abs.as_str()), 1)
    };

    if new_tag == old_tag {
        return None;
    }
    Some((old_tag, new_tag))
}
