//! Composite document assembly.
//!
//! Merges a tutorial title and the ordered chapter sections into a
//! single HTML document with print-oriented styling: a page break before
//! each chapter heading, scaled images, and styled code blocks.

use docbinder_shared::ChapterSection;
use tracing::debug;

/// Fixed style preamble for the composite document.
const STYLE: &str = "body{font-family:Arial;line-height:1.6}\
h2{page-break-before:always}\
pre{background:#f4f4f4;padding:10px}\
img{max-width:100%;display:block;margin:10px auto}";

/// Build one composite HTML document from a tutorial title and its
/// collected sections.
///
/// Sections must already be in ordinal order (the collector guarantees
/// this); chapters dropped during collection are simply absent, with no
/// placeholder or gap marker. Deterministic given identical inputs.
pub fn build_document(title: &str, sections: &[ChapterSection]) -> String {
    let mut parts = vec![
        "<!DOCTYPE html><html><head><meta charset='utf-8'><style>".to_string(),
        STYLE.to_string(),
        "</style></head><body>".to_string(),
        format!("<h1>{}</h1>", escape_text(title)),
    ];

    for section in sections {
        parts.push(format!("<h2>{}</h2>", escape_text(&section.title)));
        parts.push(section.html.clone());
    }

    parts.push("</body></html>".to_string());

    debug!(sections = sections.len(), "composite document built");
    parts.join("\n")
}

/// Escape text destined for element content. Section fragments are
/// already markup and are embedded verbatim; only headings need this.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(ordinal: usize, title: &str, html: &str) -> ChapterSection {
        ChapterSection {
            ordinal,
            title: title.into(),
            html: html.into(),
        }
    }

    #[test]
    fn document_has_title_and_style_preamble() {
        let doc = build_document("Rust Tutorial", &[]);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<h1>Rust Tutorial</h1>"));
        assert!(doc.contains("page-break-before:always"));
        assert!(doc.contains("max-width:100%"));
        assert!(doc.ends_with("</body></html>"));
    }

    #[test]
    fn sections_emitted_in_given_order() {
        let sections = vec![
            section(0, "Introduction", "<p>intro</p>"),
            section(1, "Setup", "<p>setup</p>"),
            section(2, "Ownership", "<p>ownership</p>"),
        ];
        let doc = build_document("Rust", &sections);

        let intro = doc.find("<h2>Introduction</h2>").unwrap();
        let setup = doc.find("<h2>Setup</h2>").unwrap();
        let ownership = doc.find("<h2>Ownership</h2>").unwrap();
        assert!(intro < setup && setup < ownership);

        // Each subheading is followed by its fragment.
        assert!(doc.find("<p>intro</p>").unwrap() > intro);
        assert!(doc.find("<p>intro</p>").unwrap() < setup);
    }

    #[test]
    fn dropped_chapters_leave_no_marker() {
        // Ordinal 1 was dropped by the collector.
        let sections = vec![
            section(0, "First", "<p>a</p>"),
            section(2, "Third", "<p>c</p>"),
        ];
        let doc = build_document("T", &sections);

        assert_eq!(doc.matches("<h2>").count(), 2);
        assert!(!doc.contains("missing"));
        assert!(!doc.contains("placeholder"));
    }

    #[test]
    fn headings_are_escaped() {
        let sections = vec![section(0, "C++ <templates> & more", "<p>x</p>")];
        let doc = build_document("A & B", &sections);
        assert!(doc.contains("<h1>A &amp; B</h1>"));
        assert!(doc.contains("<h2>C++ &lt;templates&gt; &amp; more</h2>"));
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let sections = vec![section(0, "One", "<p>1</p>"), section(1, "Two", "<p>2</p>")];
        assert_eq!(
            build_document("T", &sections),
            build_document("T", &sections)
        );
    }
}
