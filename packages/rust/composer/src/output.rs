//! Output file naming and writing.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use docbinder_shared::{DocbinderError, Result};

/// Derive a filesystem-safe stem from a tutorial title: non-word
/// characters stripped, whitespace runs collapsed to single underscores.
pub fn safe_file_stem(title: &str) -> String {
    static NON_WORD: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
    static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let stripped = NON_WORD.replace_all(title, "");
    WHITESPACE
        .replace_all(stripped.trim(), "_")
        .into_owned()
}

/// Write a composite document to `<dir>/<stem>.html`, creating the
/// directory if needed. Returns the written path.
pub fn write_document(dir: &Path, stem: &str, html: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| DocbinderError::io(dir, e))?;

    let path = dir.join(format!("{stem}.html"));
    std::fs::write(&path, html).map_err(|e| DocbinderError::io(&path, e))?;

    debug!(path = %path.display(), bytes = html.len(), "wrote composite document");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_strips_punctuation_and_collapses_whitespace() {
        assert_eq!(safe_file_stem("C++ Programming"), "C_Programming");
        assert_eq!(safe_file_stem("Node.js  &  Express!"), "Nodejs_Express");
        assert_eq!(safe_file_stem("  Rust Tutorial  "), "Rust_Tutorial");
    }

    #[test]
    fn stem_keeps_word_characters() {
        assert_eq!(safe_file_stem("HTML5_Basics"), "HTML5_Basics");
    }

    #[test]
    fn write_creates_directory_and_file() {
        let dir = std::env::temp_dir().join(format!(
            "docbinder-output-test-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);

        let path = write_document(&dir, "Rust_Tutorial", "<html></html>").unwrap();
        assert!(path.ends_with("Rust_Tutorial.html"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
