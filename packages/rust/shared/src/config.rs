//! Application configuration for docbinder.
//!
//! User config lives at `~/.docbinder/docbinder.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocbinderError, Result};
use crate::types::Category;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docbinder.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docbinder";

/// Root of the default source site.
const DEFAULT_BASE: &str = "https://www.tutorialspoint.com";

// ---------------------------------------------------------------------------
// Config structs (matching docbinder.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Chapter collection settings.
    #[serde(default)]
    pub collect: CollectConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Tutorial categories offered for selection.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            collect: CollectConfig::default(),
            output: OutputConfig::default(),
            categories: default_categories(),
        }
    }
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0".into()
}
fn default_timeout_secs() -> u64 {
    20
}

/// `[collect]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectConfig {
    /// Maximum concurrent chapter fetches per tutorial.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Whether dropped chapters are reported to the operator at the end
    /// of each tutorial (they are always counted and logged).
    #[serde(default = "default_true")]
    pub report_failures: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            report_failures: true,
        }
    }
}

fn default_workers() -> usize {
    5
}
fn default_true() -> bool {
    true
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory where composite documents and rendered files are written.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// External command used to render HTML to PDF.
    #[serde(default = "default_render_command")]
    pub render_command: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            render_command: default_render_command(),
        }
    }
}

fn default_output_dir() -> String {
    "output".into()
}
fn default_render_command() -> String {
    "weasyprint".into()
}

/// `[[categories]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Small integer id used for menu selection.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Listing page URL.
    pub url: String,
}

impl CategoryEntry {
    /// Parse the entry into a domain [`Category`].
    pub fn to_category(&self) -> Result<Category> {
        let url = Url::parse(&self.url).map_err(|e| {
            DocbinderError::config(format!("invalid category URL {}: {e}", self.url))
        })?;
        Ok(Category {
            id: self.id,
            name: self.name.clone(),
            url,
        })
    }
}

/// The built-in category table for the default source site.
fn default_categories() -> Vec<CategoryEntry> {
    let entries = [
        (1, "Programming Languages", "/computer_programming_tutorials.htm"),
        (2, "Latest Technologies", "/latest_technologies.htm"),
        (3, "Machine Learning", "/machine_learning_tutorials.htm"),
        (4, "Computer Science", "/computer_science_tutorials.htm"),
        (5, "Web Development", "/web_development_tutorials.htm"),
        (6, "Mobile Development", "/mobile_development_tutorials.htm"),
        (7, "Databases", "/database_tutorials.htm"),
    ];

    entries
        .into_iter()
        .map(|(id, name, path)| CategoryEntry {
            id,
            name: name.into(),
            url: format!("{DEFAULT_BASE}{path}"),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docbinder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocbinderError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docbinder/docbinder.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file
/// does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocbinderError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocbinderError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocbinderError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocbinderError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocbinderError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("user_agent"));
        assert!(toml_str.contains("render_command"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.fetch.timeout_secs, 20);
        assert_eq!(parsed.collect.workers, 5);
        assert_eq!(parsed.categories.len(), 7);
    }

    #[test]
    fn default_categories_resolve() {
        for entry in default_categories() {
            let cat = entry.to_category().expect("valid category URL");
            assert_eq!(cat.url.host_str(), Some("www.tutorialspoint.com"));
        }
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[collect]
workers = 3

[[categories]]
id = 1
name = "Only One"
url = "https://docs.example.com/list.htm"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.collect.workers, 3);
        assert!(config.collect.report_failures);
        assert_eq!(config.fetch.timeout_secs, 20);
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[0].name, "Only One");
    }

    #[test]
    fn invalid_category_url_rejected() {
        let entry = CategoryEntry {
            id: 9,
            name: "Broken".into(),
            url: "not a url".into(),
        };
        assert!(entry.to_category().is_err());
    }
}
