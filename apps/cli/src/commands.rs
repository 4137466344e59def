//! CLI command definitions, routing, and tracing setup.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use docbinder_composer::CommandRenderer;
use docbinder_core::{
    OverwriteGate, OverwritePolicy, OverwritePrompt, ProcessOptions, ProgressReporter,
    RunSummary, TutorialOutcome, process_tutorials,
};
use docbinder_harvest::{Fetcher, scan_category};
use docbinder_shared::{AppConfig, Category, Tutorial, init_config, load_config};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docbinder — bind multi-chapter tutorials into single documents.
#[derive(Parser)]
#[command(
    name = "docbinder",
    version,
    about = "Harvest multi-chapter tutorials into single print-ready documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Overwrite behavior for pre-existing rendered artifacts.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum OverwriteMode {
    /// Ask once at the first conflict; the answer applies to the whole run.
    Ask,
    /// Overwrite without asking.
    Always,
    /// Skip conflicting tutorials without asking.
    Never,
}

impl From<OverwriteMode> for OverwritePolicy {
    fn from(mode: OverwriteMode) -> Self {
        match mode {
            OverwriteMode::Ask => OverwritePolicy::Ask,
            OverwriteMode::Always => OverwritePolicy::Always,
            OverwriteMode::Never => OverwritePolicy::Never,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List configured categories, or the tutorials in one category.
    List {
        /// Category id to scan for tutorials.
        #[arg(short, long)]
        category: Option<u32>,
    },

    /// Grab tutorials: scan, download, assemble, and render.
    Grab {
        /// Category id, repeatable (interactive menu when omitted).
        #[arg(short, long = "category")]
        categories: Vec<u32>,

        /// Grab from every configured category.
        #[arg(long, conflicts_with = "categories")]
        all: bool,

        /// Tutorials to grab: "all" or a comma-separated list of listing
        /// numbers (interactive menu when omitted).
        #[arg(short, long)]
        tutorials: Option<String>,

        /// Output directory (defaults to the configured one).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Concurrent chapter downloads per tutorial.
        #[arg(short, long)]
        workers: Option<usize>,

        /// What to do when a rendered file already exists.
        #[arg(long, default_value = "ask")]
        overwrite: OverwriteMode,

        /// Write the composite HTML only, skip PDF rendering.
        #[arg(long)]
        no_render: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docbinder=info",
        1 => "docbinder=debug",
        _ => "docbinder=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::List { category } => cmd_list(category).await,
        Command::Grab {
            categories,
            all,
            tutorials,
            output,
            workers,
            overwrite,
            no_render,
        } => {
            cmd_grab(
                &categories,
                all,
                tutorials.as_deref(),
                output,
                workers,
                overwrite,
                no_render,
            )
            .await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

async fn cmd_list(category: Option<u32>) -> Result<()> {
    let config = load_config()?;

    let Some(id) = category else {
        println!("Categories:");
        for entry in &config.categories {
            println!("  {:>2}. {}", entry.id, entry.name);
        }
        return Ok(());
    };

    let cat = resolve_category(&config, id)?;
    let fetcher = Fetcher::new(&config.fetch)?;

    info!(category = %cat.name, "scanning category listing");
    let tutorials = scan_category(&fetcher, &cat.url).await?;

    println!("{} — {} tutorials:", cat.name, tutorials.len());
    for (i, t) in tutorials.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, t.title);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// grab
// ---------------------------------------------------------------------------

async fn cmd_grab(
    category_ids: &[u32],
    all: bool,
    tutorials: Option<&str>,
    output: Option<PathBuf>,
    workers: Option<usize>,
    overwrite: OverwriteMode,
    no_render: bool,
) -> Result<()> {
    let config = load_config()?;

    let cats: Vec<Category> = if all {
        config
            .categories
            .iter()
            .map(|c| c.to_category())
            .collect::<docbinder_shared::Result<_>>()?
    } else if !category_ids.is_empty() {
        category_ids
            .iter()
            .map(|id| resolve_category(&config, *id))
            .collect::<Result<_>>()?
    } else {
        vec![choose_category(&config)?]
    };

    let renderer = if no_render {
        None
    } else {
        check_render_command(&config.output.render_command)?;
        Some(CommandRenderer::new(&config.output.render_command))
    };

    let fetcher = Fetcher::new(&config.fetch)?;

    let opts = ProcessOptions {
        output_dir: output.unwrap_or_else(|| PathBuf::from(&config.output.dir)),
        workers: workers.unwrap_or(config.collect.workers),
        report_failures: config.collect.report_failures,
    };

    // The interactive tutorial menu only makes sense for a single
    // category; multi-category runs default to everything listed.
    let pick_interactively = tutorials.is_none() && cats.len() == 1;

    info!(
        categories = cats.len(),
        workers = opts.workers,
        render = renderer.is_some(),
        "starting run"
    );

    let progress = Arc::new(CliProgress::new());
    let mut gate = OverwriteGate::new(overwrite.into());
    let prompt = StdinPrompt;
    let mut summary = RunSummary::default();

    for cat in &cats {
        info!(category = %cat.name, "scanning category listing");
        progress.phase(&format!("Scanning category: {}", cat.name));

        // A failed or empty category never stops the run.
        let listing = match scan_category(&fetcher, &cat.url).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(category = %cat.name, error = %e, "category scan failed, skipping");
                summary.failed.push((cat.name.clone(), e.to_string()));
                continue;
            }
        };
        if listing.is_empty() {
            info!(category = %cat.name, "no tutorials found");
            continue;
        }

        let selected = match tutorials {
            Some(spec) => select_tutorials(&listing, spec)?,
            None if pick_interactively => choose_tutorials(&listing)?,
            None => listing,
        };

        let s = process_tutorials(
            &fetcher,
            &selected,
            &opts,
            renderer
                .as_ref()
                .map(|r| r as &dyn docbinder_composer::Renderer),
            &mut gate,
            &prompt,
            Arc::clone(&progress) as Arc<dyn ProgressReporter>,
        )
        .await;

        summary.processed.extend(s.processed);
        summary.skipped += s.skipped;
        summary.failed.extend(s.failed);
    }

    progress.finish();
    print_summary(&summary, opts.report_failures);

    Ok(())
}

/// Look up a category by its configured id.
fn resolve_category(config: &AppConfig, id: u32) -> Result<Category> {
    let entry = config
        .categories
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| eyre!("unknown category id {id}; run `docbinder list` to see them"))?;
    Ok(entry.to_category()?)
}

/// Verify the external render command responds before starting a run.
fn check_render_command(command: &str) -> Result<()> {
    let check = std::process::Command::new(command).arg("--version").output();

    match check {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            info!(command, version = %version.trim(), "render command found");
            Ok(())
        }
        _ => Err(eyre!(
            "render command '{command}' not found. Install it or pass --no-render."
        )),
    }
}

/// Parse a selection spec ("all" or "1,3,5" in listing order) into
/// tutorials.
fn select_tutorials(listing: &[Tutorial], spec: &str) -> Result<Vec<Tutorial>> {
    if spec.trim().eq_ignore_ascii_case("all") {
        return Ok(listing.to_vec());
    }

    let mut selected = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let n: usize = part
            .parse()
            .map_err(|_| eyre!("invalid tutorial number '{part}'"))?;
        if n == 0 || n > listing.len() {
            return Err(eyre!(
                "tutorial number {n} out of range (1..={})",
                listing.len()
            ));
        }
        selected.push(listing[n - 1].clone());
    }

    if selected.is_empty() {
        return Err(eyre!("empty tutorial selection '{spec}'"));
    }
    Ok(selected)
}

// ---------------------------------------------------------------------------
// Interactive menus
// ---------------------------------------------------------------------------

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn choose_category(config: &AppConfig) -> Result<Category> {
    println!("Categories:");
    for entry in &config.categories {
        println!("  {:>2}. {}", entry.id, entry.name);
    }

    let answer = read_line("Choose a category: ")?;
    let id: u32 = answer
        .parse()
        .map_err(|_| eyre!("invalid category choice '{answer}'"))?;
    resolve_category(config, id)
}

fn choose_tutorials(listing: &[Tutorial]) -> Result<Vec<Tutorial>> {
    println!("Tutorials:");
    println!("  {:>3}. ALL", 0);
    for (i, t) in listing.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, t.title);
    }

    let answer = read_line("Choose tutorials (0 for all, or e.g. 1,3,5): ")?;
    if answer == "0" {
        return Ok(listing.to_vec());
    }
    select_tutorials(listing, &answer)
}

/// Stdin-backed answer to the single per-run overwrite question.
struct StdinPrompt;

impl OverwritePrompt for StdinPrompt {
    fn confirm_overwrite_all(&self) -> bool {
        match read_line("Some files already exist. Overwrite them all? [y/N]: ") {
            Ok(answer) => matches!(answer.as_str(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn chapter_done(&self, completed: usize, total: usize) {
        self.spinner
            .set_message(format!("Downloading chapters [{completed}/{total}]"));
    }

    fn tutorial_done(&self, outcome: &TutorialOutcome) {
        self.spinner.println(format!(
            "  done: {} ({} chapters)",
            outcome.title, outcome.chapters_total
        ));
    }
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

fn print_summary(summary: &RunSummary, report_failures: bool) {
    println!();
    println!("  Run complete.");
    println!("  Processed: {}", summary.processed.len());
    println!("  Skipped:   {}", summary.skipped);
    println!("  Failed:    {}", summary.failed.len());

    for outcome in &summary.processed {
        let target = outcome
            .pdf_path
            .as_deref()
            .unwrap_or(outcome.html_path.as_path());
        println!("    {} -> {}", outcome.title, target.display());

        if report_failures && !outcome.failures.is_empty() {
            println!(
                "      {} of {} chapters dropped:",
                outcome.failures.len(),
                outcome.chapters_total
            );
            for f in &outcome.failures {
                println!("        - {} ({})", f.title, f.reason);
            }
        }
    }

    for (title, reason) in &summary.failed {
        println!("    failed: {title} ({reason})");
    }
    println!();
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn listing() -> Vec<Tutorial> {
        ["Rust", "Go", "Zig"]
            .into_iter()
            .map(|t| Tutorial {
                title: t.into(),
                index_url: Url::parse(&format!(
                    "https://docs.example.com/{}/index.htm",
                    t.to_lowercase()
                ))
                .unwrap(),
            })
            .collect()
    }

    #[test]
    fn select_all_keeps_listing_order() {
        let selected = select_tutorials(&listing(), "all").unwrap();
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].title, "Rust");
        assert_eq!(selected[2].title, "Zig");
    }

    #[test]
    fn select_by_numbers() {
        let selected = select_tutorials(&listing(), "1, 3").unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].title, "Rust");
        assert_eq!(selected[1].title, "Zig");
    }

    #[test]
    fn select_rejects_out_of_range_and_garbage() {
        assert!(select_tutorials(&listing(), "4").is_err());
        assert!(select_tutorials(&listing(), "0").is_err());
        assert!(select_tutorials(&listing(), "two").is_err());
        assert!(select_tutorials(&listing(), " , ").is_err());
    }
}
