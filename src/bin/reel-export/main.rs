//! CLI tool to render a persisted storyboard as a printable HTML document.
//!
//! Usage:
//!   reel-export --data-dir ~/.storyreel [--project NAME] [--storyboard NAME] [--output out.html]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use storyreel::persist::{load_root, DirStorage};
use storyreel::store::{Project, Storyboard};
use storyreel::render_storyboard_html;

#[derive(Parser, Debug)]
#[command(
    name = "reel-export",
    about = "Render a persisted storyboard as a printable HTML document",
    version
)]
struct Args {
    /// Directory holding the persisted storyreel data
    #[arg(short, long, env = "STORYREEL_DATA_DIR")]
    data_dir: PathBuf,

    /// Project id or name (defaults to the active project)
    #[arg(short, long)]
    project: Option<String>,

    /// Storyboard id or name (defaults to the project's active storyboard)
    #[arg(short, long)]
    storyboard: Option<String>,

    /// Output file path
    #[arg(short, long, default_value = "storyboard.html")]
    output: PathBuf,
}

fn find_project<'a>(root: &'a storyreel::StoreRoot, selector: &str) -> Option<&'a Project> {
    root.projects
        .iter()
        .find(|p| p.id == selector || p.name == selector)
}

fn find_storyboard<'a>(project: &'a Project, selector: &str) -> Option<&'a Storyboard> {
    project
        .storyboards
        .iter()
        .find(|b| b.id == selector || b.name == selector)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();

    let mut storage = DirStorage::new(&args.data_dir);
    let root = load_root(&mut storage);

    let project = match &args.project {
        Some(selector) => find_project(&root, selector)
            .with_context(|| format!("No project matching '{}'", selector))?,
        None => root
            .active_project()
            .context("No active project in the persisted data")?,
    };

    let storyboard = match &args.storyboard {
        Some(selector) => find_storyboard(project, selector)
            .with_context(|| format!("No storyboard matching '{}'", selector))?,
        None => project
            .active_storyboard()
            .context("Project has no active storyboard")?,
    };

    let html = render_storyboard_html(project, storyboard);
    std::fs::write(&args.output, html)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Exported '{}' / '{}' ({} shots, {:.1}s) to {}",
        project.name,
        storyboard.name,
        storyboard.shots.len(),
        storyboard.total_duration(),
        args.output.display()
    );
    Ok(())
}
