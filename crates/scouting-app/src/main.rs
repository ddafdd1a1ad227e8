// Scouting run entry point.
//
// 1. Initialize tracing (stderr, so the report can go to stdout)
// 2. Load config from <base>/config/scout.toml
// 3. Load the five stat tables
// 4. Score and compose
// 5. Store the run
// 6. Write the markdown report
//
// Usage: scout [--base <dir>] [--report <file>]

use std::path::PathBuf;

use anyhow::Context;
use scouting_app::config::{self, DataPaths};
use scouting_app::pipeline;
use scouting_app::report;
use scouting_app::store::ResultStore;
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let base_dir = match parse_path_arg("--base") {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    info!("Scouting run starting in {}", base_dir.display());

    let config = config::load_config(&base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: positions={:?}, max_age={}, min_90s={}, top_n={}",
        config.filters.positions,
        config.filters.max_age,
        config.filters.min_90s,
        config.analysis.top_n
    );

    let tables = pipeline::load_tables(&base_dir, &config.data_paths)
        .context("failed to load stat tables")?;
    let results = pipeline::analyze_players(tables, &config).context("analysis failed")?;

    let db_path = DataPaths::resolve(&base_dir, &config.db_path);
    let mut store = ResultStore::open(&db_path.to_string_lossy())
        .context("failed to open result store")?;
    let run = store.save_run(&results).context("failed to store run")?;
    info!(
        "Stored run {} at {} ({} rows)",
        run.run_id,
        run.created_at.to_rfc3339(),
        store.row_count(&run.run_id)?
    );

    let text = report::render_report(&results);
    match parse_path_arg("--report") {
        Some(path) => {
            std::fs::write(&path, &text)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => print!("{text}"),
    }

    Ok(())
}

/// `--name <value>` or `--name=<value>`.
fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&format!("{name}=")) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == name {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

/// Initialize tracing to stderr; stdout carries the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("scouting_app=info,scouting_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
