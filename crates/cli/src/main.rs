//! report-tables CLI - Replay interactions against report table snapshots

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

mod error;
mod html;
mod schedule;
mod script;

use html::HtmlConfig;
use report_tables_core::{EnhanceConfig, Enhancer, Event, Page, RecordingRenderer};

/// report-tables: interactive behaviour for static report tables
#[derive(Parser, Debug)]
#[command(name = "report-tables")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enhance a page, replay events and write the resulting HTML
    Replay(ReplayArgs),
    /// Enhance a page, replay events and print a summary
    Inspect(InspectArgs),
}

/// Overrides of the page's embedded configuration
#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Sparklines drawn per timer tick
    #[arg(long, env = "REPORT_TABLES_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Delay between sparkline ticks in milliseconds
    #[arg(long, env = "REPORT_TABLES_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// Rows selected when comparison charts are set up
    #[arg(long)]
    compare_rows: Option<usize>,

    /// Prefix of comparison tooltip values
    #[arg(long)]
    value_prefix: Option<String>,

    /// Accessibility description of the comparison x-axis
    #[arg(long)]
    axis_description: Option<String>,
}

impl ConfigArgs {
    fn apply(&self, config: &mut EnhanceConfig) {
        if let Some(batch_size) = self.batch_size {
            config.sparkline_batch_size = batch_size;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.sparkline_interval_ms = interval_ms;
        }
        if let Some(rows) = self.compare_rows {
            config.compare_default_rows = rows;
        }
        if let Some(prefix) = &self.value_prefix {
            config.value_prefix = prefix.clone();
        }
        if let Some(description) = &self.axis_description {
            config.x_axis_description = description.clone();
        }
    }
}

#[derive(Parser, Debug)]
struct ReplayArgs {
    /// Page snapshot (JSON)
    #[arg(value_name = "PAGE")]
    page: PathBuf,

    /// Event script (JSON) replayed after the page is ready
    #[arg(short, long, value_name = "FILE")]
    events: Option<PathBuf>,

    /// Base directory of the output
    #[arg(long, default_value = ".")]
    base_path: PathBuf,

    /// Output directory, relative to the base directory
    #[arg(short, long, default_value = "report")]
    output_dir: String,

    /// Title used when the page has none
    #[arg(long, default_value = "Report")]
    title: String,

    /// Draw every sparkline at once instead of on the timer
    #[arg(long, default_value = "false")]
    no_wait: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Page snapshot (JSON)
    #[arg(value_name = "PAGE")]
    page: PathBuf,

    /// Event script (JSON) replayed after the page is ready
    #[arg(short, long, value_name = "FILE")]
    events: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Replay(args) => replay_command(args).await,
        Commands::Inspect(args) => inspect_command(args),
    }
}

/// Load the page, apply config overrides and read the event script
fn load(
    page_path: &Path,
    events_path: Option<&Path>,
    overrides: &ConfigArgs,
) -> Result<(Page, Vec<Event>)> {
    info!("Loading page from {:?}", page_path);
    let mut page = Page::load_from_file(page_path)
        .with_context(|| format!("Failed to load page snapshot: {:?}", page_path))?;

    overrides.apply(&mut page.config);
    page.config.validate().context("Invalid configuration")?;

    let events = match events_path {
        Some(path) => script::load_script(path)
            .with_context(|| format!("Failed to load event script: {:?}", path))?,
        None => Vec::new(),
    };

    info!(
        tables = page.tables.len(),
        events = events.len(),
        "Loaded page"
    );
    Ok((page, events))
}

/// Bootstrap the page and replay the events in order
fn enhance(page: &mut Page, events: &[Event]) -> Enhancer<RecordingRenderer> {
    let mut enhancer = Enhancer::new(page.config.clone(), RecordingRenderer::new());
    enhancer.ready(page);

    for (index, event) in events.iter().enumerate() {
        let ran = enhancer.dispatch(page, event);
        debug!(index, ?event, handlers = ran, "Replayed event");
    }

    enhancer
}

async fn replay_command(args: ReplayArgs) -> Result<()> {
    let (mut page, events) = load(&args.page, args.events.as_deref(), &args.config)?;
    let started = Utc::now();

    let mut enhancer = enhance(&mut page, &events);

    let ticks = if args.no_wait {
        enhancer.drain_sparklines(&mut page)
    } else {
        let period = enhancer.config().sparkline_interval();
        schedule::drive_sparklines(&mut enhancer, &mut page, period).await
    };
    info!(
        ticks,
        elapsed_ms = (Utc::now() - started).num_milliseconds(),
        "Sparklines drawn"
    );

    let charts = html::charts_from(enhancer.renderer());
    let config = HtmlConfig {
        title: args.title,
        output_dir: args.output_dir,
    };
    html::write_output(&page, &charts, &config, &args.base_path)
        .with_context(|| "Failed to write report output")?;

    println!(
        "Wrote {} with {} charts",
        args.base_path.join(&config.output_dir).display(),
        charts.len()
    );
    Ok(())
}

fn inspect_command(args: InspectArgs) -> Result<()> {
    let (mut page, events) = load(&args.page, args.events.as_deref(), &args.config)?;
    let enhancer = enhance(&mut page, &events);

    println!("{}", if page.title.is_empty() { "(untitled)" } else { page.title.as_str() });
    println!("{}", "=".repeat(40));

    for table in &page.tables {
        let sorted = enhancer
            .sort()
            .state(&table.id)
            .and_then(|s| s.sorted_column().map(|c| (c, s.direction(c))));

        println!(
            "\n{}: {} of {} rows visible",
            table.id,
            table.visible_rows().len(),
            table.body.len()
        );
        if let Some((column, Some(direction))) = sorted {
            println!("  sorted by column {} ({})", column, direction.as_attr());
        }

        let active = enhancer.comparison().active(&table.id);
        if !active.is_empty() {
            println!("  comparing:");
            for row in table.body.iter().filter(|r| active.contains(&r.id)) {
                println!("    - {}", row.label_name());
            }
        }
    }

    for block in &page.compare_blocks {
        match &block.graph {
            Some(graph) => println!("\nchart {} -> #{}", block.id, graph),
            None => println!("\nchart {} not rendered", block.id),
        }
    }

    println!(
        "\n{} listeners bound, comparisons {}",
        enhancer.listeners().len(),
        if page.compare_enabled { "shown" } else { "hidden" }
    );
    Ok(())
}
