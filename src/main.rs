//! linkstats - statistics for backlink source catalogues
//!
//! A CLI tool that loads a categorized JSON catalogue of backlink source
//! sites, counts the entries with usable metrics, and reports average
//! quality metrics per category and overall.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (read/fetch failure, invalid JSON, bad input shape, etc.)
//!   2 - Fewer valid sites than --expect-min

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod source;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE};
use models::Report;
use serde_json::Value;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(log_level(&args, &config));

    info!("linkstats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(&args, &config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Statistics run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .linkstats.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the input source, validity rules, and report format.");
    Ok(())
}

/// Log level from the flags, raised to DEBUG by `general.verbose`.
fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if !args.quiet && config.general.verbose {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Progress line for the user; kept off stdout when the report goes there.
macro_rules! status {
    ($args:expr, $($fmt:tt)*) => {
        if !$args.quiet {
            if $args.stdout {
                eprintln!($($fmt)*);
            } else {
                println!($($fmt)*);
            }
        }
    };
}

/// Run the load, aggregate and render workflow. Returns exit code (0 or 2).
async fn run(args: &Args, config: &Config) -> Result<i32> {
    let start_time = Instant::now();

    // Step 1: Load the catalogue
    let input = config.input_source();
    if input.is_remote() {
        status!(args, "🌐 Fetching catalogue: {}", input);
    } else {
        status!(args, "📥 Loading catalogue: {}", input);
    }

    let document = source::load_input(&input, &config.load_options(args.quiet))
        .await
        .with_context(|| format!("Failed to load catalogue from {}", input))?;

    // Step 2: Aggregate
    status!(args, "🔢 Computing statistics...");
    let report = build_report(&document, &input.to_string(), config)?;
    let overall = &report.stats.overall;

    // Step 3: Render and write
    let format = config.report.format;
    let output = report::render(&report, format, &config.render_options())?;

    let output_path = config.output_path();
    if args.stdout {
        print!("{}", output);
    } else {
        let path = Path::new(&output_path);
        std::fs::write(path, &output)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    status!(args, "\n📊 Catalogue Summary:");
    status!(args, "   Categories: {}", report.metadata.category_count);
    status!(args, "   Total websites: {}", overall.total);
    status!(args, "   Valid websites: {}", overall.valid);
    status!(
        args,
        "   Avg DA: {} | Avg PA: {} | Avg Spam: {}",
        overall.avg_da,
        overall.avg_pa,
        overall.avg_spam
    );
    status!(args, "   Duration: {:.2}s", start_time.elapsed().as_secs_f64());
    if !args.stdout {
        status!(args, "\n✅ Report saved to: {}", output_path);
    }

    Ok(expect_min_exit_code(overall.valid, args.expect_min))
}

/// Exit code for the --expect-min threshold: 2 when too few sites are valid.
fn expect_min_exit_code(valid: usize, expect_min: Option<usize>) -> i32 {
    match expect_min {
        Some(expected) if valid < expected => {
            eprintln!(
                "\n⛔ Only {} valid websites found, expected at least {} (exit code 2).",
                valid, expected
            );
            2
        }
        _ => 0,
    }
}

/// Aggregate a loaded document into a report.
fn build_report(document: &Value, source: &str, config: &Config) -> Result<Report> {
    let rules = config.validity_rules();
    let stats = analysis::aggregate_value(document, &rules)
        .context("Cannot compute statistics for this catalogue")?;

    info!(
        "Aggregated {} categories: {}/{} valid",
        stats.categories.len(),
        stats.overall.valid,
        stats.overall.total
    );

    Ok(Report::new(source, rules.enforce_metric_ranges, stats))
}

/// Load configuration from file or use defaults, then apply CLI overrides.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        // Try explicit config path
        Config::load(config_path)?
    } else {
        // Try default location
        match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE, e);
                Config::default()
            }
        }
    };

    config.merge_with_args(args);
    Ok(config)
}
