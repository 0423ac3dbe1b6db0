//! MF4 Analyzer CLI Application
//!
//! Command-line front end for the mf4-analyzer-core library. It picks the
//! log to analyze, runs the analysis pipeline and adds:
//! - Terminal summary
//! - CSV and JSON exports of the flat result list
//! - One SVG chart per metric group
//! - Report generation (TXT/HTML)

use anyhow::{Context, Result};
use clap::Parser;
use mf4_analyzer_core::{analyze, find_latest_log, open_log, Analysis, ChannelSource, LogFileInfo};
use std::path::PathBuf;

mod config;
mod export;
mod report;

use config::{AppConfig, OutputFormat};

/// MF4 Analyzer - Battery test log analysis
#[derive(Parser, Debug)]
#[command(name = "mf4-analyzer")]
#[command(about = "Analyze decoded battery test logs: signals, mode, KPIs and reports", long_about = None)]
#[command(version)]
struct Args {
    /// Log file to analyze (default: newest log in the input directory)
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Directory searched for the newest log
    #[arg(short, long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Directory receiving all exports
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, value_name = "FORMAT")]
    report: Option<OutputFormat>,

    /// Skip the CSV export
    #[arg(long)]
    no_csv: bool,

    /// Skip the JSON summary export
    #[arg(long)]
    no_json: bool,

    /// Skip the plots
    #[arg(long)]
    no_plots: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("MF4 Analyzer CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using analyzer library v{}", mf4_analyzer_core::VERSION);

    let config = effective_config(&args)?;

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    run(&config, args.quiet)
}

/// Config file (if any) with command-line overrides applied
fn effective_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    if let Some(log) = &args.log {
        config.input.file = Some(log.clone());
    }
    if let Some(dir) = &args.input_dir {
        config.input.dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(format) = args.report {
        config.output.report = format;
    }
    config.output.csv &= !args.no_csv;
    config.output.json &= !args.no_json;
    config.output.plots &= !args.no_plots;

    Ok(config)
}

/// Resolve the log to analyze
fn select_log(config: &AppConfig) -> Result<(Box<dyn ChannelSource>, LogFileInfo)> {
    match &config.input.file {
        Some(path) => {
            let info = LogFileInfo::from_path(path)
                .with_context(|| format!("Cannot read log file {:?}", path))?;
            let source = open_log(path).with_context(|| format!("Failed to load {:?}", path))?;
            Ok((source, info))
        }
        None => find_latest_log(&config.input.dir, &config.input.extensions)
            .with_context(|| format!("No readable log file in {:?}", config.input.dir)),
    }
}

fn run(config: &AppConfig, quiet: bool) -> Result<()> {
    let (source, info) = select_log(config)?;

    let analysis = analyze(&config.analysis, source.as_ref());
    for skipped in &analysis.skipped {
        log::debug!("Skipped {} [{}]: {}", skipped.name, skipped.metric, skipped.reason);
    }

    if !quiet {
        print_summary(&info, &analysis);
    }

    let out_dir = &config.output.dir;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {:?}", out_dir))?;

    let records = analysis.records();
    if config.output.csv {
        export::export_csv(out_dir, &info.base_name, &records)?;
    }
    if config.output.json {
        export::export_json(out_dir, &info.base_name, &records)?;
    }

    let plots = if config.output.plots {
        export::export_plots(out_dir, &info.base_name, analysis.groups())
    } else {
        Vec::new()
    };

    let ctx = report::ReportContext::new(&info, &analysis, &plots);
    report::write_report(out_dir, config.output.report, &ctx)?;

    Ok(())
}

fn print_summary(info: &LogFileInfo, analysis: &Analysis) {
    println!("═══════════════════════════════════════════════");
    println!("  MF4 Analysis - {}", info.file_name);
    println!("═══════════════════════════════════════════════\n");

    for (label, value) in analysis.summary.iter() {
        println!("  {:<25}: {}", label, value);
    }

    println!("\n  Signals evaluated: {}", analysis.signals().len());
    println!("  Signals skipped:   {}", analysis.skipped.len());
    println!("───────────────────────────────────────────────");
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
