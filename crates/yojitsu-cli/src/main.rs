//! yojitsu CLI - Hotel budget / forecast reporting
//!
//! Command-line interface for loading the per-month budget workbook,
//! deriving the FC/OH series and writing the consolidated report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use yojitsu_core::{
    HolidayCalendar, JapaneseHolidays, Metric, NoHolidays, ReportConfig, Series, YearAggregate,
};
use yojitsu_forecast::build_report;
use yojitsu_loader::load_workbook;
use yojitsu_render::ExcelRenderer;

#[derive(Parser)]
#[command(name = "yojitsu")]
#[command(author, version, about = "Hotel budget/forecast report generator", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Parameters shared by every subcommand: the input workbook plus the two
/// report-wide values collected up front.
#[derive(Args)]
struct ReportArgs {
    /// Input workbook path (one sheet per month)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Room capacity of the property
    #[arg(short, long, env = "YOJITSU_CAPACITY")]
    capacity: u32,

    /// First month of the fiscal year (1-12)
    #[arg(short = 'm', long, env = "YOJITSU_FISCAL_START", default_value_t = 4)]
    fiscal_start_month: u32,

    /// Disable the Japanese public holiday calendar
    #[arg(long)]
    no_holidays: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the consolidated report workbook
    Generate {
        #[command(flatten)]
        report: ReportArgs,

        /// Output directory (current directory if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output filename stem
        #[arg(long, default_value = "予実管理表")]
        report_name: String,

        /// Write computed values instead of recalculable formulas
        #[arg(long)]
        static_values: bool,
    },

    /// Load and derive only, reporting per-month coverage
    Check {
        #[command(flatten)]
        report: ReportArgs,
    },

    /// Print the annual aggregate
    Summary {
        #[command(flatten)]
        report: ReportArgs,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { report, output, report_name, static_values } => {
            run_generate(&report, output, report_name, static_values)
        }
        Commands::Check { report } => run_check(&report),
        Commands::Summary { report, format } => run_summary(&report, &format),
    }
}

fn holiday_calendar(args: &ReportArgs) -> Box<dyn HolidayCalendar> {
    if args.no_holidays {
        Box::new(NoHolidays)
    } else {
        Box::new(JapaneseHolidays)
    }
}

fn load_and_derive(
    args: &ReportArgs,
) -> Result<(ReportConfig, Vec<yojitsu_core::MonthSheet>, YearAggregate)> {
    let config = ReportConfig::new(args.capacity, args.fiscal_start_month)
        .context("invalid report parameters")?;

    tracing::info!(file = %args.file.display(), "loading input workbook");
    let inputs = load_workbook(&args.file, &config)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    tracing::debug!(months = inputs.len(), "loaded month sheets");

    let holidays = holiday_calendar(args);
    let (months, year) = build_report(&inputs, &config, holidays.as_ref())
        .context("forecast derivation failed")?;
    Ok((config, months, year))
}

fn run_generate(
    args: &ReportArgs,
    output: Option<PathBuf>,
    report_name: String,
    static_values: bool,
) -> Result<()> {
    let (config, months, year) = load_and_derive(args)?;

    let mut renderer = ExcelRenderer::new().report_name(report_name);
    if static_values {
        renderer = renderer.static_values();
    }

    let dir = output.unwrap_or_else(|| PathBuf::from("."));
    let path = renderer
        .save(&months, &year, &config, &dir)
        .with_context(|| format!("failed to write report into {}", dir.display()))?;

    tracing::info!(path = %path.display(), "report written");
    println!("出力完了: {}", path.display());
    Ok(())
}

fn run_check(args: &ReportArgs) -> Result<()> {
    let (_, months, year) = load_and_derive(args)?;

    for month in &months {
        let forecast_only = month.days.iter().filter(|d| d.forecast_only).count();
        println!(
            "{}: {} days, {} actualized, {} forecast-only",
            month.sheet_name(),
            month.days.len(),
            month.actual_day_count(),
            forecast_only,
        );
    }
    println!(
        "fiscal year {}: {} of 12 months present",
        year.fiscal_year,
        year.months.iter().filter(|m| m.present).count(),
    );
    Ok(())
}

fn run_summary(args: &ReportArgs, format: &str) -> Result<()> {
    let (_, _, year) = load_and_derive(args)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&year)?);
        }
        "text" => print_text_summary(&year),
        other => anyhow::bail!("unknown summary format '{other}' (expected text or json)"),
    }
    Ok(())
}

fn print_text_summary(year: &YearAggregate) {
    println!("fiscal year {}", year.fiscal_year);
    for series in Series::ALL {
        let line = Metric::ALL
            .iter()
            .map(|metric| {
                let value = year
                    .year_value(series, *metric)
                    .map_or_else(|| "-".to_string(), format_metric_value(*metric));
                format!("{} {}", metric.label(), value)
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("{:<4} {}", series.label(), line);
    }
}

fn format_metric_value(metric: Metric) -> impl Fn(f64) -> String {
    move |value| match metric {
        Metric::Occupancy => format!("{:.1}%", value * 100.0),
        Metric::DaysOfRun => format!("{value:.0}"),
        _ => format!("{value:.0}"),
    }
}
