mod fmt;
mod tui;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, Color, Table};
use pulseboard_core::{
    delta, export, load_snapshot, mock::MockProvider, Account, DashboardSnapshot, Delta,
    FilterState, GenerationCounter, RangeSelection,
};

use crate::fmt::{format_count, format_currency, format_pct};

#[derive(Parser)]
#[command(name = "pulseboard")]
#[command(version, about = "Marketing analytics dashboard for social and web performance")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    filters: FilterArgs,

    /// Color theme for the TUI (blue, green, teal, purple, mono)
    #[arg(long, default_value = "blue")]
    theme: String,

    /// Verbose tracing output on stderr
    #[arg(long)]
    debug: bool,
}

#[derive(Args, Clone, Default)]
struct FilterArgs {
    /// Number of days ending today (default 30)
    #[arg(long)]
    days: Option<u32>,

    /// Range start, YYYY-MM-DD (requires --until)
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Range end, YYYY-MM-DD (requires --since)
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Comma-separated account ids (default: all)
    #[arg(long, value_delimiter = ',')]
    accounts: Vec<String>,

    /// Compare against the immediately preceding period
    #[arg(long)]
    compare: bool,
}

impl FilterArgs {
    fn is_default(&self) -> bool {
        self.days.is_none()
            && self.since.is_none()
            && self.until.is_none()
            && self.accounts.is_empty()
            && !self.compare
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show KPI totals, derived ratios and period-over-period deltas
    Kpis {
        /// Output the full snapshot as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Per-account breakdown for the selected period
    Accounts {
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Website traffic grouped by attribution source
    Sources {
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Export the merged time series as CSV
    Export {
        /// Output path (default: dashboard_timeseries.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Launch the interactive dashboard (default when no subcommand)
    Tui {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "pulseboard=debug,pulseboard_core=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let roster = MockProvider::demo_roster();

    match cli.command {
        Some(Commands::Kpis { json, filters }) => {
            let snapshot = load(&resolve_filter(&filters, &roster)?, &roster)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_kpis(&snapshot);
            }
        }
        Some(Commands::Accounts { json, filters }) => {
            let snapshot = load(&resolve_filter(&filters, &roster)?, &roster)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.accounts)?);
            } else {
                print_accounts(&snapshot);
            }
        }
        Some(Commands::Sources { json, filters }) => {
            let snapshot = load(&resolve_filter(&filters, &roster)?, &roster)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.sources)?);
            } else {
                print_sources(&snapshot);
            }
        }
        Some(Commands::Export { output, filters }) => {
            let snapshot = load(&resolve_filter(&filters, &roster)?, &roster)?;
            let path = output.unwrap_or_else(|| PathBuf::from(export::EXPORT_FILENAME));
            export::write_csv(&path, &snapshot.days)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!(
                "{} {} days to {}",
                "Exported".green().bold(),
                snapshot.days.len(),
                path.display()
            );
        }
        Some(Commands::Tui { filters }) => run_tui(filters, cli.theme, &roster)?,
        None => run_tui(cli.filters, cli.theme, &roster)?,
    }

    Ok(())
}

fn run_tui(filters: FilterArgs, theme: String, roster: &[Account]) -> Result<()> {
    // Explicit flags override persisted settings; a bare invocation lets
    // the saved filter state through.
    let filter = if filters.is_default() {
        None
    } else {
        Some(resolve_filter(&filters, roster)?)
    };
    tui::run(tui::TuiConfig {
        theme,
        filter,
        settings_path: None,
    })
}

fn resolve_filter(args: &FilterArgs, roster: &[Account]) -> Result<FilterState> {
    let range = match (args.since, args.until) {
        (Some(start), Some(end)) => RangeSelection::manual(start, end),
        (None, None) => RangeSelection::preset(args.days.unwrap_or(30)),
        _ => bail!("--since and --until must be used together"),
    };

    let selected_accounts = if args.accounts.is_empty() {
        roster.iter().map(|a| a.id.clone()).collect()
    } else {
        for id in &args.accounts {
            if !roster.iter().any(|a| &a.id == id) {
                let known: Vec<&str> = roster.iter().map(|a| a.id.as_str()).collect();
                bail!("unknown account id '{id}' (known: {})", known.join(", "));
            }
        }
        args.accounts.clone()
    };

    Ok(FilterState {
        selected_accounts,
        range,
        compare: args.compare,
    })
}

fn load(filter: &FilterState, roster: &[Account]) -> Result<DashboardSnapshot> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let provider = MockProvider::new();
    let generation = GenerationCounter::new().begin();
    let snapshot = runtime.block_on(load_snapshot(&provider, roster, filter, generation))?;
    if let Some(warning) = &snapshot.warning {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    Ok(snapshot)
}

fn change_cell(delta: Option<Delta>) -> Cell {
    match delta {
        Some(d) if d.ratio >= 0.0 => Cell::new(d.caption()).fg(Color::Green),
        Some(d) => Cell::new(d.caption()).fg(Color::Red),
        None => Cell::new("—").fg(Color::DarkGrey),
    }
}

fn print_kpis(snapshot: &DashboardSnapshot) {
    let compare = snapshot.compare;
    let totals = &snapshot.totals;
    let prev = &snapshot.previous_totals;
    let ratios = &snapshot.ratios;
    let prev_ratios = &snapshot.previous_ratios;

    let rows: Vec<(&str, String, String, Option<Delta>)> = vec![
        (
            "Total Reach",
            format_count(totals.total_reach()),
            format_count(prev.total_reach()),
            delta(compare, totals.total_reach() as f64, prev.total_reach() as f64),
        ),
        (
            "Organic Reach",
            format_count(totals.organic_reach),
            format_count(prev.organic_reach),
            delta(compare, totals.organic_reach as f64, prev.organic_reach as f64),
        ),
        (
            "Paid Reach",
            format_count(totals.paid_reach),
            format_count(prev.paid_reach),
            delta(compare, totals.paid_reach as f64, prev.paid_reach as f64),
        ),
        (
            "Impressions",
            format_count(totals.impressions),
            format_count(prev.impressions),
            delta(compare, totals.impressions as f64, prev.impressions as f64),
        ),
        (
            "Clicks",
            format_count(totals.clicks),
            format_count(prev.clicks),
            delta(compare, totals.clicks as f64, prev.clicks as f64),
        ),
        (
            "Engagements",
            format_count(totals.engagements),
            format_count(prev.engagements),
            delta(compare, totals.engagements as f64, prev.engagements as f64),
        ),
        (
            "Spend",
            format_currency(totals.spend),
            format_currency(prev.spend),
            delta(compare, totals.spend, prev.spend),
        ),
        (
            "Sessions",
            format_count(totals.sessions),
            format_count(prev.sessions),
            delta(compare, totals.sessions as f64, prev.sessions as f64),
        ),
        (
            "Conversions",
            format_count(totals.conversions),
            format_count(prev.conversions),
            delta(compare, totals.conversions as f64, prev.conversions as f64),
        ),
        (
            "CTR",
            format_pct(ratios.click_through_rate),
            format_pct(prev_ratios.click_through_rate),
            delta(compare, ratios.click_through_rate, prev_ratios.click_through_rate),
        ),
        (
            "CPC",
            format_currency(ratios.cost_per_click),
            format_currency(prev_ratios.cost_per_click),
            delta(compare, ratios.cost_per_click, prev_ratios.cost_per_click),
        ),
        (
            "CPM",
            format_currency(ratios.cost_per_mille),
            format_currency(prev_ratios.cost_per_mille),
            delta(compare, ratios.cost_per_mille, prev_ratios.cost_per_mille),
        ),
        (
            "Conversion Rate",
            format_pct(ratios.conversion_rate),
            format_pct(prev_ratios.conversion_rate),
            delta(compare, ratios.conversion_rate, prev_ratios.conversion_rate),
        ),
    ];

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(["Metric", "Current", "Previous", "Change"]);
    for (label, current, previous, d) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(current).set_alignment(CellAlignment::Right),
            Cell::new(if compare { previous } else { "—".to_string() })
                .set_alignment(CellAlignment::Right),
            change_cell(d),
        ]);
    }
    println!("{table}");
}

fn print_accounts(snapshot: &DashboardSnapshot) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header([
        "Account",
        "Type",
        "Organic",
        "Paid",
        "Impressions",
        "Clicks",
        "Engagements",
        "Spend",
    ]);
    for account in &snapshot.accounts {
        table.add_row(vec![
            Cell::new(&account.name),
            Cell::new(account.kind.as_str()),
            Cell::new(format_count(account.organic_reach)).set_alignment(CellAlignment::Right),
            Cell::new(format_count(account.paid_reach)).set_alignment(CellAlignment::Right),
            Cell::new(format_count(account.impressions)).set_alignment(CellAlignment::Right),
            Cell::new(format_count(account.clicks)).set_alignment(CellAlignment::Right),
            Cell::new(format_count(account.engagements)).set_alignment(CellAlignment::Right),
            Cell::new(format_currency(account.spend)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
}

fn print_sources(snapshot: &DashboardSnapshot) {
    let total_sessions: u64 = snapshot.sources.iter().map(|s| s.sessions).sum();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(["Source", "Sessions", "Conversions", "Share"]);
    for source in &snapshot.sources {
        let share = if total_sessions == 0 {
            0.0
        } else {
            source.sessions as f64 / total_sessions as f64
        };
        table.add_row(vec![
            Cell::new(&source.source),
            Cell::new(format_count(source.sessions)).set_alignment(CellAlignment::Right),
            Cell::new(format_count(source.conversions)).set_alignment(CellAlignment::Right),
            Cell::new(format_pct(share)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
}
