//! CLI definition and dispatch.

use chrono::DateTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::cached_data_port::CachedDataPort;
use crate::adapters::csv_adapter::CsvDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestReport, BacktestRequest, run_request};
use crate::domain::config_validation::{build_request, strategy_section};
use crate::domain::error::SignalbenchError;
use crate::domain::position::format_holding_period;
use crate::domain::strategy::{ParamKind, StrategyKind};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "signalbench", about = "Technical-analysis strategy backtester")]
pub struct Cli {
    /// Log level filter; RUST_LOG takes precedence when set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        interval: Option<String>,
    },
    /// List registered strategies and their parameters
    Strategies,
    /// Validate a backtest configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols with data for an interval
    ListSymbols {
        #[arg(long)]
        interval: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show the stored data range for a symbol
    Info {
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        interval: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(&cli.log_level);

    match cli.command {
        Command::Backtest {
            config,
            data_dir,
            symbol,
            interval,
        } => run_backtest(
            &config,
            data_dir.as_deref(),
            symbol.as_deref(),
            interval.as_deref(),
        ),
        Command::Strategies => run_strategies(),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols {
            interval,
            config,
            data_dir,
        } => run_list_symbols(interval.as_deref(), config.as_deref(), data_dir.as_deref()),
        Command::Info {
            symbol,
            interval,
            config,
            data_dir,
        } => run_info(
            symbol.as_deref(),
            interval.as_deref(),
            config.as_deref(),
            data_dir.as_deref(),
        ),
    }
}

/// Install the fmt subscriber once; later calls are no-ops.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SignalbenchError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// `--data-dir`, then `[backtest] data_dir`, then `data`.
fn resolve_data_dir(cli_value: Option<&Path>, config: Option<&dyn ConfigPort>) -> PathBuf {
    cli_value
        .map(Path::to_path_buf)
        .or_else(|| {
            config
                .and_then(|c| c.get_string("backtest", "data_dir"))
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn apply_overrides(
    request: &mut BacktestRequest,
    symbol: Option<&str>,
    interval: Option<&str>,
) -> Result<(), SignalbenchError> {
    for (key, value, target) in [
        ("symbol", symbol, &mut request.symbol),
        ("interval", interval, &mut request.interval),
    ] {
        if let Some(v) = value {
            let v = v.trim();
            if v.is_empty() {
                return Err(SignalbenchError::ConfigInvalid {
                    section: "backtest".to_string(),
                    key: key.to_string(),
                    reason: format!("--{key} must not be empty"),
                });
            }
            *target = v.to_string();
        }
    }
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    data_dir: Option<&Path>,
    symbol: Option<&str>,
    interval: Option<&str>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate and build the request
    let mut request = match build_request(&adapter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = apply_overrides(&mut request, symbol, interval) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Fetch and simulate
    let data_dir = resolve_data_dir(data_dir, Some(&adapter));
    eprintln!(
        "Backtesting {} ({}) from {}",
        request.symbol,
        request.interval,
        data_dir.display()
    );
    let port = CachedDataPort::new(CsvDataAdapter::new(data_dir));
    let report = match run_request(&port, &request) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_report(&report);
    ExitCode::SUCCESS
}

fn format_timestamp(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn format_profit_factor(value: f64) -> String {
    if value.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2}", value)
    }
}

fn print_report(report: &BacktestReport) {
    let metrics = &report.metrics;

    eprintln!("\n=== {} ===", report.strategy_name);
    eprintln!("Initial Balance:  {:.2}", report.initial_balance);
    eprintln!("Final Balance:    {:.2}", report.final_balance);
    eprintln!("Total Return:     {:.2}%", metrics.total_return_pct);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", metrics.total_trades);
    eprintln!(
        "Won / Lost / Even: {} / {} / {}",
        metrics.winning_trades, metrics.losing_trades, metrics.breakeven_trades
    );
    eprintln!("Win Rate:         {:.1}%", metrics.win_rate);
    eprintln!("Profit Factor:    {}", format_profit_factor(metrics.profit_factor));
    eprintln!("Total Profit:     {:.2}", metrics.total_profit);
    eprintln!("Total Loss:       {:.2}", metrics.total_loss);
    eprintln!("Largest Win:      {:.2}", metrics.largest_win);
    eprintln!("Largest Loss:     -{:.2}", metrics.largest_loss);
    if let Some(period) = metrics.avg_holding_period {
        eprintln!("Avg Holding:      {}", format_holding_period(period));
    }

    if report.trades.is_empty() {
        eprintln!("\nNo trades");
        return;
    }

    eprintln!("\n=== Trades ===");
    eprintln!(
        "{:<17} {:>12} {:<17} {:>12} {:>12} {:>10}  Reason",
        "Entry", "Price", "Exit", "Price", "PnL", "Held"
    );
    for trade in &report.trades {
        let exit_time = trade
            .exit_timestamp
            .map(format_timestamp)
            .unwrap_or_else(|| "open".to_string());
        let exit_price = trade
            .exit_price
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        let pnl = trade
            .pnl
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        let held = trade
            .holding_period
            .map(format_holding_period)
            .unwrap_or_else(|| "-".to_string());
        let reason = trade
            .exit_reason
            .map(|r| r.to_string())
            .unwrap_or_default();
        eprintln!(
            "{:<17} {:>12.2} {:<17} {:>12} {:>12} {:>10}  {}",
            format_timestamp(trade.entry_timestamp),
            trade.entry_price,
            exit_time,
            exit_price,
            pnl,
            held,
            reason
        );
    }
}

fn run_strategies() -> ExitCode {
    for kind in StrategyKind::all() {
        println!("{}  {}", kind.id(), kind.name());
        println!("  {}", kind.description());
        println!("  [{}]", strategy_section(kind));
        for def in kind.param_schema() {
            let detail = match &def.kind {
                ParamKind::Number {
                    default,
                    min,
                    max,
                    step,
                } => format!("default {default}, {min}..{max} step {step}"),
                ParamKind::Select { default, options } => {
                    format!("default {default}, one of {}", options.join("|"))
                }
                ParamKind::Text { default } => format!("default '{default}'"),
                ParamKind::Boolean { default } => format!("default {default}"),
            };
            println!(
                "    {} ({}, {}): {}",
                def.name,
                def.type_name(),
                detail,
                def.label
            );
        }
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let request = match build_request(&adapter) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nBacktest:");
    eprintln!("  symbol:            {}", request.symbol);
    eprintln!("  interval:          {}", request.interval);
    eprintln!("  initial balance:   {:.2}", request.initial_balance);
    eprintln!("  take profit ratio: 1:{}", request.take_profit_ratio);
    eprintln!("  stop loss:         {}%", request.config.stop_loss_pct);
    eprintln!("  warm-up bars:      {}", request.config.warmup_bars);
    if let Some(from) = request.from {
        eprintln!("  from:              {}", format_timestamp(from));
    }
    if let Some(to) = request.to {
        eprintln!("  to:                {}", format_timestamp(to));
    }

    eprintln!("\nStrategies:");
    for binding in &request.bindings {
        let params: Vec<String> = binding
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        eprintln!(
            "  {} ({}%): {}",
            binding.kind.name(),
            binding.weight,
            params.join(", ")
        );
    }

    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}

/// Optional config file plus the data directory it resolves to.
fn open_data_source(
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
) -> Result<(Option<FileConfigAdapter>, CsvDataAdapter), ExitCode> {
    let config = match config_path {
        Some(p) => Some(load_config(p)?),
        None => None,
    };
    let dir = resolve_data_dir(data_dir, config.as_ref().map(|c| c as &dyn ConfigPort));
    Ok((config, CsvDataAdapter::new(dir)))
}

fn resolve_key(
    cli_value: Option<&str>,
    config: Option<&FileConfigAdapter>,
    key: &str,
) -> Option<String> {
    cli_value
        .map(str::to_string)
        .or_else(|| config.and_then(|c| c.get_string("backtest", key)))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn run_list_symbols(
    interval: Option<&str>,
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
) -> ExitCode {
    let (config, adapter) = match open_data_source(config_path, data_dir) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let Some(interval) = resolve_key(interval, config.as_ref(), "interval") else {
        eprintln!("error: interval is required (use --interval or set in config)");
        return ExitCode::from(2);
    };

    let symbols = match adapter.list_symbols(&interval) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if symbols.is_empty() {
        eprintln!("No symbols found for interval {}", interval);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}

fn run_info(
    symbol: Option<&str>,
    interval: Option<&str>,
    config_path: Option<&Path>,
    data_dir: Option<&Path>,
) -> ExitCode {
    let (config, adapter) = match open_data_source(config_path, data_dir) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let Some(interval) = resolve_key(interval, config.as_ref(), "interval") else {
        eprintln!("error: interval is required (use --interval or set in config)");
        return ExitCode::from(2);
    };

    let symbols = match resolve_key(symbol, config.as_ref(), "symbol") {
        Some(s) => vec![s],
        None => match adapter.list_symbols(&interval) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    for s in &symbols {
        match adapter.data_range(s, &interval) {
            Ok(Some(range)) => {
                println!(
                    "{} ({}): {} bars, {} to {}",
                    s,
                    interval,
                    range.bars,
                    format_timestamp(range.first),
                    format_timestamp(range.last)
                );
            }
            Ok(None) => {
                eprintln!("{} ({}): no data found", s, interval);
            }
            Err(e) => {
                eprintln!("error querying {} ({}): {}", s, interval, e);
            }
        }
    }
    ExitCode::SUCCESS
}
