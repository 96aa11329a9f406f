//! Configuration validation and run request assembly.
//!
//! Everything is checked before any data is fetched: the `[backtest]`
//! section, the `[strategies] enabled` list and each `[strategy.<id>]`
//! section with its weight and parameters.

use crate::domain::aggregator::StrategyBinding;
use crate::domain::backtest::{
    BacktestConfig, BacktestRequest, DEFAULT_STOP_LOSS_PCT, DEFAULT_WARMUP_BARS,
};
use crate::domain::error::SignalbenchError;
use crate::domain::strategy::{StrategyKind, StrategyParams};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

const BACKTEST: &str = "backtest";
const STRATEGIES: &str = "strategies";
const WEIGHT_KEY: &str = "weight";
const DAY_MS: i64 = 86_400_000;

pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;
pub const DEFAULT_TAKE_PROFIT_RATIO: f64 = 1.0;

/// Section holding the weight and parameters of one enabled strategy.
pub fn strategy_section(kind: StrategyKind) -> String {
    format!("strategy.{}", kind.id())
}

/// Validate the config and build the run request it describes.
pub fn build_request(config: &dyn ConfigPort) -> Result<BacktestRequest, SignalbenchError> {
    validate_backtest_config(config)?;
    let bindings = load_bindings(config)?;

    let (from, to) = date_range(config)?;
    Ok(BacktestRequest {
        bindings,
        symbol: required_string(config, BACKTEST, "symbol")?,
        interval: required_string(config, BACKTEST, "interval")?,
        initial_balance: number(config, BACKTEST, "initial_balance")?
            .unwrap_or(DEFAULT_INITIAL_BALANCE),
        from,
        to,
        take_profit_ratio: number(config, BACKTEST, "take_profit_ratio")?
            .unwrap_or(DEFAULT_TAKE_PROFIT_RATIO),
        config: backtest_config(config)?,
    })
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SignalbenchError> {
    required_string(config, BACKTEST, "symbol")?;
    required_string(config, BACKTEST, "interval")?;
    validate_initial_balance(config)?;
    validate_take_profit_ratio(config)?;
    backtest_config(config)?;
    date_range(config)?;
    Ok(())
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), SignalbenchError> {
    let value = number(config, BACKTEST, "initial_balance")?.unwrap_or(DEFAULT_INITIAL_BALANCE);
    if value <= 0.0 {
        return Err(invalid(BACKTEST, "initial_balance", "initial_balance must be positive"));
    }
    Ok(())
}

fn validate_take_profit_ratio(config: &dyn ConfigPort) -> Result<(), SignalbenchError> {
    let value =
        number(config, BACKTEST, "take_profit_ratio")?.unwrap_or(DEFAULT_TAKE_PROFIT_RATIO);
    if value <= 0.0 {
        return Err(invalid(
            BACKTEST,
            "take_profit_ratio",
            "take_profit_ratio must be positive",
        ));
    }
    Ok(())
}

fn backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SignalbenchError> {
    let warmup = number(config, BACKTEST, "warmup_bars")?.unwrap_or(DEFAULT_WARMUP_BARS as f64);
    if warmup < 0.0 || warmup.fract() != 0.0 {
        return Err(invalid(
            BACKTEST,
            "warmup_bars",
            "warmup_bars must be a non-negative whole number",
        ));
    }

    let stop_loss_pct = number(config, BACKTEST, "stop_loss_pct")?.unwrap_or(DEFAULT_STOP_LOSS_PCT);
    if stop_loss_pct <= 0.0 || stop_loss_pct >= 100.0 {
        return Err(invalid(
            BACKTEST,
            "stop_loss_pct",
            "stop_loss_pct must be between 0 and 100",
        ));
    }

    Ok(BacktestConfig {
        warmup_bars: warmup as usize,
        stop_loss_pct,
    })
}

fn date_range(config: &dyn ConfigPort) -> Result<(Option<i64>, Option<i64>), SignalbenchError> {
    let from = optional_string(config, BACKTEST, "from")
        .map(|s| parse_timestamp(&s, "from", false))
        .transpose()?;
    let to = optional_string(config, BACKTEST, "to")
        .map(|s| parse_timestamp(&s, "to", true))
        .transpose()?;

    if let (Some(f), Some(t)) = (from, to) {
        if f >= t {
            return Err(invalid(BACKTEST, "from", "from must be before to"));
        }
    }
    Ok((from, to))
}

/// Epoch milliseconds, or a `YYYY-MM-DD` date in UTC. A date used as an upper
/// bound covers the whole day.
fn parse_timestamp(value: &str, field: &str, end_of_day: bool) -> Result<i64, SignalbenchError> {
    if let Ok(ms) = value.parse::<i64>() {
        return Ok(ms);
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        invalid(
            BACKTEST,
            field,
            &format!("invalid {} format, expected YYYY-MM-DD or epoch milliseconds", field),
        )
    })?;
    let start = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .ok_or_else(|| invalid(BACKTEST, field, "date out of range"))?;

    Ok(if end_of_day { start + DAY_MS - 1 } else { start })
}

/// Bindings for every enabled strategy, in the order listed.
///
/// A missing `weight` gives that strategy an equal share of 100.
pub fn load_bindings(config: &dyn ConfigPort) -> Result<Vec<StrategyBinding>, SignalbenchError> {
    let enabled = required_string(config, STRATEGIES, "enabled")?;

    let mut kinds: Vec<StrategyKind> = Vec::new();
    for name in enabled.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind = StrategyKind::from_name(name).ok_or_else(|| SignalbenchError::UnknownStrategy {
            name: name.to_string(),
        })?;
        if kinds.contains(&kind) {
            return Err(invalid(
                STRATEGIES,
                "enabled",
                &format!("{} is listed more than once", kind.id()),
            ));
        }
        kinds.push(kind);
    }

    if kinds.is_empty() {
        return Err(SignalbenchError::ConfigMissing {
            section: STRATEGIES.to_string(),
            key: "enabled".to_string(),
        });
    }

    let equal_share = 100.0 / kinds.len() as f64;
    kinds
        .into_iter()
        .map(|kind| {
            let section = strategy_section(kind);
            let weight = number(config, &section, WEIGHT_KEY)?.unwrap_or(equal_share);
            if weight < 0.0 {
                return Err(invalid(&section, WEIGHT_KEY, "weight must be non-negative"));
            }
            let params = load_params(config, kind, &section)?;
            Ok(StrategyBinding::new(kind, weight).with_params(params))
        })
        .collect()
}

/// Schema defaults overlaid with the keys present in `section`.
fn load_params(
    config: &dyn ConfigPort,
    kind: StrategyKind,
    section: &str,
) -> Result<StrategyParams, SignalbenchError> {
    let mut params = kind.default_params();
    let schema = kind.param_schema();

    for key in config.keys(section) {
        if key == WEIGHT_KEY {
            continue;
        }
        let def = schema.iter().find(|d| d.name == key).ok_or_else(|| {
            invalid(
                section,
                &key,
                &format!("unknown parameter for {}", kind.name()),
            )
        })?;
        let raw = config.get_string(section, &key).unwrap_or_default();
        let value = def.parse(&raw).map_err(|reason| invalid(section, &key, &reason))?;
        params.set(def.name, value);
    }

    Ok(params)
}

fn required_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, SignalbenchError> {
    optional_string(config, section, key).ok_or_else(|| SignalbenchError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

fn optional_string(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A present key must parse as a finite number.
fn number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, SignalbenchError> {
    match optional_string(config, section, key) {
        None => Ok(None),
        Some(raw) => match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(invalid(
                section,
                key,
                &format!("{} must be a number, got '{}'", key, raw),
            )),
        },
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> SignalbenchError {
    SignalbenchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
