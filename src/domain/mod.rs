//! Core domain types and logic.

pub mod aggregator;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod strategy;
pub mod tracker;
