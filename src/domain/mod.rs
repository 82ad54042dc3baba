//! Core domain types and logic.

pub mod series;
pub mod ohlcv;
pub mod indicator;
pub mod interval;
pub mod expr;
pub mod expr_parser;
pub mod expr_eval;
pub mod context;
pub mod rule;
pub mod evaluator;
pub mod debounce;
pub mod notification;
pub mod monitor;
pub mod config;
pub mod cycle;
pub mod error;
