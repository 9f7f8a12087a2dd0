//! # Summit Metrics Engine
//!
//! This crate turns the daily price history of an equity into the handful of
//! numbers a position review starts from: the current market price (CMP), the
//! all-time high (ATH), how far CMP sits below ATH, and exponential moving
//! averages over configurable spans.
//!
//! ## Architectural Principles
//!
//! - **Pure calculation:** Drawdown and EMA functions are pure functions of
//!   their input. The `MetricsEngine` holds nothing but its settings.
//! - **Failures are values:** Every per-symbol problem is a `MetricsResult::Failure`
//!   carrying a typed `MetricsError`. A batch always yields one result per
//!   request, in request order.
//! - **Narrow data seam:** Histories arrive through the `SeriesProvider` trait,
//!   so the engine can be driven by a live HTTP client or an in-memory fixture.
//!
//! ## Public API
//!
//! - `compute_drawdown`, `compute_ema`, `compute_stock_emas`: the numeric primitives.
//! - `MetricsEngine`: per-symbol pipeline, `compute_batch`, and the async
//!   `compute_for_symbols` convenience wrapper.
//! - `MetricsResult`, `SymbolMetrics`: the output records.
//! - `MetricsError`, `ErrorKind`: the error taxonomy.

pub mod drawdown;
pub mod ema;
pub mod engine;
pub mod error;
mod pipeline;
pub mod provider;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use drawdown::{DrawdownSummary, compute_drawdown};
pub use ema::{compute_ema, compute_stock_emas};
pub use engine::MetricsEngine;
pub use error::{ErrorKind, MetricsError};
pub use provider::SeriesProvider;
pub use report::{MetricsResult, SymbolMetrics};
