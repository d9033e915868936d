//! Networth - net-worth tracker with flow-adjusted returns
//!
//! This library turns dated net-worth snapshots and their deposits and
//! withdrawals into flow-adjusted returns, window-relative performance, and
//! benchmark comparisons.

pub mod cli;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod importers;
pub mod pricing;
pub mod reports;
pub mod utils;
