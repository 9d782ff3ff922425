//! Trade guide: finds the most profitable one-hop buy/sell trip from a city.
//!
//! [`domain`] holds the market model and the planner, [`infra`] loads market
//! data from a hosted database, a snapshot file or the built-in demo market.

pub mod app;
pub mod config;
pub mod domain;
pub mod infra;
pub mod report;
