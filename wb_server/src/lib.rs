//! Settlement server library.
//!
//! Exposes the wagerbook settlement core over HTTP: canonical provider
//! callbacks, operator endpoints, health checks, and Prometheus metrics.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
