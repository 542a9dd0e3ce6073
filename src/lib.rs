//! This crate provides a read-only sales analytics API. It loads static JSON datasets of sales,
//! users and customers from disk and serves aggregations of them over HTTP: sales totals and
//! growth, new and active customers per interval, customer counts per city and monthly customer
//! lifetime value.
//!
//! Every request re-reads its dataset and aggregates it in memory. Nothing is written and nothing
//! is cached.
//!
//! The API is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs deserialisation of datasets and serialisation of JSON responses.
//! * [time] parses record dates.
//! * [Prometheus](prometheus) collects request and dataset metrics.

pub mod app;
pub mod app_state;
pub mod cli;
pub mod error;
pub mod metrics;
pub mod models;
pub mod operation;
pub mod operations;
pub mod record_store;
pub mod server;
pub mod tracing;
pub mod types;
pub mod validated_query;
