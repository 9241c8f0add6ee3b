//! Majlis portal - membership, attendance and monthly reporting service
//!
//! # Architecture
//! - `storage`: SeaORM entities access, migrations, atomic upserts
//! - `services`: business rules shared by the HTTP API and the CLI
//! - `api`: HTTP handlers, JSON envelopes and middleware
//! - `config`: static configuration (`config.toml` + `MP__*` environment)
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging setup

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
