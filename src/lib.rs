//! `llm-unit-economics` library crate.
//!
//! Estimates monthly unit economics for LLM providers: cost per million
//! generated tokens and subscription break-even prices, built on a synthetic
//! monthly grid reconciled with external electricity and GPU price series.
//!
//! The binary (`llm-econ`) is a thin wrapper around this library so the whole
//! pipeline is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod coerce;
pub mod cost;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod reconcile;
pub mod report;
