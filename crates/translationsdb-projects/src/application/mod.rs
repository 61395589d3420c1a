//! Application layer: commands, queries, read models and pipeline wiring.

pub mod command_handlers;
pub mod pipelines;
pub mod query_handlers;
pub mod read_models;
