//! Domain layer: events, aggregates and command inputs.

pub mod aggregates;
pub mod commands;
pub mod events;
