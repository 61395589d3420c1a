//! translationsdb core: event-sourcing primitives.
//!
//! This crate defines the event envelope, the tagged payload codec, the event
//! store and cursor contracts, the replay engine, the persistence boundary and
//! the command pipeline that fans events out to read models inside one
//! transaction. It contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod codec;
pub mod command;
pub mod error;
pub mod event;
pub mod id;
pub mod pipeline;
pub mod read_model;
pub mod store;
pub mod transaction;
