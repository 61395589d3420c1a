//! translationsdb HTTP API.
//!
//! A thin JSON adapter over the Projects context: requests become commands
//! dispatched through the pipelines in [`state::AppState`], and reads are
//! served either by replay or by the materialized project list.

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;
pub mod state;
