//! translationsdb: Projects bounded context.
//!
//! Projects own keys, keys own one translation per locale. State is never
//! stored directly; it is rebuilt by folding the project's event stream.

pub mod application;
pub mod domain;
