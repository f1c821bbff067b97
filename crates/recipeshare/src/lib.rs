//! Recipe sharing backend: the access facade and storage backends over the
//! contracts defined in `recipeshare_core`.
//!
//! Request handlers deserialize an inbound request, call one
//! [`RecipeService`] operation, and serialize the tagged result; this crate
//! never speaks HTTP itself.

pub mod config;
pub mod service;
pub mod storage;

pub use config::Config;
pub use service::{ListScope, RecipeService};
