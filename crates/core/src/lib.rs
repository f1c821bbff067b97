//! Core domain types and storage contracts for the recipeshare project.
//!
//! This crate is pure: domain entities, validation, the single-table key
//! schema, the record codec, and the `TableStore` engine contract. Concrete
//! storage backends and the service facade live in the `recipeshare` crate.

pub mod model;
pub mod storage;
