//! Storage contracts for the single-table design.
//!
//! The table's generic representation ([`Value`], [`RawItem`], [`ItemKey`]),
//! the key schema, the record codec, the write-operation vocabulary, and the
//! [`TableStore`] engine trait. Backends implementing the trait live in the
//! `recipeshare` crate.

pub mod codec;
mod error;
mod http_mapping;
pub mod keys;
mod ops;
mod traits;
mod value;

pub use error::{CancellationCode, Result, ServiceError, StoreError};
pub use http_mapping::service_error_to_status_code;
pub use ops::{IndexQuery, Page, PageToken, RawPage, UpdateAction, WriteCondition, WriteOp};
pub use traits::TableStore;
pub use value::{ItemKey, RawItem, Value};
