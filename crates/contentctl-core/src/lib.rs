#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Table-driven description of the Content Management API operations.
//!
//! Layout: `registry.rs` (descriptors and the immutable lookup table),
//! `table.rs` (the standard operation rows), `flag.rs` (the closed set of
//! behavioural flags and their request-shape deltas), `shape.rs` (the composed
//! request), `record.rs` (operation records, response envelopes, and the
//! JSON-Lines codec), `prepare.rs` (record preparation without execution).
//!
//! Nothing in this crate performs network or file IO; the engine crate turns a
//! composed [`RequestShape`] into an HTTP call.

pub mod arguments;
pub mod error;
pub mod flag;
pub mod prepare;
pub mod record;
pub mod registry;
pub mod shape;
mod table;
mod template;

pub use arguments::Arguments;
pub use error::{ContractError, DecodeError, RegistryError};
pub use flag::Flag;
pub use prepare::prepare;
pub use record::{
    Envelope, OperationRecord, RateLimit, decode_record, decode_record_bytes, encode_envelope,
    encode_line,
};
pub use registry::{Descriptor, Host, Method, Registry, RegistryBuilder};
pub use shape::{BodySource, Confirmation, Payload, PayloadKind, RequestShape, compose};
