//! Quest dApp cell records.
//!
//! `generated` is compiled by `build.rs` from `schemas/quest.json`; `records`
//! turns those types into the byte payloads stored in campaign, user and
//! protocol cells, and back.

pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/quest.rs"));
}

pub mod records;

pub use generated::*;
pub use records::{CellRecord, RecordError};
