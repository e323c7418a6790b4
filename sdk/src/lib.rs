//! molgen
//!
//! The one crate a project depends on to use molecule codecs generated by
//! `molgen`:
//!
//! - the runtime (`Codec`, combinators, primitive codecs, chain entities) and
//!   the `prelude` that generated modules import,
//! - the generator entry points, for `build.rs` scripts,
//! - `decode_to_json` for inspecting encoded cell data.

use serde::Serialize;
use thiserror::Error;

pub use molgen_schema::*;

pub use molgen_compiler::{check, generate, render, GeneratorConfig, GenerationReport, MolgenError};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode `bytes` with `codec` into a pretty-printed JSON string.
pub fn decode_to_json<C>(codec: &C, bytes: &[u8]) -> Result<String, DecodeError>
where
    C: Codec,
    C::Value: Serialize,
{
    let value = codec.decode(bytes)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

pub mod compiler {
    pub use molgen_compiler::*;
}
