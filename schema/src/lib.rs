//! Runtime support for molecule-encoded chain data. See
//! [https://github.com/nervosnetwork/molecule](https://github.com/nervosnetwork/molecule)
//! for documentation about the format.
//!
//! Two families of foundation codecs live here: generic primitives
//! (`Uint32`, `Byte32`, `Bytes`, ...) that are codec values, and chain
//! entities (`Script`, `OutPoint`, ...) that are structs adapted through
//! [`EntityCodec`]. Both expose the same [`Codec`] interface.
//!
//! ```
//! use molgen_schema::prelude::*;
//!
//! let hash = format!("0x{}", "11".repeat(32));
//! let bytes = BYTE32.encode(&hash).unwrap();
//! assert_eq!(bytes.len(), 32);
//! assert_eq!(BYTE32.decode(&bytes).unwrap(), hash);
//!
//! let amounts = vec![1u32, 2, 3];
//! assert_eq!(UINT32_VEC.encode(&amounts).unwrap().len(), 4 + 3 * 4);
//! ```

pub mod bb;
pub mod codec;
pub mod entity;
pub mod error;
pub mod hex_string;
pub mod primitives;

pub use bb::*;
pub use codec::*;
pub use entity::*;
pub use error::CodecError;
pub use hex_string::{from_hex, to_hex, Hex};
pub use num_bigint::BigUint;
pub use primitives::*;

/// Everything generated codec modules refer to.
pub mod prelude {
    pub use crate::codec::*;
    pub use crate::entity::*;
    pub use crate::error::CodecError;
    pub use crate::hex_string::{from_hex, to_hex, Hex};
    pub use crate::primitives::*;
    pub use num_bigint::BigUint;
}
