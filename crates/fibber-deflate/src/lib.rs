//! Byte-aligned streaming gzip/DEFLATE encoder.
//!
//! This crate contains:
//! - Byte and bit writers (`ByteWriter`, `BitWriter`)
//! - Spliceable checksums (`NullChecksum`, `Adler32`, `Crc32`)
//! - The fixed DEFLATE code tables and serialized block header (`tables`)
//! - The literal pool (`LiteralPool`) of pre-encoded text fragments
//! - The token sinks (`RawStream`, `DeflateStream`, `GzipStream`)
//!
//! The encoder never searches for matches. Literals are pre-encoded once
//! into the pool; at emission time a literal either replays its encoded
//! bytes or, when the same pool entry was emitted recently enough, turns
//! into a fixed-size length/distance backreference. The code tables are
//! chosen so that both forms occupy whole bytes, which is what keeps the
//! stream writable without a persistent bit register.

pub mod checksum;
pub mod clmul;
pub mod pool;
pub mod stream;
pub mod tables;
pub mod writer;

#[cfg(test)]
mod stream_tests;
#[cfg(test)]
mod tables_tests;

pub use checksum::{Adler32, Checksum, Crc32, NullChecksum};
pub use pool::{Encoding, LitId, Literal, LiteralPool, PoolEntry};
pub use stream::{
    DeflateStream, GzipStream, MAX_DISTANCE, MAX_MATCH, MIN_MATCH, RawStream, StreamError,
    TokenSink,
};
pub use tables::{Code, DeflateTables, TABLES, canonical_codes};
pub use writer::{BitWriter, ByteWriter};
