//! Interned pool of pre-encoded text fragments.
//!
//! Interning happens once, at program-build time, before any stream exists.
//! Each entry stores the fragment's encoded bytes (entropy-coded for the
//! packed encoding, verbatim for plain), its original length, and the
//! checksum of its original bytes so a stream can splice it in O(1) instead
//! of re-folding byte by byte.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::checksum::{Checksum, Crc32};
use crate::tables::TABLES;

/// A lightweight handle to a pooled literal. Indices are dense and assigned
/// in first-use order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct LitId(u32);

impl LitId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Create a LitId from a raw index. Use only for deserialization.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// How pooled literals are stored.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Encoding {
    /// Verbatim bytes, zero checksums. Pairs with [`RawStream`](crate::RawStream).
    Plain,
    /// Entropy-coded bytes with CRC-32 entry checksums. Pairs with the
    /// DEFLATE-based streams.
    Packed,
}

/// Pool-entry metadata: where the encoded bytes live and what they decode to.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PoolEntry {
    offset: u32,
    len: u32,
    encoded_len: u32,
    checksum: u32,
}

/// A resolved literal, borrowed from the pool.
#[derive(Clone, Copy, Debug)]
pub struct Literal<'a> {
    pub id: LitId,
    /// Encoded (stored) bytes.
    pub bytes: &'a [u8],
    /// Original (logical) length.
    pub len: u32,
    /// Checksum of the original bytes, from a zero state.
    pub checksum: u32,
}

/// Append-only storage of interned literals.
#[derive(Debug, Serialize, Deserialize)]
pub struct LiteralPool {
    encoding: Encoding,
    bytes: Vec<u8>,
    entries: Vec<PoolEntry>,
    /// Build-time dedup index; not persisted, loaded pools are read-only.
    #[serde(skip)]
    dedup: HashMap<(u32, u32), LitId>,
}

impl LiteralPool {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            bytes: Vec::new(),
            entries: Vec::new(),
            dedup: HashMap::new(),
        }
    }

    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of pooled literals.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Intern a fragment, returning its stable index.
    ///
    /// A fragment whose original length, checksum, and encoded bytes all
    /// match an existing entry reuses that entry's index.
    pub fn intern(&mut self, text: &str) -> LitId {
        let offset = self.bytes.len();
        let checksum = match self.encoding {
            Encoding::Plain => encode_plain(&mut self.bytes, text),
            Encoding::Packed => encode_packed(&mut self.bytes, text),
        };
        let len = text.len() as u32;

        if let Some(&id) = self.dedup.get(&(len, checksum)) {
            let prior = self.get(id);
            if prior.bytes == &self.bytes[offset..] {
                self.bytes.truncate(offset);
                return id;
            }
        }

        let id = LitId(self.entries.len() as u32);
        self.entries.push(PoolEntry {
            offset: offset as u32,
            len,
            encoded_len: (self.bytes.len() - offset) as u32,
            checksum,
        });
        self.dedup.insert((len, checksum), id);
        id
    }

    /// Resolve an index. Pure lookup, no side effects.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this pool.
    #[inline]
    pub fn get(&self, id: LitId) -> Literal<'_> {
        let e = &self.entries[id.as_usize()];
        let start = e.offset as usize;
        Literal {
            id,
            bytes: &self.bytes[start..start + e.encoded_len as usize],
            len: e.len,
            checksum: e.checksum,
        }
    }
}

/// Verbatim storage for the raw output mode; no checksum to record.
fn encode_plain(out: &mut Vec<u8>, text: &str) -> u32 {
    out.extend_from_slice(text.as_bytes());
    0
}

/// Entropy-code a fragment into whole bytes.
///
/// ASCII bytes map 1:1 to their 8-bit codes. Within a UTF-8 sequence the
/// lead and continuation codes are accumulated bit-wise and flushed at the
/// byte boundary every complete sequence is guaranteed to land on.
fn encode_packed(out: &mut Vec<u8>, text: &str) -> u32 {
    let table = &TABLES.literal;
    let mut check = Crc32::from_state(0);
    let mut chunk: u64 = 0;
    let mut filled: u32 = 0;
    for &b in text.as_bytes() {
        let code = table[b as usize];
        debug_assert!(code.len > 0, "byte {b:#04x} has no literal code");
        check.add(b);
        if b < 0x80 {
            debug_assert_eq!(code.len, 8);
            out.push(code.bits as u8);
        } else if b < 0xc0 {
            chunk |= (code.bits as u64) << filled;
            filled += code.len as u32;
            if filled % 8 == 0 {
                while filled > 0 {
                    out.push(chunk as u8);
                    chunk >>= 8;
                    filled -= 8;
                }
            }
        } else {
            chunk = code.bits as u64;
            filled = code.len as u32;
        }
    }
    debug_assert_eq!(filled, 0, "unterminated UTF-8 sequence");
    check.value()
}
