//! Token sinks: the streaming side of the encoder.
//!
//! A sink consumes logical tokens (pooled literals, single bytes, decimal
//! integers) and serializes them. `RawStream` writes the text verbatim;
//! `DeflateStream` writes one byte-aligned DEFLATE block body;
//! `GzipStream` wraps that body in the gzip container.
//!
//! Logical state (running position, checksum, per-literal last-use table)
//! belongs to the stream and survives buffer drains; only the physical write
//! cursor resets.

use crate::checksum::{Checksum, Crc32, NullChecksum};
use crate::pool::Literal;
use crate::tables::TABLES;
use crate::writer::ByteWriter;

/// Shortest run a match can encode.
pub const MIN_MATCH: u32 = 3;
/// Longest run a single match can encode.
pub const MAX_MATCH: u32 = 258;
/// Furthest back a match can reach.
pub const MAX_DISTANCE: u64 = 32768;

const NEVER: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum StreamError {
    /// The output buffer cannot hold the next write. Drain and retry.
    #[error("output buffer full: need {needed} bytes, {available} available")]
    BufferFull { needed: usize, available: usize },
}

/// A consumer of the interpreter's logical token stream.
pub trait TokenSink {
    /// Emit any container/block framing that precedes the body.
    fn open(&mut self) -> Result<(), StreamError>;

    /// Emit a pooled literal, as a backreference when one is reachable.
    fn literal(&mut self, lit: Literal<'_>) -> Result<(), StreamError>;

    /// Emit one byte. Never backreferenced.
    fn byte(&mut self, byte: u8) -> Result<(), StreamError>;

    /// Emit `value` in decimal ASCII, most significant digit first, no
    /// leading zeros, at least one digit.
    fn integer(&mut self, value: u32) -> Result<(), StreamError>;

    /// Emit the end-of-stream framing.
    fn close(&mut self) -> Result<(), StreamError>;

    /// Logical (uncompressed) bytes emitted so far.
    fn position(&self) -> u64;

    /// Serialized bytes not yet drained.
    fn buffered(&self) -> &[u8];

    /// Drop the buffered bytes after the caller has flushed them. Position
    /// and checksum continue uninterrupted.
    fn clear_buffered(&mut self);
}

/// Format `value` into `buf`, returning the used tail.
fn decimal_digits(mut value: u32, buf: &mut [u8; 10]) -> &[u8] {
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    &buf[i..]
}

/// Uncoded pass-through output. Pairs with a plain-encoded pool.
#[derive(Debug)]
pub struct RawStream {
    out: ByteWriter,
    position: u64,
    checksum: NullChecksum,
}

impl RawStream {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: ByteWriter::with_capacity(capacity),
            position: 0,
            checksum: NullChecksum,
        }
    }
}

impl TokenSink for RawStream {
    fn open(&mut self) -> Result<(), StreamError> {
        Ok(())
    }

    fn literal(&mut self, lit: Literal<'_>) -> Result<(), StreamError> {
        self.out.write_bytes(lit.bytes)?;
        self.position += lit.len as u64;
        self.checksum.fast_forward(lit.len as u64);
        self.checksum.splice(lit.checksum);
        Ok(())
    }

    fn byte(&mut self, byte: u8) -> Result<(), StreamError> {
        self.out.write_u8(byte)?;
        self.checksum.add(byte);
        self.position += 1;
        Ok(())
    }

    fn integer(&mut self, value: u32) -> Result<(), StreamError> {
        let mut buf = [0u8; 10];
        let digits = decimal_digits(value, &mut buf);
        self.out.write_bytes(digits)?;
        self.position += digits.len() as u64;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StreamError> {
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn buffered(&self) -> &[u8] {
        self.out.as_slice()
    }

    fn clear_buffered(&mut self) {
        self.out.clear();
    }
}

/// Clip a run to one match-sized segment. Long runs are cut at 258 with the
/// cut pulled back so no residual segment of length 1 or 2 remains, since a
/// match cannot encode them.
pub(crate) fn clip_match_run(len: u32) -> u32 {
    if len <= MAX_MATCH {
        return len;
    }
    match len - MAX_MATCH {
        1 => 256,
        2 => 257,
        _ => 258,
    }
}

pub(crate) fn count_match_runs(mut len: u32) -> usize {
    let mut n = 0;
    while len >= MIN_MATCH {
        len -= clip_match_run(len);
        n += 1;
    }
    n
}

/// One byte-aligned DEFLATE block body with opportunistic literal-identity
/// backreferencing. No windowed search: a literal either replays its
/// pre-encoded bytes or, when the same pool entry was last emitted within
/// the match window, becomes one or more length/distance matches.
#[derive(Debug)]
pub struct DeflateStream {
    out: ByteWriter,
    position: u64,
    checksum: Crc32,
    last_use: Vec<u64>,
}

impl DeflateStream {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: ByteWriter::with_capacity(capacity),
            position: 0,
            checksum: Crc32::new(),
            last_use: Vec::new(),
        }
    }

    /// Running (position, checksum) pair.
    pub fn tell(&self) -> (u64, u32) {
        (self.position, self.checksum.value())
    }

    fn backref(&mut self, len: u32, distance: u64) -> Result<(), StreamError> {
        debug_assert!(
            distance >= 1 && distance <= MAX_DISTANCE,
            "backreference distance {distance} outside the match window"
        );
        let tables = &*TABLES;
        let dist_bits = tables.distance_bits[distance as usize] as u32;
        self.out.ensure(3 * count_match_runs(len))?;
        let mut len = len;
        while len >= MIN_MATCH {
            let run = clip_match_run(len);
            let bits = tables.match_bits[run as usize] as u32 | (dist_bits << 9);
            self.out.write_u24_le(bits)?;
            len -= run;
        }
        Ok(())
    }
}

impl TokenSink for DeflateStream {
    fn open(&mut self) -> Result<(), StreamError> {
        self.out.write_bytes(&TABLES.header)
    }

    fn literal(&mut self, lit: Literal<'_>) -> Result<(), StreamError> {
        let idx = lit.id.as_usize();
        if idx >= self.last_use.len() {
            self.last_use.resize(idx + 16, NEVER);
        }
        let last = self.last_use[idx];
        let hit = lit.len >= MIN_MATCH
            && last != NEVER
            && self.position - last <= MAX_DISTANCE;

        if hit {
            self.backref(lit.len, self.position - last)?;
        } else {
            self.out.write_bytes(lit.bytes)?;
        }
        self.last_use[idx] = self.position;
        self.position += lit.len as u64;
        self.checksum.fast_forward(lit.len as u64);
        self.checksum.splice(lit.checksum);
        Ok(())
    }

    fn byte(&mut self, byte: u8) -> Result<(), StreamError> {
        let code = TABLES.literal[byte as usize];
        debug_assert_eq!(code.len, 8, "byte {byte:#04x} has no 8-bit code");
        self.out.write_u8(code.bits as u8)?;
        self.checksum.add(byte);
        self.position += 1;
        Ok(())
    }

    fn integer(&mut self, value: u32) -> Result<(), StreamError> {
        let mut buf = [0u8; 10];
        let digits = decimal_digits(value, &mut buf);
        self.out.ensure(digits.len())?;
        for &d in digits {
            self.byte(d)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), StreamError> {
        let eob = TABLES.literal[256];
        debug_assert_eq!(eob.len, 8);
        self.out.write_u8(eob.bits as u8)
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn buffered(&self) -> &[u8] {
        self.out.as_slice()
    }

    fn clear_buffered(&mut self) {
        self.out.clear();
    }
}

/// gzip container around a [`DeflateStream`] body.
#[derive(Debug)]
pub struct GzipStream {
    inner: DeflateStream,
    mtime: u32,
}

impl GzipStream {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: DeflateStream::with_capacity(capacity),
            mtime: 0,
        }
    }

    /// Set the header's modification-time field (seconds since the epoch).
    pub fn mtime(mut self, secs: u32) -> Self {
        self.mtime = secs;
        self
    }

    /// Running (position, checksum) pair.
    pub fn tell(&self) -> (u64, u32) {
        self.inner.tell()
    }
}

impl TokenSink for GzipStream {
    fn open(&mut self) -> Result<(), StreamError> {
        self.inner.out.ensure(10 + TABLES.header.len())?;
        // Magic, deflate method, FTEXT flag, mtime, no XFL hints, unix.
        self.inner.out.write_bytes(&[0x1f, 0x8b, 8, 1])?;
        self.inner.out.write_u32_le(self.mtime)?;
        self.inner.out.write_bytes(&[0, 3])?;
        self.inner.open()
    }

    fn literal(&mut self, lit: Literal<'_>) -> Result<(), StreamError> {
        self.inner.literal(lit)
    }

    fn byte(&mut self, byte: u8) -> Result<(), StreamError> {
        self.inner.byte(byte)
    }

    fn integer(&mut self, value: u32) -> Result<(), StreamError> {
        self.inner.integer(value)
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.inner.out.ensure(9)?;
        self.inner.close()?;
        let crc = self.inner.checksum.finalize();
        let len = self.inner.position as u32;
        self.inner.out.write_u32_le(crc)?;
        self.inner.out.write_u32_le(len)
    }

    fn position(&self) -> u64 {
        self.inner.position()
    }

    fn buffered(&self) -> &[u8] {
        self.inner.buffered()
    }

    fn clear_buffered(&mut self) {
        self.inner.clear_buffered();
    }
}
