//! Fixed DEFLATE code tables and the serialized dynamic-table block header.
//!
//! The code lengths here are not derived from live data. They are a fixed
//! assignment chosen so that:
//! - every emittable literal byte gets an 8-bit code,
//! - every length symbol plus its extra bits totals 9 bits,
//! - every distance symbol plus its extra bits totals 15 bits,
//! - the end-of-block symbol gets an 8-bit code.
//!
//! A backreference is therefore always 9 + 15 = 24 bits and the whole block
//! body stays byte-aligned. UTF-8 lead bytes get 14/12/10-bit codes and
//! continuation bytes 10-bit codes, so complete multi-byte sequences also
//! pack to whole bytes.
//!
//! Everything below is built once, at first use, and shared read-only.

use std::sync::LazyLock;

use crate::writer::BitWriter;

/// A canonical Huffman code in LSB-first transmission order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code {
    pub bits: u16,
    pub len: u8,
}

/// Build canonical codes from a per-symbol length assignment.
///
/// Codes of equal length are consecutive integers assigned in symbol order,
/// then bit-reversed for LSB-first packing. Aborts if the lengths
/// oversubscribe the code space; the assignments in this crate are complete
/// by construction and a failure here means the fixed tables are broken.
pub fn canonical_codes(count: usize, len_of: impl Fn(usize) -> u8) -> Vec<Code> {
    let mut hist = [0u32; 16];
    for i in 0..count {
        let len = len_of(i);
        assert!(len < 16, "code length {len} out of range for symbol {i}");
        hist[len as usize] += 1;
    }

    let mut next = [0u32; 16];
    let mut code = 0u32;
    for len in 1..16 {
        next[len] = code;
        code += hist[len];
        assert!(
            code <= 1 << len,
            "oversubscribed code lengths at {len} bits"
        );
        code <<= 1;
    }

    let mut out = vec![Code::default(); count];
    for (i, slot) in out.iter_mut().enumerate() {
        let len = len_of(i);
        if len > 0 {
            let raw = next[len as usize] as u16;
            next[len as usize] += 1;
            *slot = Code {
                bits: raw.reverse_bits() >> (16 - len),
                len,
            };
        }
    }
    out
}

/// Code lengths for the control range 0..32. Bytes with length 0 cannot
/// appear in generated text; the coded ones exist to complete the code space.
const CONTROL_LEN: [u8; 32] = [
    9, 9, 9, 9, 9, 9, 9, 8, //
    8, 8, 8, 8, 8, 8, 0, 0, //
    0, 0, 0, 0, 0, 0, 0, 0, //
    0, 0, 0, 8, 0, 0, 0, 0,
];

/// Code lengths for symbols 256..=285 (end-of-block and match lengths),
/// chosen so code length plus extra bits is always 9.
const MATCH_LEN: [u8; 30] = [
    8, //
    9, 9, 9, 9, 9, 9, 9, 9, //
    8, 8, 8, 8, //
    7, 7, 7, 7, //
    6, 6, 6, 6, //
    5, 5, 5, 5, //
    4, 4, 4, 4, //
    9,
];

fn literal_code_len(sym: usize) -> u8 {
    match sym {
        0..=31 => CONTROL_LEN[sym],
        32..=126 => 8,
        127 => 9,
        0x80..=0xbf => 10,
        0xc0..=0xdf => 14,
        0xe0..=0xef => 12,
        0xf0..=0xf7 => 10,
        256..=285 => MATCH_LEN[sym - 256],
        _ => 0,
    }
}

/// Extra bits for match-length symbol `257 + idx`.
fn match_extra_bits(idx: usize) -> u8 {
    (idx.saturating_sub(4) >> 2) as u8
}

/// Extra bits for distance symbol `sym`.
fn distance_extra_bits(sym: usize) -> u8 {
    (sym.saturating_sub(2) >> 1) as u8
}

/// Distance code lengths: code plus extra bits is always 15.
fn distance_code_len(sym: usize) -> u8 {
    15 - distance_extra_bits(sym)
}

/// The compiled tables: literal codes, expanded match and distance lookup
/// tables, and the serialized block header reused for every stream.
pub struct DeflateTables {
    /// Codes for byte literals 0..=255 plus end-of-block at 256.
    pub literal: [Code; 257],
    /// Run length (3..=258) to its 9-bit length-code-plus-extra unit.
    pub match_bits: [u16; 259],
    /// Distance (1..=32768) to its 15-bit distance-code-plus-extra unit.
    pub distance_bits: Box<[u16]>,
    /// Serialized dynamic-table block header, a whole number of bytes.
    pub header: Vec<u8>,
}

pub static TABLES: LazyLock<DeflateTables> = LazyLock::new(DeflateTables::build);

impl DeflateTables {
    fn build() -> Self {
        let lit_codes = canonical_codes(286, literal_code_len);
        let dist_codes = canonical_codes(30, distance_code_len);

        let mut literal = [Code::default(); 257];
        literal.copy_from_slice(&lit_codes[..257]);

        // Length 258 is representable as symbol 284 with saturated extra
        // bits, so symbol 285 never appears in the expanded table.
        let mut match_bits = [0u16; 259];
        let mut i = 3;
        for (j, c) in lit_codes[257..285].iter().enumerate() {
            let extra = match_extra_bits(j);
            for m in 0..(1u16 << extra) {
                match_bits[i] = c.bits | (m << c.len);
                i += 1;
            }
        }
        assert_eq!(i, 259, "match table must cover runs 3..=258");

        let mut distance_bits = vec![0u16; 32769].into_boxed_slice();
        let mut i = 1;
        for (j, c) in dist_codes.iter().enumerate() {
            let extra = distance_extra_bits(j);
            for m in 0..(1u16 << extra) {
                distance_bits[i] = c.bits | (m << c.len);
                i += 1;
            }
        }
        assert_eq!(i, 32769, "distance table must cover 1..=32768");

        let header = build_header();

        Self {
            literal,
            match_bits,
            distance_bits,
            header,
        }
    }
}

/// One run-length-encoded code-length entry: a code-length symbol 0..=18
/// plus the repeat argument for the three repeat codes.
#[derive(Debug, Clone, Copy)]
struct RleOp {
    code: u8,
    arg: u8,
}

/// RLE a section of code lengths. Runs never span sections.
fn rle_section(out: &mut Vec<RleOp>, lens: &[u8]) {
    let mut i = 0;
    while i < lens.len() {
        let len = lens[i];
        let mut count = 1;
        while i + count < lens.len() && lens[i + count] == len {
            count += 1;
        }
        i += count;
        emit_run(out, len, count);
    }
}

fn emit_run(out: &mut Vec<RleOp>, len: u8, mut count: usize) {
    if len == 0 {
        while count >= 11 {
            let run = count.min(138);
            out.push(RleOp {
                code: 18,
                arg: (run - 11) as u8,
            });
            count -= run;
        }
        while count >= 3 {
            let run = count.min(10);
            out.push(RleOp {
                code: 17,
                arg: (run - 3) as u8,
            });
            count -= run;
        }
    } else {
        out.push(RleOp { code: len, arg: 0 });
        count -= 1;
        while count >= 3 {
            let mut run = count.min(6);
            if count - run == 1 {
                run -= 1;
            }
            if count - run == 2 {
                run -= 1;
            }
            out.push(RleOp {
                code: 16,
                arg: (run - 3) as u8,
            });
            count -= run;
        }
    }
    for _ in 0..count {
        out.push(RleOp { code: len, arg: 0 });
    }
}

fn rle_extra_bits(code: u8) -> u32 {
    match code {
        16 => 2,
        17 => 3,
        18 => 7,
        _ => 0,
    }
}

/// Base length assignment for the 19-symbol code-length alphabet. Complete
/// by construction; the tweak below only permutes the first sixteen entries.
const LENTAB: [u8; 19] = [
    7, 7, 6, 6, 6, 6, 6, 7, //
    4, 5, 4, 5, 6, 6, 6, 7, //
    1, 3, 5,
];

/// Transmission order of the code-length code lengths.
const HCLEN_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Permute the base assignment; multiplying the index by an odd factor is a
/// bijection on 0..16, so completeness is preserved.
fn tweaked_lens(tweak: u32) -> [u8; 19] {
    let mut lens = [0u8; 19];
    for (i, slot) in lens.iter_mut().enumerate() {
        let j = if i <= 15 {
            i * (tweak as usize * 2 + 1) & 15
        } else {
            i
        };
        *slot = LENTAB[j];
    }
    lens
}

/// Serialize the block header.
///
/// The header is stored as an immutable byte blob and the stream writer only
/// handles whole bytes, so the header's own bit length must be a multiple of
/// eight. The 32 candidate length assignments are tried in order until one
/// aligns; none aligning means the fixed tables are unusable, which is fatal.
fn build_header() -> Vec<u8> {
    let lit_lens: Vec<u8> = (0..286).map(literal_code_len).collect();
    let dist_lens: Vec<u8> = (0..30).map(distance_code_len).collect();

    let mut ops = Vec::new();
    rle_section(&mut ops, &lit_lens);
    rle_section(&mut ops, &dist_lens);

    let mut chosen = None;
    for tweak in 0..32 {
        let lens = tweaked_lens(tweak);
        let mut bits = 17 + 3 * 19;
        for op in &ops {
            bits += lens[op.code as usize] as u32 + rle_extra_bits(op.code);
        }
        if bits % 8 == 0 {
            chosen = Some(lens);
            break;
        }
    }
    let lens = chosen.expect("no code-length assignment byte-aligns the block header");
    let codes = canonical_codes(19, |i| lens[i]);

    let mut w = BitWriter::new();
    w.write(1, 1); // final block
    w.write(2, 0b10); // dynamic tables
    w.write(5, 286 - 257); // literal/length count
    w.write(5, 30 - 1); // distance count
    w.write(4, 19 - 4); // code-length count
    for &sym in &HCLEN_ORDER {
        w.write(3, codes[sym].len as u64);
    }
    for op in &ops {
        let c = codes[op.code as usize];
        w.write(c.len as u32, c.bits as u64);
        let extra = rle_extra_bits(op.code);
        if extra > 0 {
            w.write(extra, op.arg as u64);
        }
    }
    w.finish()
}
