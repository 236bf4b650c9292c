use crate::tables::{Code, TABLES, canonical_codes};

/// Undo the LSB-first bit reversal to recover the canonical code value.
fn canonical_value(c: Code) -> u16 {
    c.bits.reverse_bits() >> (16 - c.len)
}

#[test]
fn canonical_codes_are_consecutive_per_length() {
    let codes = canonical_codes(8, |i| [3, 3, 3, 3, 3, 2, 4, 4][i]);
    // Within one length, values are consecutive in symbol order.
    assert_eq!(canonical_value(codes[5]), 0); // the lone 2-bit code
    let threes: Vec<u16> = (0..5).map(|i| canonical_value(codes[i])).collect();
    assert_eq!(threes, vec![2, 3, 4, 5, 6]);
    let fours: Vec<u16> = (6..8).map(|i| canonical_value(codes[i])).collect();
    assert_eq!(fours, vec![14, 15]);
}

#[test]
fn canonical_codes_are_prefix_free() {
    let codes = canonical_codes(286, literal_len);
    for (i, a) in codes.iter().enumerate() {
        for (j, b) in codes.iter().enumerate() {
            if i == j || a.len == 0 || b.len == 0 || a.len > b.len {
                continue;
            }
            // LSB-first: a shorter code is a prefix when it equals the
            // longer code's low bits.
            assert_ne!(
                a.bits,
                b.bits & ((1 << a.len) - 1),
                "code {i} is a prefix of code {j}"
            );
        }
    }
}

/// The crate-private length assignment, reconstructed through the public
/// table: literal codes expose their lengths directly.
fn literal_len(sym: usize) -> u8 {
    if sym < 257 {
        TABLES.literal[sym].len
    } else {
        // Lengths past the end-of-block symbol are only observable through
        // the match table, which is validated separately.
        match sym {
            257..=264 => 9,
            265..=268 => 8,
            269..=272 => 7,
            273..=276 => 6,
            277..=280 => 5,
            281..=284 => 4,
            285 => 9,
            _ => 0,
        }
    }
}

#[test]
#[should_panic(expected = "oversubscribed")]
fn oversubscribed_lengths_abort() {
    // Three 1-bit codes cannot form a prefix code.
    canonical_codes(3, |_| 1);
}

#[test]
fn literal_code_space_is_complete() {
    // A complete prefix code satisfies Kraft with equality. Scaled by 2^15
    // to stay integral (no literal code is longer than 14 bits).
    let mut sum: u64 = 0;
    for sym in 0..286 {
        let len = literal_len(sym);
        if len > 0 {
            assert!(len <= 14);
            sum += 1u64 << (15 - len);
        }
    }
    assert_eq!(sum, 1 << 15);
}

#[test]
fn emittable_bytes_have_byte_codes() {
    for b in (0x20..0x7f).chain([b'\n' as usize, 256]) {
        assert_eq!(TABLES.literal[b].len, 8, "symbol {b}");
    }
}

#[test]
fn match_units_fit_nine_bits() {
    assert_eq!(TABLES.match_bits[0], 0);
    assert_eq!(TABLES.match_bits[1], 0);
    assert_eq!(TABLES.match_bits[2], 0);
    for run in 3..=258 {
        assert!(TABLES.match_bits[run] < 1 << 9, "run {run}");
    }
}

#[test]
fn distance_units_fit_fifteen_bits() {
    for distance in 1..=32768usize {
        assert!(TABLES.distance_bits[distance] < 1 << 15, "distance {distance}");
    }
}

#[test]
fn header_is_byte_aligned_dynamic_block() {
    let header = &TABLES.header;
    assert!(!header.is_empty());
    // LSB-first: BFINAL=1, then BTYPE=10 (dynamic tables).
    assert_eq!(header[0] & 0b111, 0b101);
}
