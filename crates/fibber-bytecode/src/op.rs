//! Opcode words.
//!
//! A program is a flat array of fixed-width words. The high byte of a word
//! is the operation tag and the low 24 bits the operand: a pool index, a
//! sub-program address, an alternative count, or a range bound. A "pointer"
//! is an index into the array. Random-integer instructions are followed by
//! one untagged data word holding the range width.

use serde::{Deserialize, Serialize};

use fibber_deflate::LitId;

/// Index of an instruction in the program's opcode array.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Addr(u32);

impl Addr {
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Addr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

/// Largest value an operand (and therefore an address or pool index) can hold.
pub const MAX_OPERAND: u32 = 0x00ff_ffff;

const TAG_SHIFT: u32 = 24;
const TAG_CALL: u32 = 0x00;
const TAG_GATE: u32 = 0xfb;
const TAG_RAND_INT: u32 = 0xfc;
const TAG_LITERAL: u32 = 0xfd;
const TAG_PICK: u32 = 0xfe;
const TAG_RETURN: u32 = 0xff;

/// One fixed-width program word.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpWord(u32);

impl OpWord {
    #[inline]
    pub fn call(target: Addr) -> Self {
        debug_assert!(target.as_u32() <= MAX_OPERAND);
        Self((TAG_CALL << TAG_SHIFT) | target.as_u32())
    }

    #[inline]
    pub fn ret() -> Self {
        Self(TAG_RETURN << TAG_SHIFT)
    }

    #[inline]
    pub fn pick(count: u32) -> Self {
        debug_assert!(count <= MAX_OPERAND);
        Self((TAG_PICK << TAG_SHIFT) | count)
    }

    #[inline]
    pub fn literal(id: LitId) -> Self {
        debug_assert!(id.as_u32() <= MAX_OPERAND);
        Self((TAG_LITERAL << TAG_SHIFT) | id.as_u32())
    }

    #[inline]
    pub fn rand_int(lo: u32) -> Self {
        debug_assert!(lo <= MAX_OPERAND);
        Self((TAG_RAND_INT << TAG_SHIFT) | lo)
    }

    #[inline]
    pub fn gate(threshold: u32) -> Self {
        debug_assert!(threshold <= 0x10000);
        Self((TAG_GATE << TAG_SHIFT) | threshold)
    }

    /// An untagged data word (the range width after a random-integer).
    #[inline]
    pub fn data(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    fn tag(self) -> u32 {
        self.0 >> TAG_SHIFT
    }

    #[inline]
    fn operand(self) -> u32 {
        self.0 & MAX_OPERAND
    }

    /// Decode the word, or `None` for an unrecognized tag.
    #[inline]
    pub fn decode(self) -> Option<Op> {
        match self.tag() {
            TAG_CALL => Some(Op::Call(Addr::from_raw(self.operand()))),
            TAG_RETURN => Some(Op::Return),
            TAG_PICK => Some(Op::Pick {
                count: self.operand(),
            }),
            TAG_LITERAL => Some(Op::Literal(LitId::from_raw(self.operand()))),
            TAG_RAND_INT => Some(Op::RandInt { lo: self.operand() }),
            TAG_GATE => Some(Op::Gate {
                threshold: self.operand(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for OpWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.decode() {
            Some(op) => write!(f, "OpWord({op:?})"),
            None => write!(f, "OpWord({:#010x})", self.0),
        }
    }
}

/// A decoded instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Op {
    /// Execute the sequence at `target`, then fall through.
    Call(Addr),
    /// End the current sequence.
    Return,
    /// Choose one of the next `count` instructions uniformly at random,
    /// execute exactly that one, and end the current sequence.
    Pick { count: u32 },
    /// Emit a pooled literal.
    Literal(LitId),
    /// Emit a uniform random integer from the closed range starting at `lo`;
    /// the following data word holds the range width (`hi - lo`).
    RandInt { lo: u32 },
    /// Draw from [0, 65536); at or above `threshold`, end the current
    /// sequence early.
    Gate { threshold: u32 },
}
