//! The compiled program: opcode array + literal pool + entry pointer.
//!
//! Programs come from the builder or from a serialized image. Either way the
//! layout invariants are validated once here and trusted afterwards by the
//! interpreter: addresses in bounds, pool indices in bounds, every
//! alternative array fully populated with single-instruction alternatives,
//! every random-integer followed by its range word.

use serde::{Deserialize, Serialize};

use fibber_deflate::LiteralPool;

use crate::op::{Addr, MAX_OPERAND, Op, OpWord};

/// Magic bytes of a serialized program image.
pub const MAGIC: [u8; 4] = *b"FIBC";
/// Image format version.
pub const VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("invalid magic: expected FIBC")]
    InvalidMagic,
    #[error("unsupported format version: {0} (expected {VERSION})")]
    UnsupportedVersion(u32),
    #[error("truncated program image")]
    Truncated,
    #[error("malformed program image: {0}")]
    Codec(#[from] postcard::Error),
    #[error("empty program")]
    Empty,
    #[error("program too large: {0} words")]
    TooLarge(usize),
    #[error("entry point {0:#06x} is out of bounds")]
    EntryOutOfBounds(u32),
    #[error("unrecognized opcode {word:#010x} at {addr:#06x}")]
    BadOpcode { addr: u32, word: u32 },
    #[error("call target {target:#06x} at {addr:#06x} is out of bounds")]
    CallOutOfBounds { addr: u32, target: u32 },
    #[error("literal index {id} at {addr:#06x} is not in the pool")]
    LiteralOutOfBounds { addr: u32, id: u32 },
    #[error("empty alternative array at {addr:#06x}")]
    EmptyPick { addr: u32 },
    #[error("alternative array at {addr:#06x} overruns the program")]
    PickOverrun { addr: u32 },
    #[error("alternative at {addr:#06x} must be a literal or a call")]
    BadAlternative { addr: u32 },
    #[error("random-integer at {addr:#06x} is missing its range word")]
    TruncatedRange { addr: u32 },
    #[error("gate threshold at {addr:#06x} exceeds 65536")]
    BadThreshold { addr: u32 },
}

/// A validated, immutable compiled grammar.
#[derive(Debug, Serialize, Deserialize)]
pub struct Program {
    ops: Vec<OpWord>,
    pool: LiteralPool,
    entry: Addr,
}

impl Program {
    /// Assemble and validate a program.
    pub fn from_parts(
        ops: Vec<OpWord>,
        pool: LiteralPool,
        entry: Addr,
    ) -> Result<Self, ProgramError> {
        let program = Self { ops, pool, entry };
        program.validate()?;
        Ok(program)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[inline]
    pub fn entry(&self) -> Addr {
        self.entry
    }

    #[inline]
    pub fn pool(&self) -> &LiteralPool {
        &self.pool
    }

    /// Fetch the word at `index`, if it exists.
    #[inline]
    pub fn word(&self, index: usize) -> Option<OpWord> {
        self.ops.get(index).copied()
    }

    /// Serialize to an image: magic, version, then the postcard payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ProgramError> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend(postcard::to_allocvec(self)?);
        Ok(out)
    }

    /// Load and re-validate a serialized image.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProgramError> {
        if bytes.len() < 8 {
            return Err(ProgramError::Truncated);
        }
        if bytes[..4] != MAGIC {
            return Err(ProgramError::InvalidMagic);
        }
        let version = u32::from_le_bytes(bytes[4..8].try_into().expect("sliced to 4 bytes"));
        if version != VERSION {
            return Err(ProgramError::UnsupportedVersion(version));
        }
        let program: Program = postcard::from_bytes(&bytes[8..])?;
        program.validate()?;
        Ok(program)
    }

    /// Check the layout invariants once; execution trusts them afterwards.
    fn validate(&self) -> Result<(), ProgramError> {
        let n = self.ops.len();
        if n == 0 {
            return Err(ProgramError::Empty);
        }
        if n > MAX_OPERAND as usize + 1 {
            return Err(ProgramError::TooLarge(n));
        }
        if self.entry.as_usize() >= n {
            return Err(ProgramError::EntryOutOfBounds(self.entry.as_u32()));
        }

        let mut i = 0;
        while i < n {
            let word = self.ops[i];
            let addr = i as u32;
            let op = word.decode().ok_or(ProgramError::BadOpcode {
                addr,
                word: word.raw(),
            })?;
            match op {
                Op::Return => {}
                Op::Call(target) => self.check_call(addr, target)?,
                Op::Literal(id) => self.check_literal(addr, id.as_u32())?,
                Op::RandInt { .. } => {
                    if i + 1 >= n {
                        return Err(ProgramError::TruncatedRange { addr });
                    }
                    i += 1; // the range word is data, not an instruction
                }
                Op::Gate { threshold } => {
                    if threshold > 0x10000 {
                        return Err(ProgramError::BadThreshold { addr });
                    }
                }
                Op::Pick { count } => {
                    if count == 0 {
                        return Err(ProgramError::EmptyPick { addr });
                    }
                    if i + count as usize >= n {
                        return Err(ProgramError::PickOverrun { addr });
                    }
                    for k in 1..=count as usize {
                        let alt_addr = (i + k) as u32;
                        match self.ops[i + k].decode() {
                            Some(Op::Literal(id)) => self.check_literal(alt_addr, id.as_u32())?,
                            Some(Op::Call(target)) => self.check_call(alt_addr, target)?,
                            _ => return Err(ProgramError::BadAlternative { addr: alt_addr }),
                        }
                    }
                }
            }
            i += 1;
        }
        Ok(())
    }

    fn check_call(&self, addr: u32, target: Addr) -> Result<(), ProgramError> {
        if target.as_usize() >= self.ops.len() {
            return Err(ProgramError::CallOutOfBounds {
                addr,
                target: target.as_u32(),
            });
        }
        Ok(())
    }

    fn check_literal(&self, addr: u32, id: u32) -> Result<(), ProgramError> {
        if id as usize >= self.pool.len() {
            return Err(ProgramError::LiteralOutOfBounds { addr, id });
        }
        Ok(())
    }
}
