//! Session execution.
//!
//! A session walks the opcode array one instruction at a time. Sequences run
//! until a return; a call re-enters at another address and falls through on
//! completion; an alternative array draws one entry, tail-jumps into it, and
//! never resumes its own successor; a gate may cut a sequence short. Every
//! terminal lands in the token sink as a pooled literal, a byte, or a
//! decimal integer.

use std::io;

use fibber_bytecode::{Addr, Op, Program};
use fibber_deflate::{StreamError, TokenSink};

use crate::rng::Rng;

/// Default bound on nested rule calls. Grammar nesting is shallow; hitting
/// this means a rule cycle.
pub const DEFAULT_CALL_DEPTH: u32 = 64;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Rule calls nested past the session's depth limit.
    #[error("rule call depth limit exceeded")]
    CallDepthExceeded,

    /// Instruction pointer left the program. Cannot happen for a validated
    /// program; kept as a hard stop rather than trust.
    #[error("instruction pointer {0:#06x} out of bounds")]
    PcOutOfBounds(u32),

    /// Undecodable word reached at runtime. Same caveat as above.
    #[error("unrecognized opcode {word:#010x} at {addr:#06x}")]
    BadOpcode { addr: u32, word: u32 },
}

/// One generation session: a program, a sink, and the session-local
/// mutable state (PRNG, call depth).
pub struct Session<'p, S: TokenSink> {
    program: &'p Program,
    sink: S,
    rng: Rng,
    depth: u32,
    depth_limit: u32,
}

impl<'p, S: TokenSink> Session<'p, S> {
    /// Open a session: seeds the generator and emits the sink's framing.
    pub fn open(program: &'p Program, mut sink: S, seed: u64) -> Result<Self, EngineError> {
        sink.open()?;
        Ok(Self {
            program,
            sink,
            rng: Rng::new(seed),
            depth: 0,
            depth_limit: DEFAULT_CALL_DEPTH,
        })
    }

    /// Override the rule-call depth limit.
    pub fn call_depth_limit(mut self, limit: u32) -> Self {
        self.depth_limit = limit;
        self
    }

    /// Restart the random stream mid-session.
    pub fn reseed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    /// Execute the program once from its entry rule.
    pub fn generate_one_fact(&mut self) -> Result<(), EngineError> {
        self.run(self.program.entry(), false)
    }

    /// Logical (uncompressed) bytes emitted so far.
    pub fn position(&self) -> u64 {
        self.sink.position()
    }

    /// Serialized bytes waiting to be drained.
    pub fn buffered_len(&self) -> usize {
        self.sink.buffered().len()
    }

    /// Flush the buffered output to `out` and reset the physical buffer.
    /// Position and checksum continue uninterrupted.
    pub fn drain(&mut self, out: &mut impl io::Write) -> io::Result<usize> {
        let chunk = self.sink.buffered();
        out.write_all(chunk)?;
        let n = chunk.len();
        self.sink.clear_buffered();
        Ok(n)
    }

    /// Emit the end-of-stream framing. Drain once more afterwards.
    pub fn close(&mut self) -> Result<(), EngineError> {
        self.sink.close()?;
        Ok(())
    }

    /// Borrow the sink, e.g. to inspect its running position and checksum.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn run(&mut self, addr: Addr, single: bool) -> Result<(), EngineError> {
        if self.depth >= self.depth_limit {
            return Err(EngineError::CallDepthExceeded);
        }
        self.depth += 1;
        let result = self.run_at(addr, single);
        self.depth -= 1;
        result
    }

    fn run_at(&mut self, addr: Addr, single: bool) -> Result<(), EngineError> {
        let mut pc = addr.as_usize();
        loop {
            let word = self
                .program
                .word(pc)
                .ok_or(EngineError::PcOutOfBounds(pc as u32))?;
            let op = word.decode().ok_or(EngineError::BadOpcode {
                addr: pc as u32,
                word: word.raw(),
            })?;
            pc += 1;
            match op {
                Op::Return => return Ok(()),
                Op::Call(target) => self.run(target, false)?,
                Op::Pick { count } => {
                    let chosen = pc + self.rng.below(count) as usize;
                    return self.run(Addr::from_raw(chosen as u32), true);
                }
                Op::Literal(id) => {
                    let lit = self.program.pool().get(id);
                    self.sink.literal(lit)?;
                }
                Op::RandInt { lo } => {
                    let width = self
                        .program
                        .word(pc)
                        .ok_or(EngineError::PcOutOfBounds(pc as u32))?
                        .raw();
                    pc += 1;
                    let value = self.rng.spanned(lo, width);
                    self.sink.integer(value)?;
                }
                Op::Gate { threshold } => {
                    if self.rng.below(0x10000) >= threshold {
                        return Ok(());
                    }
                }
            }
            if single {
                return Ok(());
            }
        }
    }
}
