//! Program construction.
//!
//! Grammar content is written as nested `seq!`/`pick!` invocations over a
//! builder. Text fragments are interned into the literal pool as they are
//! ingested, so rule definition order fixes pool index order.
//!
//! Shape violations (an empty alternative array, a gate threshold past the
//! probability scale, a backwards integer range) abort at build time; they
//! are grammar bugs, not runtime conditions.

use fibber_deflate::{Encoding, LiteralPool};

use crate::op::{Addr, MAX_OPERAND, OpWord};
use crate::program::{Program, ProgramError};

/// One element of a rule under construction.
#[derive(Clone, Copy, Debug)]
pub enum Term<'a> {
    /// A text fragment, interned on ingestion.
    Text(&'a str),
    /// A call to a previously built rule.
    Rule(Addr),
    /// A uniform random integer in the closed range `[lo, hi]`.
    Int(u32, u32),
    /// Continue past this point only with probability `threshold / 65536`.
    Gate(u32),
}

impl<'a> From<&'a str> for Term<'a> {
    fn from(text: &'a str) -> Self {
        Term::Text(text)
    }
}

impl From<Addr> for Term<'_> {
    fn from(rule: Addr) -> Self {
        Term::Rule(rule)
    }
}

/// Accumulates opcode words and pooled literals, then seals them into a
/// validated [`Program`].
#[derive(Debug)]
pub struct ProgramBuilder {
    ops: Vec<OpWord>,
    pool: LiteralPool,
}

impl ProgramBuilder {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            ops: Vec::new(),
            pool: LiteralPool::new(encoding),
        }
    }

    fn here(&self) -> Addr {
        assert!(
            self.ops.len() <= MAX_OPERAND as usize,
            "program exceeds the addressable range"
        );
        Addr::from_raw(self.ops.len() as u32)
    }

    /// Append a sequence rule: each term in order, then a return.
    pub fn seq(&mut self, terms: &[Term]) -> Addr {
        let start = self.here();
        for term in terms {
            self.ingest(term);
        }
        self.ops.push(OpWord::ret());
        start
    }

    /// Append an alternative array: one entry is chosen uniformly per
    /// evaluation. Every alternative must be a single instruction, so only
    /// text and rule calls are allowed.
    pub fn pick(&mut self, alts: &[Term]) -> Addr {
        assert!(!alts.is_empty(), "empty alternative array");
        let start = self.here();
        self.ops.push(OpWord::pick(alts.len() as u32));
        for alt in alts {
            match alt {
                Term::Text(_) | Term::Rule(_) => self.ingest(alt),
                other => panic!("alternative must be text or a rule call, got {other:?}"),
            }
        }
        start
    }

    fn ingest(&mut self, term: &Term) {
        match *term {
            Term::Text(text) => {
                let id = self.pool.intern(text);
                self.ops.push(OpWord::literal(id));
            }
            Term::Rule(target) => self.ops.push(OpWord::call(target)),
            Term::Int(lo, hi) => {
                assert!(lo <= hi, "backwards integer range {lo}..={hi}");
                assert!(lo <= MAX_OPERAND, "range start {lo} exceeds the operand width");
                self.ops.push(OpWord::rand_int(lo));
                self.ops.push(OpWord::data(hi - lo));
            }
            Term::Gate(threshold) => {
                assert!(threshold <= 0x10000, "gate threshold {threshold} exceeds 65536");
                self.ops.push(OpWord::gate(threshold));
            }
        }
    }

    /// Seal the program with its entry rule.
    pub fn finish(self, entry: Addr) -> Result<Program, ProgramError> {
        Program::from_parts(self.ops, self.pool, entry)
    }
}

/// Build a sequence rule: `seq![builder; "text", rule_addr, Term::Int(2, 9)]`.
///
/// Items are evaluated before the builder call, so rules may be built inline.
#[macro_export]
macro_rules! seq {
    ($builder:expr; $($item:expr),+ $(,)?) => {{
        let terms = [$($crate::Term::from($item)),+];
        $builder.seq(&terms)
    }};
}

/// Build an alternative array: `pick![builder; "tigers", "blue cats", rule]`.
///
/// Items are evaluated before the builder call, so rules may be built inline.
#[macro_export]
macro_rules! pick {
    ($builder:expr; $($item:expr),+ $(,)?) => {{
        let terms = [$($crate::Term::from($item)),+];
        $builder.pick(&terms)
    }};
}
