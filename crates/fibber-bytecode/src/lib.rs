//! Compiled grammar format for fibber.
//!
//! This crate contains:
//! - Opcode words and their decoded form (`OpWord`, `Op`)
//! - The compiled program (`Program`): a flat opcode array, a literal pool,
//!   and an entry pointer, with load-time validation and serialization
//! - The `ProgramBuilder` and the `seq!`/`pick!` construction macros
//! - A human-readable program dump for debugging

pub mod builder;
pub mod dump;
pub mod op;
pub mod program;

#[cfg(test)]
mod program_tests;

pub use builder::{ProgramBuilder, Term};
pub use dump::dump;
pub use op::{Addr, MAX_OPERAND, Op, OpWord};
pub use program::{MAGIC, Program, ProgramError, VERSION};
