//! Interpreter sessions for compiled fibber grammars.
//!
//! A [`Session`] executes a read-only [`Program`](fibber_bytecode::Program)
//! against a token sink, drawing randomness from its own seeded generator.
//! Programs and the code tables are shared across sessions; everything
//! mutable (PRNG, output stream, backreference bookkeeping) is per session.

pub mod rng;
pub mod session;

#[cfg(test)]
mod rng_tests;

pub use rng::Rng;
pub use session::{DEFAULT_CALL_DEPTH, EngineError, Session};
