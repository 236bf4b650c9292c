//! Human-readable program dump for debugging.

use std::fmt::Write as _;

use fibber_deflate::Encoding;

use crate::op::Op;
use crate::program::Program;

/// Render a program, one instruction per line. Alternative arrays indent
/// their entries. Literal text is shown when the pool stores it verbatim;
/// packed pools only expose lengths.
pub fn dump(program: &Program) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "entry {}; {} words; {} literals",
        program.entry(),
        program.len(),
        program.pool().len()
    );

    let mut pending_alts = 0usize;
    let mut i = 0;
    while i < program.len() {
        let word = program.word(i).expect("index within len");
        let indent = if pending_alts > 0 {
            pending_alts -= 1;
            "  "
        } else {
            ""
        };
        let _ = write!(out, "{i:04x}  {indent}");
        match word.decode() {
            None => {
                let _ = writeln!(out, "raw {:#010x}", word.raw());
            }
            Some(Op::Return) => {
                let _ = writeln!(out, "return");
            }
            Some(Op::Call(target)) => {
                let _ = writeln!(out, "call {target}");
            }
            Some(Op::Pick { count }) => {
                pending_alts = count as usize;
                let _ = writeln!(out, "pick {count}");
            }
            Some(Op::Literal(id)) => {
                let lit = program.pool().get(id);
                match program.pool().encoding() {
                    Encoding::Plain => {
                        let text = String::from_utf8_lossy(lit.bytes);
                        let _ = writeln!(out, "lit #{} {:?}", id.as_u32(), text);
                    }
                    Encoding::Packed => {
                        let _ = writeln!(out, "lit #{} len {}", id.as_u32(), lit.len);
                    }
                }
            }
            Some(Op::RandInt { lo }) => {
                let width = program.word(i + 1).map(|w| w.raw()).unwrap_or(0);
                i += 1;
                let _ = writeln!(out, "int {lo}..={}", lo.saturating_add(width));
            }
            Some(Op::Gate { threshold }) => {
                let _ = writeln!(out, "gate {threshold}");
            }
        }
        i += 1;
    }
    out
}
