mod cli;

use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use fibber_bytecode::Program;
use fibber_deflate::{GzipStream, RawStream, TokenSink};
use fibber_vm::Session;

use cli::Cli;

/// Output buffer sizing: one fact can never need more than the headroom, so
/// draining at the high-water mark keeps emission from ever filling up.
const BUFFER_HEADROOM: usize = 0x4000;
const BUFFER_CAPACITY: usize = 0x10_0000 + BUFFER_HEADROOM;
const DRAIN_MARK: usize = BUFFER_CAPACITY - BUFFER_HEADROOM;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let seed = cli.seed.unwrap_or(now.as_nanos() as u64);

    let stdout = io::stdout().lock();
    let result = if cli.gzip {
        let sink = GzipStream::with_capacity(BUFFER_CAPACITY).mtime(now.as_secs() as u32);
        run(fibber_facts::packed(), sink, seed, cli.length, stdout)
    } else {
        let sink = RawStream::with_capacity(BUFFER_CAPACITY);
        run(fibber_facts::plain(), sink, seed, cli.length, stdout)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fibber: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run<S: TokenSink>(
    program: &Program,
    sink: S,
    seed: u64,
    length: u64,
    mut out: impl Write,
) -> Result<(), Box<dyn Error>> {
    let mut session = Session::open(program, sink, seed)?;
    while session.position() < length {
        session.generate_one_fact()?;
        if session.buffered_len() >= DRAIN_MARK {
            session.drain(&mut out)?;
        }
    }
    session.close()?;
    session.drain(&mut out)?;
    out.flush()?;
    Ok(())
}
