use clap::Parser;

#[derive(Parser)]
#[command(name = "fibber", bin_name = "fibber")]
#[command(about = "Stream pseudo-random cat facts, as text or as gzip")]
pub struct Cli {
    /// Emit a gzip stream instead of plain text.
    #[arg(short = 'z', long)]
    pub gzip: bool,

    /// Stop once at least this many uncompressed bytes have been generated.
    #[arg(short = 'l', long, default_value_t = 32768)]
    pub length: u64,

    /// Seed for the random stream; defaults to the wall clock.
    #[arg(short = 's', long)]
    pub seed: Option<u64>,
}
