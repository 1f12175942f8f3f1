use crate::driver::Driver;
use clap::Parser;
use lazy_static::lazy_static;

#[derive(Parser, Debug)]
#[command(author,version,about,long_about=None)]
pub struct Args {
    /// Instruction pattern (.instpat) file to compile
    pub input: String,

    /// File to write the generated dispatch fragment to
    pub output: String,

    /// Dispatch convention to emit
    #[arg(short, long, value_enum, default_value = "direct")]
    pub driver: Driver,

    /// Action template with {name}/{shape} substitution (template driver only)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Receiver class named in emitted member-function pointers
    #[arg(long, default_value = "Core")]
    pub class: String,

    /// Emit the batch-compare strategy for buckets at or above the threshold
    #[arg(long)]
    pub vector: bool,

    /// Smallest bucket the batch-compare strategy is emitted for
    #[arg(long, default_value_t = 32)]
    pub vector_threshold: usize,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

lazy_static! {
    pub static ref ARGS: Args = if cfg!(test) {
        // manually set parameters for running tests
        Args::parse_from(["test", "test.instpat", "test.h"])
    } else {
        Args::parse()
    };
}

pub fn init() {}
pub fn vector() -> bool { ARGS.vector }
