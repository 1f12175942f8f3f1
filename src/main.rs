//! # An instruction decode dispatch generator written in Rust.
//!
//! Compiles a textual list of fixed-width bit-encoded instruction patterns
//! into C++ dispatch code for inclusion in a CPU emulator's decoder.
//!
//! ## Getting Started
//! To generate a dispatch fragment:
//! ```
//! cargo run -- /path/to/patterns.instpat /path/to/decoder.h
//! ```
//! ...or if you've already built the binary then just...
//! ```
//! decgen /path/to/patterns.instpat /path/to/decoder.h
//! ```
//! ## Options
//! Help for command line options is available using -h or --help.
#[macro_use]
mod macros;
mod config;
mod driver;
mod emit;
mod error;
mod parse;
mod pattern;
mod table;
use crate::emit::Emitter;
use crate::parse::Parser;
use std::fs;
use std::io::Write;
use std::result::Result;
pub(crate) use crate::error::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::init();
    // process_file does all the work
    if let Err(e) = process_file(config::ARGS.input.as_str(), config::ARGS.output.as_str()) {
        println!("{}", e);
        return Err(Box::new(e));
    }
    Ok(())
}
/// process_file drives the top level functionality (parse, group, emit) of the app
fn process_file(input: &str, output: &str) -> Result<(), Error> {
    let driver = config::ARGS.driver;
    if config::vector() && !driver.has_vector_form() {
        warn!("the template driver has no batch-compare form; emitting keyed branches only");
    }
    info!("Compiling patterns from {}", input);
    let text = fs::read_to_string(input)?;
    let groups = Parser::new(driver).parse(&text)?;
    verbose_println!("parsed {} group(s)", groups.len());
    let tables = table::build(groups)?;
    let mut emitter = Emitter::new(driver);
    emitter.format = config::ARGS.format.clone();
    emitter.class = config::ARGS.class.clone();
    emitter.vector = config::vector();
    emitter.vector_threshold = config::ARGS.vector_threshold;
    // render the whole fragment before touching the output file so a failed
    // run leaves nothing behind
    let code = emitter.emit(&tables)?;
    let mut file = fs::File::create(output)?;
    file.write_all(code.as_bytes())?;
    println!("wrote dispatch fragment: {}", output);
    Ok(())
}
