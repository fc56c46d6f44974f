use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use clap::Parser;

use kxn_asm::Assembler;

/// KXN assembler
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Assembly source file
    input: PathBuf,

    /// Image file to write
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {:?}", args.input))?;

    let mut assembler = Assembler::new();
    let assembly = assembler
        .assemble(&source)
        .with_context(|| format!("failed to assemble {:?}", args.input))?;

    for diagnostic in &assembly.diagnostics {
        eprintln!("{diagnostic}");
    }

    // The image is written even on errors; the exit code carries the
    // verdict.
    std::fs::write(&args.output, &assembly.image)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    println!(
        "Assembly complete: {} bytes written to {:?}",
        assembly.image.len(),
        args.output
    );

    if assembly.has_errors() {
        exit(1);
    }
    Ok(())
}
