use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use kxn_host::{ConsoleFrontend, Platform};
use kxn_vm::{Fault, Vm};

/// KXN image runner
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Image to load and execute
    image: PathBuf,
}

fn main() -> Result<()> {
    let env = env_logger::Env::default()
        .filter_or("KXN_LOG", "info")
        .write_style_or("KXN_LOG", "always");
    env_logger::init_from_env(env);

    let args = Args::parse();
    let image = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {:?}", args.image))?;

    let mut vm = Vm::new();
    vm.load(&image)
        .with_context(|| format!("failed to load {:?}", args.image))?;

    let mut platform = Platform::new(ConsoleFrontend::new());

    let start = Instant::now();
    let outcome = vm.run(&mut platform);
    info!("run finished in {:?}", start.elapsed());

    match outcome {
        None => {
            println!("vm shut down by host");
            Ok(())
        }
        Some(Fault::Halt) => {
            println!("vm halted normally");
            Ok(())
        }
        Some(fault) => {
            eprintln!("vm fault: {fault}");
            exit(1);
        }
    }
}
