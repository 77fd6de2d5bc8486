mod command;
mod shell;

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use memvfs::{VfsBuilder, BLOCK_SIZE, TOTAL_BLOCKS};
use tracing::Level;

use crate::shell::Shell;

/// Interactive shell over an in-memory block file system.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Number of blocks in the pool
    #[arg(short, long, default_value_t = TOTAL_BLOCKS)]
    blocks: usize,

    /// Size of each block in bytes
    #[arg(long, default_value_t = BLOCK_SIZE)]
    block_size: usize,

    /// Run the commands in this file instead of reading standard input
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let vfs = VfsBuilder::new()
        .with_total_blocks(args.blocks)
        .with_block_size(args.block_size)
        .build()
        .context("could not create file system")?;
    let shell = Shell::new(vfs, io::stdout());

    match args.script {
        Some(path) => {
            shell::run_script(shell, &path)
                .with_context(|| format!("failed to run script {}", path.display()))?;
        }
        None => {
            println!("Compact VFS - ready. Type 'exit' to quit.");
            shell::run(shell, io::stdin().lock(), true).context("failed to run shell")?;
        }
    }
    Ok(())
}
