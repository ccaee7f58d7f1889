use std::io::{self, Write};

use anyhow::Result;
use clap::Args;
use mgit_repository::Repository;

#[derive(Args)]
pub struct InitArgs {}

pub fn run(_args: &InitArgs) -> Result<i32> {
    Repository::init(".")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Initialized git directory")?;
    Ok(0)
}
