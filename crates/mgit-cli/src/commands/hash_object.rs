use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use mgit_hash::Hasher;
use mgit_object::ObjectType;

use super::open_repo;

#[derive(Args)]
pub struct HashObjectArgs {
    /// Actually write the object into the object store
    #[arg(short = 'w')]
    write: bool,

    /// File to hash as a blob
    file: PathBuf,
}

pub fn run(args: &HashObjectArgs) -> Result<i32> {
    let content = std::fs::read(&args.file)?;

    let oid = if args.write {
        open_repo()?.objects().write_raw(ObjectType::Blob, &content)?
    } else {
        Hasher::hash_object("blob", &content)
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", oid.to_hex())?;
    Ok(0)
}
