use std::io::{self, Write};

use anyhow::{anyhow, bail, Result};
use clap::Args;
use mgit_hash::ObjectId;

use super::open_repo;

#[derive(Args)]
pub struct CatFileArgs {
    /// Pretty-print the object content
    #[arg(short = 'p')]
    pretty: bool,

    /// The object to show
    object: String,
}

pub fn run(args: &CatFileArgs) -> Result<i32> {
    if !args.pretty {
        bail!("usage: cat-file -p <object>");
    }

    let repo = open_repo()?;
    let oid = ObjectId::from_hex(&args.object)
        .map_err(|e| anyhow!("invalid object name '{}': {e}", args.object))?;

    let obj = repo
        .objects()
        .read(&oid)?
        .ok_or_else(|| anyhow!("object not found: {}", oid.to_hex()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    out.write_all(&obj.serialize_body())?;
    Ok(0)
}
