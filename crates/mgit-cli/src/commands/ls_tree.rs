use std::io::{self, Write};

use anyhow::{anyhow, Result};
use bstr::ByteSlice;
use clap::Args;
use mgit_hash::ObjectId;
use mgit_object::Object;

use super::open_repo;

#[derive(Args)]
pub struct LsTreeArgs {
    /// List only entry names
    #[arg(long = "name-only")]
    name_only: bool,

    /// The tree object to list
    tree: String,
}

pub fn run(args: &LsTreeArgs) -> Result<i32> {
    let repo = open_repo()?;
    let oid = ObjectId::from_hex(&args.tree)
        .map_err(|e| anyhow!("invalid object name '{}': {e}", args.tree))?;

    let tree = match repo
        .objects()
        .read(&oid)?
        .ok_or_else(|| anyhow!("object not found: {}", oid.to_hex()))?
    {
        Object::Tree(t) => t,
        other => anyhow::bail!("not a tree object: {} ({})", oid.to_hex(), other.object_type()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for entry in tree.iter() {
        if args.name_only {
            writeln!(out, "{}", entry.name.as_bstr())?;
        } else {
            let type_name = if entry.mode.is_tree() { "tree" } else { "blob" };
            writeln!(
                out,
                "{:06o} {} {}\t{}",
                entry.mode.raw(),
                type_name,
                entry.oid.to_hex(),
                entry.name.as_bstr(),
            )?;
        }
    }
    Ok(0)
}
