use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use mgit_repository::{worktree, Repository};
use mgit_transport::HttpTransport;

#[derive(Args)]
pub struct CloneArgs {
    /// Repository URL (smart HTTP)
    repository: String,

    /// Destination directory
    directory: PathBuf,
}

pub fn run(args: &CloneArgs) -> Result<i32> {
    let dest = &args.directory;
    if dest.exists() && std::fs::read_dir(dest)?.next().is_some() {
        bail!(
            "destination path '{}' already exists and is not an empty directory",
            dest.display()
        );
    }

    let stderr = io::stderr();
    let mut err = stderr.lock();
    writeln!(err, "Cloning into '{}'...", dest.display())?;

    let transport = HttpTransport::new(&args.repository);
    let head = mgit_protocol::discover_head(&transport)?;
    let pack = mgit_protocol::fetch_pack(&transport, &head)?;

    std::fs::create_dir_all(dest)?;
    let repo = Repository::init(dest)?;

    let store = repo.objects();
    mgit_pack::ingest(&pack, &store)?;

    repo.refs().write_branch("master", &head)?;
    worktree::materialize_commit(&store, &head, repo.work_dir())?;

    Ok(0)
}
