use std::io::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use bstr::{BStr, BString};
use clap::Args;
use mgit_hash::ObjectId;
use mgit_object::{Commit, Object, Signature};

use super::open_repo;

#[derive(Args)]
pub struct CommitTreeArgs {
    /// The tree the commit records
    tree: String,

    /// Parent commit(s)
    #[arg(short = 'p', value_name = "parent")]
    parents: Vec<String>,

    /// Commit message
    #[arg(short = 'm', value_name = "message", required = true)]
    message: String,
}

pub fn run(args: &CommitTreeArgs) -> Result<i32> {
    let repo = open_repo()?;
    let store = repo.objects();

    let tree = parse_oid(&args.tree)?;
    let parents = args
        .parents
        .iter()
        .map(|p| parse_oid(p))
        .collect::<Result<Vec<_>>>()?;

    let mut message = BString::from(args.message.as_str());
    if !message.ends_with(b"\n") {
        message.push(b'\n');
    }

    let commit = Commit {
        tree,
        parents,
        author: identity_from_env("GIT_AUTHOR")?,
        committer: identity_from_env("GIT_COMMITTER")?,
        message,
    };
    let oid = store.write(&Object::Commit(commit))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", oid.to_hex())?;
    Ok(0)
}

fn parse_oid(hex: &str) -> Result<ObjectId> {
    ObjectId::from_hex(hex).map_err(|e| anyhow!("invalid object name '{hex}': {e}"))
}

/// Build an identity from `<prefix>_NAME` / `<prefix>_EMAIL` /
/// `<prefix>_DATE` (`<unix_ts> ±HHMM`), with fixed fallbacks and the
/// current time.
fn identity_from_env(prefix: &str) -> Result<Signature> {
    let name = std::env::var(format!("{prefix}_NAME")).unwrap_or_else(|_| "mgit".into());
    let email =
        std::env::var(format!("{prefix}_EMAIL")).unwrap_or_else(|_| "mgit@localhost".into());

    let (timestamp, tz_offset) = match std::env::var(format!("{prefix}_DATE")) {
        Ok(date) => {
            let probe = format!("x <x@x> {date}");
            let sig = Signature::parse(BStr::new(probe.as_bytes()))
                .map_err(|_| anyhow!("invalid {prefix}_DATE: {date}"))?;
            (sig.timestamp, sig.tz_offset)
        }
        Err(_) => {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);
            (now, 0)
        }
    };

    Ok(Signature::new(name, email, timestamp, tz_offset))
}
