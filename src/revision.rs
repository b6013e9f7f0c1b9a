//! Source-control provenance of a build.
//!
//! The database is a git repository; every datafile records the short hash of
//! the commit it was generated from and the tag pointing at that commit, if
//! any. An untagged commit is `None`, never an empty string, so consumers can
//! tell "untagged" from "tag lookup failed" (the latter aborts the build).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RevisionError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("`git {command}` failed: {stderr}")]
    Git { command: String, stderr: String },
    #[error("`git rev-parse` printed no commit hash")]
    EmptyHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub commit_hash: String,
    pub commit_tag: Option<String>,
}

/// Read the revision checked out in the repository containing `repo_dir`.
pub fn read_revision(repo_dir: &Path) -> Result<Revision, RevisionError> {
    let commit_hash = git(repo_dir, &["rev-parse", "--short", "HEAD"])?
        .trim()
        .to_string();
    if commit_hash.is_empty() {
        return Err(RevisionError::EmptyHash);
    }
    let tags = git(repo_dir, &["tag", "--points-at", "HEAD"])?;
    Ok(Revision {
        commit_hash,
        commit_tag: parse_tag(&tags),
    })
}

fn git(repo_dir: &Path, args: &[&str]) -> Result<String, RevisionError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_dir)
        .args(args)
        .output()?;
    if !output.status.success() {
        return Err(RevisionError::Git {
            command: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// First tag listed by `git tag --points-at`, if any.
pub fn parse_tag(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
