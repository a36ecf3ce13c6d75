use crate::{
    CommitInfo, GitRef, LastRelease, RefType, RepositoryInfo, RepositoryStatus, Signature,
    VcsClient, discover_root,
};
use nci_core::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

const LOG_FORMAT: &str = "--format=%an%x00%ae%x00%cn%x00%ce%x00%B";

/// [`VcsClient`] backed by the `git` command line.
///
/// Only read-only subcommands are used; the checkout is never modified.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    /// Use the `git` found on `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `git` executable.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, root: &Path, args: &[&str]) -> Result<String> {
        debug!("Running git {}", args.join(" "));
        let output = Command::new(&self.binary)
            .current_dir(root)
            .args(args)
            .output()
            .map_err(|e| Error::vcs(root, format!("failed to run git: {e}")))?;

        if !output.status.success() {
            return Err(Error::vcs(
                root,
                format!(
                    "git {} failed: {}",
                    args.join(" "),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn try_run(&self, root: &Path, args: &[&str]) -> Option<String> {
        self.run(root, args)
            .inspect_err(|e| debug!("{e}"))
            .ok()
            .filter(|out| !out.is_empty())
    }

    fn count(&self, root: &Path, range: &str) -> Result<u64> {
        let out = self.run(root, &["rev-list", "--count", range])?;
        out.parse()
            .map_err(|e| Error::vcs(root, format!("unexpected commit count {out:?}: {e}")))
    }

    fn remote(&self, root: &Path) -> String {
        if let Some(url) = self.try_run(root, &["remote", "get-url", "origin"]) {
            return url;
        }
        self.try_run(root, &["remote"])
            .and_then(|names| names.lines().next().map(str::to_string))
            .and_then(|name| self.try_run(root, &["remote", "get-url", &name]))
            .unwrap_or_default()
    }

    fn head(&self, root: &Path) -> GitRef {
        if let Some(branch) = self.try_run(root, &["symbolic-ref", "--quiet", "--short", "HEAD"]) {
            return GitRef::branch(branch);
        }
        if let Some(tag) = self.try_run(root, &["describe", "--tags", "--exact-match", "HEAD"]) {
            return GitRef::tag(tag);
        }
        debug!("HEAD is detached and not tagged");
        GitRef::branch("HEAD")
    }

    fn commit(&self, root: &Path) -> Result<CommitInfo> {
        let sha = self.run(root, &["rev-parse", "HEAD"])?;
        let log = self.run(root, &["log", "-1", LOG_FORMAT])?;

        let mut parts = log.splitn(5, '\0');
        let mut next = || parts.next().unwrap_or_default().to_string();
        let author = Signature {
            name: next(),
            email: next(),
        };
        let committer = Signature {
            name: next(),
            email: next(),
        };
        let message = next();

        let mut commit = CommitInfo {
            sha,
            author,
            committer,
            ..CommitInfo::default()
        };
        commit.set_message(&message);
        Ok(commit)
    }

    fn last_release(&self, root: &Path, head: &GitRef) -> Option<LastRelease> {
        let rev = match head.kind {
            RefType::Tag => "HEAD^",
            RefType::Branch => "HEAD",
        };
        let tag = self.try_run(root, &["describe", "--tags", "--abbrev=0", rev])?;
        let commits_since = self
            .count(root, &format!("{tag}..HEAD"))
            .inspect_err(|e| debug!("{e}"))
            .ok()?;
        Some(LastRelease { tag, commits_since })
    }
}

impl VcsClient for GitCli {
    fn find_repository_root(&self, start: &Path) -> Result<PathBuf> {
        discover_root(start).ok_or_else(|| Error::repository_not_found(start))
    }

    fn repository_info(&self, root: &Path) -> Result<RepositoryInfo> {
        let commit = self.commit(root)?;
        let status = if self.run(root, &["status", "--porcelain"])?.is_empty() {
            RepositoryStatus::Clean
        } else {
            RepositoryStatus::Dirty
        };
        let head = self.head(root);
        let commit_count = self.count(root, "HEAD")?;
        let last_release = self.last_release(root, &head);

        Ok(RepositoryInfo {
            kind: "git".to_string(),
            remote: self.remote(root),
            status,
            head,
            commit,
            commit_count,
            last_release,
        })
    }
}
