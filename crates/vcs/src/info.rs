use crate::release_name;
use nci_core::{NciSpec, slugify};
use std::fmt;

/// Whether the ref checked out is a branch or a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefType {
    /// `refs/heads/*`
    #[default]
    Branch,
    /// `refs/tags/*`
    Tag,
}

impl RefType {
    /// Canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Tag => "tag",
        }
    }

    const fn vcs_prefix(self) -> &'static str {
        match self {
            Self::Branch => "refs/heads/",
            Self::Tag => "refs/tags/",
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Working tree state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepositoryStatus {
    /// No uncommitted changes.
    #[default]
    Clean,
    /// Uncommitted or untracked changes present.
    Dirty,
}

impl RepositoryStatus {
    /// Canonical string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
        }
    }
}

/// A branch or tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GitRef {
    /// Branch or tag.
    pub kind: RefType,
    /// Short name, e.g. `main` or `v1.0.0`.
    pub name: String,
}

impl GitRef {
    /// A branch ref.
    #[must_use]
    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            kind: RefType::Branch,
            name: name.into(),
        }
    }

    /// A tag ref.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            kind: RefType::Tag,
            name: name.into(),
        }
    }

    /// `<type>/<name>`, e.g. `branch/main`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}/{}", self.kind, self.name)
    }

    /// Fully qualified ref, e.g. `refs/heads/main`.
    #[must_use]
    pub fn vcs(&self) -> String {
        format!("{}{}", self.kind.vcs_prefix(), self.name)
    }
}

/// Name and email of a commit author or committer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// The commit HEAD points at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitInfo {
    /// Full hash.
    pub sha: String,
    /// First line of the message.
    pub title: String,
    /// Remainder of the message, trimmed.
    pub description: String,
    /// Author signature.
    pub author: Signature,
    /// Committer signature.
    pub committer: Signature,
}

impl CommitInfo {
    /// Split a raw commit message into title and description.
    pub fn set_message(&mut self, message: &str) {
        let message = message.trim();
        let (title, description) = message.split_once('\n').unwrap_or((message, ""));
        self.title = title.trim().to_string();
        self.description = description.trim().to_string();
    }

    /// Hash abbreviated to 7 characters.
    #[must_use]
    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }
}

/// The most recent release tag reachable from HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRelease {
    /// Tag name, e.g. `v1.1.0`.
    pub tag: String,
    /// Commits on HEAD after the tag.
    pub commits_since: u64,
}

/// Everything a normalizer needs to know about the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepositoryInfo {
    /// VCS kind, e.g. `git`.
    pub kind: String,
    /// Remote URL, empty when no remote is configured.
    pub remote: String,
    /// Working tree state.
    pub status: RepositoryStatus,
    /// Ref checked out.
    pub head: GitRef,
    /// Commit checked out.
    pub commit: CommitInfo,
    /// Commits reachable from HEAD.
    pub commit_count: u64,
    /// Latest release before HEAD, if any.
    pub last_release: Option<LastRelease>,
}

impl RepositoryInfo {
    /// Write the repository, commit and last-release namespaces of `spec`.
    ///
    /// Every field in those namespaces is overwritten, including the
    /// last-release ones when there is no release.
    pub fn apply(&self, spec: &mut NciSpec) {
        spec.repository_kind.clone_from(&self.kind);
        spec.repository_remote.clone_from(&self.remote);
        spec.repository_status = self.status.as_str().to_string();

        spec.commit_ref_type = self.head.kind.as_str().to_string();
        spec.commit_ref_name.clone_from(&self.head.name);
        spec.commit_ref_path = self.head.path();
        spec.commit_ref_slug = slugify(&self.head.name);
        spec.commit_ref_vcs = self.head.vcs();
        spec.commit_ref_release = release_name(&self.head.name);

        spec.commit_sha.clone_from(&self.commit.sha);
        spec.commit_sha_short = self.commit.short_sha().to_string();
        spec.commit_title.clone_from(&self.commit.title);
        spec.commit_description.clone_from(&self.commit.description);
        spec.commit_author_name.clone_from(&self.commit.author.name);
        spec.commit_author_email.clone_from(&self.commit.author.email);
        spec.commit_committer_name.clone_from(&self.commit.committer.name);
        spec.commit_committer_email.clone_from(&self.commit.committer.email);
        spec.commit_count = self.commit_count.to_string();

        match &self.last_release {
            Some(release) => {
                let tag = GitRef::tag(release.tag.clone());
                spec.lastrelease_ref_name.clone_from(&tag.name);
                spec.lastrelease_ref_slug = slugify(&tag.name);
                spec.lastrelease_ref_vcs = tag.vcs();
                spec.lastrelease_commit_after_count = release.commits_since.to_string();
            }
            None => {
                spec.lastrelease_ref_name.clear();
                spec.lastrelease_ref_slug.clear();
                spec.lastrelease_ref_vcs.clear();
                spec.lastrelease_commit_after_count.clear();
            }
        }
    }
}
