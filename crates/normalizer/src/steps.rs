//! Normalization steps shared by every provider.

use crate::{NormalizeContext, NormalizerInfo};
use chrono::{DateTime, SecondsFormat, Utc};
use nci_core::{Environment, Error, NciSpec, PipelineTrigger, Result, slugify};
use tracing::{debug, warn};

/// Index of the id in a `/`-split pull request ref such as
/// `refs/pull/<id>/merge` or `refs/merge-requests/<id>/head`.
pub const PULL_REQUEST_REF_SEGMENT: usize = 2;

/// Seed a spec from `env` and stamp the normalizer identity.
///
/// Canonical keys already present in `env` pass through, so normalizing
/// an already normalized environment keeps fields this run does not touch.
#[must_use]
pub fn seed(env: &Environment, info: &NormalizerInfo) -> NciSpec {
    let mut spec = NciSpec::from_map(env);
    spec.found = "true".to_string();
    spec.version = info.version.to_string();
    spec.service_name = info.name.to_string();
    spec.service_slug = info.slug.to_string();
    spec
}

/// `<os>/<arch>` of the executing host, with Go-style architecture names.
#[must_use]
pub fn host_arch() -> String {
    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    };
    format!("{}/{arch}", std::env::consts::OS)
}

/// Classify a provider event name.
///
/// Names outside both lists map to [`PipelineTrigger::Unknown`].
#[must_use]
pub fn classify_trigger(event: &str, push: &[&str], pull_request: &[&str]) -> PipelineTrigger {
    if push.contains(&event) {
        PipelineTrigger::Push
    } else if pull_request.contains(&event) {
        PipelineTrigger::PullRequest
    } else {
        PipelineTrigger::Unknown
    }
}

/// Extract the pull request id from a `/`-delimited ref.
///
/// # Errors
/// Returns [`Error::MalformedReference`] when the ref has no non-empty
/// segment at [`PULL_REQUEST_REF_SEGMENT`].
pub fn pull_request_id_from_ref(variable: &str, reference: &str) -> Result<String> {
    reference
        .split('/')
        .nth(PULL_REQUEST_REF_SEGMENT)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::malformed_reference(variable, reference))
}

/// `true` when every value is non-empty.
///
/// URL templates are only rendered when all of their parts are known.
#[must_use]
pub fn all_set(values: &[&str]) -> bool {
    values.iter().all(|value| !value.is_empty())
}

/// Insert `value` under `key` unless it is empty.
pub fn insert_present(env: &mut Environment, key: &str, value: &str) {
    if !value.is_empty() {
        env.insert(key.to_string(), value.to_string());
    }
}

/// Full commit message from the title and description fields.
#[must_use]
pub fn commit_message(spec: &NciSpec) -> String {
    if spec.commit_description.is_empty() {
        spec.commit_title.clone()
    } else {
        format!("{}\n\n{}", spec.commit_title, spec.commit_description)
    }
}

/// Set a name field and its slug.
pub fn set_named(name: &mut String, slug: &mut String, value: &str) {
    value.clone_into(name);
    *slug = slugify(value);
}

/// Validate an RFC 3339 timestamp and render it in UTC.
///
/// Unparsable values are dropped with a warning.
#[must_use]
pub fn normalize_timestamp(variable: &str, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => ts
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        Err(e) => {
            warn!("Ignoring {variable}={value:?}: not an RFC 3339 timestamp ({e})");
            String::new()
        }
    }
}

/// Fill repository, commit, project, container registry and control fields.
///
/// # Errors
/// Fails when the VCS collaborator cannot find or read the repository.
/// Missing project details are not an error.
pub fn apply_checkout(spec: &mut NciSpec, ctx: &NormalizeContext<'_>) -> Result<()> {
    let root = ctx.vcs.find_repository_root(&ctx.working_dir)?;
    debug!("Repository root: {}", root.display());

    let info = ctx.vcs.repository_info(&root)?;
    info.apply(spec);

    match ctx
        .project
        .project_details(&spec.repository_kind, &spec.repository_remote)
    {
        Some(details) => details.apply(spec),
        None => debug!(
            "No project details for {} remote {:?}",
            spec.repository_kind, spec.repository_remote
        ),
    }
    spec.project_dir = root.display().to_string();

    spec.containerregistry_repository = root
        .file_name()
        .map(|name| slugify(&name.to_string_lossy()))
        .unwrap_or_default();
    spec.containerregistry_tag.clone_from(&spec.commit_ref_release);
    // Credentials are never carried from the input environment.
    spec.containerregistry_host.clear();
    spec.containerregistry_username.clear();
    spec.containerregistry_password.clear();

    spec.deploy_freeze = "false".to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{FixedProjectDetails, NoProjectDetails, ProjectDetails};
    use nci_core::environment::from_pairs;
    use nci_vcs::{FixedVcs, GitRef, RepositoryInfo};

    static INFO: NormalizerInfo = NormalizerInfo::new("Example CI", "example-ci");

    fn repository() -> RepositoryInfo {
        RepositoryInfo {
            kind: "git".to_string(),
            remote: "https://github.com/org/my-app.git".to_string(),
            head: GitRef::tag("v2.0.0"),
            ..RepositoryInfo::default()
        }
    }

    #[test]
    fn test_seed_stamps_identity_and_keeps_canonical_keys() {
        let env = from_pairs([("NCI_COMMIT_SHA", "abc"), ("NCI", "false")]);
        let spec = seed(&env, &INFO);
        assert_eq!(spec.found, "true");
        assert_eq!(spec.version, "1.0.0");
        assert_eq!(spec.service_name, "Example CI");
        assert_eq!(spec.service_slug, "example-ci");
        assert_eq!(spec.commit_sha, "abc");
    }

    #[test]
    fn test_host_arch_shape() {
        let arch = host_arch();
        let (os, cpu) = arch.split_once('/').unwrap();
        assert_eq!(os, std::env::consts::OS);
        assert!(!cpu.is_empty());
        if cfg!(target_arch = "x86_64") {
            assert_eq!(cpu, "amd64");
        }
    }

    #[test]
    fn test_classify_trigger() {
        let push = ["push"];
        let pr = ["pull_request"];
        assert_eq!(classify_trigger("push", &push, &pr), PipelineTrigger::Push);
        assert_eq!(
            classify_trigger("pull_request", &push, &pr),
            PipelineTrigger::PullRequest
        );
        assert_eq!(classify_trigger("schedule", &push, &pr), PipelineTrigger::Unknown);
        assert_eq!(classify_trigger("", &push, &pr), PipelineTrigger::Unknown);
    }

    #[test]
    fn test_pull_request_id_from_ref() {
        assert_eq!(
            pull_request_id_from_ref("GITHUB_REF", "refs/pull/42/merge").unwrap(),
            "42"
        );
        assert_eq!(
            pull_request_id_from_ref("CI_MERGE_REQUEST_REF_PATH", "refs/merge-requests/7/head")
                .unwrap(),
            "7"
        );
    }

    #[test]
    fn test_pull_request_id_missing_segment() {
        for reference in ["", "refs/pull", "refs/pull/", "main"] {
            let err = pull_request_id_from_ref("GITHUB_REF", reference).unwrap_err();
            assert!(
                matches!(err, Error::MalformedReference { ref value, .. } if value == reference),
                "{reference:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_all_set() {
        assert!(all_set(&["https://github.com", "org/repo", "1"]));
        assert!(!all_set(&["https://github.com", "", "1"]));
    }

    #[test]
    fn test_insert_present_skips_empty() {
        let mut env = Environment::new();
        insert_present(&mut env, "A", "1");
        insert_present(&mut env, "B", "");
        assert_eq!(env.len(), 1);
        assert_eq!(env["A"], "1");
    }

    #[test]
    fn test_commit_message() {
        let mut spec = NciSpec {
            commit_title: "feat: a".to_string(),
            ..NciSpec::default()
        };
        assert_eq!(commit_message(&spec), "feat: a");
        spec.commit_description = "body".to_string();
        assert_eq!(commit_message(&spec), "feat: a\n\nbody");
    }

    #[test]
    fn test_set_named() {
        let mut name = String::new();
        let mut slug = String::new();
        set_named(&mut name, &mut slug, "__run");
        assert_eq!(name, "__run");
        assert_eq!(slug, "run");
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp("X", "2022-05-10T20:20:59Z"),
            "2022-05-10T20:20:59Z"
        );
        assert_eq!(
            normalize_timestamp("X", "2022-05-10T22:20:59+02:00"),
            "2022-05-10T20:20:59Z"
        );
        assert_eq!(normalize_timestamp("X", "yesterday"), "");
        assert_eq!(normalize_timestamp("X", ""), "");
    }

    #[test]
    fn test_apply_checkout_fills_checkout_fields() {
        let vcs = FixedVcs::new("/builds/org/My App", repository());
        let project = FixedProjectDetails(ProjectDetails {
            name: "my-app".to_string(),
            ..ProjectDetails::default()
        });
        let ctx = NormalizeContext::new("/builds/org/My App/sub", &vcs, &project);

        let mut spec = NciSpec::default();
        apply_checkout(&mut spec, &ctx).unwrap();

        assert_eq!(spec.repository_kind, "git");
        assert_eq!(spec.commit_ref_release, "2.0.0");
        assert_eq!(spec.project_name, "my-app");
        assert_eq!(spec.project_dir, "/builds/org/My App");
        assert_eq!(spec.containerregistry_repository, "my-app");
        assert_eq!(spec.containerregistry_tag, "2.0.0");
        assert_eq!(spec.deploy_freeze, "false");
    }

    #[test]
    fn test_apply_checkout_keeps_project_without_details() {
        let vcs = FixedVcs::new("/src/app", repository());
        let ctx = NormalizeContext::new("/src/app", &vcs, &NoProjectDetails);
        let mut spec = NciSpec {
            project_name: "seeded".to_string(),
            ..NciSpec::default()
        };
        apply_checkout(&mut spec, &ctx).unwrap();
        assert_eq!(spec.project_name, "seeded");
    }

    #[test]
    fn test_apply_checkout_clears_registry_credentials() {
        let vcs = FixedVcs::new("/src/app", repository());
        let ctx = NormalizeContext::new("/src/app", &vcs, &NoProjectDetails);
        let mut spec = NciSpec {
            containerregistry_host: "ghcr.io".to_string(),
            containerregistry_username: "bot".to_string(),
            containerregistry_password: "s3cret".to_string(),
            ..NciSpec::default()
        };
        apply_checkout(&mut spec, &ctx).unwrap();
        assert_eq!(spec.containerregistry_host, "");
        assert_eq!(spec.containerregistry_username, "");
        assert_eq!(spec.containerregistry_password, "");
        assert_eq!(spec.containerregistry_repository, "app");
    }

    #[test]
    fn test_apply_checkout_without_repository_fails() {
        let vcs = FixedVcs::without_repository();
        let ctx = NormalizeContext::new("/tmp", &vcs, &NoProjectDetails);
        let mut spec = NciSpec::default();
        let err = apply_checkout(&mut spec, &ctx).unwrap_err();
        assert!(matches!(err, Error::RepositoryNotFound { .. }));
    }
}
