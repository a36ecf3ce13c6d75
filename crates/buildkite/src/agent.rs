use nci_core::{Environment, EnvironmentExt, Error, NciSpec, PipelineTrigger, Result};
use nci_normalizer::{NormalizeContext, Normalizer, NormalizerInfo, steps};
use tracing::{debug, warn};

static INFO: NormalizerInfo = NormalizerInfo::new("Buildkite", "buildkite");

const PUSH_SOURCES: &[&str] = &["webhook"];

/// Normalizer for Buildkite.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildkiteNormalizer;

impl BuildkiteNormalizer {
    /// Create the normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Pull request number, or `None` outside of pull request builds.
    ///
    /// Anything other than `false` or a number is a malformed reference.
    fn pull_request(env: &Environment) -> Result<Option<&str>> {
        match env.value("BUILDKITE_PULL_REQUEST") {
            "" | "false" => Ok(None),
            id if id.bytes().all(|b| b.is_ascii_digit()) => Ok(Some(id)),
            other => Err(Error::malformed_reference("BUILDKITE_PULL_REQUEST", other)),
        }
    }

    /// One-based attempt from the zero-based `BUILDKITE_RETRY_COUNT`.
    fn attempt(env: &Environment) -> String {
        let retries = env.value("BUILDKITE_RETRY_COUNT");
        if retries.is_empty() {
            return String::new();
        }
        match retries.parse::<u64>() {
            Ok(count) => (count + 1).to_string(),
            Err(e) => {
                warn!("Ignoring BUILDKITE_RETRY_COUNT={retries:?}: {e}");
                String::new()
            }
        }
    }
}

impl Normalizer for BuildkiteNormalizer {
    fn info(&self) -> &'static NormalizerInfo {
        &INFO
    }

    fn check(&self, env: &Environment) -> bool {
        env.value("BUILDKITE") == "true"
    }

    fn normalize(&self, env: &Environment, ctx: &NormalizeContext<'_>) -> Result<NciSpec> {
        let mut nci = steps::seed(env, self.info());

        // worker
        nci.worker_id = env.value("BUILDKITE_AGENT_ID").to_string();
        nci.worker_name = env.value("BUILDKITE_AGENT_NAME").to_string();
        nci.worker_arch = steps::host_arch();

        // pipeline
        let trigger = match Self::pull_request(env)? {
            Some(id) => {
                nci.pipeline_pull_request_id = id.to_string();
                PipelineTrigger::PullRequest
            }
            None => steps::classify_trigger(env.value("BUILDKITE_SOURCE"), PUSH_SOURCES, &[]),
        };
        nci.pipeline_trigger = trigger.to_string();
        steps::set_named(
            &mut nci.pipeline_stage_name,
            &mut nci.pipeline_stage_slug,
            env.value("BUILDKITE_GROUP_LABEL"),
        );
        steps::set_named(
            &mut nci.pipeline_job_name,
            &mut nci.pipeline_job_slug,
            env.value("BUILDKITE_LABEL"),
        );
        nci.pipeline_id = env.value("BUILDKITE_BUILD_ID").to_string();
        nci.pipeline_attempt = Self::attempt(env);

        let organization = env.value("BUILDKITE_ORGANIZATION_SLUG");
        let pipeline = env.value("BUILDKITE_PIPELINE_SLUG");
        let build_number = env.value("BUILDKITE_BUILD_NUMBER");
        nci.pipeline_url = if steps::all_set(&[organization, pipeline, build_number]) {
            format!("https://buildkite.com/{organization}/{pipeline}/builds/{build_number}")
        } else {
            debug!("Buildkite build URL variables incomplete, leaving pipeline URL empty");
            String::new()
        };

        steps::apply_checkout(&mut nci, ctx)?;

        Ok(nci)
    }

    fn denormalize(&self, env: &Environment) -> Environment {
        let nci = NciSpec::from_map(env);
        let mut out = Environment::new();

        out.insert("CI".to_string(), "true".to_string());
        out.insert("BUILDKITE".to_string(), "true".to_string());

        steps::insert_present(&mut out, "BUILDKITE_AGENT_ID", &nci.worker_id);
        steps::insert_present(&mut out, "BUILDKITE_AGENT_NAME", &nci.worker_name);

        // pipeline
        steps::insert_present(&mut out, "BUILDKITE_BUILD_ID", &nci.pipeline_id);
        steps::insert_present(&mut out, "BUILDKITE_BUILD_URL", &nci.pipeline_url);
        steps::insert_present(&mut out, "BUILDKITE_GROUP_LABEL", &nci.pipeline_stage_name);
        steps::insert_present(&mut out, "BUILDKITE_LABEL", &nci.pipeline_job_name);
        let pull_request = if nci.pipeline_pull_request_id.is_empty() {
            "false"
        } else {
            nci.pipeline_pull_request_id.as_str()
        };
        out.insert("BUILDKITE_PULL_REQUEST".to_string(), pull_request.to_string());

        // commit
        steps::insert_present(&mut out, "BUILDKITE_COMMIT", &nci.commit_sha);
        match nci.commit_ref_type.as_str() {
            "branch" => steps::insert_present(&mut out, "BUILDKITE_BRANCH", &nci.commit_ref_name),
            "tag" => steps::insert_present(&mut out, "BUILDKITE_TAG", &nci.commit_ref_name),
            _ => {}
        }
        steps::insert_present(&mut out, "BUILDKITE_MESSAGE", &steps::commit_message(&nci));
        steps::insert_present(&mut out, "BUILDKITE_BUILD_AUTHOR", &nci.commit_author_name);
        steps::insert_present(&mut out, "BUILDKITE_BUILD_AUTHOR_EMAIL", &nci.commit_author_email);

        // repository
        steps::insert_present(&mut out, "BUILDKITE_REPO", &nci.repository_remote);
        steps::insert_present(&mut out, "BUILDKITE_BUILD_CHECKOUT_PATH", &nci.project_dir);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nci_core::environment::from_pairs;
    use nci_core::keys;
    use nci_normalizer::NoProjectDetails;
    use nci_vcs::{FixedVcs, GitRef, RepositoryInfo};

    fn normalize(env: &Environment) -> Result<NciSpec> {
        let vcs = FixedVcs::new(
            "/var/lib/buildkite-agent/builds/agent-1/acme/my-pipeline",
            RepositoryInfo {
                kind: "git".to_string(),
                head: GitRef::branch("main"),
                ..RepositoryInfo::default()
            },
        );
        let ctx = NormalizeContext::new(
            "/var/lib/buildkite-agent/builds/agent-1/acme/my-pipeline",
            &vcs,
            &NoProjectDetails,
        );
        BuildkiteNormalizer.normalize(env, &ctx)
    }

    #[test]
    fn test_check() {
        let n = BuildkiteNormalizer::new();
        assert!(n.check(&from_pairs([("BUILDKITE", "true")])));
        assert!(!n.check(&from_pairs([("BUILDKITE", "1")])));
        assert!(!n.check(&from_pairs([("TF_BUILD", "True")])));
    }

    #[test]
    fn test_worker_and_pipeline() {
        let nci = normalize(&from_pairs([
            ("BUILDKITE_AGENT_ID", "0189-agent"),
            ("BUILDKITE_AGENT_NAME", "agent-1"),
            ("BUILDKITE_SOURCE", "webhook"),
            ("BUILDKITE_PULL_REQUEST", "false"),
            ("BUILDKITE_GROUP_LABEL", "Tests"),
            ("BUILDKITE_LABEL", ":rust: Unit Tests"),
            ("BUILDKITE_BUILD_ID", "0189-build"),
            ("BUILDKITE_RETRY_COUNT", "0"),
            ("BUILDKITE_ORGANIZATION_SLUG", "acme"),
            ("BUILDKITE_PIPELINE_SLUG", "my-pipeline"),
            ("BUILDKITE_BUILD_NUMBER", "128"),
        ]))
        .unwrap();
        assert_eq!(nci.service_name, "Buildkite");
        assert_eq!(nci.worker_id, "0189-agent");
        assert_eq!(nci.worker_name, "agent-1");
        assert_eq!(nci.pipeline_trigger, "push");
        assert_eq!(nci.pipeline_pull_request_id, "");
        assert_eq!(nci.pipeline_stage_slug, "tests");
        assert_eq!(nci.pipeline_job_slug, "rust-unit-tests");
        assert_eq!(nci.pipeline_id, "0189-build");
        assert_eq!(nci.pipeline_attempt, "1");
        assert_eq!(
            nci.pipeline_url,
            "https://buildkite.com/acme/my-pipeline/builds/128"
        );
        assert_eq!(nci.containerregistry_repository, "my-pipeline");
    }

    #[test]
    fn test_pull_request_id_is_used_directly() {
        let nci = normalize(&from_pairs([
            ("BUILDKITE_SOURCE", "webhook"),
            ("BUILDKITE_PULL_REQUEST", "321"),
        ]))
        .unwrap();
        assert_eq!(nci.pipeline_trigger, "pull-request");
        assert_eq!(nci.pipeline_pull_request_id, "321");
    }

    #[test]
    fn test_non_numeric_pull_request_is_malformed() {
        for value in ["abc", "12a", "true", "#12"] {
            let err = normalize(&from_pairs([("BUILDKITE_PULL_REQUEST", value)])).unwrap_err();
            assert!(
                matches!(
                    &err,
                    Error::MalformedReference { variable, value: v }
                        if variable == "BUILDKITE_PULL_REQUEST" && v == value
                ),
                "{value}: {err}"
            );
        }
    }

    #[test]
    fn test_manual_builds_are_unknown() {
        for source in ["ui", "api", "schedule", "trigger_job", ""] {
            let nci = normalize(&from_pairs([("BUILDKITE_SOURCE", source)])).unwrap();
            assert_eq!(nci.pipeline_trigger, "unknown");
        }
    }

    #[test]
    fn test_invalid_retry_count_is_dropped() {
        let nci = normalize(&from_pairs([("BUILDKITE_RETRY_COUNT", "many")])).unwrap();
        assert_eq!(nci.pipeline_attempt, "");
        let nci = normalize(&from_pairs([("BUILDKITE_RETRY_COUNT", "2")])).unwrap();
        assert_eq!(nci.pipeline_attempt, "3");
    }

    #[test]
    fn test_denormalize() {
        let env = from_pairs([
            (keys::NCI_COMMIT_SHA, "1b37fdecbab29370c0715489429dbaed6581c678"),
            (keys::NCI_COMMIT_REF_TYPE, "tag"),
            (keys::NCI_COMMIT_REF_NAME, "v1.0.0"),
            (keys::NCI_COMMIT_TITLE, "chore: release"),
            (keys::NCI_COMMIT_AUTHOR_NAME, "Jane Doe"),
            (keys::NCI_COMMIT_AUTHOR_EMAIL, "jane@example.com"),
            (keys::NCI_PIPELINE_JOB_NAME, "Release"),
            (keys::NCI_REPOSITORY_REMOTE, "git@github.com:acme/app.git"),
        ]);
        let out = BuildkiteNormalizer.denormalize(&env);

        assert_eq!(out["BUILDKITE"], "true");
        assert_eq!(out["BUILDKITE_COMMIT"], "1b37fdecbab29370c0715489429dbaed6581c678");
        assert_eq!(out["BUILDKITE_TAG"], "v1.0.0");
        assert!(!out.contains_key("BUILDKITE_BRANCH"));
        assert_eq!(out["BUILDKITE_MESSAGE"], "chore: release");
        assert_eq!(out["BUILDKITE_BUILD_AUTHOR"], "Jane Doe");
        assert_eq!(out["BUILDKITE_BUILD_AUTHOR_EMAIL"], "jane@example.com");
        assert_eq!(out["BUILDKITE_LABEL"], "Release");
        assert_eq!(out["BUILDKITE_PULL_REQUEST"], "false");
        assert_eq!(out["BUILDKITE_REPO"], "git@github.com:acme/app.git");
    }

    #[test]
    fn test_denormalized_pull_request_round_trips() {
        let env = from_pairs([
            (keys::NCI_PIPELINE_PULL_REQUEST_ID, "321"),
            (keys::NCI_PIPELINE_JOB_NAME, "Unit Tests"),
        ]);
        let native = BuildkiteNormalizer.denormalize(&env);
        assert!(BuildkiteNormalizer.check(&native));

        let nci = normalize(&native).unwrap();
        assert_eq!(nci.pipeline_trigger, "pull-request");
        assert_eq!(nci.pipeline_pull_request_id, "321");
        assert_eq!(nci.pipeline_job_name, "Unit Tests");
    }
}
