//! The canonical NCI schema.
//!
//! [`NciSpec`] holds one `String` per canonical key. Absence is the empty
//! string, never a missing key: [`NciSpec::to_map`] always emits every key,
//! and [`NciSpec::from_map`] defaults every key the input lacks.
//!
//! The field table is declared once in `nci_spec!` so the struct, the key
//! constants and both mapping directions cannot drift apart.

use crate::environment::{Environment, EnvironmentExt};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Version of the schema emitted by the normalizers in this workspace.
pub const SPEC_VERSION: &str = "1.0.0";

macro_rules! nci_spec {
    ($( $(#[$doc:meta])* $field:ident : $key:ident ),+ $(,)?) => {
        /// Canonical key names.
        pub mod keys {
            $(
                #[doc = concat!("`", stringify!($key), "`")]
                pub const $key: &str = stringify!($key);
            )+
        }

        /// Vendor-neutral CI metadata.
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct NciSpec {
            $( $(#[$doc])* pub $field: String, )+
        }

        impl NciSpec {
            /// Every canonical key, in declaration order.
            pub const KEYS: &'static [&'static str] = &[$( keys::$key ),+];

            /// Seed a spec from `env`.
            ///
            /// Canonical keys are copied, everything else is ignored.
            #[must_use]
            pub fn from_map(env: &Environment) -> Self {
                Self {
                    $( $field: env.value(keys::$key).to_string(), )+
                }
            }

            /// Render the schema as a mapping containing every canonical key.
            #[must_use]
            pub fn to_map(&self) -> Environment {
                let mut map = Environment::new();
                $( map.insert(keys::$key.to_string(), self.$field.clone()); )+
                map
            }
        }
    };
}

nci_spec! {
    // common
    /// `"true"` once a normalizer recognized the environment.
    found: NCI,
    /// Schema version the normalizer implements.
    version: NCI_VERSION,
    /// Display name of the CI service.
    service_name: NCI_SERVICE_NAME,
    /// Slug of the CI service.
    service_slug: NCI_SERVICE_SLUG,

    // worker
    /// Identifier of the runner/agent.
    worker_id: NCI_WORKER_ID,
    /// Name of the runner/agent.
    worker_name: NCI_WORKER_NAME,
    /// Version of the runner/agent or its image.
    worker_version: NCI_WORKER_VERSION,
    /// `<os>/<arch>` of the executing host.
    worker_arch: NCI_WORKER_ARCH,
    /// Operating system description supplied by the provider.
    worker_os: NCI_WORKER_OS,
    /// Kind of worker, e.g. `github_hosted_vm`.
    worker_type: NCI_WORKER_TYPE,

    // pipeline
    /// `push`, `pull-request` or `unknown`.
    pipeline_trigger: NCI_PIPELINE_TRIGGER,
    /// Stage or workflow name.
    pipeline_stage_name: NCI_PIPELINE_STAGE_NAME,
    /// Slug of the stage name.
    pipeline_stage_slug: NCI_PIPELINE_STAGE_SLUG,
    /// Job name.
    pipeline_job_name: NCI_PIPELINE_JOB_NAME,
    /// Slug of the job name.
    pipeline_job_slug: NCI_PIPELINE_JOB_SLUG,
    /// Provider run/pipeline identifier.
    pipeline_id: NCI_PIPELINE_ID,
    /// Web URL of the pipeline run.
    pipeline_url: NCI_PIPELINE_URL,
    /// Retry attempt of the run.
    pipeline_attempt: NCI_PIPELINE_ATTEMPT,
    /// RFC 3339 timestamp the job started at.
    pipeline_job_started_at: NCI_PIPELINE_JOB_STARTED_AT,
    /// Pipeline definition file, relative to the repository root.
    pipeline_config_file: NCI_PIPELINE_CONFIG_FILE,
    /// Pull/merge request id for `pull-request` triggers.
    pipeline_pull_request_id: NCI_PIPELINE_PULL_REQUEST_ID,

    // repository
    /// VCS kind, e.g. `git`.
    repository_kind: NCI_REPOSITORY_KIND,
    /// Remote URL of the repository.
    repository_remote: NCI_REPOSITORY_REMOTE,
    /// `clean` or `dirty`.
    repository_status: NCI_REPOSITORY_STATUS,
    /// `branch` or `tag`.
    commit_ref_type: NCI_COMMIT_REF_TYPE,
    /// Branch or tag name.
    commit_ref_name: NCI_COMMIT_REF_NAME,
    /// `<type>/<name>`, e.g. `branch/main`.
    commit_ref_path: NCI_COMMIT_REF_PATH,
    /// Slug of the ref name.
    commit_ref_slug: NCI_COMMIT_REF_SLUG,
    /// Full VCS ref, e.g. `refs/heads/main`.
    commit_ref_vcs: NCI_COMMIT_REF_VCS,
    /// Release-friendly ref name, e.g. `1.2.3` for tag `v1.2.3`.
    commit_ref_release: NCI_COMMIT_REF_RELEASE,

    // commit
    /// Full commit hash.
    commit_sha: NCI_COMMIT_SHA,
    /// Abbreviated commit hash.
    commit_sha_short: NCI_COMMIT_SHA_SHORT,
    /// First line of the commit message.
    commit_title: NCI_COMMIT_TITLE,
    /// Commit message body.
    commit_description: NCI_COMMIT_DESCRIPTION,
    /// Commit author name.
    commit_author_name: NCI_COMMIT_AUTHOR_NAME,
    /// Commit author email.
    commit_author_email: NCI_COMMIT_AUTHOR_EMAIL,
    /// Committer name.
    commit_committer_name: NCI_COMMIT_COMMITTER_NAME,
    /// Committer email.
    commit_committer_email: NCI_COMMIT_COMMITTER_EMAIL,
    /// Number of commits reachable from HEAD.
    commit_count: NCI_COMMIT_COUNT,

    // last release
    /// Name of the latest release tag before HEAD.
    lastrelease_ref_name: NCI_LASTRELEASE_REF_NAME,
    /// Slug of the latest release tag.
    lastrelease_ref_slug: NCI_LASTRELEASE_REF_SLUG,
    /// Full VCS ref of the latest release tag.
    lastrelease_ref_vcs: NCI_LASTRELEASE_REF_VCS,
    /// Commits between the latest release and HEAD.
    lastrelease_commit_after_count: NCI_LASTRELEASE_COMMIT_AFTER_COUNT,

    // project
    /// Forge project id.
    project_id: NCI_PROJECT_ID,
    /// Project name.
    project_name: NCI_PROJECT_NAME,
    /// Project path, e.g. `org/repo`.
    project_path: NCI_PROJECT_PATH,
    /// Slug of the project path.
    project_slug: NCI_PROJECT_SLUG,
    /// Project description.
    project_description: NCI_PROJECT_DESCRIPTION,
    /// Comma separated project topics.
    project_topics: NCI_PROJECT_TOPICS,
    /// Issue tracker URL.
    project_issue_url: NCI_PROJECT_ISSUE_URL,
    /// Stargazer count.
    project_stargazers: NCI_PROJECT_STARGAZERS,
    /// Fork count.
    project_forks: NCI_PROJECT_FORKS,
    /// Local repository root.
    project_dir: NCI_PROJECT_DIR,
    /// Web URL of the project.
    project_url: NCI_PROJECT_URL,

    // container registry
    /// Registry host.
    containerregistry_host: NCI_CONTAINERREGISTRY_HOST,
    /// Image repository name.
    containerregistry_repository: NCI_CONTAINERREGISTRY_REPOSITORY,
    /// Registry username.
    containerregistry_username: NCI_CONTAINERREGISTRY_USERNAME,
    /// Registry password.
    containerregistry_password: NCI_CONTAINERREGISTRY_PASSWORD,
    /// Image tag.
    containerregistry_tag: NCI_CONTAINERREGISTRY_TAG,

    // control
    /// `"true"` while deployments are frozen.
    deploy_freeze: NCI_DEPLOY_FREEZE,
}

impl NciSpec {
    /// `true` when a normalizer populated this spec.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.found == "true"
    }
}

impl Serialize for NciSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NciSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Environment::deserialize(deserializer).map(|env| Self::from_map(&env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::from_pairs;

    #[test]
    fn test_default_map_has_every_key_empty() {
        let map = NciSpec::default().to_map();
        assert_eq!(map.len(), NciSpec::KEYS.len());
        assert!(map.values().all(String::is_empty));
    }

    #[test]
    fn test_from_map_ignores_foreign_keys() {
        let env = from_pairs([("PATH", "/usr/bin"), (keys::NCI_COMMIT_SHA, "abc")]);
        let spec = NciSpec::from_map(&env);
        assert_eq!(spec.commit_sha, "abc");

        let map = spec.to_map();
        assert!(!map.contains_key("PATH"));
        assert_eq!(map.get(keys::NCI_COMMIT_SHA).map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_round_trip_preserves_canonical_keys() {
        let env: Environment = NciSpec::KEYS
            .iter()
            .map(|k| ((*k).to_string(), format!("value-of-{k}")))
            .collect();
        assert_eq!(NciSpec::from_map(&env).to_map(), env);
    }

    #[test]
    fn test_keys_are_unique_and_prefixed() {
        let mut seen = std::collections::HashSet::new();
        for key in NciSpec::KEYS {
            assert!(key.starts_with("NCI"), "{key} is not namespaced");
            assert!(seen.insert(*key), "{key} declared twice");
        }
    }

    #[test]
    fn test_json_uses_canonical_keys() {
        let spec = NciSpec {
            found: "true".to_string(),
            ..NciSpec::default()
        };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["NCI"], "true");
        assert_eq!(json["NCI_DEPLOY_FREEZE"], "");

        let back: NciSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_is_found() {
        assert!(!NciSpec::default().is_found());
        let env = from_pairs([(keys::NCI, "true")]);
        assert!(NciSpec::from_map(&env).is_found());
    }
}
