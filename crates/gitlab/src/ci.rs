use nci_core::{Environment, EnvironmentExt, NciSpec, PipelineTrigger, Result};
use nci_normalizer::{NormalizeContext, Normalizer, NormalizerInfo, steps};
use tracing::debug;

static INFO: NormalizerInfo = NormalizerInfo::new("GitLab CI", "gitlab-ci");

const PUSH_SOURCES: &[&str] = &["push"];
const MERGE_REQUEST_SOURCES: &[&str] = &["merge_request_event"];

/// Normalizer for GitLab CI.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitLabCiNormalizer;

impl GitLabCiNormalizer {
    /// Create the normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Normalizer for GitLabCiNormalizer {
    fn info(&self) -> &'static NormalizerInfo {
        &INFO
    }

    fn check(&self, env: &Environment) -> bool {
        env.value("GITLAB_CI") == "true"
    }

    fn normalize(&self, env: &Environment, ctx: &NormalizeContext<'_>) -> Result<NciSpec> {
        let mut nci = steps::seed(env, self.info());

        // worker
        nci.worker_id = env.value("CI_RUNNER_ID").to_string();
        nci.worker_name = env.value("CI_RUNNER_DESCRIPTION").to_string();
        nci.worker_version = env.value("CI_RUNNER_VERSION").to_string();
        nci.worker_arch = match env.value("CI_RUNNER_EXECUTABLE_ARCH") {
            "" => steps::host_arch(),
            arch => arch.to_string(),
        };

        // pipeline
        let trigger = steps::classify_trigger(
            env.value("CI_PIPELINE_SOURCE"),
            PUSH_SOURCES,
            MERGE_REQUEST_SOURCES,
        );
        nci.pipeline_trigger = trigger.to_string();
        if trigger.is_pull_request() {
            nci.pipeline_pull_request_id = steps::pull_request_id_from_ref(
                "CI_MERGE_REQUEST_REF_PATH",
                env.value("CI_MERGE_REQUEST_REF_PATH"),
            )?;
        }
        steps::set_named(
            &mut nci.pipeline_stage_name,
            &mut nci.pipeline_stage_slug,
            env.value("CI_JOB_STAGE"),
        );
        steps::set_named(
            &mut nci.pipeline_job_name,
            &mut nci.pipeline_job_slug,
            env.value("CI_JOB_NAME"),
        );
        nci.pipeline_id = env.value("CI_PIPELINE_ID").to_string();
        nci.pipeline_job_started_at =
            steps::normalize_timestamp("CI_JOB_STARTED_AT", env.value("CI_JOB_STARTED_AT"));
        nci.pipeline_config_file = env.value("CI_CONFIG_PATH").to_string();

        let server = env.value("CI_SERVER_URL");
        let project_path = env.value("CI_PROJECT_PATH");
        let pipeline_id = env.value("CI_PIPELINE_ID");
        nci.pipeline_url = if steps::all_set(&[server, project_path, pipeline_id]) {
            format!("{server}/{project_path}/-/pipelines/{pipeline_id}")
        } else {
            debug!("GitLab pipeline URL variables incomplete, leaving pipeline URL empty");
            String::new()
        };

        steps::apply_checkout(&mut nci, ctx)?;

        if env.is_set("CI_PROJECT_URL") {
            nci.project_url = env.value("CI_PROJECT_URL").to_string();
        }

        // control
        if env.value("CI_DEPLOY_FREEZE") == "true" {
            nci.deploy_freeze = "true".to_string();
        }

        Ok(nci)
    }

    fn denormalize(&self, env: &Environment) -> Environment {
        let nci = NciSpec::from_map(env);
        let mut out = Environment::new();

        out.insert("CI".to_string(), "true".to_string());
        out.insert("GITLAB_CI".to_string(), "true".to_string());
        out.insert("CI_SERVER_NAME".to_string(), "GitLab".to_string());

        steps::insert_present(&mut out, "CI_RUNNER_ID", &nci.worker_id);
        steps::insert_present(&mut out, "CI_RUNNER_DESCRIPTION", &nci.worker_name);
        steps::insert_present(&mut out, "CI_RUNNER_VERSION", &nci.worker_version);
        steps::insert_present(&mut out, "CI_RUNNER_EXECUTABLE_ARCH", &nci.worker_arch);

        // pipeline
        let source = match nci.pipeline_trigger.parse::<PipelineTrigger>() {
            Ok(PipelineTrigger::Push) => "push",
            Ok(PipelineTrigger::PullRequest) => "merge_request_event",
            _ => "",
        };
        steps::insert_present(&mut out, "CI_PIPELINE_SOURCE", source);
        steps::insert_present(&mut out, "CI_PIPELINE_ID", &nci.pipeline_id);
        steps::insert_present(&mut out, "CI_PIPELINE_URL", &nci.pipeline_url);
        steps::insert_present(&mut out, "CI_JOB_STAGE", &nci.pipeline_stage_name);
        steps::insert_present(&mut out, "CI_JOB_NAME", &nci.pipeline_job_name);
        steps::insert_present(&mut out, "CI_JOB_STARTED_AT", &nci.pipeline_job_started_at);
        steps::insert_present(&mut out, "CI_CONFIG_PATH", &nci.pipeline_config_file);
        steps::insert_present(&mut out, "CI_MERGE_REQUEST_IID", &nci.pipeline_pull_request_id);

        // commit
        steps::insert_present(&mut out, "CI_COMMIT_SHA", &nci.commit_sha);
        steps::insert_present(&mut out, "CI_COMMIT_SHORT_SHA", &nci.commit_sha_short);
        steps::insert_present(&mut out, "CI_COMMIT_REF_NAME", &nci.commit_ref_name);
        steps::insert_present(&mut out, "CI_COMMIT_REF_SLUG", &nci.commit_ref_slug);
        match nci.commit_ref_type.as_str() {
            "branch" => steps::insert_present(&mut out, "CI_COMMIT_BRANCH", &nci.commit_ref_name),
            "tag" => steps::insert_present(&mut out, "CI_COMMIT_TAG", &nci.commit_ref_name),
            _ => {}
        }
        steps::insert_present(&mut out, "CI_COMMIT_TITLE", &nci.commit_title);
        steps::insert_present(&mut out, "CI_COMMIT_DESCRIPTION", &nci.commit_description);
        steps::insert_present(&mut out, "CI_COMMIT_MESSAGE", &steps::commit_message(&nci));
        if !nci.commit_author_name.is_empty() {
            out.insert(
                "CI_COMMIT_AUTHOR".to_string(),
                format!("{} <{}>", nci.commit_author_name, nci.commit_author_email),
            );
        }

        // project
        steps::insert_present(&mut out, "CI_PROJECT_ID", &nci.project_id);
        steps::insert_present(&mut out, "CI_PROJECT_NAME", &nci.project_name);
        steps::insert_present(&mut out, "CI_PROJECT_PATH", &nci.project_path);
        steps::insert_present(&mut out, "CI_PROJECT_PATH_SLUG", &nci.project_slug);
        steps::insert_present(&mut out, "CI_PROJECT_DESCRIPTION", &nci.project_description);
        steps::insert_present(&mut out, "CI_PROJECT_DIR", &nci.project_dir);
        steps::insert_present(&mut out, "CI_PROJECT_URL", &nci.project_url);
        steps::insert_present(&mut out, "CI_REPOSITORY_URL", &nci.repository_remote);

        // container registry
        steps::insert_present(&mut out, "CI_REGISTRY", &nci.containerregistry_host);
        steps::insert_present(&mut out, "CI_REGISTRY_USER", &nci.containerregistry_username);
        steps::insert_present(&mut out, "CI_REGISTRY_PASSWORD", &nci.containerregistry_password);

        // control
        if nci.deploy_freeze == "true" {
            out.insert("CI_DEPLOY_FREEZE".to_string(), "true".to_string());
        }

        out
    }
}
