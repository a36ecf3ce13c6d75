use nci_core::{Environment, EnvironmentExt, NciSpec, Result};
use nci_normalizer::{NormalizeContext, Normalizer, NormalizerInfo, steps};
use tracing::debug;

static INFO: NormalizerInfo = NormalizerInfo::new("GitHub Actions", "github-actions");

const PUSH_EVENTS: &[&str] = &["push"];
const PULL_REQUEST_EVENTS: &[&str] = &["pull_request"];

/// Normalizer for GitHub Actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubActionsNormalizer;

impl GitHubActionsNormalizer {
    /// Create the normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Workflow file from `GITHUB_WORKFLOW_REF`
    /// (`<owner>/<repo>/.github/workflows/ci.yml@refs/heads/main`).
    fn config_file(env: &Environment) -> String {
        let workflow_ref = env.value("GITHUB_WORKFLOW_REF");
        let path = workflow_ref
            .split_once('@')
            .map_or(workflow_ref, |(path, _)| path);
        let repository = env.value("GITHUB_REPOSITORY");
        if repository.is_empty() {
            return String::new();
        }
        path.strip_prefix(repository)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or_default()
            .to_string()
    }
}

impl Normalizer for GitHubActionsNormalizer {
    fn info(&self) -> &'static NormalizerInfo {
        &INFO
    }

    fn check(&self, env: &Environment) -> bool {
        env.value("GITHUB_ACTIONS") == "true"
    }

    fn normalize(&self, env: &Environment, ctx: &NormalizeContext<'_>) -> Result<NciSpec> {
        let mut nci = steps::seed(env, self.info());

        // worker
        let image_os = env.value("ImageOS");
        let image_version = env.value("ImageVersion");
        nci.worker_id = env.value("RUNNER_TRACKING_ID").to_string();
        nci.worker_name = env.value("RUNNER_TRACKING_ID").to_string();
        nci.worker_version = image_version.to_string();
        nci.worker_arch = steps::host_arch();
        if !image_os.is_empty() {
            nci.worker_os = format!("{image_os}:{image_version}");
            nci.worker_type = "github_hosted_vm".to_string();
        }

        // pipeline
        let trigger = steps::classify_trigger(
            env.value("GITHUB_EVENT_NAME"),
            PUSH_EVENTS,
            PULL_REQUEST_EVENTS,
        );
        nci.pipeline_trigger = trigger.to_string();
        if trigger.is_pull_request() {
            nci.pipeline_pull_request_id =
                steps::pull_request_id_from_ref("GITHUB_REF", env.value("GITHUB_REF"))?;
        }
        steps::set_named(
            &mut nci.pipeline_stage_name,
            &mut nci.pipeline_stage_slug,
            env.value("GITHUB_WORKFLOW"),
        );
        steps::set_named(
            &mut nci.pipeline_job_name,
            &mut nci.pipeline_job_slug,
            env.value("GITHUB_ACTION"),
        );
        nci.pipeline_id = env.value("GITHUB_RUN_ID").to_string();
        nci.pipeline_attempt = env.value("GITHUB_RUN_ATTEMPT").to_string();
        nci.pipeline_config_file = Self::config_file(env);

        let server = env.value("GITHUB_SERVER_URL");
        let repository = env.value("GITHUB_REPOSITORY");
        let run_id = env.value("GITHUB_RUN_ID");
        nci.pipeline_url = if steps::all_set(&[server, repository, run_id]) {
            format!("{server}/{repository}/actions/runs/{run_id}")
        } else {
            debug!("GitHub run URL variables incomplete, leaving pipeline URL empty");
            String::new()
        };

        steps::apply_checkout(&mut nci, ctx)?;

        if steps::all_set(&[server, repository]) {
            nci.project_url = format!("{server}/{repository}");
        }

        Ok(nci)
    }
}
