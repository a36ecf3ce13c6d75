use nci_core::{Environment, EnvironmentExt, NciSpec, Result};
use nci_normalizer::{NormalizeContext, Normalizer, NormalizerInfo, steps};
use tracing::debug;

static INFO: NormalizerInfo = NormalizerInfo::new("Azure DevOps Pipelines", "azure-devops");

const PUSH_REASONS: &[&str] = &["IndividualCI", "BatchedCI"];
const PULL_REQUEST_REASONS: &[&str] = &["PullRequest"];

/// Normalizer for Azure DevOps Pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureDevOpsNormalizer;

impl AzureDevOpsNormalizer {
    /// Create the normalizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// `<os>/<arch>` from `AGENT_OS` and `AGENT_OSARCHITECTURE`.
    ///
    /// Returns `None` when either is unset or not a known value.
    fn agent_arch(env: &Environment) -> Option<String> {
        let os = match env.value("AGENT_OS") {
            "Linux" => "linux",
            "Windows_NT" => "windows",
            "Darwin" => "darwin",
            _ => return None,
        };
        let arch = match env.value("AGENT_OSARCHITECTURE") {
            "X64" => "amd64",
            "X86" => "386",
            "ARM64" => "arm64",
            "ARM" => "arm",
            _ => return None,
        };
        Some(format!("{os}/{arch}"))
    }
}

impl Normalizer for AzureDevOpsNormalizer {
    fn info(&self) -> &'static NormalizerInfo {
        &INFO
    }

    fn check(&self, env: &Environment) -> bool {
        env.is_flag("TF_BUILD", "true")
    }

    fn normalize(&self, env: &Environment, ctx: &NormalizeContext<'_>) -> Result<NciSpec> {
        let mut nci = steps::seed(env, self.info());

        // worker
        nci.worker_id = env.value("AGENT_ID").to_string();
        nci.worker_name = env.value("AGENT_NAME").to_string();
        nci.worker_version = env.value("AGENT_VERSION").to_string();
        nci.worker_arch = Self::agent_arch(env).unwrap_or_else(steps::host_arch);
        let image_os = env.value("ImageOS");
        if image_os.is_empty() {
            nci.worker_os = env.value("AGENT_OS").to_string();
        } else {
            nci.worker_os = format!("{image_os}:{}", env.value("ImageVersion"));
            nci.worker_type = "azure_hosted_vm".to_string();
        }

        // pipeline
        let trigger = steps::classify_trigger(
            env.value("BUILD_REASON"),
            PUSH_REASONS,
            PULL_REQUEST_REASONS,
        );
        nci.pipeline_trigger = trigger.to_string();
        if trigger.is_pull_request() {
            nci.pipeline_pull_request_id =
                steps::pull_request_id_from_ref("BUILD_SOURCEBRANCH", env.value("BUILD_SOURCEBRANCH"))?;
        }
        steps::set_named(
            &mut nci.pipeline_stage_name,
            &mut nci.pipeline_stage_slug,
            env.value("SYSTEM_STAGEDISPLAYNAME"),
        );
        steps::set_named(
            &mut nci.pipeline_job_name,
            &mut nci.pipeline_job_slug,
            env.value("SYSTEM_JOBDISPLAYNAME"),
        );
        nci.pipeline_id = env.value("BUILD_BUILDID").to_string();
        nci.pipeline_attempt = env.value("SYSTEM_JOBATTEMPT").to_string();

        let collection = env.value("SYSTEM_TEAMFOUNDATIONCOLLECTIONURI");
        let project = env.value("SYSTEM_TEAMPROJECT");
        let build_id = env.value("BUILD_BUILDID");
        nci.pipeline_url = if steps::all_set(&[collection, project, build_id]) {
            format!("{collection}{project}/_build/results?buildId={build_id}")
        } else {
            debug!("Azure DevOps build URL variables incomplete, leaving pipeline URL empty");
            String::new()
        };

        steps::apply_checkout(&mut nci, ctx)?;

        if env.is_set("BUILD_REPOSITORY_URI") {
            nci.project_url = env.value("BUILD_REPOSITORY_URI").to_string();
        }

        Ok(nci)
    }
}
