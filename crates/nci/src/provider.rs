//! The closed set of supported CI platforms and the dispatcher over them.
//!
//! [`Provider`] delegates every [`Normalizer`] method to the platform crate
//! with an exhaustive `match`, so adding a variant without wiring its
//! detection fails to compile. [`Dispatcher`] walks an ordered list of
//! providers and normalizes with the first whose `check` matches.

use nci_azure_devops::AzureDevOpsNormalizer;
use nci_buildkite::BuildkiteNormalizer;
use nci_core::{Environment, Error, NciSpec, Result};
use nci_github::GitHubActionsNormalizer;
use nci_gitlab::GitLabCiNormalizer;
use nci_normalizer::{NormalizeContext, Normalizer, NormalizerInfo};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// A supported CI platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// GitHub Actions.
    GitHubActions,
    /// GitLab CI.
    GitLabCi,
    /// Azure DevOps Pipelines.
    AzureDevOps,
    /// Buildkite.
    Buildkite,
}

impl Provider {
    /// Every provider, in default detection order.
    pub const ALL: [Self; 4] = [
        Self::GitHubActions,
        Self::GitLabCi,
        Self::AzureDevOps,
        Self::Buildkite,
    ];

    /// Every provider, in default detection order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &Self::ALL
    }

    /// Look a provider up by its slug.
    #[must_use]
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.slug() == slug)
    }

    /// Comma separated list of every slug, for help texts.
    #[must_use]
    pub fn known_slugs() -> String {
        Self::ALL
            .iter()
            .map(|p| p.slug())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Normalizer for Provider {
    fn info(&self) -> &'static NormalizerInfo {
        match self {
            Self::GitHubActions => GitHubActionsNormalizer.info(),
            Self::GitLabCi => GitLabCiNormalizer.info(),
            Self::AzureDevOps => AzureDevOpsNormalizer.info(),
            Self::Buildkite => BuildkiteNormalizer.info(),
        }
    }

    fn check(&self, env: &Environment) -> bool {
        match self {
            Self::GitHubActions => GitHubActionsNormalizer.check(env),
            Self::GitLabCi => GitLabCiNormalizer.check(env),
            Self::AzureDevOps => AzureDevOpsNormalizer.check(env),
            Self::Buildkite => BuildkiteNormalizer.check(env),
        }
    }

    fn normalize(&self, env: &Environment, ctx: &NormalizeContext<'_>) -> Result<NciSpec> {
        match self {
            Self::GitHubActions => GitHubActionsNormalizer.normalize(env, ctx),
            Self::GitLabCi => GitLabCiNormalizer.normalize(env, ctx),
            Self::AzureDevOps => AzureDevOpsNormalizer.normalize(env, ctx),
            Self::Buildkite => BuildkiteNormalizer.normalize(env, ctx),
        }
    }

    fn denormalize(&self, env: &Environment) -> Environment {
        match self {
            Self::GitHubActions => GitHubActionsNormalizer.denormalize(env),
            Self::GitLabCi => GitLabCiNormalizer.denormalize(env),
            Self::AzureDevOps => AzureDevOpsNormalizer.denormalize(env),
            Self::Buildkite => BuildkiteNormalizer.denormalize(env),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slug(s).ok_or_else(|| {
            Error::configuration(
                format!("unknown provider `{s}`"),
                format!("Known providers: {}", Self::known_slugs()),
            )
        })
    }
}

impl clap::ValueEnum for Provider {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.slug()).help(self.name()))
    }
}

/// Ordered provider detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatcher {
    providers: Vec<Provider>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher over every provider in default order: GitHub Actions,
    /// GitLab CI, Azure DevOps, Buildkite.
    #[must_use]
    pub fn new() -> Self {
        Self::with_providers(Provider::ALL.to_vec())
    }

    /// Dispatcher over `providers`, checked in exactly the given order.
    #[must_use]
    pub fn with_providers(providers: Vec<Provider>) -> Self {
        Self { providers }
    }

    /// Providers in detection order.
    #[must_use]
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// First provider whose `check` accepts `env`.
    #[must_use]
    pub fn detect(&self, env: &Environment) -> Option<&Provider> {
        let found = self.providers.iter().find(|p| p.check(env));
        match found {
            Some(provider) => debug!(provider = provider.slug(), "Detected CI provider"),
            None => debug!("No CI provider detected"),
        }
        found
    }

    /// Registered provider with the given slug.
    #[must_use]
    pub fn find(&self, slug: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.slug() == slug)
    }

    /// Detect the provider and normalize `env` with it.
    ///
    /// Returns `Ok(None)` when no provider recognizes the environment.
    ///
    /// # Errors
    /// Propagates the provider's normalization error. No partial result is
    /// returned in that case.
    pub fn normalize(
        &self,
        env: &Environment,
        ctx: &NormalizeContext<'_>,
    ) -> Result<Option<NciSpec>> {
        let Some(provider) = self.detect(env) else {
            return Ok(None);
        };
        let spec = provider.normalize(env, ctx)?;
        info!(
            provider = provider.slug(),
            commit = %spec.commit_sha_short,
            "Normalized CI environment"
        );
        Ok(Some(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nci_core::environment::from_pairs;

    fn fixture(provider: Provider) -> Environment {
        match provider {
            Provider::GitHubActions => from_pairs([
                ("GITHUB_ACTIONS", "true"),
                ("GITHUB_EVENT_NAME", "push"),
                ("GITHUB_RUN_ID", "1"),
            ]),
            Provider::GitLabCi => from_pairs([
                ("GITLAB_CI", "true"),
                ("CI_PIPELINE_SOURCE", "push"),
                ("CI_PIPELINE_ID", "1"),
            ]),
            Provider::AzureDevOps => from_pairs([
                ("TF_BUILD", "True"),
                ("BUILD_REASON", "IndividualCI"),
                ("BUILD_BUILDID", "1"),
            ]),
            Provider::Buildkite => from_pairs([
                ("BUILDKITE", "true"),
                ("BUILDKITE_SOURCE", "webhook"),
                ("BUILDKITE_BUILD_NUMBER", "1"),
            ]),
        }
    }

    #[test]
    fn test_checks_are_mutually_exclusive() {
        for env_of in Provider::ALL {
            let env = fixture(env_of);
            for provider in Provider::ALL {
                assert_eq!(
                    provider.check(&env),
                    provider == env_of,
                    "{provider} check on {env_of} fixture"
                );
            }
        }
    }

    #[test]
    fn test_default_order() {
        assert_eq!(
            Dispatcher::new().providers(),
            &[
                Provider::GitHubActions,
                Provider::GitLabCi,
                Provider::AzureDevOps,
                Provider::Buildkite,
            ]
        );
    }

    #[test]
    fn test_detect_each_fixture() {
        let dispatcher = Dispatcher::default();
        for provider in Provider::all() {
            assert_eq!(dispatcher.detect(&fixture(*provider)), Some(provider));
        }
        assert_eq!(dispatcher.detect(&Environment::new()), None);
    }

    #[test]
    fn test_first_match_wins_in_caller_order() {
        let mut env = fixture(Provider::GitHubActions);
        env.extend(fixture(Provider::Buildkite));

        assert_eq!(
            Dispatcher::new().detect(&env),
            Some(&Provider::GitHubActions)
        );
        let reordered =
            Dispatcher::with_providers(vec![Provider::Buildkite, Provider::GitHubActions]);
        assert_eq!(reordered.detect(&env), Some(&Provider::Buildkite));
    }

    #[test]
    fn test_find_respects_registration() {
        let dispatcher = Dispatcher::with_providers(vec![Provider::GitLabCi]);
        assert_eq!(dispatcher.find("gitlab-ci"), Some(&Provider::GitLabCi));
        assert_eq!(dispatcher.find("github-actions"), None);
    }

    #[test]
    fn test_slugs() {
        let slugs: Vec<_> = Provider::ALL.iter().map(|p| p.slug()).collect();
        assert_eq!(
            slugs,
            ["github-actions", "gitlab-ci", "azure-devops", "buildkite"]
        );
        for provider in Provider::ALL {
            assert_eq!(Provider::from_slug(provider.slug()), Some(provider));
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_unknown_slug() {
        assert_eq!(Provider::from_slug("jenkins"), None);
        let err = "jenkins".parse::<Provider>().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("jenkins"));
    }

    #[test]
    fn test_denormalize_delegates() {
        let env = from_pairs([("NCI_COMMIT_SHA", "abc")]);
        assert!(Provider::GitHubActions.denormalize(&env).is_empty());
        assert!(Provider::AzureDevOps.denormalize(&env).is_empty());
        assert_eq!(Provider::GitLabCi.denormalize(&env)["CI_COMMIT_SHA"], "abc");
        assert_eq!(Provider::Buildkite.denormalize(&env)["BUILDKITE_COMMIT"], "abc");
    }

    #[test]
    fn test_identity_delegates() {
        assert_eq!(Provider::AzureDevOps.name(), "Azure DevOps Pipelines");
        assert_eq!(Provider::Buildkite.version().to_string(), "1.0.0");
    }
}
