//! The AWS-client factory: resolves a region/profile/runtime-argument triple into an
//! `aws_types::SdkConfig`, the capability object every service client is built from.

use {
    crate::config::{ConfigError, Scope},
    aws_config::meta::region::RegionProviderChain,
    aws_types::{region::Region, SdkConfig},
};

/// Builds [SdkConfig] objects for a given profile, applying the region override and retry
/// defaults that every service client in the pipeline shares.
#[derive(Clone, Debug, Default)]
pub struct ClientFactory {
    profile: Option<String>,
}

impl ClientFactory {
    pub fn new(profile: Option<String>) -> Self {
        Self { profile }
    }

    /// Builds a [ClientFactory] from a scope, reading the `profile` parameter if bound.
    pub fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        let profile = match scope.get("profile") {
            Some(v) => Some(v.as_str("profile")?.to_string()),
            None => None,
        };
        Ok(Self::new(profile))
    }

    /// Resolves an [SdkConfig] for the given region, applying this factory's profile (if any) and
    /// the ambient credential chain otherwise.
    pub async fn config_for_region(&self, region: &str) -> SdkConfig {
        let region_provider = RegionProviderChain::first_try(Region::new(region.to_string()));
        let mut loader = aws_config::from_env().region(region_provider);

        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }

        loader.load().await
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }
}
