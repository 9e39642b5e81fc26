//! The recon base link: specializes the link runtime for AWS work (§4.D). Concrete per-resource
//! links embed a [ReconBase] by composition rather than inheriting from it — a capability record
//! exposing `regions()`/`profile()`/`config_for_region()`, kept to two levels of indirection
//! (runtime → recon specialization) per the struct-embedding redesign note in §9.

use {
    crate::{
        aws_client::ClientFactory,
        config::{ParamValue, Scope},
        link::LinkError,
    },
    aws_types::SdkConfig,
    std::{collections::HashMap, sync::Arc},
    tokio::sync::Semaphore,
};

/// Services whose resources are global (not region-scoped); the canonical endpoint for these is
/// always `us-east-1`.
const GLOBAL_SERVICES: &[&str] = &["AWS::IAM", "AWS::CloudFront", "AWS::Route53", "AWS::S3"];

const CANONICAL_GLOBAL_REGION: &str = "us-east-1";

/// The default per-(link, region) concurrency limit on AWS API calls.
pub const DEFAULT_REGION_CONCURRENCY: usize = 5;

/// The AWS-specific capability a recon link embeds: resolved regions, the client factory, and a
/// bounded semaphore per region for fan-out throughput control.
pub struct ReconBase {
    factory: ClientFactory,
    regions: Vec<String>,
    semaphores: HashMap<String, Arc<Semaphore>>,
}

impl ReconBase {
    /// Resolves `profile` and `regions` out of `scope` and builds the per-region semaphores.
    ///
    /// If `regions` is unset or `"all"`, `enabled_regions` supplies the full region set for the
    /// account (the EC2 `DescribeRegions` call in the real deployment; tests inject a stub).
    pub async fn initialize<F>(
        scope: &Scope,
        resource_types: &[String],
        enabled_regions: F,
    ) -> Result<Self, LinkError>
    where
        F: FnOnce() -> Vec<String>,
    {
        let factory = ClientFactory::from_scope(scope)?;

        let requested = match scope.get("regions") {
            Some(v) => v.as_str_list("regions")?,
            None => vec!["all".to_string()],
        };

        let regions = if requested.len() == 1 && requested[0].eq_ignore_ascii_case("all") {
            enabled_regions()
        } else {
            requested
        };

        if regions.is_empty() {
            return Err(LinkError::process("recon", "no regions resolved for this account"));
        }

        if resource_types.iter().any(|t| is_global_service(t)) && !regions.iter().any(|r| r == CANONICAL_GLOBAL_REGION)
        {
            return Err(LinkError::process(
                "recon",
                format!(
                    "resource type(s) include a global service but {CANONICAL_GLOBAL_REGION} is not in the region set"
                ),
            ));
        }

        let semaphores =
            regions.iter().map(|r| (r.clone(), Arc::new(Semaphore::new(DEFAULT_REGION_CONCURRENCY)))).collect();

        Ok(Self { factory, regions, semaphores })
    }

    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    pub fn profile(&self) -> Option<&str> {
        self.factory.profile()
    }

    /// Builds an [SdkConfig] for `region`, applying this link's profile.
    pub async fn config_for_region(&self, region: &str) -> SdkConfig {
        self.factory.config_for_region(region).await
    }

    /// The bounded semaphore guarding concurrent AWS calls to `region`. Returns `None` for a
    /// region outside the resolved set.
    pub fn region_semaphore(&self, region: &str) -> Option<Arc<Semaphore>> {
        self.semaphores.get(region).cloned()
    }
}

/// Matches a resource type name against the global-service table.
pub fn is_global_service(resource_type: &str) -> bool {
    GLOBAL_SERVICES.iter().any(|svc| resource_type.starts_with(svc))
}

/// Expands the `regions` parameter value into the `all` sentinel check used during initialization.
pub fn regions_param(regions: &[&str]) -> ParamValue {
    ParamValue::StrList(regions.iter().map(|s| s.to_string()).collect())
}
