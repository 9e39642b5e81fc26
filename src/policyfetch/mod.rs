//! Resource policy fetchers: a service-keyed registry mapping a resource type to the call that
//! retrieves its canonical attached policy (§4.F). S3 gets its own specialized flow in
//! [`s3`] because public exposure there can arise from four overlapping surfaces (policy, ACL,
//! Block Public Access, and object-level grants); every other supported service is a single
//! request-response fetch registered here.

pub mod context_gen;
pub mod s3;

use {
    crate::{model::erd::EnrichedResourceDescription, Policy},
    async_trait::async_trait,
    aws_types::SdkConfig,
    std::{collections::HashMap, str::FromStr},
};

/// Errors raised while retrieving or parsing a resource policy.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("AWS API error fetching policy for {resource}: {message}")]
    Sdk { resource: String, message: String },

    #[error("policy document for {0} failed to parse: {1}")]
    InvalidPolicy(String, String),

    #[error("resource type {0} has no registered policy fetcher")]
    Unsupported(String),
}

impl FetchError {
    pub fn sdk(resource: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Sdk { resource: resource.into(), message: message.to_string() }
    }
}

/// One service's policy-retrieval contract: given an [SdkConfig] already scoped to the correct
/// region and the ERD's identifier, return the resource's attached policy, or `None` if it has
/// none. Implementors own exactly one AWS API shape; nothing here reflects over response types.
#[async_trait]
pub trait PolicyFetcher: Send + Sync {
    async fn get_policy(&self, config: &SdkConfig, identifier: &str) -> Result<Option<Policy>, FetchError>;
}

fn parse_policy(resource: &str, raw: &str) -> Result<Policy, FetchError> {
    Policy::from_str(raw).map_err(|e| FetchError::InvalidPolicy(resource.to_string(), e.to_string()))
}

struct SnsFetcher;

#[async_trait]
impl PolicyFetcher for SnsFetcher {
    async fn get_policy(&self, config: &SdkConfig, identifier: &str) -> Result<Option<Policy>, FetchError> {
        let client = aws_sdk_sns::Client::new(config);
        let output = client
            .get_topic_attributes()
            .topic_arn(identifier)
            .send()
            .await
            .map_err(|e| FetchError::sdk(identifier, e))?;
        match output.attributes().and_then(|attrs| attrs.get("Policy")) {
            Some(raw) => Ok(Some(parse_policy(identifier, raw)?)),
            None => Ok(None),
        }
    }
}

struct SqsFetcher;

#[async_trait]
impl PolicyFetcher for SqsFetcher {
    async fn get_policy(&self, config: &SdkConfig, identifier: &str) -> Result<Option<Policy>, FetchError> {
        let client = aws_sdk_sqs::Client::new(config);
        let output = client
            .get_queue_attributes()
            .queue_url(identifier)
            .attribute_names(aws_sdk_sqs::types::QueueAttributeName::Policy)
            .send()
            .await
            .map_err(|e| FetchError::sdk(identifier, e))?;
        match output.attributes().and_then(|attrs| attrs.get(&aws_sdk_sqs::types::QueueAttributeName::Policy)) {
            Some(raw) => Ok(Some(parse_policy(identifier, raw)?)),
            None => Ok(None),
        }
    }
}

struct LambdaFetcher;

#[async_trait]
impl PolicyFetcher for LambdaFetcher {
    async fn get_policy(&self, config: &SdkConfig, identifier: &str) -> Result<Option<Policy>, FetchError> {
        let client = aws_sdk_lambda::Client::new(config);
        match client.get_policy().function_name(identifier).send().await {
            Ok(output) => match output.policy() {
                Some(raw) => Ok(Some(parse_policy(identifier, raw)?)),
                None => Ok(None),
            },
            // Lambda returns ResourceNotFoundException when no resource-based policy is attached.
            Err(e) if e.as_service_error().map(|se| se.is_resource_not_found_exception()).unwrap_or(false) => Ok(None),
            Err(e) => Err(FetchError::sdk(identifier, e)),
        }
    }
}

struct EfsFetcher;

#[async_trait]
impl PolicyFetcher for EfsFetcher {
    async fn get_policy(&self, config: &SdkConfig, identifier: &str) -> Result<Option<Policy>, FetchError> {
        let client = aws_sdk_efs::Client::new(config);
        match client.describe_file_system_policy().file_system_id(identifier).send().await {
            Ok(output) => match output.policy() {
                Some(raw) => Ok(Some(parse_policy(identifier, raw)?)),
                None => Ok(None),
            }
            Err(e) if e.as_service_error().map(|se| se.is_policy_not_found()).unwrap_or(false) => Ok(None),
            Err(e) => Err(FetchError::sdk(identifier, e)),
        }
    }
}

struct OpenSearchFetcher;

#[async_trait]
impl PolicyFetcher for OpenSearchFetcher {
    async fn get_policy(&self, config: &SdkConfig, identifier: &str) -> Result<Option<Policy>, FetchError> {
        let client = aws_sdk_opensearch::Client::new(config);
        let output = client
            .describe_domain_config()
            .domain_name(identifier)
            .send()
            .await
            .map_err(|e| FetchError::sdk(identifier, e))?;
        let raw = output
            .domain_config()
            .and_then(|c| c.access_policies())
            .and_then(|ap| ap.options());
        match raw {
            Some(raw) => Ok(Some(parse_policy(identifier, raw)?)),
            None => Ok(None),
        }
    }
}

/// Which ERD property carries the identifier a fetcher expects, and which property the retrieved
/// policy (if any) is written back to, per resource type.
#[derive(Clone, Copy, Debug)]
pub struct FetchBinding {
    pub identifier_field: &'static str,
    pub policy_field: &'static str,
}

const DEFAULT_BINDING: FetchBinding = FetchBinding { identifier_field: "identifier", policy_field: "ResourcePolicy" };

/// The immutable, initialization-time-built table mapping a CloudFormation `TypeName` to its
/// [PolicyFetcher] and [FetchBinding]. Reified as a value rather than a module-level mutable map
/// so tests can construct alternative tables without racing on shared state (§9).
pub struct ServiceMap {
    fetchers: HashMap<&'static str, Box<dyn PolicyFetcher>>,
    bindings: HashMap<&'static str, FetchBinding>,
}

impl ServiceMap {
    /// Builds the default table covering every non-S3 type named in §4.F. S3 is handled by the
    /// dedicated [s3] flow instead of this registry.
    pub fn standard() -> Self {
        let mut fetchers: HashMap<&'static str, Box<dyn PolicyFetcher>> = HashMap::new();
        fetchers.insert("AWS::SNS::Topic", Box::new(SnsFetcher));
        fetchers.insert("AWS::SQS::Queue", Box::new(SqsFetcher));
        fetchers.insert("AWS::Lambda::Function", Box::new(LambdaFetcher));
        fetchers.insert("AWS::EFS::FileSystem", Box::new(EfsFetcher));
        fetchers.insert("AWS::Elasticsearch::Domain", Box::new(OpenSearchFetcher));
        fetchers.insert("AWS::OpenSearchService::Domain", Box::new(OpenSearchFetcher));

        let mut bindings = HashMap::new();
        bindings.insert("AWS::SNS::Topic", DEFAULT_BINDING);
        bindings.insert("AWS::SQS::Queue", FetchBinding { identifier_field: "QueueUrl", policy_field: "ResourcePolicy" });
        bindings.insert("AWS::Lambda::Function", DEFAULT_BINDING);
        bindings.insert("AWS::EFS::FileSystem", DEFAULT_BINDING);
        bindings.insert("AWS::Elasticsearch::Domain", DEFAULT_BINDING);
        bindings.insert("AWS::OpenSearchService::Domain", DEFAULT_BINDING);

        Self { fetchers, bindings }
    }

    pub fn empty() -> Self {
        Self { fetchers: HashMap::new(), bindings: HashMap::new() }
    }

    pub fn register(&mut self, type_name: &'static str, fetcher: Box<dyn PolicyFetcher>, binding: FetchBinding) {
        self.fetchers.insert(type_name, fetcher);
        self.bindings.insert(type_name, binding);
    }

    pub fn is_supported(&self, type_name: &str) -> bool {
        self.fetchers.contains_key(type_name)
    }

    /// Fetches and writes the policy for `erd` into its own `ResourcePolicy`-equivalent property,
    /// returning the policy as well for immediate use by the evaluator.
    pub async fn fetch_into(
        &self,
        config: &SdkConfig,
        erd: &mut EnrichedResourceDescription,
    ) -> Result<Option<Policy>, FetchError> {
        let type_name = erd.type_name().to_string();
        let fetcher = self.fetchers.get(type_name.as_str()).ok_or_else(|| FetchError::Unsupported(type_name.clone()))?;
        let binding = self.bindings.get(type_name.as_str()).copied().unwrap_or(DEFAULT_BINDING);

        let identifier = erd
            .get_property(binding.identifier_field)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| erd.identifier().to_string());

        let policy = fetcher.get_policy(config, &identifier).await?;
        if let Some(policy) = &policy {
            erd.set_property(binding.policy_field, serde_json::json!(policy.to_string()));
        }
        Ok(policy)
    }
}

impl Default for ServiceMap {
    fn default() -> Self {
        Self::standard()
    }
}
