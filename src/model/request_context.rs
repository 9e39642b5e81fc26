//! Builds evaluator [Context]s from recon-gathered facts, including the condition-key defaults
//! every request carries and the permutation generator used to probe access under more than one
//! plausible set of ambient conditions (§4.F, §4.H).

use {
    crate::{AspenError, Context, ContextBuilder},
    derive_builder::Builder,
    scratchstack_arn::Arn,
    scratchstack_aws_principal::{Principal, SessionData, SessionValue},
};

/// `aws:SecureTransport`'s tri-state: AWS only sets this key when a connection is actually made,
/// so "unknown" is a distinct, meaningful state from "false" — a policy conditioned on
/// `aws:SecureTransport` being absent behaves differently than one conditioned on it being `false`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SecureTransport {
    Yes,
    No,
    Unknown,
}

/// The recon-gathered facts needed to build one or more evaluator [Context]s for a single
/// action/resource pair. Condition keys implied by the ARN (`aws:RequestedRegion`) or by
/// `secure_transport` are populated automatically; callers add anything more specific (source IP,
/// MFA, tags) via [RequestContextBuilder::extra_session_value].
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(skip))]
pub struct RequestContext {
    #[builder(setter(into))]
    action: String,
    #[builder(setter(into))]
    service: String,
    actor: Principal,
    #[builder(default)]
    resources: Vec<Arn>,
    #[builder(default = "SecureTransport::Unknown")]
    secure_transport: SecureTransport,
    #[builder(default)]
    extra_session_values: Vec<(String, SessionValue)>,
}

impl RequestContextBuilder {
    /// Adds a condition-key value beyond the automatic defaults (e.g. `aws:SourceIp`,
    /// `aws:MultiFactorAuthPresent`, a resource tag key).
    pub fn extra_session_value(&mut self, key: impl Into<String>, value: SessionValue) -> &mut Self {
        self.extra_session_values.get_or_insert_with(Vec::new).push((key.into(), value));
        self
    }

    pub fn build(&self) -> Result<RequestContext, RequestContextBuilderError> {
        Ok(RequestContext {
            action: self.action.clone().ok_or(RequestContextBuilderError::UninitializedField("action"))?,
            service: self.service.clone().ok_or(RequestContextBuilderError::UninitializedField("service"))?,
            actor: self.actor.clone().ok_or(RequestContextBuilderError::UninitializedField("actor"))?,
            resources: self.resources.clone().unwrap_or_default(),
            secure_transport: self.secure_transport.unwrap_or(SecureTransport::Unknown),
            extra_session_values: self.extra_session_values.clone().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum RequestContextBuilderError {
    #[error("`{0}` must be initialized")]
    UninitializedField(&'static str),
}

impl RequestContext {
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn actor(&self) -> &Principal {
        &self.actor
    }

    pub fn resources(&self) -> &[Arn] {
        &self.resources
    }

    /// The condition keys this request context actually populates: the default ones derived from
    /// the resource ARN and `secure_transport`, plus every key added via
    /// [RequestContextBuilder::extra_session_value]. A statement that conditions on any key
    /// outside this set cannot be conclusively decided from this context (§4.H.3).
    pub fn available_condition_keys(&self) -> std::collections::HashSet<String> {
        let mut keys = std::collections::HashSet::new();
        if !self.resources.is_empty() {
            keys.insert("aws:RequestedRegion".to_string());
        }
        if self.secure_transport != SecureTransport::Unknown {
            keys.insert("aws:SecureTransport".to_string());
        }
        for (key, _) in &self.extra_session_values {
            keys.insert(key.clone());
        }
        keys
    }

    /// Builds the single evaluator [Context] implied by this request's facts: the region defaults
    /// from the first resource's ARN, and `aws:SecureTransport` is set only when known.
    pub fn to_context(&self) -> Result<Context, AspenError> {
        let mut session_data = SessionData::new();

        if let Some(arn) = self.resources.first() {
            session_data.insert("aws:RequestedRegion", SessionValue::from(arn.region()));
        }

        match self.secure_transport {
            SecureTransport::Yes => session_data.insert("aws:SecureTransport", SessionValue::from(true)),
            SecureTransport::No => session_data.insert("aws:SecureTransport", SessionValue::from(false)),
            SecureTransport::Unknown => {}
        }

        for (key, value) in &self.extra_session_values {
            session_data.insert(key.as_str(), value.clone());
        }

        ContextBuilder::default()
            .action(self.action.clone())
            .service(self.service.clone())
            .actor(self.actor.clone())
            .resources(self.resources.clone())
            .session_data(session_data)
            .build()
            .map_err(|e| AspenError::InvalidSubstitution(e.to_string()))
    }

    /// Generates every context permutation worth separately probing: `aws:SecureTransport`
    /// known-true and known-false when it was left `Unknown`, otherwise just the single pinned
    /// value. This is how the summarizer distinguishes "allowed only over TLS" findings from
    /// unconditional ones without the caller having to enumerate the axis itself.
    pub fn permutations(&self) -> Result<Vec<Context>, AspenError> {
        if self.secure_transport != SecureTransport::Unknown {
            return Ok(vec![self.to_context()?]);
        }

        let mut yes = self.clone();
        yes.secure_transport = SecureTransport::Yes;
        let mut no = self.clone();
        no.secure_transport = SecureTransport::No;

        Ok(vec![yes.to_context()?, no.to_context()?])
    }
}
