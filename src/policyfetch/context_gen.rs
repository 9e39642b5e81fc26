//! Turns [S3PublicAccessFacts](super::s3::S3PublicAccessFacts) into the probe requests the
//! evaluator runs to decide whether a bucket is reachable from outside the account (§4.F's
//! context generator). Every base [RequestContext] this module builds is still a single pinned
//! set of facts; it is [RequestContext::permutations] that expands each one into the Cartesian
//! product of condition-key states worth probing separately (at minimum `aws:SecureTransport` ∈
//! `{true, false, absent}`) — callers must expand before evaluating, or a TLS-gated public grant
//! will look unreachable simply because the probe never asserted `SecureTransport` either way.
//!
//! §9 open question: when Block Public Access fully blocks a bucket, do not synthesize an
//! explicit-deny policy and run it through the evaluator — skip generating probes for that
//! bucket entirely. A fabricated deny statement would show up in evaluation traces as if AWS
//! itself had written it, and would have to be kept in lockstep with every future evaluator
//! change; an empty probe list says the same thing without inventing policy text.

use {
    super::s3::S3PublicAccessFacts,
    crate::model::request_context::{RequestContext, RequestContextBuilderError},
    scratchstack_arn::Arn,
    scratchstack_aws_principal::{Principal, PrincipalIdentity, User},
};

/// S3 actions exercised against every bucket's public-access surface. `ListBucket` covers
/// enumeration, `GetObject`/`PutObject` cover read/write of contents.
pub const PUBLIC_ACCESS_PROBE_ACTIONS: [&str; 3] = ["s3:ListBucket", "s3:GetObject", "s3:PutObject"];

/// The account id used to stand in for an anonymous, unauthenticated caller when building a probe
/// principal — not a real AWS account, chosen to sort and print unambiguously in findings output.
pub const ANONYMOUS_PROBE_ACCOUNT: &str = "000000000000";

fn anonymous_principal() -> Principal {
    Principal::from(vec![PrincipalIdentity::from(
        User::new("aws", ANONYMOUS_PROBE_ACCOUNT, "/", "anonymous-probe").expect("static principal is well-formed"),
    )])
}

/// Builds the single base [RequestContext] for one `(action, resource)` pair against the
/// anonymous probe principal. `secure_transport` is left at `SecureTransport::Unknown`; callers
/// that want the full condition-permutation set call [RequestContext::permutations] on the
/// result rather than evaluating this context directly (§4.F's "Cartesian product of per-service
/// condition permutations").
pub fn build_probe(action: &'static str, resource: Arn) -> Result<RequestContext, RequestContextBuilderError> {
    RequestContext::builder().action(action).service("s3").actor(anonymous_principal()).resources(vec![resource]).build()
}

/// Builds one base [RequestContext] per probe action, or an empty list if `facts` shows Block
/// Public Access fully engaged — in which case there is nothing worth asking the evaluator.
pub fn generate_public_access_probes(facts: &S3PublicAccessFacts, bucket_arn: &Arn) -> Vec<RequestContext> {
    if facts.block_public_access.fully_blocks_public_access() {
        return Vec::new();
    }

    probes_for_action_resource_pairs(PUBLIC_ACCESS_PROBE_ACTIONS.iter().map(|a| (*a, bucket_arn.clone())))
}

/// Builds one base [RequestContext] per `(action, resource)` pair, against the anonymous probe
/// principal, without consulting Block Public Access — callers that already know which resources
/// are worth probing (e.g. both a bucket ARN and its `/*` object-level ARN) drive the pairing
/// themselves. Each returned context still needs [RequestContext::permutations] expanded before
/// evaluation to cover the `aws:SecureTransport` tri-state.
pub fn probes_for_action_resource_pairs(pairs: impl IntoIterator<Item = (&'static str, Arn)>) -> Vec<RequestContext> {
    pairs.into_iter().filter_map(|(action, resource)| build_probe(action, resource).ok()).collect()
}
