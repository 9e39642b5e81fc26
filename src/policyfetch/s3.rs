//! The specialized S3 public-access flow (§4.F step 3). Exposure to the public internet is never
//! decided by one document here: it's the conjunction of Block Public Access, the bucket policy,
//! and the bucket ACL, so this module fetches all three in parallel per bucket and reduces them
//! to a single verdict the evaluator can probe against.

use {
    super::{
        context_gen::{build_probe, PUBLIC_ACCESS_PROBE_ACTIONS},
        FetchError,
    },
    crate::{AspenError, Decision, Policy},
    aws_types::SdkConfig,
    scratchstack_arn::Arn,
    std::{collections::BTreeSet, str::FromStr},
};

/// The four independent Block Public Access switches (`GetPublicAccessBlock`). All default to
/// `true` on buckets created after April 2023, but older buckets may have any carried over.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BlockPublicAccess {
    pub block_public_acls: bool,
    pub ignore_public_acls: bool,
    pub block_public_policy: bool,
    pub restrict_public_buckets: bool,
}

impl BlockPublicAccess {
    /// `true` when every switch is on: public access is structurally impossible regardless of
    /// what the policy or ACL say, so probing them is wasted evaluator work.
    pub fn fully_blocks_public_access(&self) -> bool {
        self.block_public_acls && self.ignore_public_acls && self.block_public_policy && self.restrict_public_buckets
    }
}

/// One grant on the bucket ACL naming a well-known public group rather than a specific principal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicAclGrant {
    pub grantee: PublicGrantee,
    pub permission: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PublicGrantee {
    AllUsers,
    AuthenticatedUsers,
}

/// Everything the public-access evaluator needs for one bucket, gathered by one parallel fetch.
#[derive(Clone, Debug, Default)]
pub struct S3PublicAccessFacts {
    pub region: String,
    pub block_public_access: BlockPublicAccess,
    pub bucket_policy: Option<Policy>,
    pub public_acl_grants: Vec<PublicAclGrant>,
    /// `true` when the bucket has ACLs disabled (`BucketOwnerEnforced`), in which case ACL grants
    /// cannot exist and `public_acl_grants` is always empty.
    pub acls_disabled: bool,
}

/// Runs `GetBucketLocation`, `GetPublicAccessBlock`, `GetBucketPolicy`, and `GetBucketAcl`
/// concurrently against a client already scoped to `bucket`'s home region, and reduces the results
/// into [S3PublicAccessFacts]. A bucket lacking a policy, BPA configuration, or any public ACL
/// grant reports the corresponding field as empty/default rather than erroring — those are the
/// expected, common case, not failures.
pub async fn fetch_facts(config: &SdkConfig, bucket: &str) -> Result<S3PublicAccessFacts, FetchError> {
    let client = aws_sdk_s3::Client::new(config);

    let (location, bpa, policy, acl) = tokio::join!(
        client.get_bucket_location().bucket(bucket).send(),
        client.get_public_access_block().bucket(bucket).send(),
        client.get_bucket_policy().bucket(bucket).send(),
        client.get_bucket_acl().bucket(bucket).send(),
    );

    let region = location
        .map_err(|e| FetchError::sdk(bucket, e))?
        .location_constraint()
        .map(|lc| lc.as_str().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "us-east-1".to_string());

    let block_public_access = match bpa {
        Ok(output) => output
            .public_access_block_configuration()
            .map(|c| BlockPublicAccess {
                block_public_acls: c.block_public_acls().unwrap_or(false),
                ignore_public_acls: c.ignore_public_acls().unwrap_or(false),
                block_public_policy: c.block_public_policy().unwrap_or(false),
                restrict_public_buckets: c.restrict_public_buckets().unwrap_or(false),
            })
            .unwrap_or_default(),
        Err(e) if e.as_service_error().map(|se| se.is_no_such_public_access_block_configuration()).unwrap_or(false) => {
            BlockPublicAccess::default()
        }
        Err(e) => return Err(FetchError::sdk(bucket, e)),
    };

    let bucket_policy = match policy {
        Ok(output) => match output.policy() {
            Some(raw) => Some(Policy::from_str(raw).map_err(|e| FetchError::InvalidPolicy(bucket.to_string(), e.to_string()))?),
            None => None,
        },
        Err(e) if e.as_service_error().map(|se| se.is_no_such_bucket_policy()).unwrap_or(false) => None,
        Err(e) => return Err(FetchError::sdk(bucket, e)),
    };

    let acl_output = acl.map_err(|e| FetchError::sdk(bucket, e))?;
    let mut public_acl_grants = Vec::new();
    let mut acls_disabled = false;
    match acl_output.grants() {
        grants if grants.is_empty() && acl_output.owner().is_none() => acls_disabled = true,
        grants => {
            for grant in grants {
                let Some(grantee) = grant.grantee() else { continue };
                let Some(uri) = grantee.uri() else { continue };
                let public_grantee = if uri.ends_with("/AllUsers") {
                    Some(PublicGrantee::AllUsers)
                } else if uri.ends_with("/AuthenticatedUsers") {
                    Some(PublicGrantee::AuthenticatedUsers)
                } else {
                    None
                };
                if let Some(grantee) = public_grantee {
                    let permission = grant.permission().map(|p| p.as_str().to_string()).unwrap_or_default();
                    public_acl_grants.push(PublicAclGrant { grantee, permission });
                }
            }
        }
    }

    Ok(S3PublicAccessFacts { region, block_public_access, bucket_policy, public_acl_grants, acls_disabled })
}

/// One bucket's public-access verdict (§4.F step 3-5, §8.5/§8.6): the actions reachable by an
/// anonymous caller and the human-readable reasons triage would want, collected from whichever
/// surfaces Block Public Access left in play.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PublicAccessFinding {
    pub actions: Vec<String>,
    pub reasons: Vec<String>,
    pub needs_manual_triage: bool,
}

/// The bucket-level ACL permission names, mapped to the S3 actions they imply for an anonymous
/// grantee. `FULL_CONTROL` implies every action the narrower permissions do.
fn actions_implied_by_acl_permission(permission: &str) -> &'static [&'static str] {
    match permission {
        "READ" => &["s3:ListBucket"],
        "WRITE" => &["s3:PutObject", "s3:DeleteObject"],
        "READ_ACP" => &["s3:GetBucketAcl"],
        "WRITE_ACP" => &["s3:PutBucketAcl"],
        "FULL_CONTROL" => &["s3:ListBucket", "s3:PutObject", "s3:DeleteObject", "s3:GetBucketAcl", "s3:PutBucketAcl"],
        _ => &[],
    }
}

/// Reduces `facts` to a public-access verdict for `bucket_arn`, or `None` when nothing about the
/// bucket is reachable by an anonymous caller.
///
/// Implements §4.F steps 3-5: both BPA switches fully engaged skips everything (already handled
/// by [super::context_gen::generate_public_access_probes] returning no probes, but checked again
/// here since this function also drives the ACL branch, which that helper doesn't); otherwise
/// `restrict_public_buckets` alone skips the policy branch and `ignore_public_acls` (or ACLs being
/// disabled entirely under the Bucket Owner Enforced ownership control) skips the ACL branch. The
/// policy branch evaluates both the bucket ARN and the object-level ARN (`<bucket-arn>/*`), since a
/// policy commonly grants object-level access only without ever naming the bucket ARN itself, and
/// every `(action, resource)` probe is expanded through [RequestContext::permutations] so a grant
/// gated on `aws:SecureTransport` still surfaces under whichever permutation satisfies it.
pub fn evaluate_public_access(facts: &S3PublicAccessFacts, bucket_arn: &Arn) -> Result<Option<PublicAccessFinding>, AspenError> {
    if facts.block_public_access.fully_blocks_public_access() {
        return Ok(None);
    }

    let mut actions = BTreeSet::new();
    let mut reasons = Vec::new();

    if !facts.block_public_access.restrict_public_buckets {
        if let Some(policy) = &facts.bucket_policy {
            let object_arn = Arn::new(bucket_arn.partition(), "s3", "", "", format!("{}/*", bucket_arn.resource()))
                .map_err(|e| AspenError::InvalidSubstitution(e.to_string()))?;

            for action in PUBLIC_ACCESS_PROBE_ACTIONS {
                'resources: for resource in [bucket_arn.clone(), object_arn.clone()] {
                    let request_context = build_probe(action, resource.clone())
                        .map_err(|e| AspenError::InvalidSubstitution(e.to_string()))?;
                    for ctx in request_context.permutations()? {
                        if policy.evaluate(&ctx)? == Decision::Allow {
                            actions.insert(action.to_string());
                            reasons.push(format!("bucket policy allows {action} to any principal on {resource}"));
                            break 'resources;
                        }
                    }
                }
            }
        }
    }

    if !facts.block_public_access.ignore_public_acls && !facts.acls_disabled {
        for grant in &facts.public_acl_grants {
            let implied = actions_implied_by_acl_permission(&grant.permission);
            if implied.is_empty() {
                continue;
            }
            actions.extend(implied.iter().map(|a| a.to_string()));
            reasons.push(format!("bucket ACL grants {} to {:?}", grant.permission, grant.grantee));
        }
    }

    if actions.is_empty() && reasons.is_empty() {
        return Ok(None);
    }

    Ok(Some(PublicAccessFinding { actions: actions.into_iter().collect(), reasons, needs_manual_triage: false }))
}
