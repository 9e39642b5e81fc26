//! The authorization snapshot loader (§4.G): GAAD retrieval, URL-decoding of embedded policy
//! documents, and the offline file-load variant.

use {
    crate::{model::orgpolicies::OrgPolicies, Policy},
    percent_encoding::percent_decode_str,
    serde::{Deserialize, Serialize},
    serde_json::Value,
    std::collections::HashMap,
    thiserror::Error,
};

/// Errors raised while loading or decoding a GAAD snapshot.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("GAAD file is empty (expected an object or a non-empty array)")]
    EmptyFile,

    #[error("failed to read GAAD source: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse GAAD JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("AWS API error retrieving account authorization details: {0}")]
    Aws(String),
}

/// An inline policy attached directly to a user, role, or group.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct InlinePolicy {
    #[serde(rename = "PolicyName")]
    pub policy_name: String,
    #[serde(rename = "PolicyDocument")]
    pub policy_document: Policy,
}

/// A customer-managed or AWS-managed policy, as it appears in GAAD's top-level `Policies` list.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ManagedPolicyDetail {
    #[serde(rename = "PolicyName")]
    pub policy_name: String,
    #[serde(rename = "PolicyId")]
    pub policy_id: String,
    #[serde(rename = "Arn")]
    pub arn: String,
    #[serde(rename = "DefaultVersionId")]
    pub default_version_id: String,
    #[serde(rename = "PolicyVersionList", default)]
    pub policy_version_list: Vec<ManagedPolicyVersion>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ManagedPolicyVersion {
    #[serde(rename = "VersionId")]
    pub version_id: String,
    #[serde(rename = "IsDefaultVersion", default)]
    pub is_default_version: bool,
    #[serde(rename = "Document")]
    pub document: Policy,
}

impl ManagedPolicyDetail {
    /// The document corresponding to `DefaultVersionId`, if present in `PolicyVersionList`.
    pub fn default_document(&self) -> Option<&Policy> {
        self.policy_version_list.iter().find(|v| v.version_id == self.default_version_id).map(|v| &v.document)
    }
}

/// A reference to a managed policy attached to a user/role/group (the GAAD shape omits the
/// document here; it's resolved against the top-level `Policies` list by ARN).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AttachedPolicy {
    #[serde(rename = "PolicyName")]
    pub policy_name: String,
    #[serde(rename = "PolicyArn")]
    pub policy_arn: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UserDetail {
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "UserId")]
    pub user_id: String,
    #[serde(rename = "Arn")]
    pub arn: String,
    #[serde(rename = "Path", default)]
    pub path: String,
    #[serde(rename = "UserPolicyList", default)]
    pub user_policy_list: Vec<InlinePolicy>,
    #[serde(rename = "AttachedManagedPolicies", default)]
    pub attached_managed_policies: Vec<AttachedPolicy>,
    #[serde(rename = "GroupList", default)]
    pub group_list: Vec<String>,
    #[serde(rename = "Tags", default)]
    pub tags: Vec<Tag>,
    #[serde(rename = "PermissionsBoundary", default)]
    pub permissions_boundary: Option<AttachedPolicy>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GroupDetail {
    #[serde(rename = "GroupName")]
    pub group_name: String,
    #[serde(rename = "GroupId")]
    pub group_id: String,
    #[serde(rename = "Arn")]
    pub arn: String,
    #[serde(rename = "Path", default)]
    pub path: String,
    #[serde(rename = "GroupPolicyList", default)]
    pub group_policy_list: Vec<InlinePolicy>,
    #[serde(rename = "AttachedManagedPolicies", default)]
    pub attached_managed_policies: Vec<AttachedPolicy>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct RoleDetail {
    #[serde(rename = "RoleName")]
    pub role_name: String,
    #[serde(rename = "RoleId")]
    pub role_id: String,
    #[serde(rename = "Arn")]
    pub arn: String,
    #[serde(rename = "Path", default)]
    pub path: String,
    #[serde(rename = "AssumeRolePolicyDocument")]
    pub assume_role_policy_document: Policy,
    #[serde(rename = "RolePolicyList", default)]
    pub role_policy_list: Vec<InlinePolicy>,
    #[serde(rename = "AttachedManagedPolicies", default)]
    pub attached_managed_policies: Vec<AttachedPolicy>,
    #[serde(rename = "InstanceProfileList", default)]
    pub instance_profile_list: Vec<InstanceProfile>,
    #[serde(rename = "Tags", default)]
    pub tags: Vec<Tag>,
    #[serde(rename = "PermissionsBoundary", default)]
    pub permissions_boundary: Option<AttachedPolicy>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct InstanceProfile {
    #[serde(rename = "InstanceProfileName")]
    pub instance_profile_name: String,
    #[serde(rename = "Arn")]
    pub arn: String,
}

/// The authorization snapshot: `iam:GetAccountAuthorizationDetails`, concatenated across pages.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Gaad {
    #[serde(rename = "UserDetailList", default)]
    pub user_detail_list: Vec<UserDetail>,
    #[serde(rename = "GroupDetailList", default)]
    pub group_detail_list: Vec<GroupDetail>,
    #[serde(rename = "RoleDetailList", default)]
    pub role_detail_list: Vec<RoleDetail>,
    #[serde(rename = "Policies", default)]
    pub policies: Vec<ManagedPolicyDetail>,
}

impl Gaad {
    /// Appends one page's worth of entries onto this snapshot (§8.2 pagination completeness).
    pub fn extend_with_page(&mut self, page: Gaad) {
        self.user_detail_list.extend(page.user_detail_list);
        self.group_detail_list.extend(page.group_detail_list);
        self.role_detail_list.extend(page.role_detail_list);
        self.policies.extend(page.policies);
    }

    /// Looks up a managed policy by ARN.
    pub fn policy_by_arn(&self, arn: &str) -> Option<&ManagedPolicyDetail> {
        self.policies.iter().find(|p| p.arn == arn)
    }
}

/// Walks a JSON tree, URL-decoding every string leaf that looks like a percent-encoded JSON
/// object (begins with `%7B`, the encoding of `{`) and re-parsing it into nested structure, so
/// downstream consumers never have to double-decode (§4.G, §8.3).
pub fn decode_embedded_policies(value: &mut Value) {
    match value {
        Value::String(s) if s.starts_with("%7B") => {
            if let Ok(decoded) = percent_decode_str(s).decode_utf8() {
                if let Ok(mut parsed) = serde_json::from_str::<Value>(&decoded) {
                    decode_embedded_policies(&mut parsed);
                    *value = parsed;
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                decode_embedded_policies(item);
            }
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                decode_embedded_policies(v);
            }
        }
        _ => {}
    }
}

/// Parses a GAAD JSON blob, accepting either a single object or a length-≥1 array (using the
/// first element) per the two historical output shapes (§4.G, §8.5).
pub fn parse_gaad_document(raw: &str) -> Result<Gaad, LoaderError> {
    let mut value: Value = serde_json::from_str(raw)?;
    decode_embedded_policies(&mut value);

    let object = match value {
        Value::Array(mut items) => {
            if items.is_empty() {
                return Err(LoaderError::EmptyFile);
            }
            items.remove(0)
        }
        other => other,
    };

    Ok(serde_json::from_value(object)?)
}

/// The evaluator's full input bundle (§3): GAAD, per-resource policies, org policies, and the
/// enumerated ERDs in scope. Built incrementally by the loader links and passed whole into the
/// summarizer.
#[derive(Clone, Debug, Default)]
pub struct PolicyData {
    pub gaad: Gaad,
    pub resource_policies: HashMap<String, Policy>,
    pub org_policies: OrgPolicies,
    pub resources: Vec<crate::model::erd::EnrichedResourceDescription>,
}
