//! Organization-level policy state (§4.F): service control policies, resource control policies,
//! and the account metadata the summarizer enriches onto graph nodes.

use {
    crate::{Policy, PolicySet, PolicySource},
    std::{collections::HashMap, str::FromStr},
};

/// One node of an organization's policy tree: the policies attached directly at this node, plus
/// its children by account/OU id. An account with no SCPs/RCPs attached anywhere above it falls
/// back to the implicit full-access policy every AWS organization root carries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyTree {
    service_control_policies: Vec<(String, String, Policy)>,
    resource_control_policies: Vec<(String, String, Policy)>,
    children: HashMap<String, PolicyTree>,
}

impl PolicyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a service control policy at this node.
    pub fn attach_scp(&mut self, policy_arn: impl Into<String>, policy_name: impl Into<String>, document: Policy) {
        self.service_control_policies.push((policy_arn.into(), policy_name.into(), document));
    }

    /// Attaches a resource control policy at this node.
    pub fn attach_rcp(&mut self, policy_arn: impl Into<String>, policy_name: impl Into<String>, document: Policy) {
        self.resource_control_policies.push((policy_arn.into(), policy_name.into(), document));
    }

    /// Returns (creating if absent) the child node for `id` (an account id or OU id).
    pub fn child_mut(&mut self, id: impl Into<String>) -> &mut PolicyTree {
        self.children.entry(id.into()).or_default()
    }

    /// Walks `path` (root to leaf, e.g. `["r-abcd", "ou-abcd-11111111", "123456789012"]`) and adds
    /// every SCP/RCP encountered along the way into `policy_set`, tagged with `applied_arn`.
    fn collect_into(&self, path: &[&str], applied_arn_for: impl Fn(&str) -> String + Copy, policy_set: &mut PolicySet) {
        for (policy_arn, policy_name, document) in &self.service_control_policies {
            let applied_arn = applied_arn_for(path.first().copied().unwrap_or_default());
            policy_set.add_policy(
                PolicySource::new_org_service_control(policy_arn.clone(), policy_name.clone(), applied_arn),
                document.clone(),
            );
        }
        for (policy_arn, policy_name, document) in &self.resource_control_policies {
            let applied_arn = applied_arn_for(path.first().copied().unwrap_or_default());
            policy_set.add_policy(
                PolicySource::new_org_resource_control(policy_arn.clone(), policy_name.clone(), applied_arn),
                document.clone(),
            );
        }

        if let Some((head, rest)) = path.split_first() {
            if let Some(child) = self.children.get(*head) {
                child.collect_into(rest, applied_arn_for, policy_set);
            }
        }
    }
}

/// Per-account metadata the summarizer attaches to graph nodes once the permission edges have
/// been projected (§4.I): account id, friendly name/email if known, and the OU path.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountMeta {
    account_id: String,
    account_name: Option<String>,
    account_email: Option<String>,
    ou_path: Vec<String>,
}

impl AccountMeta {
    pub fn new(account_id: impl Into<String>, ou_path: Vec<String>) -> Self {
        Self { account_id: account_id.into(), account_name: None, account_email: None, ou_path }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.account_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.account_email = Some(email.into());
        self
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn account_name(&self) -> Option<&str> {
        self.account_name.as_deref()
    }

    pub fn account_email(&self) -> Option<&str> {
        self.account_email.as_deref()
    }

    pub fn ou_path(&self) -> &[String] {
        &self.ou_path
    }
}

/// The organization's full policy state: the policy tree rooted at the organization root, plus
/// per-account metadata keyed by account id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrgPolicies {
    tree: PolicyTree,
    accounts: HashMap<String, AccountMeta>,
}

impl OrgPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree_mut(&mut self) -> &mut PolicyTree {
        &mut self.tree
    }

    pub fn set_account(&mut self, meta: AccountMeta) {
        self.accounts.insert(meta.account_id().to_string(), meta);
    }

    pub fn account(&self, account_id: &str) -> Option<&AccountMeta> {
        self.accounts.get(account_id)
    }

    /// Builds a [PolicySet] of every SCP/RCP in force for `account_id`, walking from the root
    /// through each OU in its `ou_path` down to the account itself. Accounts with no metadata on
    /// file are treated as directly under the root (the organization's implicit FullAWSAccess
    /// equivalent, which this function does not itself add — callers seed that default).
    pub fn org_policy_set_for_account(&self, account_id: &str) -> PolicySet {
        let mut path: Vec<&str> = match self.accounts.get(account_id) {
            Some(meta) => meta.ou_path().iter().map(String::as_str).collect(),
            None => vec![],
        };
        path.push(account_id);

        let mut policy_set = PolicySet::new();
        self.tree.collect_into(&path, |id| format!("arn:aws:organizations::{account_id}:account/o-unknown/{id}"), &mut policy_set);
        policy_set
    }
}

/// The policy every organization root implicitly carries in the absence of an explicit SCP:
/// unconditional allow on every action and resource. RCPs have no such implicit default; an
/// account with no RCPs attached simply contributes none to the evaluation.
pub fn default_full_access_policy() -> Policy {
    Policy::from_str(
        r#"{"Version":"2012-10-17","Statement":{"Effect":"Allow","Action":"*","Resource":"*"}}"#,
    )
    .expect("static policy document is well-formed")
}
