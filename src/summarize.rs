//! The permissions summarizer & graph projector (§4.I): walks every principal in a [PolicyData]
//! snapshot, probes the evaluator for every action it could plausibly exercise against every
//! enriched resource in scope, and projects the resulting stream of evaluation outcomes into
//! typed [GraphEdge]s ready for the graph store.

use {
    crate::{
        condop,
        evaluator::{self, EvaluationRequest, EvaluationResult, EvaluatorError},
        model::{
            erd::EnrichedResourceDescription,
            gaad::{Gaad, PolicyData, RoleDetail},
            graph::{Capability, GraphEdge, GraphNode},
            orgpolicies::OrgPolicies,
            request_context::{RequestContext, RequestContextBuilderError, SecureTransport},
            transform,
        },
        AwsPrincipal, PolicySet, PolicySource, Statement,
    },
    scratchstack_arn::Arn,
    scratchstack_aws_principal::{Principal as ActorPrincipal, PrincipalIdentity, Role, User},
    serde_json::json,
    std::{
        collections::{BTreeMap, BTreeSet},
        str::FromStr,
    },
};

/// Errors raised while summarizing a [PolicyData] snapshot. Individual probe failures are folded
/// into [SummaryOutput::errors] rather than propagated — one unreachable principal or malformed
/// ARN should not abort the whole run (§4.I "Failure semantics").
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("request context error: {0}")]
    RequestContext(#[from] RequestContextBuilderError),
}

/// The subject-claim marker identifying GitHub Actions OIDC federation on a role's trust policy.
const GITHUB_OIDC_PROVIDER_MARKER: &str = "token.actions.githubusercontent.com";
const GITHUB_OIDC_SUB_CONDITION_KEY: &str = "token.actions.githubusercontent.com:sub";

/// ERD properties worth checking for an attached IAM role, in preference order. Resource types
/// vary in what they call this property (EC2 instance profiles, Lambda execution roles, …); this
/// covers the common shapes rather than one canonical key.
const ROLE_PROPERTY_CANDIDATES: &[&str] = &["Role", "RoleArn", "ExecutionRoleArn", "IamInstanceProfile"];

/// Builds the [PolicySet] in force for one principal's own identity: its inline policies, its
/// attached managed policies (resolved against GAAD's top-level `Policies` list), its groups'
/// policies (users only), and its permissions boundary if any. The evaluator adds the resource
/// policy and organization layer on top of this (see [crate::evaluator::evaluate]).
pub fn identity_policy_set(gaad: &Gaad, principal_arn: &str) -> PolicySet {
    let mut policy_set = PolicySet::new();

    if let Some(user) = gaad.user_detail_list.iter().find(|u| u.arn == principal_arn) {
        for inline in &user.user_policy_list {
            policy_set.add_policy(
                PolicySource::new_entity_inline(user.arn.clone(), user.user_id.clone(), inline.policy_name.clone()),
                inline.policy_document.clone(),
            );
        }
        for attached in &user.attached_managed_policies {
            add_managed_policy(gaad, &mut policy_set, attached);
        }
        for group_name in &user.group_list {
            if let Some(group) = gaad.group_detail_list.iter().find(|g| &g.group_name == group_name) {
                for inline in &group.group_policy_list {
                    policy_set.add_policy(
                        PolicySource::new_group_inline(group.arn.clone(), group.group_id.clone(), inline.policy_name.clone()),
                        inline.policy_document.clone(),
                    );
                }
                for attached in &group.attached_managed_policies {
                    if let Some(detail) = gaad.policy_by_arn(&attached.policy_arn) {
                        if let Some(document) = detail.default_document() {
                            policy_set.add_policy(
                                PolicySource::new_group_attached_policy(
                                    group.arn.clone(),
                                    group.group_id.clone(),
                                    detail.arn.clone(),
                                    detail.policy_id.clone(),
                                    detail.default_version_id.clone(),
                                ),
                                document.clone(),
                            );
                        }
                    }
                }
            }
        }
        if let Some(boundary) = &user.permissions_boundary {
            add_permission_boundary(gaad, &mut policy_set, boundary);
        }
        return policy_set;
    }

    if let Some(role) = gaad.role_detail_list.iter().find(|r| r.arn == principal_arn) {
        for inline in &role.role_policy_list {
            policy_set.add_policy(
                PolicySource::new_entity_inline(role.arn.clone(), role.role_id.clone(), inline.policy_name.clone()),
                inline.policy_document.clone(),
            );
        }
        for attached in &role.attached_managed_policies {
            add_managed_policy(gaad, &mut policy_set, attached);
        }
        if let Some(boundary) = &role.permissions_boundary {
            add_permission_boundary(gaad, &mut policy_set, boundary);
        }
    }

    policy_set
}

fn add_managed_policy(gaad: &Gaad, policy_set: &mut PolicySet, attached: &crate::model::gaad::AttachedPolicy) {
    if let Some(detail) = gaad.policy_by_arn(&attached.policy_arn) {
        if let Some(document) = detail.default_document() {
            policy_set.add_policy(
                PolicySource::new_entity_attached_policy(detail.arn.clone(), detail.policy_id.clone(), detail.default_version_id.clone()),
                document.clone(),
            );
        }
    }
}

fn add_permission_boundary(gaad: &Gaad, policy_set: &mut PolicySet, boundary: &crate::model::gaad::AttachedPolicy) {
    if let Some(detail) = gaad.policy_by_arn(&boundary.policy_arn) {
        if let Some(document) = detail.default_document() {
            policy_set.add_policy(
                PolicySource::new_permission_boundary(detail.arn.clone(), detail.policy_id.clone(), detail.default_version_id.clone()),
                document.clone(),
            );
        }
    }
}

/// `true` when `statement`'s Principal clause names `arn` directly, an account containing it, or
/// is the wildcard `*`. Used to pull resource-policy statements naming a specific principal into
/// that principal's action universe (§4.I) without needing the full actor-matching machinery
/// (which would require reconstructing a [PrincipalIdentity] for every candidate first).
fn principal_statement_targets_arn(statement: &Statement, arn: &str) -> bool {
    let Some(principal) = statement.principal() else { return false };
    match principal.specified() {
        None => principal.is_any(),
        Some(specified) => match specified.aws() {
            Some(list) => list.to_vec().iter().any(|p| match p.as_ref() {
                AwsPrincipal::Any => true,
                AwsPrincipal::Arn(pattern) => pattern.to_string() == arn,
                AwsPrincipal::Account(account_id) => arn.contains(&format!(":{account_id}:")),
            }),
            None => false,
        },
    }
}

/// The union of actions `principal_arn`'s own identity policies reference and every action
/// referenced by a resource policy statement naming it directly (§4.I, first paragraph).
fn actions_for_principal(policy_data: &PolicyData, identity_policies: &PolicySet, principal_arn: &str) -> BTreeSet<String> {
    let mut actions = evaluator::actions_referenced(identity_policies);
    for policy in policy_data.resource_policies.values() {
        for statement in policy.statement().to_vec() {
            if principal_statement_targets_arn(&statement, principal_arn) {
                actions.extend(evaluator::statement_actions(&statement));
            }
        }
    }
    actions
}

fn split_action(action: &str) -> Option<(String, String)> {
    if action == "*" {
        // A bare wildcard grant widens the action universe but has no single service/action pair
        // to probe the evaluator with; the grant itself is still visible via `actions_referenced`
        // for callers that want to flag it, it just contributes no single graph edge here (§9).
        return None;
    }
    let (service, name) = action.split_once(':')?;
    Some((service.to_string(), name.to_string()))
}

/// Builds the evaluator actor for `arn`: a user or role identity reconstructed from the ARN's
/// partition/account/path/name, the same shapes [crate::policyfetch::context_gen] builds for its
/// anonymous probe principal.
fn principal_actor(arn_str: &str) -> Option<ActorPrincipal> {
    let arn = Arn::from_str(arn_str).ok()?;
    let resource = arn.resource();
    if resource.starts_with("user/") {
        let (path, name) = split_path_and_name(resource, "user/");
        User::new(arn.partition(), arn.account_id(), &path, &name).ok().map(|u| ActorPrincipal::from(vec![PrincipalIdentity::from(u)]))
    } else if resource.starts_with("role/") {
        let (path, name) = split_path_and_name(resource, "role/");
        Role::new(arn.partition(), arn.account_id(), &path, &name).ok().map(|r| ActorPrincipal::from(vec![PrincipalIdentity::from(r)]))
    } else {
        None
    }
}

fn split_path_and_name(resource: &str, prefix: &str) -> (String, String) {
    let rest = resource.strip_prefix(prefix).unwrap_or(resource);
    match rest.rfind('/') {
        Some(idx) => (format!("/{}/", &rest[..idx]), rest[idx + 1..].to_string()),
        None => ("/".to_string(), rest.to_string()),
    }
}

/// Evaluates `action` against `resources` for `actor`, trying the un-pinned `aws:SecureTransport`
/// context first and only falling back to the pinned true/false permutations when the un-pinned
/// probe denies — this is how an "allowed only over TLS" finding surfaces without every probe
/// paying for two evaluations (§4.I tie-break, [RequestContext::permutations]).
fn evaluate_probe(
    policy_data: &PolicyData,
    identity_policies: &PolicySet,
    service: &str,
    action: &str,
    actor: &ActorPrincipal,
    resources: &[Arn],
) -> Result<EvaluationResult, SummarizeError> {
    for secure_transport in [SecureTransport::Unknown, SecureTransport::Yes, SecureTransport::No] {
        let context = RequestContext::builder()
            .action(action)
            .service(service)
            .actor(actor.clone())
            .resources(resources.to_vec())
            .secure_transport(secure_transport)
            .build()?;
        let request = EvaluationRequest::new(identity_policies.clone(), context);
        let result = evaluator::evaluate(policy_data, &request)?;
        if result.allowed || secure_transport == SecureTransport::No {
            return Ok(result);
        }
    }
    unreachable!("the SecureTransport::No iteration always returns")
}

/// The provenance tag attached to a projected permission edge. The evaluator collapses its
/// decision to a single `allowed` flag rather than exposing every contributing source, so this is
/// a best-effort classification: a resource with its own attached policy is tagged
/// [Capability::ResourcePolicy], everything else [Capability::IdentityPolicy] (§9).
fn capability_for(policy_data: &PolicyData, resource_arn: &str) -> Capability {
    if evaluator::resource_policy_for(policy_data, resource_arn).is_some() {
        Capability::ResourcePolicy
    } else {
        Capability::IdentityPolicy
    }
}

fn project_edge(principal_node: GraphNode, erd: &EnrichedResourceDescription, action: &str, result: &EvaluationResult, capability: Capability) -> GraphEdge {
    let end = transform::resource_node(erd);
    let mut edge = GraphEdge::new(principal_node, end, action, capability)
        .with_property("allowed", json!(result.allowed))
        .with_property("details", json!(result.evaluation_details))
        .with_property("hasInconclusiveCondition", json!(result.has_inconclusive_condition));

    if let Some(restrictions) = &result.ssm_document_restrictions {
        edge = edge
            .with_property("ssmDocumentPatterns", json!(restrictions.document_patterns))
            .with_property("ssmShellExecutionReachable", json!(restrictions.shell_execution_reachable));
    }

    edge
}

fn github_org_repo(sub_pattern: &str) -> Option<String> {
    let rest = sub_pattern.strip_prefix("repo:")?;
    let org_repo = rest.split(':').next()?;
    if org_repo.is_empty() {
        None
    } else {
        Some(org_repo.to_string())
    }
}

/// Groups the `sub` claim patterns a role's trust policy allows from the GitHub Actions OIDC
/// provider by `org/repo` (§4.I, GitHub-Actions federation projection).
fn github_federation_groups(role: &RoleDetail) -> BTreeMap<String, BTreeSet<String>> {
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for statement in role.assume_role_policy_document.statement().to_vec() {
        if *statement.effect() != crate::Effect::Allow {
            continue;
        }
        let Some(principal) = statement.principal() else { continue };
        let Some(specified) = principal.specified() else { continue };
        let Some(federated) = specified.federated() else { continue };
        if !federated.to_vec().iter().any(|f| f.contains(GITHUB_OIDC_PROVIDER_MARKER)) {
            continue;
        }
        let Some(condition) = statement.condition() else { continue };
        let Some(map) = condition.get(&condop::StringLike) else { continue };
        let Some(subs) = map.get(GITHUB_OIDC_SUB_CONDITION_KEY) else { continue };
        for sub in subs.to_vec() {
            if let Some(org_repo) = github_org_repo(sub) {
                groups.entry(org_repo).or_default().insert(sub.clone());
            }
        }
    }

    groups
}

/// Builds the `Repository` node for one `org/repo` group (§4.I, E4): keyed on the canonical
/// `https://github.com/<org>/<repo>` URL, since that's the stable, queryable identity for a
/// GitHub repository rather than the bare `org/repo` string the sub-claim pattern carries.
fn repository_node(org_repo: &str) -> GraphNode {
    let (org, repo) = org_repo.split_once('/').unwrap_or((org_repo, ""));
    let url = format!("https://github.com/{org_repo}");
    GraphNode::new(vec!["Repository".to_string()], vec!["url".to_string()])
        .with_property("url", json!(url))
        .with_property("orgRepo", json!(org_repo))
        .with_property("org", json!(org))
        .with_property("repo", json!(repo))
}

fn github_federation_edges(role: &RoleDetail) -> Vec<GraphEdge> {
    let role_node = transform::role_node(role);
    github_federation_groups(role)
        .into_iter()
        .map(|(org_repo, subs)| {
            GraphEdge::new(repository_node(&org_repo), role_node.clone(), "sts:AssumeRole", Capability::GitHubActionsFederation)
                .with_property("subjectPatterns", json!(subs.into_iter().collect::<Vec<_>>()))
        })
        .collect()
}

/// Parses `value` as a role ARN, or (if it's a bare name) synthesizes one from `partition`/`account_id`.
fn resolve_role_arn(partition: &str, account_id: &str, value: &str) -> Option<Arn> {
    if let Ok(arn) = Arn::from_str(value) {
        if arn.resource().starts_with("role/") {
            return Some(arn);
        }
    }
    let bare_name = value.rsplit('/').next().unwrap_or(value);
    Arn::from_str(&format!("arn:{partition}:iam::{account_id}:role/{bare_name}")).ok()
}

/// The role ARN an ERD's properties name, if any (§4.I, "Resource→Role assume role edges").
fn extract_role_arn(erd: &EnrichedResourceDescription) -> Option<Arn> {
    for key in ROLE_PROPERTY_CANDIDATES {
        if let Some(value) = erd.get_property(key).and_then(|v| v.as_str()) {
            if let Some(arn) = resolve_role_arn(erd.arn().partition(), erd.account_id(), value) {
                return Some(arn);
            }
        }
    }
    None
}

fn assume_role_edges(policy_data: &PolicyData) -> Vec<GraphEdge> {
    let mut edges = Vec::new();
    for erd in &policy_data.resources {
        let Some(role_arn) = extract_role_arn(erd) else { continue };
        let resource_node = transform::resource_node(erd);
        let role_node = GraphNode::new(vec!["Principal".to_string(), "Role".to_string()], vec!["arn".to_string()])
            .with_property("arn", json!(role_arn.to_string()));
        edges.push(GraphEdge::new(resource_node, role_node, "AssumesRole", Capability::IdentityPolicy));
    }
    edges
}

fn account_node(account_id: &str, org_policies: &OrgPolicies) -> GraphNode {
    let node = GraphNode::new(vec!["Account".to_string()], vec!["accountId".to_string()]).with_property("accountId", json!(account_id));
    match org_policies.account(account_id) {
        Some(meta) => {
            let node = node.with_property("ouPath", json!(meta.ou_path()));
            let node = match meta.account_name() {
                Some(name) => node.with_property("name", json!(name)),
                None => node,
            };
            match meta.account_email() {
                Some(email) => node.with_property("email", json!(email)),
                None => node,
            }
        }
        None => node.with_property("thirdparty", json!(true)),
    }
}

fn account_ids(policy_data: &PolicyData) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for user in &policy_data.gaad.user_detail_list {
        if let Ok(arn) = Arn::from_str(&user.arn) {
            if !arn.account_id().is_empty() {
                ids.insert(arn.account_id().to_string());
            }
        }
    }
    for role in &policy_data.gaad.role_detail_list {
        if let Ok(arn) = Arn::from_str(&role.arn) {
            if !arn.account_id().is_empty() {
                ids.insert(arn.account_id().to_string());
            }
        }
    }
    for erd in &policy_data.resources {
        if !erd.account_id().is_empty() {
            ids.insert(erd.account_id().to_string());
        }
    }
    ids
}

/// The full projection for one snapshot: permission edges, GitHub-Actions federation edges,
/// resource→role edges, the account-node enrichment pass, and any probe failures encountered
/// along the way (logged, not propagated — §4.I "Failure semantics").
#[derive(Clone, Debug, Default)]
pub struct SummaryOutput {
    pub edges: Vec<GraphEdge>,
    pub account_nodes: Vec<GraphNode>,
    pub errors: Vec<String>,
}

/// Walks every principal × action × resource combination in `policy_data` and projects the
/// resulting evaluations into a [SummaryOutput] (§4.I).
pub fn summarize(policy_data: &PolicyData) -> SummaryOutput {
    let mut edges = Vec::new();
    let mut errors = Vec::new();

    for role in &policy_data.gaad.role_detail_list {
        edges.extend(github_federation_edges(role));
    }
    edges.extend(assume_role_edges(policy_data));

    let mut principals: Vec<(String, GraphNode)> = Vec::new();
    for user in &policy_data.gaad.user_detail_list {
        principals.push((user.arn.clone(), transform::user_node(user)));
    }
    for role in &policy_data.gaad.role_detail_list {
        principals.push((role.arn.clone(), transform::role_node(role)));
    }

    // Tracks (principal, action, resource) triples already established Allow under a simpler
    // context so later, more specific contexts are skipped for them — Allow is monotone (§4.I).
    let mut allowed_once: BTreeSet<(String, String, String)> = BTreeSet::new();

    for (principal_arn, principal_node) in &principals {
        let identity_policies = identity_policy_set(&policy_data.gaad, principal_arn);
        let actions = actions_for_principal(policy_data, &identity_policies, principal_arn);

        let Some(actor) = principal_actor(principal_arn) else {
            errors.push(format!("could not build an evaluator actor for {principal_arn}"));
            continue;
        };

        for erd in &policy_data.resources {
            let resource_arn = erd.arn().to_string();
            let capability = capability_for(policy_data, &resource_arn);

            for action in &actions {
                let Some((service, action_name)) = split_action(action) else { continue };
                let key = (principal_arn.clone(), action.clone(), resource_arn.clone());
                if allowed_once.contains(&key) {
                    continue;
                }

                match evaluate_probe(policy_data, &identity_policies, &service, &action_name, &actor, std::slice::from_ref(erd.arn())) {
                    Ok(result) => {
                        if result.allowed {
                            allowed_once.insert(key);
                        }
                        edges.push(project_edge(principal_node.clone(), erd, action, &result, capability.clone()));
                    }
                    Err(e) => errors.push(format!("evaluating {principal_arn} {action} {resource_arn}: {e}")),
                }
            }
        }
    }

    let account_nodes = account_ids(policy_data).into_iter().map(|id| account_node(&id, &policy_data.org_policies)).collect();

    SummaryOutput { edges, account_nodes, errors }
}
