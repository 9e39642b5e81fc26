//! The IAM policy evaluator (§4.H): turns a [PolicyData] snapshot plus an [EvaluationRequest]
//! into an [EvaluationResult], following the same decision order IAM itself uses — an explicit
//! Deny anywhere wins, otherwise an Allow anywhere wins, otherwise the request is denied by
//! default — while separately flagging requests whose outcome depends on a condition key this
//! evaluation run could not populate.
//!
//! The per-statement mechanics (principal/action/resource matching, condition operators) all live
//! in the policy-language core (`policyset`, `statement`, `condition`); this module is the layer
//! that assembles the right [PolicySet] for a request (identity policies plus the resource policy
//! plus the organization's SCPs/RCPs) and interprets the result for the recon pipeline.

use {
    crate::{
        model::{gaad::PolicyData, request_context::RequestContext},
        AspenError, Decision, Effect, Policy, PolicySet, PolicySource, Statement,
    },
    std::collections::{BTreeSet, HashSet},
};

/// Errors raised while evaluating a request. Wraps [AspenError] (the policy core's own error
/// type, left as a hand-rolled enum per §7) behind a `thiserror` enum, matching every other new
/// framework-level module in this crate.
#[derive(Debug, thiserror::Error)]
pub enum EvaluatorError {
    #[error("policy evaluation error: {0}")]
    Policy(#[from] AspenError),
}

/// The caller-assembled input to one evaluation: the candidate action/resource/context, and the
/// identity-side policies already resolved for the principal making the request (its inline and
/// attached-managed policies, its groups' policies, and its permissions boundary if any — see
/// [crate::summarize::identity_policy_set]). The evaluator itself adds the resource policy and
/// the organization policy layer from `PolicyData` before evaluating.
#[derive(Clone, Debug)]
pub struct EvaluationRequest {
    pub identity_policies: PolicySet,
    pub context: RequestContext,
}

impl EvaluationRequest {
    pub fn new(identity_policies: PolicySet, context: RequestContext) -> Self {
        Self { identity_policies, context }
    }
}

/// SSM document-ARN restrictions implied by a `ssm:*` evaluation (§4.H, last paragraph). Built
/// only for actions in [SSM_SHELL_SENSITIVE_ACTIONS] — an explicit allowlist rather than substring
/// matching on action names, per the redesign note in §9.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SsmDocumentRestrictions {
    /// The document ARN/name patterns the matching Allow statements restrict this action to. A
    /// matching Allow statement with no `ssm:documentARN` condition contributes the unrestricted
    /// pattern `*`.
    pub document_patterns: Vec<String>,

    /// `true` when `*`, `*RunShellScript*`, or `*RunPowerShellScript*` is reachable among
    /// `document_patterns` — i.e. this principal can run arbitrary shell/PowerShell on managed
    /// instances via this action.
    pub shell_execution_reachable: bool,
}

/// Actions whose SSM document-ARN condition keys are worth projecting. Chosen explicitly because
/// the relevant condition keys are not uniformly documented across every SSM action (§9).
pub const SSM_SHELL_SENSITIVE_ACTIONS: &[&str] =
    &["ssm:SendCommand", "ssm:StartSession", "ssm:StartAutomationExecution", "ssm:CreateAssociation"];

const SSM_DOCUMENT_CONDITION_KEY: &str = "ssm:documentARN";

const SHELL_DOCUMENT_MARKERS: &[&str] = &["RunShellScript", "RunPowerShellScript"];

/// Per (principal, action, resource, context) probe outcome (§3).
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationResult {
    pub allowed: bool,
    pub evaluation_details: String,
    pub has_inconclusive_condition: bool,
    pub ssm_document_restrictions: Option<SsmDocumentRestrictions>,
}

/// Builds the full [PolicySet] for `request`: its identity policies, the resource policy (if
/// `PolicyData` has one for the resource ARN), and the organization's SCPs/RCPs for the resource's
/// account.
fn assemble_policy_set(policy_data: &PolicyData, request: &EvaluationRequest) -> PolicySet {
    let mut policy_set = request.identity_policies.clone();

    for arn in request.context.resources() {
        let arn_string = arn.to_string();
        if let Some(resource_policy) = policy_data.resource_policies.get(&arn_string) {
            policy_set.add_policy(PolicySource::new_resource(arn_string.clone(), None::<String>), resource_policy.clone());
        }

        let account_id = arn.account_id();
        if !account_id.is_empty() {
            let org_set = policy_data.org_policies.org_policy_set_for_account(account_id);
            for (source, policy) in org_set.policies() {
                policy_set.add_policy(source.clone(), policy.clone());
            }
        }
    }

    policy_set
}

/// Walks every statement in `policy_set`, returning the union of condition keys referenced by
/// statements whose Principal/Action/Resource clauses match `request`'s context but whose
/// Condition clause cannot be conclusively decided from the context's
/// [RequestContext::available_condition_keys] (§4.H.3).
fn collect_inconclusive_keys(
    policy_set: &PolicySet,
    context: &crate::Context,
    available_keys: &HashSet<String>,
) -> Result<BTreeSet<String>, AspenError> {
    let mut inconclusive = BTreeSet::new();
    for (_, policy) in policy_set.policies() {
        for statement in policy.statement().to_vec() {
            if statement.matches_ignoring_condition(context, policy.version())? {
                inconclusive.extend(statement.inconclusive_condition_keys(available_keys));
            }
        }
    }
    Ok(inconclusive)
}

/// Projects the allowed SSM document ARN patterns for `request`'s action out of every Allow
/// statement in `policy_set` that matches the context, when the action is one of
/// [SSM_SHELL_SENSITIVE_ACTIONS].
fn ssm_document_restrictions(
    policy_set: &PolicySet,
    context: &crate::Context,
) -> Result<Option<SsmDocumentRestrictions>, AspenError> {
    let action_id = format!("{}:{}", context.service(), context.action());
    if !SSM_SHELL_SENSITIVE_ACTIONS.iter().any(|a| a.eq_ignore_ascii_case(&action_id)) {
        return Ok(None);
    }

    let mut document_patterns = Vec::new();
    for (_, policy) in policy_set.policies() {
        for statement in policy.statement().to_vec() {
            if *statement.effect() != Effect::Allow {
                continue;
            }
            if !statement.matches_ignoring_condition(context, policy.version())? {
                continue;
            }
            match statement_document_patterns(&statement) {
                Some(patterns) => document_patterns.extend(patterns),
                None => document_patterns.push("*".to_string()),
            }
        }
    }

    let shell_execution_reachable = document_patterns
        .iter()
        .any(|p| p == "*" || SHELL_DOCUMENT_MARKERS.iter().any(|marker| p.contains(marker)));

    Ok(Some(SsmDocumentRestrictions { document_patterns, shell_execution_reachable }))
}

/// The `ssm:documentARN` patterns a statement's Condition clause restricts this action to, or
/// `None` if the statement has no such restriction (i.e. it permits any document).
fn statement_document_patterns(statement: &Statement) -> Option<Vec<String>> {
    use crate::condop;

    let condition = statement.condition()?;
    let mut patterns = Vec::new();
    for op in [condop::StringEquals, condop::StringLike, condop::StringEqualsIfExists, condop::StringLikeIfExists] {
        if let Some(map) = condition.get(&op) {
            if let Some(values) = map.get(SSM_DOCUMENT_CONDITION_KEY) {
                patterns.extend(values.to_vec().into_iter().map(ToString::to_string));
            }
        }
    }

    if patterns.is_empty() {
        None
    } else {
        Some(patterns)
    }
}

fn describe(decision: &Decision, sources: &[&PolicySource]) -> String {
    match decision {
        Decision::Allow => format!("allowed by {} matching statement(s)", sources.len().max(1)),
        Decision::Deny => "explicitly denied".to_string(),
        Decision::DefaultDeny => "denied by default (no matching Allow statement)".to_string(),
    }
}

/// Evaluates `request` against `policy_data`, combining its identity policies with the resource
/// policy and organization policy layer, per the decision order in §4.H.2.
pub fn evaluate(policy_data: &PolicyData, request: &EvaluationRequest) -> Result<EvaluationResult, EvaluatorError> {
    let policy_set = assemble_policy_set(policy_data, request);
    let context = request.context.to_context()?;

    let (decision, sources) = policy_set.evaluate_all(&context)?;
    let allowed = matches!(decision, Decision::Allow);
    let evaluation_details = describe(&decision, &sources);

    let available_keys = request.context.available_condition_keys();
    let inconclusive = collect_inconclusive_keys(&policy_set, &context, &available_keys)?;
    let has_inconclusive_condition = !inconclusive.is_empty();

    let ssm_document_restrictions = ssm_document_restrictions(&policy_set, &context)?;

    Ok(EvaluationResult { allowed, evaluation_details, has_inconclusive_condition, ssm_document_restrictions })
}

/// The literal actions one statement contributes to the action universe (§4.H.1): the
/// `service:action` pattern of every `Action` entry, or the wildcard `*` when the statement is an
/// `Effect=Allow` `NotAction` broad grant. Wildcards inside an action name (e.g. `s3:Get*`) are
/// carried through verbatim rather than expanded against a service-action catalog, since no such
/// catalog is in scope here. Shared between [actions_referenced] and the summarizer, which also
/// needs to pull actions out of resource policies naming a specific principal.
pub fn statement_actions(statement: &Statement) -> Vec<String> {
    let mut actions = Vec::new();
    match (statement.action(), statement.not_action()) {
        (Some(action_list), None) => {
            for action in action_list.to_vec() {
                if action.is_any() {
                    actions.push("*".to_string());
                } else {
                    actions.push(format!("{}:{}", action.service(), action.action()));
                }
            }
        }
        (None, Some(_)) => {
            if *statement.effect() == Effect::Allow {
                actions.push("*".to_string());
            }
        }
        _ => {}
    }
    actions
}

/// Enumerates every action referenced by `policy_set`'s statements (§4.H.1).
pub fn actions_referenced(policy_set: &PolicySet) -> BTreeSet<String> {
    let mut actions = BTreeSet::new();
    for (_, policy) in policy_set.policies() {
        for statement in policy.statement().to_vec() {
            actions.extend(statement_actions(&statement));
        }
    }
    actions
}

/// Builds the resource-policy source/document pair for `arn`, if `policy_data` has one on file.
/// Exposed so callers (e.g. the summarizer) can probe "does this resource have a policy at all"
/// without duplicating the lookup logic in [assemble_policy_set].
pub fn resource_policy_for<'a>(policy_data: &'a PolicyData, arn: &str) -> Option<&'a Policy> {
    policy_data.resource_policies.get(arn)
}
