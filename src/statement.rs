use {
    crate::{
        display_json, from_str_json, serutil::ElementList, ActionList, AspenError, Condition, Context, Decision,
        Effect, PolicyVersion, Principal, ResourceList,
    },
    derive_builder::Builder,
    serde::{
        de::{Deserializer, MapAccess, Visitor},
        Deserialize, Serialize,
    },
    std::fmt::{Formatter, Result as FmtResult},
};

#[derive(Builder, Clone, Debug, Eq, PartialEq, Serialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Statement {
    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Sid", skip_serializing_if = "Option::is_none")]
    sid: Option<String>,

    #[serde(rename = "Effect")]
    effect: Effect,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Action", skip_serializing_if = "Option::is_none")]
    action: Option<ActionList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "NotAction", skip_serializing_if = "Option::is_none")]
    not_action: Option<ActionList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Resource", skip_serializing_if = "Option::is_none")]
    resource: Option<ResourceList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "NotResource", skip_serializing_if = "Option::is_none")]
    not_resource: Option<ResourceList>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Principal", skip_serializing_if = "Option::is_none")]
    principal: Option<Principal>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "NotPrincipal", skip_serializing_if = "Option::is_none")]
    not_principal: Option<Principal>,

    #[builder(setter(into, strip_option), default)]
    #[serde(rename = "Condition", skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
}

impl Statement {
    pub fn builder() -> StatementBuilder {
        StatementBuilder::default()
    }

    #[inline]
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    #[inline]
    pub fn effect(&self) -> &Effect {
        &self.effect
    }

    #[inline]
    pub fn action(&self) -> Option<&ActionList> {
        self.action.as_ref()
    }

    #[inline]
    pub fn not_action(&self) -> Option<&ActionList> {
        self.not_action.as_ref()
    }

    #[inline]
    pub fn resource(&self) -> Option<&ResourceList> {
        self.resource.as_ref()
    }

    #[inline]
    pub fn not_resource(&self) -> Option<&ResourceList> {
        self.not_resource.as_ref()
    }

    #[inline]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    #[inline]
    pub fn not_principal(&self) -> Option<&Principal> {
        self.not_principal.as_ref()
    }

    #[inline]
    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Evaluates this statement against the given [Context], returning the [Decision] it contributes.
    ///
    /// A statement that does not match the context's principal, action, resource, or condition clause contributes
    /// [Decision::DefaultDeny]; otherwise it contributes its own [Effect] ([Decision::Allow] or [Decision::Deny]).
    pub fn evaluate(&self, context: &Context, pv: PolicyVersion) -> Result<Decision, AspenError> {
        if !self.matches_ignoring_condition(context, pv)? {
            return Ok(Decision::DefaultDeny);
        }

        if let Some(condition) = &self.condition {
            if !condition.matches(context, pv)? {
                return Ok(Decision::DefaultDeny);
            }
        }

        Ok(match self.effect {
            Effect::Allow => Decision::Allow,
            Effect::Deny => Decision::Deny,
        })
    }

    /// Indicates whether this statement's Principal, Action, and Resource clauses match `context`, without
    /// consulting its Condition clause. Used by the account-wide evaluator (`evaluator` module) to find statements
    /// that are "in play" for a request so it can separately ask whether their Condition clause is decidable under
    /// the context given, rather than only learning the final yes/no.
    pub fn matches_ignoring_condition(&self, context: &Context, pv: PolicyVersion) -> Result<bool, AspenError> {
        if !principal_matches(self.principal.as_ref(), self.not_principal.as_ref(), context) {
            return Ok(false);
        }

        let action_matches = match (&self.action, &self.not_action) {
            (Some(action), None) => action.to_vec().iter().any(|a| a.matches(context.service(), context.action())),
            (None, Some(not_action)) => {
                !not_action.to_vec().iter().any(|a| a.matches(context.service(), context.action()))
            }
            _ => unreachable!("Action and NotAction are mutually exclusive and exactly one must be set"),
        };

        if !action_matches {
            return Ok(false);
        }

        let resource_matches = match (&self.resource, &self.not_resource) {
            (Some(resource), None) => resource_list_matches(resource, false, context, pv)?,
            (None, Some(not_resource)) => resource_list_matches(not_resource, true, context, pv)?,
            _ => unreachable!("Resource and NotResource are mutually exclusive and exactly one must be set"),
        };

        Ok(resource_matches)
    }

    /// The condition keys referenced by this statement's Condition clause that cannot be decided from
    /// `available_keys` (see [Condition::inconclusive_keys]). Empty if the statement has no Condition clause.
    pub fn inconclusive_condition_keys<S: std::hash::BuildHasher>(
        &self,
        available_keys: &std::collections::HashSet<String, S>,
    ) -> Vec<String> {
        match &self.condition {
            Some(condition) => condition.inconclusive_keys(available_keys),
            None => Vec::new(),
        }
    }
}

/// Indicates whether the context's actor matches the statement's principal clause.
fn principal_matches(principal: Option<&Principal>, not_principal: Option<&Principal>, context: &Context) -> bool {
    match (principal, not_principal) {
        (Some(principal), None) => principal.matches(context.actor()),
        (None, Some(not_principal)) => !not_principal.matches(context.actor()),
        // Resource-based policies require a Principal or NotPrincipal; identity-based policies omit both, in which
        // case the statement applies to whatever principal is making the request.
        (None, None) => true,
        (Some(_), Some(_)) => unreachable!("Principal and NotPrincipal cannot both be set"),
    }
}

/// Indicates whether the context's resources satisfy a statement's `Resource` (or, if `negated`, `NotResource`)
/// clause.
///
/// `NotResource: "*"` can never be satisfied: every candidate resource is excluded, since everything matches `*`.
fn resource_list_matches(
    list: &ResourceList,
    negated: bool,
    context: &Context,
    pv: PolicyVersion,
) -> Result<bool, AspenError> {
    if negated && list.to_vec().iter().any(|r| r.is_any()) {
        return Ok(false);
    }

    let resources = context.resources();
    if resources.is_empty() {
        return Ok(true);
    }

    for candidate in resources {
        let mut any_match = false;
        for pattern in list.to_vec() {
            if pattern.matches(context, pv, candidate)? {
                any_match = true;
                break;
            }
        }

        if any_match == negated {
            return Ok(false);
        }
    }

    Ok(true)
}

display_json!(Statement);
from_str_json!(Statement);

impl<'de> Deserialize<'de> for Statement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(StatementVisitor {})
    }
}

struct StatementVisitor;
impl<'de> Visitor<'de> for StatementVisitor {
    type Value = Statement;

    fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
        formatter.write_str("a map of statement properties")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Statement, A::Error> {
        let mut builder = Statement::builder();
        let mut sid_seen = false;
        let mut effect_seen = false;
        let mut action_seen = false;
        let mut not_action_seen = false;
        let mut resource_seen = false;
        let mut not_resource_seen = false;
        let mut principal_seen = false;
        let mut not_principal_seen = false;
        let mut condition_seen = false;

        while let Some(key) = access.next_key::<&str>()? {
            match key {
                "Sid" => {
                    if sid_seen {
                        return Err(serde::de::Error::duplicate_field("Sid"));
                    }

                    sid_seen = true;
                    builder.sid(access.next_value::<&str>()?);
                }
                "Effect" => {
                    if effect_seen {
                        return Err(serde::de::Error::duplicate_field("Effect"));
                    }

                    effect_seen = true;
                    builder.effect(access.next_value::<Effect>()?);
                }
                "Action" => {
                    if action_seen {
                        return Err(serde::de::Error::duplicate_field("Action"));
                    }

                    action_seen = true;
                    builder.action(access.next_value::<ActionList>()?);
                }
                "NotAction" => {
                    if not_action_seen {
                        return Err(serde::de::Error::duplicate_field("NotAction"));
                    }

                    not_action_seen = true;
                    builder.not_action(access.next_value::<ActionList>()?);
                }
                "Resource" => {
                    if resource_seen {
                        return Err(serde::de::Error::duplicate_field("Resource"));
                    }

                    resource_seen = true;
                    builder.resource(access.next_value::<ResourceList>()?);
                }
                "NotResource" => {
                    if not_resource_seen {
                        return Err(serde::de::Error::duplicate_field("NotResource"));
                    }

                    not_resource_seen = true;
                    builder.not_resource(access.next_value::<ResourceList>()?);
                }
                "Principal" => {
                    if principal_seen {
                        return Err(serde::de::Error::duplicate_field("Principal"));
                    }

                    principal_seen = true;
                    builder.principal(access.next_value::<Principal>()?);
                }
                "NotPrincipal" => {
                    if not_principal_seen {
                        return Err(serde::de::Error::duplicate_field("NotPrincipal"));
                    }

                    not_principal_seen = true;
                    builder.not_principal(access.next_value::<Principal>()?);
                }
                "Condition" => {
                    if condition_seen {
                        return Err(serde::de::Error::duplicate_field("Condition"));
                    }

                    condition_seen = true;
                    builder.condition(access.next_value::<Condition>()?);
                }
                _ => {
                    return Err(serde::de::Error::unknown_field(
                        key,
                        &[
                            "Sid",
                            "Effect",
                            "Action",
                            "NotAction",
                            "Resource",
                            "NotResource",
                            "Principal",
                            "NotPrincipal",
                            "Condition",
                        ],
                    ));
                }
            }
        }

        builder.build().map_err(|e| match e {
            StatementBuilderError::ValidationError(s) => {
                let msg2 = s.replace('.', ";").trim_end_matches(|c| c == ';').to_string();
                serde::de::Error::custom(StatementBuilderError::ValidationError(msg2))
            }
            _ => serde::de::Error::custom(e),
        })
    }
}

impl StatementBuilder {
    fn validate(&self) -> Result<(), StatementBuilderError> {
        let mut errors = Vec::with_capacity(5);
        if self.effect.is_none() {
            errors.push("Effect must be set.");
        }

        match (&self.action, &self.not_action) {
            (Some(_), Some(_)) => errors.push("Action and NotAction cannot both be set."),
            (None, None) => errors.push("Either Action or NotAction must be set."),
            _ => (),
        }

        match (&self.resource, &self.not_resource) {
            (Some(_), Some(_)) => errors.push("Resource and NotResource cannot both be set."),
            (None, None) => errors.push("Either Resource or NotResource must be set."),
            _ => (),
        }

        if let (Some(_), Some(_)) = (&self.principal, &self.not_principal) {
            errors.push("Principal and NotPrincipal cannot both be set.");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StatementBuilderError::ValidationError(errors.join(" ")))
        }
    }
}

pub type StatementList = ElementList<Statement>;
