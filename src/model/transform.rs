//! Node transformers (§4.E): turn GAAD entities, enriched resource descriptions, and the
//! `Principal`/`AWS` strings found in trust and resource policies into [GraphNode]s the projector
//! can emit. Replaces the reflection-driven node-typing the original recon tooling used with a
//! small closed `NormalizedPrincipal` tag, per the redesign note in §9.

use {
    crate::model::{
        erd::EnrichedResourceDescription,
        gaad::{GroupDetail, RoleDetail, UserDetail},
        graph::GraphNode,
    },
    serde_json::json,
};

/// A principal string (from a trust policy, a resource policy, or a federation claim) normalized
/// into one of a small closed set of shapes, rather than typed via ad hoc string inspection at
/// every call site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NormalizedPrincipal {
    ServicePrincipal { service: String },
    RolePrincipal { arn: String },
    UserPrincipal { arn: String },
    WildcardPrincipal,
    GenericPrincipal { value: String },
}

impl NormalizedPrincipal {
    /// Classifies a raw `Principal.AWS`/`Principal.Service` value.
    pub fn classify(raw: &str) -> Self {
        if raw == "*" {
            return Self::WildcardPrincipal;
        }
        if raw.ends_with(".amazonaws.com") {
            return Self::ServicePrincipal { service: raw.to_string() };
        }
        if raw.contains(":role/") {
            return Self::RolePrincipal { arn: raw.to_string() };
        }
        if raw.contains(":user/") {
            return Self::UserPrincipal { arn: raw.to_string() };
        }
        Self::GenericPrincipal { value: raw.to_string() }
    }

    /// The graph node this principal shape projects to.
    pub fn to_node(&self) -> GraphNode {
        match self {
            Self::ServicePrincipal { service } => GraphNode::new(vec!["ServicePrincipal".to_string()], vec!["name".to_string()])
                .with_property("name", json!(service)),
            Self::RolePrincipal { arn } => GraphNode::new(vec!["Principal".to_string(), "Role".to_string()], vec!["arn".to_string()])
                .with_property("arn", json!(arn)),
            Self::UserPrincipal { arn } => GraphNode::new(vec!["Principal".to_string(), "User".to_string()], vec!["arn".to_string()])
                .with_property("arn", json!(arn)),
            Self::WildcardPrincipal => GraphNode::new(vec!["Wildcard".to_string()], vec!["name".to_string()])
                .with_property("name", json!("*")),
            Self::GenericPrincipal { value } => GraphNode::new(vec!["Principal".to_string()], vec!["arn".to_string()])
                .with_property("arn", json!(value)),
        }
    }
}

/// Projects an IAM user into a `Principal:User` node.
pub fn user_node(user: &UserDetail) -> GraphNode {
    GraphNode::new(vec!["Principal".to_string(), "User".to_string()], vec!["arn".to_string()])
        .with_property("arn", json!(user.arn))
        .with_property("name", json!(user.user_name))
        .with_property("id", json!(user.user_id))
}

/// Projects an IAM role into a `Principal:Role` node.
pub fn role_node(role: &RoleDetail) -> GraphNode {
    GraphNode::new(vec!["Principal".to_string(), "Role".to_string()], vec!["arn".to_string()])
        .with_property("arn", json!(role.arn))
        .with_property("name", json!(role.role_name))
        .with_property("id", json!(role.role_id))
}

/// Projects an IAM group into a `Group` node (groups are never themselves authorization
/// principals; they only contribute policies to their member users).
pub fn group_node(group: &GroupDetail) -> GraphNode {
    GraphNode::new(vec!["Group".to_string()], vec!["arn".to_string()])
        .with_property("arn", json!(group.arn))
        .with_property("name", json!(group.group_name))
        .with_property("id", json!(group.group_id))
}

/// Projects an enriched resource description into a `Resource` node, tagged with its CloudFormation
/// type name as a secondary label for filtering in graph queries.
pub fn resource_node(erd: &EnrichedResourceDescription) -> GraphNode {
    GraphNode::new(vec!["Resource".to_string(), erd.type_name().to_string()], vec!["arn".to_string()])
        .with_property("arn", json!(erd.arn().to_string()))
        .with_property("type", json!(erd.type_name()))
        .with_property("region", json!(erd.region()))
        .with_property("accountId", json!(erd.account_id()))
}

#[cfg(test)]
mod tests {
    use super::{resource_node, role_node, user_node, NormalizedPrincipal};
    use crate::model::{
        erd::EnrichedResourceDescription,
        gaad::{RoleDetail, UserDetail},
    };
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_classify_service_principal() {
        assert_eq!(
            NormalizedPrincipal::classify("lambda.amazonaws.com"),
            NormalizedPrincipal::ServicePrincipal { service: "lambda.amazonaws.com".to_string() }
        );
    }

    #[test]
    fn test_classify_role_vs_user() {
        assert!(matches!(
            NormalizedPrincipal::classify("arn:aws:iam::123456789012:role/Deploy"),
            NormalizedPrincipal::RolePrincipal { .. }
        ));
        assert!(matches!(
            NormalizedPrincipal::classify("arn:aws:iam::123456789012:user/alice"),
            NormalizedPrincipal::UserPrincipal { .. }
        ));
    }

    #[test]
    fn test_classify_wildcard() {
        assert_eq!(NormalizedPrincipal::classify("*"), NormalizedPrincipal::WildcardPrincipal);
    }

    #[test]
    fn test_user_node_projection() {
        let user = UserDetail {
            user_name: "alice".to_string(),
            user_id: "AIDALICE".to_string(),
            arn: "arn:aws:iam::123456789012:user/alice".to_string(),
            path: "/".to_string(),
            user_policy_list: vec![],
            attached_managed_policies: vec![],
            group_list: vec![],
            tags: vec![],
            permissions_boundary: None,
        };
        let node = user_node(&user);
        assert_eq!(node.labels(), &["Principal".to_string(), "User".to_string()]);
        assert_eq!(node.properties().get("arn"), Some(&json!("arn:aws:iam::123456789012:user/alice")));
    }

    #[test]
    fn test_role_node_projection() {
        let role = RoleDetail {
            role_name: "deploy".to_string(),
            role_id: "AROLEDEPLOY".to_string(),
            arn: "arn:aws:iam::123456789012:role/deploy".to_string(),
            path: "/".to_string(),
            assume_role_policy_document: crate::Policy::from_str(
                r#"{"Version":"2012-10-17","Statement":{"Effect":"Allow","Action":"sts:AssumeRole","Principal":{"Service":"ec2.amazonaws.com"}}}"#,
            )
            .unwrap(),
            role_policy_list: vec![],
            attached_managed_policies: vec![],
            instance_profile_list: vec![],
            tags: vec![],
            permissions_boundary: None,
        };
        let node = role_node(&role);
        assert_eq!(node.properties().get("name"), Some(&json!("deploy")));
    }

    #[test]
    fn test_resource_node_projection() {
        let erd =
            EnrichedResourceDescription::new("aws", "AWS::S3::Bucket", "us-east-1", "123456789012", "mybucket").unwrap();
        let node = resource_node(&erd);
        assert_eq!(node.labels(), &["Resource".to_string(), "AWS::S3::Bucket".to_string()]);
        assert_eq!(node.properties().get("arn"), Some(&json!("arn:aws:s3:::mybucket")));
    }
}
