//! An AWS authorization reconnaissance toolkit built around two layers.
//!
//! The policy-language core (`action`, `condition`, `effect`, `eval`, `policy`, `policyset`,
//! `principal`, `resource`, `statement`) owns the canonical `Policy`/`Statement` data model, the
//! condition operators IAM defines, and the decision logic that turns a policy set plus a request
//! [`Context`] into an [`eval::Decision`]. Above it, the link/chain runtime (`link`) and the recon
//! pipeline it hosts (`config`, `aws_client`, `model`, `policyfetch`, `evaluator`, `summarize`,
//! `graphstore`) enumerate an account's resources, gather every policy that could bear on access to
//! them, evaluate each candidate request through the policy core, and project the results into a
//! permissions graph.

pub mod action;
pub mod aws_client;
pub mod condition;
pub mod config;
pub mod effect;
pub mod error;
pub mod eval;
pub mod evaluator;
pub mod graphstore;
pub mod link;
pub mod model;
pub mod policy;
pub mod policyfetch;
pub mod policyset;
pub mod principal;
pub mod resource;
pub mod serutil;
pub mod summarize;
mod statement;

pub use {
    action::{Action, ActionList},
    condition::{condop, Condition, ConditionMap, ConditionOp, Variant},
    effect::Effect,
    error::AspenError,
    eval::{Context, ContextBuilder, Decision},
    policy::{Policy, PolicyBuilder, PolicyBuilderError, PolicyVersion},
    policyset::{PolicySet, PolicySource},
    principal::{AwsPrincipal, Principal, SpecifiedPrincipal, SpecifiedPrincipalBuilder, SpecifiedPrincipalBuilderError},
    resource::{Resource, ResourceArn, ResourceList},
    serutil::{ElementList, ListKind, StringLikeList, StringList},
    statement::{Statement, StatementBuilder, StatementBuilderError, StatementList},
};
