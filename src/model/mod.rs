//! The data model shared across the recon pipeline: resource descriptions, the authorization
//! snapshot, organization policies, request contexts, and the graph shapes the projector emits.

pub mod erd;
pub mod gaad;
pub mod graph;
pub mod orgpolicies;
pub mod request_context;
pub mod transform;

pub use {
    erd::{EnrichedResourceDescription, Properties},
    gaad::{Gaad, GroupDetail, LoaderError, ManagedPolicyDetail, PolicyData, RoleDetail, UserDetail},
    graph::{BatchSummary, GraphEdge, GraphNode},
    orgpolicies::{AccountMeta, OrgPolicies, PolicyTree},
    request_context::{RequestContext, RequestContextBuilder, SecureTransport},
};
