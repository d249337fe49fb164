//! Service Credential Provider
//!
//! Declarative lifecycle management for service credentials on a governed
//! data platform: named, access-controlled wrappers around cloud identities
//! (AWS IAM roles, Azure service principals and managed identities, GCP
//! service accounts, Cloudflare API tokens) that serverless and service
//! workloads authenticate through.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - **[`ServiceCredentialResource`]**: Create/Read/Update/Delete handlers
//!   reconciling declarative state against the remote management API
//! - **[`ApiClient`]**: dispatch between account-scoped and workspace-scoped
//!   administration, behind the [`client`] traits
//! - **Schema types**: the resource's declarative surface, with
//!   required/computed/sensitive/force-new markers
//! - **Validation**: config checks including the exactly-one cloud binding
//!   rule, run before any remote call
//! - **State handling**: [`ResourceData`] with change detection and
//!   merge-back of fetched objects
//! - **Error types**: including the composite owner-rollback failure
//! - **Logging**: integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use service_credential_provider::{
//!     init_logging, ApiClient, ResourceData, ServiceCredentialResource,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let client = ApiClient::Workspace(Arc::new(my_workspace_client()));
//!     let mut data = ResourceData::for_create(serde_json::json!({
//!         "name": "ml-pipeline",
//!         "aws_iam_role": {"role_arn": "arn:aws:iam::123456789012:role/pipeline"}
//!     }))?;
//!
//!     let resource = ServiceCredentialResource;
//!     resource.create(&client, &mut data).await?;
//!     println!("created credential {}", data.id());
//!     Ok(())
//! }
//! ```
//!
//! # Lifecycle semantics
//!
//! - **Create** always requests `SERVICE` purpose, records the
//!   remote-assigned name as the identifier, and applies `owner` and
//!   `isolation_mode` in a follow-up update when configured. Isolated
//!   credentials get the current workspace bound so the next Read can see
//!   them.
//! - **Read** merges the fetched object into state, preserving the
//!   write-only Azure client secret the remote API never returns.
//! - **Update** separates owner changes from all other changes, restores
//!   the previous owner when the second call fails, and force-sends
//!   `read_only: false` transitions the omit-default serialization would
//!   drop.
//! - **Delete** honors the client-side `force_destroy` toggle.
//!
//! Under workspace scope, every mutating operation first checks that a
//! configured `metastore_id` matches the metastore assigned to the
//! workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod logging;
pub mod model;
pub mod request;
pub mod resource;
pub mod schema;
pub mod state;
pub mod testing;
pub mod validation;

// Re-export main types at crate root
pub use client::{
    add_current_workspace_binding, validate_metastore_id, AccountCredentialsApi, ApiClient,
    WorkspaceCredentialsApi,
};
pub use error::ProviderError;
pub use logging::{init_logging, try_init_logging};
pub use model::{CredentialInfo, CredentialPurpose, IsolationMode};
pub use resource::ServiceCredentialResource;
pub use schema::{Diagnostic, Schema};
pub use state::ResourceData;

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
