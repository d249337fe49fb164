//! Outbound collaborator seams for the two API scopes.
//!
//! The platform exposes the same credential operations at two administrative
//! levels. Each level gets its own trait; [`ApiClient`] carries whichever one
//! a lifecycle invocation targets, and the handler branches on it the way a
//! caller would supply one of two callables.
//!
//! Transport, authentication and retries live behind these traits and are
//! owned by the concrete client implementations.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProviderError;
use crate::model::{CredentialInfo, IsolationMode, SecurableType, WorkspaceBinding};
use crate::request::{
    AccountsCreateCredentialRequest, AccountsUpdateCredentialRequest, CreateCredentialRequest,
    DeleteAccountCredentialRequest, DeleteCredentialRequest, UpdateCredentialRequest,
    UpdateWorkspaceBindingsRequest,
};
use crate::state::ResourceData;

/// Credential operations at account scope. Every call addresses the
/// metastore explicitly.
#[async_trait]
pub trait AccountCredentialsApi: Send + Sync {
    /// Create a credential in the named metastore.
    async fn create_credential(
        &self,
        request: AccountsCreateCredentialRequest,
    ) -> Result<CredentialInfo, ProviderError>;

    /// Apply a partial update to a credential.
    async fn update_credential(
        &self,
        request: AccountsUpdateCredentialRequest,
    ) -> Result<CredentialInfo, ProviderError>;

    /// Fetch a credential by name.
    async fn get_credential(
        &self,
        metastore_id: &str,
        name: &str,
    ) -> Result<CredentialInfo, ProviderError>;

    /// Delete a credential.
    async fn delete_credential(
        &self,
        request: DeleteAccountCredentialRequest,
    ) -> Result<(), ProviderError>;
}

/// Credential operations at workspace scope, plus the workspace-level
/// helpers the lifecycle needs (current metastore, current workspace,
/// binding management).
#[async_trait]
pub trait WorkspaceCredentialsApi: Send + Sync {
    /// Create a credential in the workspace's metastore.
    async fn create_credential(
        &self,
        request: CreateCredentialRequest,
    ) -> Result<CredentialInfo, ProviderError>;

    /// Apply a partial update to a credential.
    async fn update_credential(
        &self,
        request: UpdateCredentialRequest,
    ) -> Result<CredentialInfo, ProviderError>;

    /// Fetch a credential by name.
    async fn get_credential(&self, name: &str) -> Result<CredentialInfo, ProviderError>;

    /// Delete a credential.
    async fn delete_credential(
        &self,
        request: DeleteCredentialRequest,
    ) -> Result<(), ProviderError>;

    /// The id of the metastore currently assigned to this workspace.
    async fn current_metastore_id(&self) -> Result<String, ProviderError>;

    /// The id of the workspace this client talks to.
    async fn current_workspace_id(&self) -> Result<i64, ProviderError>;

    /// Add or remove workspace bindings on a securable.
    async fn update_workspace_bindings(
        &self,
        request: UpdateWorkspaceBindingsRequest,
    ) -> Result<(), ProviderError>;
}

/// The client a lifecycle invocation dispatches to.
#[derive(Clone)]
pub enum ApiClient {
    /// Account-scoped administration.
    Account(Arc<dyn AccountCredentialsApi>),
    /// Workspace-scoped administration.
    Workspace(Arc<dyn WorkspaceCredentialsApi>),
}

/// Fail fast when a configured `metastore_id` does not match the metastore
/// assigned to the workspace. An empty configured value is accepted.
pub async fn validate_metastore_id(
    workspace: &dyn WorkspaceCredentialsApi,
    configured: &str,
) -> Result<(), ProviderError> {
    if configured.is_empty() {
        return Ok(());
    }
    let current = workspace.current_metastore_id().await?;
    if current != configured {
        return Err(ProviderError::FailedPrecondition(format!(
            "metastore_id must be empty or match the workspace's metastore {}, got {}",
            current, configured
        )));
    }
    Ok(())
}

/// Bind the current workspace to an isolated securable so that a subsequent
/// workspace-scoped read can see it. A no-op unless the declarative record
/// asks for isolation.
pub async fn add_current_workspace_binding(
    workspace: &dyn WorkspaceCredentialsApi,
    data: &ResourceData,
    securable_type: SecurableType,
    securable_name: &str,
) -> Result<(), ProviderError> {
    let isolated = data
        .get("isolation_mode")
        .cloned()
        .map(serde_json::from_value::<IsolationMode>)
        .transpose()
        .unwrap_or_default()
        == Some(IsolationMode::Isolated);
    if !isolated {
        return Ok(());
    }

    let workspace_id = workspace.current_workspace_id().await?;
    debug!(securable = securable_name, workspace_id, "binding current workspace");
    workspace
        .update_workspace_bindings(UpdateWorkspaceBindingsRequest {
            securable_type,
            securable_name: securable_name.to_string(),
            add: vec![WorkspaceBinding::read_write(workspace_id)],
            remove: vec![],
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ApiCall, RecordingWorkspaceApi};
    use serde_json::json;

    #[tokio::test]
    async fn test_validate_metastore_id_accepts_empty() {
        let workspace = RecordingWorkspaceApi::new("m-1", 42);
        assert!(validate_metastore_id(&workspace, "").await.is_ok());
        assert!(workspace.calls().is_empty());
    }

    #[tokio::test]
    async fn test_validate_metastore_id_rejects_mismatch() {
        let workspace = RecordingWorkspaceApi::new("m-1", 42);
        assert!(validate_metastore_id(&workspace, "m-1").await.is_ok());

        let err = validate_metastore_id(&workspace, "m-2").await.unwrap_err();
        assert!(matches!(err, ProviderError::FailedPrecondition(_)));
        assert!(err.to_string().contains("m-2"));
    }

    #[tokio::test]
    async fn test_binding_skipped_when_not_isolated() {
        let workspace = RecordingWorkspaceApi::new("m-1", 42);
        let data = crate::state::ResourceData::for_create(json!({"name": "svc-1"})).unwrap();

        add_current_workspace_binding(&workspace, &data, SecurableType::Credential, "svc-1")
            .await
            .unwrap();
        assert!(workspace.calls().is_empty());
    }

    #[tokio::test]
    async fn test_binding_added_for_isolated_credential() {
        let workspace = RecordingWorkspaceApi::new("m-1", 42);
        let data = crate::state::ResourceData::for_create(json!({
            "name": "svc-1",
            "isolation_mode": "ISOLATION_MODE_ISOLATED"
        }))
        .unwrap();

        add_current_workspace_binding(&workspace, &data, SecurableType::Credential, "svc-1")
            .await
            .unwrap();

        let calls = workspace.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            ApiCall::UpdateBindings(req) => {
                assert_eq!(req.securable_name, "svc-1");
                assert_eq!(req.add, vec![WorkspaceBinding::read_write(42)]);
                assert!(req.remove.is_empty());
            }
            other => panic!("unexpected call: {:?}", other),
        }
    }
}
