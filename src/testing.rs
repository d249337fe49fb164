//! Test doubles for the credential APIs.
//!
//! The recording fakes log every remote call and can be scripted to fail,
//! so lifecycle behavior (call counts, rollback, error composition) can be
//! exercised without any transport.
//!
//! # Example
//!
//! ```
//! use service_credential_provider::testing::RecordingWorkspaceApi;
//!
//! let workspace = RecordingWorkspaceApi::new("metastore-1", 42);
//! workspace.queue_update_results(vec![None, Some("update rejected".into())]);
//! // first update succeeds, second fails with "update rejected"
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{AccountCredentialsApi, WorkspaceCredentialsApi};
use crate::error::ProviderError;
use crate::model::CredentialInfo;
use crate::request::{
    AccountsCreateCredentialRequest, AccountsUpdateCredentialRequest, CreateCredentialRequest,
    DeleteAccountCredentialRequest, DeleteCredentialRequest, UpdateCredentialRequest,
    UpdateWorkspaceBindingsRequest,
};

/// One recorded remote call, with the full request as issued.
#[derive(Debug, Clone)]
pub enum ApiCall {
    /// Account-scope create.
    AccountCreate(AccountsCreateCredentialRequest),
    /// Account-scope update.
    AccountUpdate(AccountsUpdateCredentialRequest),
    /// Account-scope get by name.
    AccountGet {
        /// The addressed metastore.
        metastore_id: String,
        /// The credential name.
        name: String,
    },
    /// Account-scope delete.
    AccountDelete(DeleteAccountCredentialRequest),
    /// Workspace-scope create.
    Create(CreateCredentialRequest),
    /// Workspace-scope update.
    Update(UpdateCredentialRequest),
    /// Workspace-scope get by name.
    Get {
        /// The credential name.
        name: String,
    },
    /// Workspace-scope delete.
    Delete(DeleteCredentialRequest),
    /// Workspace binding update.
    UpdateBindings(UpdateWorkspaceBindingsRequest),
}

#[derive(Default)]
struct Script {
    update_results: VecDeque<Option<String>>,
    binding_error: Option<String>,
    create_error: Option<String>,
}

impl Script {
    fn next_update(&mut self) -> Result<(), ProviderError> {
        match self.update_results.pop_front().flatten() {
            Some(msg) => Err(ProviderError::Api(msg)),
            None => Ok(()),
        }
    }
}

fn echo_create(request: &CreateCredentialRequest, metastore_id: &str) -> CredentialInfo {
    CredentialInfo {
        name: request.name.clone(),
        id: Some(format!("{}-id", request.name)),
        comment: request.comment.clone(),
        purpose: request.purpose,
        read_only: request.read_only,
        metastore_id: metastore_id.to_string(),
        aws_iam_role: request.aws_iam_role.clone(),
        azure_service_principal: request.azure_service_principal.clone(),
        azure_managed_identity: request.azure_managed_identity.clone(),
        gcp_service_account_key: request.gcp_service_account_key.clone(),
        cloudflare_api_token: request.cloudflare_api_token.clone(),
        ..Default::default()
    }
}

/// Recording fake for the account-scoped API.
#[derive(Default)]
pub struct RecordingAccountApi {
    calls: Mutex<Vec<ApiCall>>,
    script: Mutex<Script>,
    credential: Mutex<Option<CredentialInfo>>,
}

impl RecordingAccountApi {
    /// Create a fake with no scripted failures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The recorded update calls, in order.
    pub fn update_calls(&self) -> Vec<AccountsUpdateCredentialRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::AccountUpdate(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    /// Script the outcome of the next update calls: `None` succeeds,
    /// `Some(message)` fails with that message. Calls beyond the queue
    /// succeed.
    pub fn queue_update_results(&self, results: Vec<Option<String>>) {
        self.script.lock().unwrap().update_results = results.into();
    }

    /// Make the next create call fail.
    pub fn fail_create(&self, message: impl Into<String>) {
        self.script.lock().unwrap().create_error = Some(message.into());
    }

    /// Set the credential returned by get calls.
    pub fn set_credential(&self, credential: CredentialInfo) {
        *self.credential.lock().unwrap() = Some(credential);
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AccountCredentialsApi for RecordingAccountApi {
    async fn create_credential(
        &self,
        request: AccountsCreateCredentialRequest,
    ) -> Result<CredentialInfo, ProviderError> {
        self.record(ApiCall::AccountCreate(request.clone()));
        if let Some(msg) = self.script.lock().unwrap().create_error.take() {
            return Err(ProviderError::Api(msg));
        }
        let created = echo_create(&request.credential_info, &request.metastore_id);
        *self.credential.lock().unwrap() = Some(created.clone());
        Ok(created)
    }

    async fn update_credential(
        &self,
        request: AccountsUpdateCredentialRequest,
    ) -> Result<CredentialInfo, ProviderError> {
        self.record(ApiCall::AccountUpdate(request.clone()));
        self.script.lock().unwrap().next_update()?;
        let mut cred = self.credential.lock().unwrap().clone().unwrap_or_default();
        if !request.credential_info.owner.is_empty() {
            cred.owner = request.credential_info.owner.clone();
        }
        Ok(cred)
    }

    async fn get_credential(
        &self,
        metastore_id: &str,
        name: &str,
    ) -> Result<CredentialInfo, ProviderError> {
        self.record(ApiCall::AccountGet {
            metastore_id: metastore_id.to_string(),
            name: name.to_string(),
        });
        self.credential
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))
    }

    async fn delete_credential(
        &self,
        request: DeleteAccountCredentialRequest,
    ) -> Result<(), ProviderError> {
        self.record(ApiCall::AccountDelete(request));
        Ok(())
    }
}

/// Recording fake for the workspace-scoped API.
pub struct RecordingWorkspaceApi {
    metastore_id: String,
    workspace_id: i64,
    calls: Mutex<Vec<ApiCall>>,
    script: Mutex<Script>,
    credential: Mutex<Option<CredentialInfo>>,
}

impl RecordingWorkspaceApi {
    /// Create a fake whose workspace is assigned the given metastore.
    pub fn new(metastore_id: impl Into<String>, workspace_id: i64) -> Self {
        Self {
            metastore_id: metastore_id.into(),
            workspace_id,
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(Script::default()),
            credential: Mutex::new(None),
        }
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The recorded update calls, in order.
    pub fn update_calls(&self) -> Vec<UpdateCredentialRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::Update(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    /// Script the outcome of the next update calls: `None` succeeds,
    /// `Some(message)` fails with that message. Calls beyond the queue
    /// succeed.
    pub fn queue_update_results(&self, results: Vec<Option<String>>) {
        self.script.lock().unwrap().update_results = results.into();
    }

    /// Make the next create call fail.
    pub fn fail_create(&self, message: impl Into<String>) {
        self.script.lock().unwrap().create_error = Some(message.into());
    }

    /// Make the next binding update fail.
    pub fn fail_bindings(&self, message: impl Into<String>) {
        self.script.lock().unwrap().binding_error = Some(message.into());
    }

    /// Set the credential returned by get calls.
    pub fn set_credential(&self, credential: CredentialInfo) {
        *self.credential.lock().unwrap() = Some(credential);
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl WorkspaceCredentialsApi for RecordingWorkspaceApi {
    async fn create_credential(
        &self,
        request: CreateCredentialRequest,
    ) -> Result<CredentialInfo, ProviderError> {
        self.record(ApiCall::Create(request.clone()));
        if let Some(msg) = self.script.lock().unwrap().create_error.take() {
            return Err(ProviderError::Api(msg));
        }
        let created = echo_create(&request, &self.metastore_id);
        *self.credential.lock().unwrap() = Some(created.clone());
        Ok(created)
    }

    async fn update_credential(
        &self,
        request: UpdateCredentialRequest,
    ) -> Result<CredentialInfo, ProviderError> {
        self.record(ApiCall::Update(request.clone()));
        self.script.lock().unwrap().next_update()?;
        let mut cred = self.credential.lock().unwrap().clone().unwrap_or_default();
        if !request.owner.is_empty() {
            cred.owner = request.owner.clone();
        }
        Ok(cred)
    }

    async fn get_credential(&self, name: &str) -> Result<CredentialInfo, ProviderError> {
        self.record(ApiCall::Get {
            name: name.to_string(),
        });
        self.credential
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))
    }

    async fn delete_credential(
        &self,
        request: DeleteCredentialRequest,
    ) -> Result<(), ProviderError> {
        self.record(ApiCall::Delete(request));
        Ok(())
    }

    async fn current_metastore_id(&self) -> Result<String, ProviderError> {
        Ok(self.metastore_id.clone())
    }

    async fn current_workspace_id(&self) -> Result<i64, ProviderError> {
        Ok(self.workspace_id)
    }

    async fn update_workspace_bindings(
        &self,
        request: UpdateWorkspaceBindingsRequest,
    ) -> Result<(), ProviderError> {
        self.record(ApiCall::UpdateBindings(request));
        if let Some(msg) = self.script.lock().unwrap().binding_error.take() {
            return Err(ProviderError::Api(msg));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_workspace_fake_echoes_create() {
        let workspace = RecordingWorkspaceApi::new("m-1", 7);
        let created = workspace
            .create_credential(CreateCredentialRequest {
                name: "svc-1".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.name, "svc-1");
        assert_eq!(created.metastore_id, "m-1");
        assert_eq!(workspace.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_update_failures_apply_in_order() {
        let workspace = RecordingWorkspaceApi::new("m-1", 7);
        workspace.queue_update_results(vec![None, Some("boom".to_string())]);

        let ok = workspace
            .update_credential(UpdateCredentialRequest::owner_only("svc-1", "bob"))
            .await;
        assert!(ok.is_ok());

        let err = workspace
            .update_credential(UpdateCredentialRequest::owner_only("svc-1", "bob"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");

        // Exhausted queue falls back to success.
        assert!(workspace
            .update_credential(UpdateCredentialRequest::owner_only("svc-1", "bob"))
            .await
            .is_ok());
    }
}
