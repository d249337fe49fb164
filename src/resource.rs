//! Lifecycle handler for the service credential resource.
//!
//! Each entry point takes the declarative-state handle and the scope
//! dispatcher, builds typed requests, invokes the remote API and reconciles
//! the result back into state. The only multi-step bookkeeping is Update's
//! owner handling: the API does not allow mixing an owner change with other
//! field changes, so they run as two calls with a compensating owner
//! rollback when the second one fails.

use tracing::{debug, info, instrument, warn};

use crate::client::{add_current_workspace_binding, validate_metastore_id, ApiClient};
use crate::error::ProviderError;
use crate::model::{CredentialInfo, CredentialPurpose, SecurableType};
use crate::request::{
    AccountsCreateCredentialRequest, AccountsUpdateCredentialRequest, CreateCredentialRequest,
    DeleteAccountCredentialRequest, DeleteCredentialRequest, UpdateCredentialRequest,
};
use crate::schema::{Attribute, Block, Diagnostic, Schema};
use crate::state::ResourceData;
use crate::validation;

/// Fields whose explicit configuration requires a follow-up update after
/// create, because the create call cannot set them.
const POST_CREATE_FIELDS: &[&str] = &["owner", "isolation_mode"];

/// The service credential resource.
pub struct ServiceCredentialResource;

impl ServiceCredentialResource {
    /// The resource type name registered with the host runtime.
    pub const RESOURCE_TYPE: &'static str = "service_credential";

    /// The declarative schema surface of the resource.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_attribute("name", Attribute::required_string().with_force_new())
            .with_attribute("owner", Attribute::optional_computed_string())
            .with_attribute("comment", Attribute::optional_string())
            .with_attribute("purpose", Attribute::optional_computed_string())
            .with_attribute("read_only", Attribute::optional_bool())
            .with_attribute("skip_validation", Attribute::optional_bool())
            .with_attribute("isolation_mode", Attribute::optional_computed_string())
            .with_attribute("metastore_id", Attribute::optional_computed_string())
            .with_attribute("service_credential_id", Attribute::computed_string())
            .with_attribute("force_update", Attribute::optional_bool())
            .with_attribute("force_destroy", Attribute::optional_bool())
            .with_block(
                "aws_iam_role",
                Block::new()
                    .with_attribute("role_arn", Attribute::required_string())
                    .with_attribute("external_id", Attribute::computed_string())
                    .with_attribute("unity_catalog_iam_arn", Attribute::computed_string()),
            )
            .with_block(
                "azure_service_principal",
                Block::new()
                    .with_attribute("directory_id", Attribute::required_string())
                    .with_attribute("application_id", Attribute::required_string())
                    .with_attribute("client_secret", Attribute::required_string().sensitive()),
            )
            .with_block(
                "azure_managed_identity",
                Block::new()
                    .with_attribute("access_connector_id", Attribute::required_string())
                    .with_attribute("managed_identity_id", Attribute::optional_string())
                    .with_attribute("credential_id", Attribute::computed_string()),
            )
            .with_block(
                "gcp_service_account_key",
                Block::new()
                    .with_attribute("email", Attribute::required_string())
                    .with_attribute("private_key_id", Attribute::required_string())
                    .with_attribute("private_key", Attribute::required_string().sensitive()),
            )
            .with_block(
                "databricks_gcp_service_account",
                Block::new()
                    .with_attribute("email", Attribute::computed_string())
                    .with_attribute("credential_id", Attribute::computed_string()),
            )
            .with_block(
                "cloudflare_api_token",
                Block::new()
                    .with_attribute("account_id", Attribute::required_string())
                    .with_attribute("access_key_id", Attribute::required_string())
                    .with_attribute(
                        "secret_access_key",
                        Attribute::required_string().sensitive(),
                    ),
            )
    }

    /// Validate a config document: schema shape plus the exactly-one
    /// cloud-binding rule.
    pub fn validate_config(config: &serde_json::Value) -> Vec<Diagnostic> {
        let mut diagnostics = validation::validate(&Self::schema(), config);
        diagnostics.extend(validation::validate_cloud_binding(config));
        diagnostics
    }

    /// Create the credential remotely and record its identifier.
    ///
    /// `owner` and `isolation_mode` cannot be set by the create call; when
    /// either was explicitly supplied, a follow-up update applies them.
    /// Under workspace scope the configured metastore is validated first and
    /// an isolated credential gets the current workspace bound afterwards,
    /// so the workspace-scoped Read can see it.
    #[instrument(skip_all, name = "credential.create", fields(name = %data.get_str("name")))]
    pub async fn create(
        &self,
        client: &ApiClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let metastore_id = data.get_str("metastore_id").to_string();
        let mut create: CreateCredentialRequest = data.decode()?;
        let mut update: UpdateCredentialRequest = data.decode()?;
        create.purpose = Some(CredentialPurpose::Service);

        match client {
            ApiClient::Account(account) => {
                let cred = account
                    .create_credential(AccountsCreateCredentialRequest {
                        metastore_id: metastore_id.clone(),
                        credential_info: create,
                    })
                    .await?;
                data.set_id(cred.name.clone());
                info!(id = %data.id(), "created service credential");

                if !data.any_set(POST_CREATE_FIELDS) {
                    return Ok(());
                }
                debug!(id = %data.id(), "applying owner/isolation follow-up update");
                update.name = data.id().to_string();
                account
                    .update_credential(AccountsUpdateCredentialRequest {
                        metastore_id,
                        credential_name: cred.name,
                        credential_info: update,
                    })
                    .await?;
                Ok(())
            }
            ApiClient::Workspace(workspace) => {
                validate_metastore_id(workspace.as_ref(), &metastore_id).await?;
                let cred = workspace.create_credential(create).await?;
                data.set_id(cred.name.clone());
                info!(id = %data.id(), "created service credential");

                if data.any_set(POST_CREATE_FIELDS) {
                    debug!(id = %data.id(), "applying owner/isolation follow-up update");
                    update.name = data.id().to_string();
                    workspace.update_credential(update).await?;
                }
                // An isolated credential is invisible to this workspace
                // until bound, and the subsequent Read is workspace-scoped.
                add_current_workspace_binding(
                    workspace.as_ref(),
                    data,
                    SecurableType::Credential,
                    &cred.name,
                )
                .await
            }
        }
    }

    /// Fetch the remote object and write it back into state.
    ///
    /// The Azure client secret is write-only on the remote side; the
    /// previously configured value is spliced into the fetched object so a
    /// no-op read does not erase it.
    #[instrument(skip_all, name = "credential.read", fields(id = %data.id()))]
    pub async fn read(
        &self,
        client: &ApiClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let mut cred = match client {
            ApiClient::Account(account) => {
                account
                    .get_credential(data.get_str("metastore_id"), data.id())
                    .await?
            }
            ApiClient::Workspace(workspace) => workspace.get_credential(data.id()).await?,
        };

        let recorded: CredentialInfo = data.decode()?;
        if let Some(prior_principal) = recorded.azure_service_principal {
            if !prior_principal.client_secret.is_empty() {
                if let Some(principal) = cred.azure_service_principal.as_mut() {
                    principal.client_secret = prior_principal.client_secret;
                }
            }
        }

        data.set(
            "service_credential_id",
            cred.id.clone().unwrap_or_default(),
        )?;
        data.set_from(&cred)?;
        debug!(id = %data.id(), "read service credential");
        Ok(())
    }

    /// Apply declarative changes to the remote object.
    ///
    /// Owner changes and all other changes are independent remote calls; if
    /// the non-owner call fails after the owner was already changed, the
    /// previous owner is restored. A failed restore yields the composite
    /// rollback error naming both failures and both owners.
    #[instrument(skip_all, name = "credential.update", fields(id = %data.id()))]
    pub async fn update(
        &self,
        client: &ApiClient,
        data: &mut ResourceData,
    ) -> Result<(), ProviderError> {
        let mut update: UpdateCredentialRequest = data.decode()?;
        update.name = data.id().to_string();
        update.force = data.get_bool("force_update");

        match client {
            ApiClient::Account(account) => {
                let metastore_id = data.get_str("metastore_id").to_string();

                if data.has_change("owner") {
                    account
                        .update_credential(AccountsUpdateCredentialRequest {
                            metastore_id: metastore_id.clone(),
                            credential_name: data.id().to_string(),
                            credential_info: UpdateCredentialRequest::owner_only(
                                data.id(),
                                update.owner.clone(),
                            ),
                        })
                        .await?;
                }

                if !data.has_change_except("owner") {
                    return Ok(());
                }

                if data.has_change("read_only") {
                    update.force_send_fields.push("read_only");
                }
                update.owner = String::new();
                let result = account
                    .update_credential(AccountsUpdateCredentialRequest {
                        metastore_id: metastore_id.clone(),
                        credential_name: data.id().to_string(),
                        credential_info: update,
                    })
                    .await;

                if let Err(err) = result {
                    if data.has_change("owner") {
                        let (old_owner, new_owner) = owner_change(data);
                        warn!(id = %data.id(), "update failed, restoring previous owner");
                        let rollback = account
                            .update_credential(AccountsUpdateCredentialRequest {
                                metastore_id,
                                credential_name: data.id().to_string(),
                                credential_info: UpdateCredentialRequest::owner_only(
                                    data.id(),
                                    old_owner.clone(),
                                ),
                            })
                            .await;
                        if let Err(rollback_err) = rollback {
                            return Err(ProviderError::owner_rollback(
                                err,
                                rollback_err,
                                old_owner,
                                new_owner,
                            ));
                        }
                    }
                    return Err(err);
                }
                Ok(())
            }
            ApiClient::Workspace(workspace) => {
                validate_metastore_id(workspace.as_ref(), data.get_str("metastore_id")).await?;

                if data.has_change("owner") {
                    workspace
                        .update_credential(UpdateCredentialRequest::owner_only(
                            data.id(),
                            update.owner.clone(),
                        ))
                        .await?;
                }

                if !data.has_change_except("owner") {
                    return Ok(());
                }

                if data.has_change("read_only") {
                    update.force_send_fields.push("read_only");
                }
                update.owner = String::new();

                if let Err(err) = workspace.update_credential(update).await {
                    if data.has_change("owner") {
                        let (old_owner, new_owner) = owner_change(data);
                        warn!(id = %data.id(), "update failed, restoring previous owner");
                        let rollback = workspace
                            .update_credential(UpdateCredentialRequest::owner_only(
                                data.id(),
                                old_owner.clone(),
                            ))
                            .await;
                        if let Err(rollback_err) = rollback {
                            return Err(ProviderError::owner_rollback(
                                err,
                                rollback_err,
                                old_owner,
                                new_owner,
                            ));
                        }
                    }
                    return Err(err);
                }

                // Isolation may have just been switched on; rebind so the
                // following Read still sees the credential.
                add_current_workspace_binding(
                    workspace.as_ref(),
                    data,
                    SecurableType::Credential,
                    data.id(),
                )
                .await
            }
        }
    }

    /// Delete the remote object, honoring `force_destroy`.
    #[instrument(skip_all, name = "credential.delete", fields(id = %data.id()))]
    pub async fn delete(
        &self,
        client: &ApiClient,
        data: &ResourceData,
    ) -> Result<(), ProviderError> {
        let force = data.get_bool("force_destroy");
        match client {
            ApiClient::Account(account) => {
                account
                    .delete_credential(DeleteAccountCredentialRequest {
                        metastore_id: data.get_str("metastore_id").to_string(),
                        credential_name: data.id().to_string(),
                        force,
                    })
                    .await
            }
            ApiClient::Workspace(workspace) => {
                validate_metastore_id(workspace.as_ref(), data.get_str("metastore_id")).await?;
                workspace
                    .delete_credential(DeleteCredentialRequest {
                        name: data.id().to_string(),
                        force,
                    })
                    .await
            }
        }
    }
}

fn owner_change(data: &ResourceData) -> (String, String) {
    let (before, after) = data.get_change("owner");
    (
        before.as_str().unwrap_or_default().to_string(),
        after.as_str().unwrap_or_default().to_string(),
    )
}
