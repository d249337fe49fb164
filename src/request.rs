//! Typed request structs for the credential management APIs.
//!
//! Both scopes share the same create/update shapes; the account scope wraps
//! them in envelopes that address the metastore explicitly. Path and query
//! parameters (`name`, `force_send_fields`) are marked `serde(skip)` so they
//! never leak into a JSON body.

use serde::{Deserialize, Serialize};

use crate::model::{
    AwsIamRole, AzureManagedIdentity, AzureServicePrincipal, CloudflareApiToken,
    CredentialPurpose, GcpServiceAccountKey, IsolationMode, SecurableType, WorkspaceBinding,
};

fn is_false(v: &bool) -> bool {
    !*v
}

/// Request body for creating a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CreateCredentialRequest {
    /// The credential's name; becomes its permanent identifier.
    pub name: String,
    /// What the credential may be used for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<CredentialPurpose>,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Whether the credential is usable only for reads.
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
    /// Skip remote validation of the cloud binding.
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_validation: bool,

    /// AWS IAM role binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_iam_role: Option<AwsIamRole>,
    /// Azure service principal binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_service_principal: Option<AzureServicePrincipal>,
    /// Azure managed identity binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_managed_identity: Option<AzureManagedIdentity>,
    /// GCP service account key binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_service_account_key: Option<GcpServiceAccountKey>,
    /// Cloudflare API token binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudflare_api_token: Option<CloudflareApiToken>,
}

/// Request body for a partial credential update.
///
/// `name` addresses the credential (a path parameter); fields left at their
/// default are omitted from the payload unless listed in
/// `force_send_fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UpdateCredentialRequest {
    /// The credential being updated. Path parameter, not payload.
    #[serde(skip)]
    pub name: String,
    /// New owner, when changing ownership. The API does not allow mixing an
    /// owner change with other field changes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// Whether the credential is usable only for reads.
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
    /// Skip remote validation of the cloud binding.
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_validation: bool,
    /// Workspace visibility policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolation_mode: Option<IsolationMode>,
    /// Bypass dependency checks on the remote side.
    #[serde(default, skip_serializing_if = "is_false")]
    pub force: bool,

    /// AWS IAM role binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_iam_role: Option<AwsIamRole>,
    /// Azure service principal binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_service_principal: Option<AzureServicePrincipal>,
    /// Azure managed identity binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_managed_identity: Option<AzureManagedIdentity>,
    /// GCP service account key binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp_service_account_key: Option<GcpServiceAccountKey>,
    /// Cloudflare API token binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudflare_api_token: Option<CloudflareApiToken>,

    /// Field names to transmit even when they hold their default value.
    /// Needed for intentional transitions to `false` that the omit-default
    /// serialization would otherwise drop.
    #[serde(skip)]
    pub force_send_fields: Vec<&'static str>,
}

impl UpdateCredentialRequest {
    /// An owner-only update for the named credential.
    pub fn owner_only(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            ..Default::default()
        }
    }

    /// Serialize the request body, re-inserting any force-send fields that
    /// the omit-default rules removed.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut body = serde_json::to_value(self)?;
        if let serde_json::Value::Object(ref mut map) = body {
            for field in &self.force_send_fields {
                if *field == "read_only" {
                    map.insert("read_only".to_string(), serde_json::Value::Bool(self.read_only));
                }
            }
        }
        Ok(body)
    }
}

/// Delete a credential under workspace scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeleteCredentialRequest {
    /// The credential to delete. Path parameter.
    #[serde(skip)]
    pub name: String,
    /// Delete even if the credential has dependent objects.
    #[serde(default, skip_serializing_if = "is_false")]
    pub force: bool,
}

/// Account-scope envelope for creating a credential in a named metastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AccountsCreateCredentialRequest {
    /// The metastore the credential belongs to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metastore_id: String,
    /// The credential to create.
    pub credential_info: CreateCredentialRequest,
}

/// Account-scope envelope for updating a credential in a named metastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AccountsUpdateCredentialRequest {
    /// The metastore the credential belongs to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metastore_id: String,
    /// The credential being updated. Path parameter.
    #[serde(skip)]
    pub credential_name: String,
    /// The partial update to apply.
    pub credential_info: UpdateCredentialRequest,
}

/// Delete a credential under account scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeleteAccountCredentialRequest {
    /// The metastore the credential belongs to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metastore_id: String,
    /// The credential to delete. Path parameter.
    #[serde(skip)]
    pub credential_name: String,
    /// Delete even if the credential has dependent objects.
    #[serde(default, skip_serializing_if = "is_false")]
    pub force: bool,
}

/// Add/remove workspace bindings on a securable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateWorkspaceBindingsRequest {
    /// The kind of securable being bound.
    pub securable_type: SecurableType,
    /// The securable's name. Path parameter.
    #[serde(skip)]
    pub securable_name: String,
    /// Bindings to add.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<WorkspaceBinding>,
    /// Bindings to remove.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<WorkspaceBinding>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_omits_defaults() {
        let req = CreateCredentialRequest {
            name: "svc-1".to_string(),
            purpose: Some(CredentialPurpose::Service),
            ..Default::default()
        };

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({"name": "svc-1", "purpose": "SERVICE"}));
    }

    #[test]
    fn test_update_payload_omits_false_read_only() {
        let req = UpdateCredentialRequest {
            name: "svc-1".to_string(),
            comment: "updated".to_string(),
            ..Default::default()
        };

        let body = req.payload().unwrap();
        assert!(body.get("read_only").is_none());
        assert!(body.get("name").is_none());
        assert_eq!(body["comment"], "updated");
    }

    #[test]
    fn test_update_payload_force_sends_read_only_false() {
        let req = UpdateCredentialRequest {
            name: "svc-1".to_string(),
            read_only: false,
            force_send_fields: vec!["read_only"],
            ..Default::default()
        };

        let body = req.payload().unwrap();
        assert_eq!(body["read_only"], json!(false));
    }

    #[test]
    fn test_owner_only_update_carries_just_the_owner() {
        let req = UpdateCredentialRequest::owner_only("svc-1", "bob");
        let body = req.payload().unwrap();
        assert_eq!(body, json!({"owner": "bob"}));
    }

    #[test]
    fn test_account_envelope_keeps_path_params_out_of_body() {
        let req = AccountsUpdateCredentialRequest {
            metastore_id: "m-1".to_string(),
            credential_name: "svc-1".to_string(),
            credential_info: UpdateCredentialRequest::owner_only("svc-1", "bob"),
        };

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["metastore_id"], "m-1");
        assert!(body.get("credential_name").is_none());
        assert_eq!(body["credential_info"]["owner"], "bob");
    }
}
