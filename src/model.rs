//! Domain model for service credentials.
//!
//! Field names match the wire names used by both the account- and
//! workspace-scoped management APIs. Secrets (`client_secret`,
//! `private_key`, `secret_access_key`) are write-only: the remote API never
//! returns them in readable form.

use serde::{Deserialize, Serialize};

/// The purpose a credential is created for. This resource always creates
/// credentials with [`CredentialPurpose::Service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialPurpose {
    /// Usable by serverless compute and service workloads.
    #[serde(rename = "SERVICE")]
    Service,
    /// Usable for accessing external storage locations.
    #[serde(rename = "STORAGE")]
    Storage,
}

/// Policy restricting a credential's visibility to explicitly bound
/// workspaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsolationMode {
    /// Visible to all workspaces attached to the metastore.
    #[serde(rename = "ISOLATION_MODE_OPEN")]
    Open,
    /// Visible only to workspaces with an explicit binding.
    #[serde(rename = "ISOLATION_MODE_ISOLATED")]
    Isolated,
}

/// An AWS IAM role binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AwsIamRole {
    /// ARN of the IAM role the platform assumes.
    pub role_arn: String,
    /// Server-assigned external id used in the trust policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Server-assigned ARN the platform assumes the role from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unity_catalog_iam_arn: Option<String>,
}

/// An Azure service principal binding. The client secret is sensitive and
/// never returned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AzureServicePrincipal {
    /// The directory (tenant) id of the service principal.
    pub directory_id: String,
    /// The application (client) id of the service principal.
    pub application_id: String,
    /// The client secret. Write-only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub client_secret: String,
}

/// An Azure managed identity binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AzureManagedIdentity {
    /// Resource id of the access connector carrying the identity.
    pub access_connector_id: String,
    /// Resource id of a user-assigned identity, if not system-assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_identity_id: Option<String>,
    /// Server-assigned id of this identity binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
}

/// A GCP service account key binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GcpServiceAccountKey {
    /// The service account's email.
    pub email: String,
    /// The key id. Write-only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_key_id: String,
    /// The private key material. Write-only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub private_key: String,
}

/// A platform-generated GCP service account. Both fields are assigned by
/// the remote side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlatformGcpServiceAccount {
    /// The generated service account's email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Server-assigned id of this identity binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
}

/// A Cloudflare API token binding (R2 access).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CloudflareApiToken {
    /// The Cloudflare account id.
    pub account_id: String,
    /// The R2 access key id.
    pub access_key_id: String,
    /// The R2 secret access key. Write-only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret_access_key: String,
}

/// A service credential as returned by the remote APIs.
///
/// At most one cloud-binding field is populated. `id` and `metastore_id`
/// are server-assigned and never client-authored after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CredentialInfo {
    /// The credential's name, its permanent identifier.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Server-assigned unique id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The owning principal.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    /// What the credential may be used for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<CredentialPurpose>,
    /// Whether the credential is usable only for reads.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    /// Server-assigned id of the owning metastore.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metastore_id: String,
    /// Workspace visibility policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolation_mode: Option<IsolationMode>,

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
    /// Platform-generated GCP service account binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub databricks_gcp_service_account: Option<PlatformGcpServiceAccount>,
    /// Cloudflare API token binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudflare_api_token: Option<CloudflareApiToken>,
}

/// A governed object type that workspace bindings can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurableType {
    /// A service or storage credential.
    Credential,
    /// A catalog.
    Catalog,
    /// An external location.
    ExternalLocation,
}

/// How a bound workspace may use the securable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingType {
    /// The workspace may read and write through the securable.
    #[serde(rename = "BINDING_TYPE_READ_WRITE")]
    ReadWrite,
    /// The workspace may only read through the securable.
    #[serde(rename = "BINDING_TYPE_READ_ONLY")]
    ReadOnly,
}

/// An explicit grant permitting one workspace to use an isolated securable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceBinding {
    /// The bound workspace.
    pub workspace_id: i64,
    /// The access level of the binding.
    pub binding_type: BindingType,
}

impl WorkspaceBinding {
    /// A read-write binding for the given workspace.
    pub fn read_write(workspace_id: i64) -> Self {
        Self {
            workspace_id,
            binding_type: BindingType::ReadWrite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_isolation_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(IsolationMode::Isolated).unwrap(),
            json!("ISOLATION_MODE_ISOLATED")
        );
        assert_eq!(
            serde_json::from_value::<IsolationMode>(json!("ISOLATION_MODE_OPEN")).unwrap(),
            IsolationMode::Open
        );
    }

    #[test]
    fn test_purpose_wire_name() {
        assert_eq!(
            serde_json::to_value(CredentialPurpose::Service).unwrap(),
            json!("SERVICE")
        );
    }

    #[test]
    fn test_credential_info_omits_empty_fields() {
        let cred = CredentialInfo {
            name: "svc-1".to_string(),
            aws_iam_role: Some(AwsIamRole {
                role_arn: "arn:aws:iam::111111111111:role/r".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let value = serde_json::to_value(&cred).unwrap();
        assert_eq!(value["name"], "svc-1");
        assert_eq!(
            value["aws_iam_role"]["role_arn"],
            "arn:aws:iam::111111111111:role/r"
        );
        assert!(value.get("owner").is_none());
        assert!(value.get("read_only").is_none());
        assert!(value.get("azure_service_principal").is_none());
    }

    #[test]
    fn test_credential_info_round_trip() {
        let fetched = json!({
            "name": "svc-1",
            "id": "abc-123",
            "owner": "alice",
            "metastore_id": "m-1",
            "purpose": "SERVICE",
            "isolation_mode": "ISOLATION_MODE_ISOLATED",
            "azure_service_principal": {
                "directory_id": "dir",
                "application_id": "app"
            }
        });

        let cred: CredentialInfo = serde_json::from_value(fetched).unwrap();
        assert_eq!(cred.id.as_deref(), Some("abc-123"));
        assert_eq!(cred.isolation_mode, Some(IsolationMode::Isolated));
        // The remote API omits the secret; it deserializes as empty.
        assert_eq!(
            cred.azure_service_principal.as_ref().unwrap().client_secret,
            ""
        );
    }

    #[test]
    fn test_workspace_binding() {
        let binding = WorkspaceBinding::read_write(42);
        let value = serde_json::to_value(binding).unwrap();
        assert_eq!(value["workspace_id"], 42);
        assert_eq!(value["binding_type"], "BINDING_TYPE_READ_WRITE");
    }
}
