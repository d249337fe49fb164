//! Error types for the credential lifecycle layer.

use thiserror::Error;

/// Errors that can occur while reconciling a service credential.
///
/// Remote API failures are propagated unchanged in the [`ProviderError::Api`]
/// variant. The single synthesized case is [`ProviderError::OwnerRollback`],
/// produced when a non-owner update fails *and* the compensating owner update
/// also fails, leaving the remote object in an inconsistent ownership state.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A remote API call failed. The message is carried verbatim.
    #[error("{0}")]
    Api(String),

    /// The requested credential was not found.
    #[error("credential not found: {0}")]
    NotFound(String),

    /// Permission denied by the remote API.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The declarative configuration is invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// A precondition was not met before any mutating call was attempted,
    /// such as a metastore id that does not match the workspace.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// A state document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A non-owner update failed and the compensating owner update could not
    /// restore the previous owner. Both underlying failures and both owner
    /// values are reported so the operator can see what was attempted and
    /// what could not be undone.
    #[error(
        "failed to update credential: {update}; owner rollback from \"{new_owner}\" back to \"{old_owner}\" also failed: {rollback}"
    )]
    OwnerRollback {
        /// The original non-owner update failure.
        update: Box<ProviderError>,
        /// The failure of the compensating owner update.
        rollback: Box<ProviderError>,
        /// The owner value before the attempted change.
        old_owner: String,
        /// The owner value the failed update had applied.
        new_owner: String,
    },
}

impl ProviderError {
    /// Build the composite rollback error from its two underlying failures.
    pub fn owner_rollback(
        update: ProviderError,
        rollback: ProviderError,
        old_owner: impl Into<String>,
        new_owner: impl Into<String>,
    ) -> Self {
        Self::OwnerRollback {
            update: Box::new(update),
            rollback: Box::new(rollback),
            old_owner: old_owner.into(),
            new_owner: new_owner.into(),
        }
    }
}
