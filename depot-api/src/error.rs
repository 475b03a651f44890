use depot_core::LedgerError;

use crate::batch::BatchError;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("rpc: can't find method {0}")]
    UnknownMethod(String),

    #[error("{method}: invalid params: {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Failure of a single-record method.
    #[error("{method}: {source}")]
    Call {
        method: &'static str,
        #[source]
        source: LedgerError,
    },

    #[error("encoding result: {0}")]
    Encode(#[source] serde_json::Error),
}

impl RpcError {
    /// True when the failure comes from the store or the server itself
    /// rather than from the caller's request.
    pub fn is_internal(&self) -> bool {
        match self {
            RpcError::Encode(_) => true,
            RpcError::Call { source, .. } => matches!(source, LedgerError::Store { .. }),
            RpcError::Batch(BatchError::AllFailed { last, .. }) => {
                matches!(last, LedgerError::Store { .. })
            }
            _ => false,
        }
    }
}
