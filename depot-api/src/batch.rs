use std::fmt::Debug;
use std::future::Future;

use depot_core::{LedgerError, LedgerResult};
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("{method}: all {attempted} calls returned errors, last: {last}")]
    AllFailed {
        method: &'static str,
        attempted: usize,
        #[source]
        last: LedgerError,
    },

    #[error("{method}: all 0 calls returned errors, the batch was empty")]
    Empty { method: &'static str },
}

/// Applies `op` to every item in order, one at a time.
///
/// Successes are collected in input order with failed items left out, so the
/// output is not positionally aligned with `items`. Failures are only logged.
/// The batch fails when nothing succeeded, reporting the last error seen. An
/// empty batch has nothing that succeeded either, so it fails too.
pub async fn apply_all<T, O, F, Fut>(
    method: &'static str,
    items: Vec<T>,
    mut op: F,
) -> Result<Vec<O>, BatchError>
where
    T: Clone + Debug,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = LedgerResult<O>>,
{
    let attempted = items.len();
    if attempted == 0 {
        warn!(method, "empty batch");
        return Err(BatchError::Empty { method });
    }

    let mut succeeded = Vec::with_capacity(attempted);
    let mut last_error = None;

    for item in items {
        match op(item.clone()).await {
            Ok(out) => succeeded.push(out),
            Err(err) => {
                warn!(method, item = ?item, error = %err, "batch item failed");
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(last) if succeeded.is_empty() => {
            error!(method, attempted, error = %last, "every batch item failed");
            Err(BatchError::AllFailed {
                method,
                attempted,
                last,
            })
        }
        _ => Ok(succeeded),
    }
}
