//! Shared utilities for use cases.

use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(cancelled)` if the token is cancelled.
pub(crate) fn check_cancelled<E>(token: &CancellationToken, cancelled: E) -> Result<(), E> {
    if token.is_cancelled() {
        return Err(cancelled);
    }
    Ok(())
}
