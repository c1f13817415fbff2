use engine::ExpenseStore;

use crate::{RemoteError, RemoteExpenses};

/// Message shown when the initial fetch fails.
pub const FETCH_FAILED: &str = "Could not fetch expenses!";

/// Fetches every expense from `remote` and installs them in `store`.
///
/// Returns the number of expenses loaded. On failure the store keeps its
/// current content.
pub async fn load_expenses<R: RemoteExpenses>(
    remote: &R,
    store: &ExpenseStore,
) -> Result<usize, RemoteError> {
    let expenses = remote
        .list()
        .await
        .inspect_err(|err| tracing::error!("failed to fetch expenses: {err}"))?;
    let count = expenses.len();
    store.replace_all(expenses);
    tracing::info!(count, "loaded expenses");
    Ok(count)
}
