use engine::{Expense, ExpenseData, ExpenseId};

use crate::RemoteError;

/// CRUD operations of the remote expense service.
///
/// Implementations are used from a single task; the returned futures are not
/// required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait RemoteExpenses {
    /// Stores a new expense and returns the identifier the service assigned.
    async fn create(&self, data: &ExpenseData) -> Result<ExpenseId, RemoteError>;

    /// Replaces the fields of an existing expense.
    async fn update(&self, id: &ExpenseId, data: &ExpenseData) -> Result<(), RemoteError>;

    async fn delete(&self, id: &ExpenseId) -> Result<(), RemoteError>;

    /// Fetches every stored expense, in the service order.
    async fn list(&self) -> Result<Vec<Expense>, RemoteError>;
}

impl<T: RemoteExpenses> RemoteExpenses for &T {
    async fn create(&self, data: &ExpenseData) -> Result<ExpenseId, RemoteError> {
        (**self).create(data).await
    }

    async fn update(&self, id: &ExpenseId, data: &ExpenseData) -> Result<(), RemoteError> {
        (**self).update(id, data).await
    }

    async fn delete(&self, id: &ExpenseId) -> Result<(), RemoteError> {
        (**self).delete(id).await
    }

    async fn list(&self) -> Result<Vec<Expense>, RemoteError> {
        (**self).list().await
    }
}
