//! Manage-expense workflow: binds one create, edit or delete intent to a
//! store mutation and the matching remote call.

use engine::{EngineError, Expense, ExpenseData, ExpenseId, ExpensePatch, ExpenseStore};
use serde::Deserialize;
use tokio::sync::watch;

use crate::{RemoteExpenses, WorkflowError};

pub const SAVE_FAILED: &str = "Could not save data - please try again later!";
pub const DELETE_FAILED: &str = "Could not delete expense - please try again later!";

type ResultWorkflow<T> = Result<T, WorkflowError>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum WorkflowStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    /// Holds the user-facing message.
    Failed(String),
}

impl WorkflowStatus {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// What happens to an optimistic local mutation when the remote call fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Keep the local change even though the service rejected it.
    #[default]
    Optimistic,
    /// Undo the local change.
    RollbackOnFailure,
}

/// Local change to revert if a submission does not complete.
#[derive(Debug)]
enum Undo {
    Update(Expense),
    Restore { index: usize, expense: Expense },
}

/// Marks the workflow as submitting for as long as it lives. Dropping it
/// without [`Submission::finish`] (the operation future was dropped) puts the
/// status back to idle and reverts any recorded optimistic change.
struct Submission<'a> {
    status: &'a watch::Sender<WorkflowStatus>,
    store: &'a ExpenseStore,
    undo: Option<Undo>,
    finished: bool,
}

impl Submission<'_> {
    fn record(&mut self, undo: Undo) {
        self.undo = Some(undo);
    }

    fn rollback(&mut self) {
        let res = match self.undo.take() {
            None => return,
            Some(Undo::Update(previous)) => self
                .store
                .update(&previous.id, ExpensePatch::from(previous.data())),
            Some(Undo::Restore { index, expense }) => self.store.restore(index, expense),
        };
        match res {
            Ok(()) => tracing::info!("rolled back local change"),
            Err(err) => tracing::error!("failed to roll back local change: {err}"),
        }
    }

    fn finish(mut self, next: WorkflowStatus) {
        self.finished = true;
        self.status.send_replace(next);
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("submission dropped before completion");
            self.rollback();
            self.status.send_replace(WorkflowStatus::Idle);
        }
    }
}

/// One manage-expense session: add mode when created without an id, edit
/// mode otherwise.
#[derive(Debug)]
pub struct ManageExpense<R> {
    store: ExpenseStore,
    remote: R,
    expense_id: Option<ExpenseId>,
    policy: SyncPolicy,
    status: watch::Sender<WorkflowStatus>,
    closed: bool,
}

impl<R: RemoteExpenses> ManageExpense<R> {
    pub fn new(store: ExpenseStore, remote: R, expense_id: Option<ExpenseId>) -> Self {
        let (status, _) = watch::channel(WorkflowStatus::Idle);
        Self {
            store,
            remote,
            expense_id,
            policy: SyncPolicy::default(),
            status,
            closed: false,
        }
    }

    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn is_editing(&self) -> bool {
        self.expense_id.is_some()
    }

    pub fn expense_id(&self) -> Option<&ExpenseId> {
        self.expense_id.as_ref()
    }

    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            "Edit Expense"
        } else {
            "Add Expense"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() { "Update" } else { "Add" }
    }

    /// The expense being edited, used to prefill the form.
    pub fn defaults(&self) -> Option<Expense> {
        self.expense_id.as_ref().and_then(|id| self.store.get(id))
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowStatus> {
        self.status.subscribe()
    }

    /// Clears a failure so the user can resubmit.
    pub fn dismiss_error(&self) {
        self.status.send_if_modified(|status| {
            if status.error().is_some() {
                *status = WorkflowStatus::Idle;
                return true;
            }
            false
        });
    }

    /// Tears the session down; every later operation fails with
    /// [`WorkflowError::Closed`].
    pub fn close(&mut self) {
        self.closed = true;
        self.status.send_replace(WorkflowStatus::Idle);
    }

    /// Form confirmation: edits in edit mode, creates otherwise.
    pub async fn confirm(&mut self, data: ExpenseData) -> ResultWorkflow<Expense> {
        if self.is_editing() {
            self.edit(ExpensePatch::from(data)).await
        } else {
            self.create(data).await
        }
    }

    /// Creates the expense remotely, then adds it to the store with the
    /// identifier the service assigned. The store is untouched on failure.
    pub async fn create(&mut self, data: ExpenseData) -> ResultWorkflow<Expense> {
        let submission = self.begin()?;
        let result = self.try_create(data).await;
        self.settle(submission, result, SAVE_FAILED)
    }

    /// Applies `patch` to the store, then sends the updated expense to the
    /// service.
    pub async fn edit(&mut self, patch: ExpensePatch) -> ResultWorkflow<Expense> {
        let id = self.expense_id.clone().ok_or(WorkflowError::NotEditing)?;
        let mut submission = self.begin()?;
        let result = self.try_edit(&mut submission, &id, patch).await;
        self.settle(submission, result, SAVE_FAILED)
    }

    /// Removes the expense from the store, then from the service.
    pub async fn remove(&mut self) -> ResultWorkflow<()> {
        let id = self.expense_id.clone().ok_or(WorkflowError::NotEditing)?;
        let mut submission = self.begin()?;
        let result = self.try_remove(&mut submission, &id).await;
        self.settle(submission, result, DELETE_FAILED)
    }

    fn begin(&self) -> ResultWorkflow<Submission<'_>> {
        if self.closed {
            return Err(WorkflowError::Closed);
        }
        self.status.send_replace(WorkflowStatus::Submitting);
        Ok(Submission {
            status: &self.status,
            store: &self.store,
            undo: None,
            finished: false,
        })
    }

    fn settle<T>(
        &self,
        mut submission: Submission<'_>,
        result: ResultWorkflow<T>,
        message: &str,
    ) -> ResultWorkflow<T> {
        match &result {
            Ok(_) => submission.finish(WorkflowStatus::Success),
            Err(err) => {
                tracing::warn!("expense submission failed: {err}");
                submission.rollback();
                submission.finish(WorkflowStatus::Failed(message.to_string()));
            }
        }
        result
    }

    async fn try_create(&self, data: ExpenseData) -> ResultWorkflow<Expense> {
        let id = self.remote.create(&data).await?;
        let expense = Expense::new(id, data);
        match self.store.add(expense.clone()) {
            Ok(()) => tracing::info!(id = %expense.id, "expense created"),
            // The service already stores the record: keep it locally too.
            Err(EngineError::DuplicateId(_)) => {
                tracing::error!(id = %expense.id, "service assigned an id already in the store");
                self.store
                    .update(&expense.id, ExpensePatch::from(expense.data()))?;
            }
            Err(err) => return Err(err.into()),
        }
        Ok(expense)
    }

    async fn try_edit(
        &self,
        submission: &mut Submission<'_>,
        id: &ExpenseId,
        patch: ExpensePatch,
    ) -> ResultWorkflow<Expense> {
        let previous = self
            .store
            .get(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
        self.store.update(id, patch.clone())?;
        let updated = previous.patched(&patch);
        if self.policy == SyncPolicy::RollbackOnFailure {
            submission.record(Undo::Update(previous));
        }

        self.remote.update(id, &updated.data()).await?;
        tracing::info!(%id, "expense updated");
        Ok(updated)
    }

    async fn try_remove(
        &self,
        submission: &mut Submission<'_>,
        id: &ExpenseId,
    ) -> ResultWorkflow<()> {
        let previous = self.store.position(id).zip(self.store.get(id));
        self.store.delete(id);
        if self.policy == SyncPolicy::RollbackOnFailure {
            if let Some((index, expense)) = previous {
                submission.record(Undo::Restore { index, expense });
            }
        }

        self.remote.delete(id).await?;
        tracing::info!(%id, "expense deleted");
        Ok(())
    }
}
