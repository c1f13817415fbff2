use std::cell::{Cell, RefCell};

use chrono::NaiveDate;
use client::{
    DELETE_FAILED, ManageExpense, RemoteError, RemoteExpenses, SAVE_FAILED, StatusCode,
    SyncPolicy, WorkflowError, WorkflowStatus, load_expenses,
};
use engine::{EngineError, Expense, ExpenseData, ExpenseId, ExpensePatch, ExpenseStore, Money};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Create(ExpenseData),
    Update(ExpenseId, ExpenseData),
    Delete(ExpenseId),
    List,
}

/// In-memory stand-in for the remote service.
#[derive(Default)]
struct StubRemote {
    next_id: RefCell<String>,
    listed: RefCell<Vec<Expense>>,
    fail: Cell<bool>,
    calls: RefCell<Vec<Call>>,
    gate: Option<Notify>,
}

impl StubRemote {
    fn assigning(id: &str) -> Self {
        Self {
            next_id: RefCell::new(id.to_string()),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        let stub = Self::default();
        stub.fail.set(true);
        stub
    }

    fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::default()
        }
    }

    async fn respond(&self) -> Result<(), RemoteError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.get() {
            return Err(RemoteError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "boom".to_string(),
            });
        }
        Ok(())
    }
}

impl RemoteExpenses for StubRemote {
    async fn create(&self, data: &ExpenseData) -> Result<ExpenseId, RemoteError> {
        self.calls.borrow_mut().push(Call::Create(data.clone()));
        self.respond().await?;
        Ok(ExpenseId::new(self.next_id.borrow().clone()))
    }

    async fn update(&self, id: &ExpenseId, data: &ExpenseData) -> Result<(), RemoteError> {
        self.calls
            .borrow_mut()
            .push(Call::Update(id.clone(), data.clone()));
        self.respond().await
    }

    async fn delete(&self, id: &ExpenseId) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(Call::Delete(id.clone()));
        self.respond().await
    }

    async fn list(&self) -> Result<Vec<Expense>, RemoteError> {
        self.calls.borrow_mut().push(Call::List);
        self.respond().await?;
        Ok(self.listed.borrow().clone())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn money(cents: i64) -> Money {
    Money::from_cents(cents).unwrap()
}

fn data(description: &str, cents: i64) -> ExpenseData {
    ExpenseData::new(description, money(cents), date(2024, 1, 1)).unwrap()
}

fn two_expenses() -> ExpenseStore {
    let store = ExpenseStore::new();
    store.replace_all(vec![
        Expense::new(ExpenseId::new("2"), data("Book", 1_250)),
        Expense::new(ExpenseId::new("1"), data("Coffee", 350)),
    ]);
    store
}

fn ids(store: &ExpenseStore) -> Vec<String> {
    store
        .expenses()
        .iter()
        .map(|e| e.id.as_str().to_string())
        .collect()
}

#[tokio::test]
async fn create_adds_expense_with_remote_id() {
    let store = ExpenseStore::new();
    let remote = StubRemote::assigning("abc123");
    let mut workflow = ManageExpense::new(store.clone(), &remote, None);

    let created = workflow
        .create(ExpenseData::new("Coffee", Money::from_major(3.5).unwrap(), date(2024, 1, 1)).unwrap())
        .await
        .unwrap();

    let expected = Expense::new(
        ExpenseId::new("abc123"),
        ExpenseData::new("Coffee", money(350), date(2024, 1, 1)).unwrap(),
    );
    assert_eq!(created, expected);
    assert_eq!(&*store.expenses(), &[expected]);
    assert_eq!(workflow.status(), WorkflowStatus::Success);
}

#[tokio::test]
async fn failed_create_leaves_store_unchanged() {
    let store = two_expenses();
    let remote = StubRemote::failing();
    let mut workflow = ManageExpense::new(store.clone(), &remote, None);

    let res = workflow.create(data("Lunch", 1_000)).await;

    assert!(matches!(res, Err(WorkflowError::Remote(RemoteError::Status { .. }))));
    assert_eq!(ids(&store), ["1", "2"]);
    assert_eq!(workflow.status(), WorkflowStatus::Failed(SAVE_FAILED.to_string()));
}

#[tokio::test]
async fn failed_edit_keeps_optimistic_update() {
    let store = two_expenses();
    let remote = StubRemote::failing();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("1")));

    let res = workflow
        .edit(ExpensePatch::default().amount(Money::from_major(9.99).unwrap()))
        .await;

    assert!(res.is_err());
    let edited = store.get(&ExpenseId::new("1")).unwrap();
    assert_eq!(edited.amount.cents(), 999);
    assert_eq!(edited.description, "Coffee");
    let status = workflow.status();
    assert!(matches!(status, WorkflowStatus::Failed(_)));
    assert!(!status.error().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn failed_edit_rolls_back_when_configured() {
    let store = two_expenses();
    let before = store.expenses();
    let remote = StubRemote::failing();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("1")))
        .with_policy(SyncPolicy::RollbackOnFailure);

    let res = workflow
        .edit(ExpensePatch::default().amount(money(999)))
        .await;

    assert!(res.is_err());
    assert_eq!(&*store.expenses(), &*before);
}

#[tokio::test]
async fn edit_sends_merged_fields() {
    let store = two_expenses();
    let remote = StubRemote::default();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("2")));

    workflow
        .confirm(ExpenseData::new("Novel", money(1_500), date(2024, 2, 1)).unwrap())
        .await
        .unwrap();

    let sent = ExpenseData::new("Novel", money(1_500), date(2024, 2, 1)).unwrap();
    assert_eq!(
        *remote.calls.borrow(),
        [Call::Update(ExpenseId::new("2"), sent.clone())]
    );
    assert_eq!(store.get(&ExpenseId::new("2")).unwrap().data(), sent);
    assert_eq!(ids(&store), ["1", "2"]);
}

#[tokio::test]
async fn edit_of_unknown_expense_skips_remote() {
    let store = two_expenses();
    let remote = StubRemote::default();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("9")));

    let res = workflow.edit(ExpensePatch::default().description("x")).await;

    assert!(matches!(
        res,
        Err(WorkflowError::Store(EngineError::NotFound(id))) if id == "9"
    ));
    assert!(remote.calls.borrow().is_empty());
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn remove_goes_through_submitting_to_success() {
    let store = two_expenses();
    let remote = StubRemote::gated();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("2")));
    let mut status = workflow.subscribe();
    let gate = remote.gate.as_ref().unwrap();

    let (res, seen) = tokio::join!(workflow.remove(), async {
        let seen = status
            .wait_for(|s| s.is_submitting())
            .await
            .map(|s| (*s).clone())
            .unwrap();
        gate.notify_one();
        seen
    });

    res.unwrap();
    assert_eq!(seen, WorkflowStatus::Submitting);
    assert_eq!(*status.borrow(), WorkflowStatus::Success);
    assert_eq!(ids(&store), ["1"]);
}

#[tokio::test]
async fn failed_remove_restores_position_when_configured() {
    let store = ExpenseStore::new();
    store.replace_all(vec![
        Expense::new(ExpenseId::new("c"), data("C", 1)),
        Expense::new(ExpenseId::new("b"), data("B", 1)),
        Expense::new(ExpenseId::new("a"), data("A", 1)),
    ]);
    let remote = StubRemote::failing();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("b")))
        .with_policy(SyncPolicy::RollbackOnFailure);

    let res = workflow.remove().await;

    assert!(res.is_err());
    assert_eq!(ids(&store), ["a", "b", "c"]);
    assert_eq!(workflow.status(), WorkflowStatus::Failed(DELETE_FAILED.to_string()));
}

#[tokio::test]
async fn failed_remove_stays_removed_by_default() {
    let store = two_expenses();
    let remote = StubRemote::failing();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("2")));

    assert!(workflow.remove().await.is_err());
    assert_eq!(ids(&store), ["1"]);

    workflow.dismiss_error();
    assert_eq!(workflow.status(), WorkflowStatus::Idle);
}

#[tokio::test]
async fn retry_after_failure_succeeds() {
    let store = ExpenseStore::new();
    let remote = StubRemote::assigning("x1");
    remote.fail.set(true);
    let mut workflow = ManageExpense::new(store.clone(), &remote, None);

    assert!(workflow.confirm(data("Taxi", 2_000)).await.is_err());
    remote.fail.set(false);
    workflow.confirm(data("Taxi", 2_000)).await.unwrap();

    assert_eq!(ids(&store), ["x1"]);
    assert_eq!(workflow.status(), WorkflowStatus::Success);
}

#[tokio::test]
async fn add_mode_cannot_remove() {
    let store = two_expenses();
    let remote = StubRemote::default();
    let mut workflow = ManageExpense::new(store, &remote, None);

    assert!(matches!(workflow.remove().await, Err(WorkflowError::NotEditing)));
    assert_eq!(workflow.title(), "Add Expense");
    assert_eq!(workflow.submit_label(), "Add");
    assert!(workflow.defaults().is_none());
}

#[tokio::test]
async fn edit_mode_prefills_defaults() {
    let store = two_expenses();
    let remote = StubRemote::default();
    let workflow = ManageExpense::new(store, &remote, Some(ExpenseId::new("1")));

    assert_eq!(workflow.title(), "Edit Expense");
    assert_eq!(workflow.submit_label(), "Update");
    assert_eq!(workflow.defaults().unwrap().description, "Coffee");
}

#[tokio::test]
async fn closed_workflow_rejects_operations() {
    let store = ExpenseStore::new();
    let remote = StubRemote::default();
    let mut workflow = ManageExpense::new(store.clone(), &remote, None);

    workflow.close();

    assert!(matches!(
        workflow.create(data("Late", 1)).await,
        Err(WorkflowError::Closed)
    ));
    assert!(remote.calls.borrow().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn dropped_submission_resets_status() {
    let store = two_expenses();
    let remote = StubRemote::gated();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("1")));

    {
        let pending = workflow.edit(ExpensePatch::default().amount(money(1)));
        // Never resolves: the gate is not opened.
        let res = tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
        assert!(res.is_err());
    }

    assert_eq!(workflow.status(), WorkflowStatus::Idle);
}

#[tokio::test]
async fn dropped_remove_is_rolled_back_when_configured() {
    let store = two_expenses();
    let remote = StubRemote::gated();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("1")))
        .with_policy(SyncPolicy::RollbackOnFailure);

    {
        let pending = workflow.remove();
        let res = tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
        assert!(res.is_err());
    }

    assert_eq!(ids(&store), ["1", "2"]);
    assert_eq!(workflow.status(), WorkflowStatus::Idle);
}

#[tokio::test]
async fn dropped_edit_is_rolled_back_when_configured() {
    let store = two_expenses();
    let before = store.expenses();
    let remote = StubRemote::gated();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("2")))
        .with_policy(SyncPolicy::RollbackOnFailure);

    {
        let pending = workflow.edit(ExpensePatch::default().amount(money(1)));
        let res = tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
        assert!(res.is_err());
    }

    assert_eq!(&*store.expenses(), &*before);
}

#[tokio::test]
async fn dropped_edit_stays_applied_by_default() {
    let store = two_expenses();
    let remote = StubRemote::gated();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("2")));

    {
        let pending = workflow.edit(ExpensePatch::default().amount(money(1)));
        let res = tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
        assert!(res.is_err());
    }

    assert_eq!(store.get(&ExpenseId::new("2")).unwrap().amount.cents(), 1);
}

#[tokio::test]
async fn create_with_id_already_in_store_keeps_service_record() {
    let store = two_expenses();
    let remote = StubRemote::assigning("1");
    let mut workflow = ManageExpense::new(store.clone(), &remote, None);

    let created = workflow.create(data("Tea", 275)).await.unwrap();

    assert_eq!(created.id, ExpenseId::new("1"));
    assert_eq!(store.len(), 2);
    assert_eq!(store.get(&ExpenseId::new("1")).unwrap().data(), data("Tea", 275));
    assert_eq!(workflow.status(), WorkflowStatus::Success);
}

#[tokio::test]
async fn blank_description_edit_is_rejected_before_remote() {
    let store = two_expenses();
    let remote = StubRemote::default();
    let mut workflow = ManageExpense::new(store.clone(), &remote, Some(ExpenseId::new("1")));

    let res = workflow.edit(ExpensePatch::default().description("  ")).await;

    assert!(matches!(
        res,
        Err(WorkflowError::Store(EngineError::InvalidDescription(_)))
    ));
    assert!(remote.calls.borrow().is_empty());
    assert_eq!(store.get(&ExpenseId::new("1")).unwrap().description, "Coffee");
}

#[tokio::test]
async fn initial_load_reverses_service_order() {
    let store = ExpenseStore::new();
    let remote = StubRemote::default();
    *remote.listed.borrow_mut() = vec![
        Expense::new(ExpenseId::new("1"), data("Coffee", 350)),
        Expense::new(ExpenseId::new("2"), data("Book", 1_250)),
    ];

    let count = load_expenses(&remote, &store).await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(ids(&store), ["2", "1"]);
}

#[tokio::test]
async fn failed_initial_load_keeps_store() {
    let store = two_expenses();
    let remote = StubRemote::failing();

    assert!(load_expenses(&remote, &store).await.is_err());
    assert_eq!(store.len(), 2);
}
