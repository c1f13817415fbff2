//! Client-side expense collection.
//!
//! Every mutation goes through [`reduce`], which builds a new collection from
//! the previous one without touching it. [`ExpenseStore`] installs the result
//! and then notifies its observers synchronously.

use std::{cell::RefCell, fmt, rc::Rc};

use chrono::NaiveDate;

use crate::{EngineError, Expense, ExpenseId, ExpensePatch, Money};

type ResultStore<T> = Result<T, EngineError>;
type Observer = Rc<dyn Fn(&[Expense])>;

/// Mutations understood by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Replace the whole collection. The input order is reversed, so the
    /// last element received ends up first.
    ReplaceAll(Vec<Expense>),
    /// Prepend a new expense.
    Add(Expense),
    /// Overlay `patch` on the expense with the given id, keeping its position.
    Update { id: ExpenseId, patch: ExpensePatch },
    /// Remove the expense with the given id. Unknown ids are ignored.
    Delete(ExpenseId),
    /// Put an expense back at `index` (clamped to the collection length).
    /// Used to undo a delete.
    Restore { index: usize, expense: Expense },
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Self::ReplaceAll(_) => "replace_all",
            Self::Add(_) => "add",
            Self::Update { .. } => "update",
            Self::Delete(_) => "delete",
            Self::Restore { .. } => "restore",
        }
    }
}

/// Computes the collection that results from applying `action` to `state`.
pub fn reduce(state: &[Expense], action: Action) -> ResultStore<Vec<Expense>> {
    match action {
        Action::ReplaceAll(mut expenses) => {
            expenses.reverse();
            Ok(expenses)
        }
        Action::Add(expense) => {
            if state.iter().any(|e| e.id == expense.id) {
                return Err(EngineError::DuplicateId(expense.id.to_string()));
            }
            let mut next = Vec::with_capacity(state.len() + 1);
            next.push(expense);
            next.extend_from_slice(state);
            Ok(next)
        }
        Action::Update { id, patch } => {
            if patch.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
                return Err(EngineError::InvalidDescription(
                    "description must not be empty".to_string(),
                ));
            }
            let index = state
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
            let mut next = state.to_vec();
            next[index] = state[index].patched(&patch);
            Ok(next)
        }
        Action::Delete(id) => Ok(state.iter().filter(|e| e.id != id).cloned().collect()),
        Action::Restore { index, expense } => {
            if state.iter().any(|e| e.id == expense.id) {
                return Err(EngineError::DuplicateId(expense.id.to_string()));
            }
            let mut next = state.to_vec();
            next.insert(index.min(state.len()), expense);
            Ok(next)
        }
    }
}

/// Handle returned by [`ExpenseStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Inner {
    expenses: Rc<[Expense]>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

/// Shared, single-threaded handle to the expense collection.
///
/// Cloning the handle is cheap and every clone sees the same collection.
#[derive(Clone, Default)]
pub struct ExpenseStore {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for ExpenseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ExpenseStore")
            .field("expenses", &inner.expenses)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl ExpenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `action` and notifies observers. On error nothing changes and
    /// nobody is notified.
    pub fn dispatch(&self, action: Action) -> ResultStore<()> {
        let name = action.name();
        let next: Rc<[Expense]> = {
            let inner = self.inner.borrow();
            reduce(&inner.expenses, action)
                .inspect_err(|err| tracing::debug!("store {name} rejected: {err}"))?
                .into()
        };

        // Observers are called without holding the borrow so they can read
        // or dispatch on the store themselves.
        let observers: Vec<Observer> = {
            let mut inner = self.inner.borrow_mut();
            inner.expenses = Rc::clone(&next);
            inner.observers.iter().map(|(_, o)| Rc::clone(o)).collect()
        };
        tracing::debug!(action = name, len = next.len(), "store updated");

        for observer in observers {
            // A nested dispatch already delivered a newer collection to every
            // observer.
            if !Rc::ptr_eq(&self.inner.borrow().expenses, &next) {
                break;
            }
            observer(&next);
        }
        Ok(())
    }

    pub fn replace_all(&self, expenses: Vec<Expense>) {
        // ReplaceAll cannot fail.
        let _ = self.dispatch(Action::ReplaceAll(expenses));
    }

    pub fn add(&self, expense: Expense) -> ResultStore<()> {
        self.dispatch(Action::Add(expense))
    }

    pub fn update(&self, id: &ExpenseId, patch: ExpensePatch) -> ResultStore<()> {
        self.dispatch(Action::Update {
            id: id.clone(),
            patch,
        })
    }

    pub fn delete(&self, id: &ExpenseId) {
        // Deleting an unknown id is a no-op, never an error.
        let _ = self.dispatch(Action::Delete(id.clone()));
    }

    pub fn restore(&self, index: usize, expense: Expense) -> ResultStore<()> {
        self.dispatch(Action::Restore { index, expense })
    }

    /// Immutable snapshot of the current collection, newest first.
    pub fn expenses(&self) -> Rc<[Expense]> {
        Rc::clone(&self.inner.borrow().expenses)
    }

    pub fn get(&self, id: &ExpenseId) -> Option<Expense> {
        self.inner
            .borrow()
            .expenses
            .iter()
            .find(|e| &e.id == id)
            .cloned()
    }

    /// Position of the expense with the given id.
    pub fn position(&self, id: &ExpenseId) -> Option<usize> {
        self.inner.borrow().expenses.iter().position(|e| &e.id == id)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expenses dated within the last `days` days before `today`.
    pub fn recent(&self, today: NaiveDate, days: u64) -> Vec<Expense> {
        self.inner
            .borrow()
            .expenses
            .iter()
            .filter(|e| e.is_recent(today, days))
            .cloned()
            .collect()
    }

    /// Sum of all amounts.
    pub fn total(&self) -> Money {
        self.inner.borrow().expenses.iter().map(|e| e.amount).sum()
    }

    /// Registers `observer`, called with the new collection after every
    /// successful mutation.
    pub fn subscribe(&self, observer: impl Fn(&[Expense]) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.observers.push((id, Rc::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.observers.len();
        inner.observers.retain(|(sub, _)| *sub != id);
        inner.observers.len() != before
    }
}
