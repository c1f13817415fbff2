//! Client-side expense model: the entity, its amount type and the store that
//! owns the in-memory collection.

pub use error::EngineError;
pub use expense::{Expense, ExpenseData, ExpenseId, ExpensePatch};
pub use money::Money;
pub use store::{Action, ExpenseStore, SubscriptionId, reduce};

mod error;
mod expense;
mod money;
mod store;

/// Number of days shown by the "recent expenses" view.
pub const RECENT_DAYS: u64 = 7;
