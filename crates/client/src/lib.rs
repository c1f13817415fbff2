//! Synchronization between the local [`engine::ExpenseStore`] and the remote
//! expense service.

pub use error::{RemoteError, WorkflowError};
pub use http::{DEFAULT_TIMEOUT, HttpExpenseService};
pub use remote::RemoteExpenses;
pub use reqwest::StatusCode;
pub use sync::{FETCH_FAILED, load_expenses};
pub use workflow::{DELETE_FAILED, ManageExpense, SAVE_FAILED, SyncPolicy, WorkflowStatus};

mod error;
mod http;
mod remote;
mod sync;
mod workflow;
