use std::time::Duration;

use api_types::expense::{ErrorResponse, ExpenseBody, ExpenseCreated, ExpenseListResponse};
use engine::{Expense, ExpenseData, ExpenseId, Money};
use reqwest::{Response, Url};

use crate::{RemoteError, RemoteExpenses};

const RESOURCE: &str = "expenses";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`RemoteExpenses`] over a REST-like JSON API.
#[derive(Debug, Clone)]
pub struct HttpExpenseService {
    base_url: Url,
    http: reqwest::Client,
    json_suffix: bool,
}

impl HttpExpenseService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| RemoteError::InvalidUrl(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http,
            json_suffix: false,
        })
    }

    /// Appends `.json` to every resource path (`/expenses.json`,
    /// `/expenses/{id}.json`), as Firebase-style backends expect.
    pub fn with_json_suffix(mut self, json_suffix: bool) -> Self {
        self.json_suffix = json_suffix;
        self
    }

    fn endpoint(&self, id: Option<&ExpenseId>) -> Result<Url, RemoteError> {
        let suffix = if self.json_suffix { ".json" } else { "" };
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RemoteError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            match id {
                None => {
                    segments.push(&format!("{RESOURCE}{suffix}"));
                }
                Some(id) => {
                    segments.push(RESOURCE).push(&format!("{id}{suffix}"));
                }
            }
        }
        Ok(url)
    }
}

async fn check(res: Response) -> Result<Response, RemoteError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let message = res
        .json::<ErrorResponse>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("server error")
                .to_string()
        });
    tracing::warn!(%status, "expense service rejected request: {message}");
    Err(RemoteError::Status { status, message })
}

fn to_body(data: &ExpenseData) -> ExpenseBody {
    ExpenseBody {
        description: data.description.clone(),
        amount: data.amount.to_major(),
        date: data.date,
    }
}

fn from_body(id: String, body: ExpenseBody) -> Option<Expense> {
    let amount = match Money::from_major(body.amount) {
        Ok(amount) => amount,
        Err(err) => {
            tracing::warn!(%id, "skipping stored expense: {err}");
            return None;
        }
    };
    Some(Expense::new(
        ExpenseId::from(id),
        ExpenseData {
            description: body.description,
            amount,
            date: body.date,
        },
    ))
}

impl RemoteExpenses for HttpExpenseService {
    async fn create(&self, data: &ExpenseData) -> Result<ExpenseId, RemoteError> {
        let endpoint = self.endpoint(None)?;
        tracing::debug!(%endpoint, "creating expense");

        let res = self.http.post(endpoint).json(&to_body(data)).send().await?;
        let created = check(res).await?.json::<ExpenseCreated>().await?;
        Ok(ExpenseId::from(created.name))
    }

    async fn update(&self, id: &ExpenseId, data: &ExpenseData) -> Result<(), RemoteError> {
        let endpoint = self.endpoint(Some(id))?;
        tracing::debug!(%endpoint, "updating expense");

        let res = self.http.put(endpoint).json(&to_body(data)).send().await?;
        check(res).await?;
        Ok(())
    }

    async fn delete(&self, id: &ExpenseId) -> Result<(), RemoteError> {
        let endpoint = self.endpoint(Some(id))?;
        tracing::debug!(%endpoint, "deleting expense");

        let res = self.http.delete(endpoint).send().await?;
        check(res).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Expense>, RemoteError> {
        let endpoint = self.endpoint(None)?;
        tracing::debug!(%endpoint, "fetching expenses");

        let res = self.http.get(endpoint).send().await?;
        let list = check(res).await?.json::<ExpenseListResponse>().await?;
        Ok(list
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(id, body)| from_body(id, body))
            .collect())
    }
}
