use std::fmt;

use chrono::{Days, NaiveDate};

use crate::{EngineError, Money};

/// Identifier assigned by the remote service when an expense is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpenseId(String);

impl ExpenseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ExpenseId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The user-editable fields of an expense.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseData {
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
}

impl ExpenseData {
    /// Builds the fields of an expense, rejecting a blank description.
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        date: NaiveDate,
    ) -> Result<Self, EngineError> {
        let description = description.into();
        let description = description.trim();
        if description.is_empty() {
            return Err(EngineError::InvalidDescription(
                "description must not be empty".to_string(),
            ));
        }
        Ok(Self {
            description: description.to_string(),
            amount,
            date,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
}

impl Expense {
    pub fn new(id: ExpenseId, data: ExpenseData) -> Self {
        Self {
            id,
            description: data.description,
            amount: data.amount,
            date: data.date,
        }
    }

    /// Returns the editable fields, without the identifier.
    pub fn data(&self) -> ExpenseData {
        ExpenseData {
            description: self.description.clone(),
            amount: self.amount,
            date: self.date,
        }
    }

    /// Returns a copy with the patch fields overlaid. The id never changes.
    #[must_use]
    pub fn patched(&self, patch: &ExpensePatch) -> Self {
        Self {
            id: self.id.clone(),
            description: patch
                .description
                .as_deref()
                .map_or_else(|| self.description.clone(), |d| d.trim().to_string()),
            amount: patch.amount.unwrap_or(self.amount),
            date: patch.date.unwrap_or(self.date),
        }
    }

    /// `true` when the expense is dated strictly after `today - days`.
    pub fn is_recent(&self, today: NaiveDate, days: u64) -> bool {
        match today.checked_sub_days(Days::new(days)) {
            Some(cutoff) => self.date > cutoff,
            None => true,
        }
    }
}

/// Partial update of an expense. `None` fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpensePatch {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
}

impl ExpensePatch {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.amount.is_none() && self.date.is_none()
    }
}

impl From<ExpenseData> for ExpensePatch {
    fn from(data: ExpenseData) -> Self {
        Self {
            description: Some(data.description),
            amount: Some(data.amount),
            date: Some(data.date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn coffee() -> Expense {
        Expense::new(
            ExpenseId::new("e1"),
            ExpenseData::new("Coffee", Money::from_cents(350).unwrap(), date(2024, 1, 1)).unwrap(),
        )
    }

    #[test]
    fn patch_overlays_only_given_fields() {
        let patched = coffee().patched(&ExpensePatch::default().amount(Money::from_cents(999).unwrap()));
        assert_eq!(patched.amount.cents(), 999);
        assert_eq!(patched.description, "Coffee");
        assert_eq!(patched.date, date(2024, 1, 1));
        assert_eq!(patched.id, ExpenseId::new("e1"));
    }

    #[test]
    fn patched_description_is_trimmed() {
        let patched = coffee().patched(&ExpensePatch::default().description("  Tea "));
        assert_eq!(patched.description, "Tea");
    }

    #[test]
    fn empty_patch_is_identity() {
        assert!(ExpensePatch::default().is_empty());
        assert_eq!(coffee().patched(&ExpensePatch::default()), coffee());
    }

    #[test]
    fn blank_description_is_rejected() {
        let res = ExpenseData::new("   ", Money::ZERO, date(2024, 1, 1));
        assert!(matches!(res, Err(EngineError::InvalidDescription(_))));
    }

    #[test]
    fn recent_window_is_exclusive() {
        let today = date(2024, 1, 8);
        assert!(!coffee().is_recent(today, 7));
        assert!(coffee().is_recent(date(2024, 1, 7), 7));
    }
}
