use chrono::NaiveDate;
use engine::{Expense, ExpenseData, Money};

pub const INVALID_INPUT: &str = "Invalid input values - please check your entered data!";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Amount,
    Date,
    Description,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            Self::Amount => "Amount",
            Self::Date => "Date (YYYY-MM-DD)",
            Self::Description => "Description",
        }
    }
}

/// Which fields failed validation on the last submit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub amount: bool,
    pub date: bool,
    pub description: bool,
}

impl FieldErrors {
    pub fn any(&self) -> bool {
        self.amount || self.date || self.description
    }

    pub fn get(&self, field: FormField) -> bool {
        match field {
            FormField::Amount => self.amount,
            FormField::Date => self.date,
            FormField::Description => self.description,
        }
    }
}

/// Raw text of the manage-expense form.
#[derive(Debug, Clone)]
pub struct ExpenseForm {
    pub amount: String,
    pub date: String,
    pub description: String,
    pub focus: FormField,
    pub errors: FieldErrors,
}

impl ExpenseForm {
    /// Empty form, or prefilled from the expense being edited.
    pub fn new(defaults: Option<&Expense>) -> Self {
        let (amount, date, description) = match defaults {
            Some(expense) => (
                format!(
                    "{}.{:02}",
                    expense.amount.cents() / 100,
                    expense.amount.cents() % 100
                ),
                expense.date.format(DATE_FORMAT).to_string(),
                expense.description.clone(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        Self {
            amount,
            date,
            description,
            focus: FormField::Amount,
            errors: FieldErrors::default(),
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            FormField::Amount => FormField::Date,
            FormField::Date => FormField::Description,
            FormField::Description => FormField::Amount,
        };
    }

    pub fn prev_field(&mut self) {
        self.focus = match self.focus {
            FormField::Amount => FormField::Description,
            FormField::Date => FormField::Amount,
            FormField::Description => FormField::Date,
        };
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Amount => &self.amount,
            FormField::Date => &self.date,
            FormField::Description => &self.description,
        }
    }

    pub fn active_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Amount => &mut self.amount,
            FormField::Date => &mut self.date,
            FormField::Description => &mut self.description,
        }
    }

    /// Parses every field. Amounts must be greater than zero.
    pub fn validate(&self) -> Result<ExpenseData, FieldErrors> {
        let amount = self
            .amount
            .parse::<Money>()
            .ok()
            .filter(|amount| !amount.is_zero());
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok();
        let description = self.description.trim();

        let errors = FieldErrors {
            amount: amount.is_none(),
            date: date.is_none(),
            description: description.is_empty(),
        };

        match (amount, date) {
            (Some(amount), Some(date)) if !errors.any() => {
                ExpenseData::new(description, amount, date).map_err(|_| errors)
            }
            _ => Err(errors),
        }
    }
}
