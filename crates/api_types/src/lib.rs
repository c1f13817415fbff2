use serde::{Deserialize, Serialize};

pub mod expense {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    /// Request/response body for a single expense record.
    ///
    /// The identifier is never part of the body: it is the key the remote
    /// service stores the record under.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseBody {
        pub description: String,
        /// Decimal amount in major units (e.g. `3.5`).
        pub amount: f64,
        /// ISO-8601 date, serialized as `YYYY-MM-DD`.
        ///
        /// Full RFC3339 timestamps are accepted on input; only the date part is
        /// kept.
        #[serde(with = "super::date")]
        pub date: NaiveDate,
    }

    /// Response body of `POST /expenses`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        /// Identifier assigned by the remote service.
        pub name: String,
    }

    /// Response body of `GET /expenses`.
    ///
    /// An empty collection is returned as `null` by some backends.
    pub type ExpenseListResponse = Option<BTreeMap<String, ExpenseBody>>;

    /// Error body returned by the remote service on non-2xx responses, when
    /// it returns one at all.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub error: String,
    }
}

pub mod date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
    }

    /// Parses either a plain `YYYY-MM-DD` date or an RFC3339 timestamp.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Some(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::expense::*;
    use chrono::NaiveDate;

    #[test]
    fn body_uses_iso_date() {
        let body = ExpenseBody {
            description: "Coffee".to_string(),
            amount: 3.5,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"description": "Coffee", "amount": 3.5, "date": "2024-01-01"})
        );
    }

    #[test]
    fn body_accepts_rfc3339_timestamps() {
        let body: ExpenseBody = serde_json::from_str(
            r#"{"description":"Book","amount":12,"date":"2024-03-05T00:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(body.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(body.amount, 12.0);
    }

    #[test]
    fn empty_list_is_null() {
        let list: ExpenseListResponse = serde_json::from_str("null").unwrap();
        assert!(list.is_none());
    }

    #[test]
    fn rejects_garbage_dates() {
        let res = serde_json::from_str::<ExpenseBody>(
            r#"{"description":"x","amount":1,"date":"yesterday"}"#,
        );
        assert!(res.is_err());
    }
}
