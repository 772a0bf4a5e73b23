// 🧾 Transaction Entity - A dated movement of money against an account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionCategory {
    Income,
    Bills,
    Shopping,
    Transportation,
    Food,
    Healthcare,
    Entertainment,
    Investment,
    Other,
}

impl TransactionCategory {
    pub const ALL: [TransactionCategory; 9] = [
        TransactionCategory::Income,
        TransactionCategory::Bills,
        TransactionCategory::Shopping,
        TransactionCategory::Transportation,
        TransactionCategory::Food,
        TransactionCategory::Healthcare,
        TransactionCategory::Entertainment,
        TransactionCategory::Investment,
        TransactionCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionCategory::Income => "Income",
            TransactionCategory::Bills => "Bills",
            TransactionCategory::Shopping => "Shopping",
            TransactionCategory::Transportation => "Transportation",
            TransactionCategory::Food => "Food",
            TransactionCategory::Healthcare => "Healthcare",
            TransactionCategory::Entertainment => "Entertainment",
            TransactionCategory::Investment => "Investment",
            TransactionCategory::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

/// A single transaction recorded by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    /// When the transaction happened (business time)
    pub date: DateTime<Utc>,

    pub account_id: String,
    pub account_holder: String,
    pub amount: f64,
    pub category: TransactionCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the record was last edited (system time)
    pub last_modified: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_id: impl Into<String>,
        account_holder: impl Into<String>,
        amount: f64,
        category: TransactionCategory,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            account_id: account_id.into(),
            account_holder: account_holder.into(),
            amount,
            category,
            description: None,
            last_modified: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_round_trip() {
        for category in TransactionCategory::ALL {
            assert_eq!(TransactionCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(TransactionCategory::parse("Travel"), None);
    }

    #[test]
    fn test_transaction_wire_shape() {
        let now = Utc::now();
        let tx = Transaction::new("acc-1", "Sam", 42.5, TransactionCategory::Food, now, now);
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["accountId"], "acc-1");
        assert_eq!(json["accountHolder"], "Sam");
        assert_eq!(json["category"], "Food");
        assert!(json.get("description").is_none());
    }
}
