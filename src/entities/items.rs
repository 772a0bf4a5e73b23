// 📋 Detail Items - Itemized entries behind an asset or liability bucket

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shared behaviour of itemized detail entries.
///
/// Lets the reconciler sum and stamp asset and liability lists with one code path.
pub trait DetailItem {
    fn amount(&self) -> f64;
    fn stamp(&mut self, now: DateTime<Utc>);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetItem {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub last_modified: DateTime<Utc>,
}

impl AssetItem {
    pub fn new(name: impl Into<String>, amount: f64, now: DateTime<Utc>) -> Self {
        AssetItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            amount,
            notes: None,
            last_modified: now,
        }
    }
}

impl DetailItem for AssetItem {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiabilityItem {
    pub id: String,
    pub name: String,
    pub amount: f64,
    /// Annual rate in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub last_modified: DateTime<Utc>,
}

impl LiabilityItem {
    /// New liability items start with a 0% rate rather than no rate
    pub fn new(name: impl Into<String>, amount: f64, now: DateTime<Utc>) -> Self {
        LiabilityItem {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            amount,
            interest_rate: Some(0.0),
            notes: None,
            last_modified: now,
        }
    }
}

impl DetailItem for LiabilityItem {
    fn amount(&self) -> f64 {
        self.amount
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        self.last_modified = now;
    }
}

/// Sum of `amount` over a detail list
pub fn total<T: DetailItem>(items: &[T]) -> f64 {
    items.iter().map(DetailItem::amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_items_get_unique_ids() {
        let now = Utc::now();
        let a = AssetItem::new("Savings jar", 10.0, now);
        let b = AssetItem::new("Savings jar", 10.0, now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_liability_item_defaults_rate() {
        let item = LiabilityItem::new("Car loan", 9000.0, Utc::now());
        assert_eq!(item.interest_rate, Some(0.0));
    }

    #[test]
    fn test_total() {
        let now = Utc::now();
        let items = vec![AssetItem::new("a", 100.0, now), AssetItem::new("b", 250.0, now)];
        assert_eq!(total(&items), 350.0);
        assert_eq!(total::<LiabilityItem>(&[]), 0.0);
    }
}
