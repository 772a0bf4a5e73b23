// 🪣 Buckets - Fixed set of asset/liability sub-categories
//
// A bucket pairs a summary number with an itemized detail list.
// Each variant resolves through a static table to its wire keys and fields,
// so nothing is ever looked up by an arbitrary key string.

use serde::{Deserialize, Serialize};

use crate::entities::{AssetDetails, AssetItem, Assets, Liabilities, LiabilityDetails, LiabilityItem};
use crate::error::{FinanceError, Result};

/// Wire keys for one bucket: (summary field, detail-list field)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketKeys {
    pub summary: &'static str,
    pub items: &'static str,
}

// ============================================================================
// ASSET BUCKETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetBucket {
    Cash,
    Investments,
    Property,
    Other,
}

const ASSET_KEYS: [BucketKeys; 4] = [
    BucketKeys { summary: "cash", items: "cashItems" },
    BucketKeys { summary: "investments", items: "investmentItems" },
    BucketKeys { summary: "property", items: "propertyItems" },
    BucketKeys { summary: "other", items: "otherItems" },
];

impl AssetBucket {
    pub const ALL: [AssetBucket; 4] = [
        AssetBucket::Cash,
        AssetBucket::Investments,
        AssetBucket::Property,
        AssetBucket::Other,
    ];

    pub fn keys(&self) -> BucketKeys {
        ASSET_KEYS[*self as usize]
    }

    pub fn summary(&self, assets: &Assets) -> f64 {
        match self {
            AssetBucket::Cash => assets.cash,
            AssetBucket::Investments => assets.investments,
            AssetBucket::Property => assets.property,
            AssetBucket::Other => assets.other,
        }
    }

    pub fn summary_mut<'a>(&self, assets: &'a mut Assets) -> &'a mut f64 {
        match self {
            AssetBucket::Cash => &mut assets.cash,
            AssetBucket::Investments => &mut assets.investments,
            AssetBucket::Property => &mut assets.property,
            AssetBucket::Other => &mut assets.other,
        }
    }

    pub fn items<'a>(&self, details: &'a AssetDetails) -> &'a [AssetItem] {
        match self {
            AssetBucket::Cash => &details.cash_items,
            AssetBucket::Investments => &details.investment_items,
            AssetBucket::Property => &details.property_items,
            AssetBucket::Other => &details.other_items,
        }
    }

    pub fn items_mut<'a>(&self, details: &'a mut AssetDetails) -> &'a mut Vec<AssetItem> {
        match self {
            AssetBucket::Cash => &mut details.cash_items,
            AssetBucket::Investments => &mut details.investment_items,
            AssetBucket::Property => &mut details.property_items,
            AssetBucket::Other => &mut details.other_items,
        }
    }

    /// Accepts either wire key ("cash" or "cashItems")
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.keys().summary == key || b.keys().items == key)
    }
}

// ============================================================================
// LIABILITY BUCKETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiabilityBucket {
    Mortgage,
    OtherDebts,
}

const LIABILITY_KEYS: [BucketKeys; 2] = [
    BucketKeys { summary: "mortgage", items: "mortgageItems" },
    BucketKeys { summary: "otherDebts", items: "debtItems" },
];

impl LiabilityBucket {
    pub const ALL: [LiabilityBucket; 2] = [LiabilityBucket::Mortgage, LiabilityBucket::OtherDebts];

    pub fn keys(&self) -> BucketKeys {
        LIABILITY_KEYS[*self as usize]
    }

    pub fn summary(&self, liabilities: &Liabilities) -> f64 {
        match self {
            LiabilityBucket::Mortgage => liabilities.mortgage,
            LiabilityBucket::OtherDebts => liabilities.other_debts,
        }
    }

    pub fn summary_mut<'a>(&self, liabilities: &'a mut Liabilities) -> &'a mut f64 {
        match self {
            LiabilityBucket::Mortgage => &mut liabilities.mortgage,
            LiabilityBucket::OtherDebts => &mut liabilities.other_debts,
        }
    }

    pub fn items<'a>(&self, details: &'a LiabilityDetails) -> &'a [LiabilityItem] {
        match self {
            LiabilityBucket::Mortgage => &details.mortgage_items,
            LiabilityBucket::OtherDebts => &details.debt_items,
        }
    }

    pub fn items_mut<'a>(&self, details: &'a mut LiabilityDetails) -> &'a mut Vec<LiabilityItem> {
        match self {
            LiabilityBucket::Mortgage => &mut details.mortgage_items,
            LiabilityBucket::OtherDebts => &mut details.debt_items,
        }
    }

    /// Accepts either wire key ("otherDebts" or "debtItems")
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.keys().summary == key || b.keys().items == key)
    }
}

// ============================================================================
// EITHER SIDE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Asset(AssetBucket),
    Liability(LiabilityBucket),
}

impl Bucket {
    /// Resolve a legacy ("asset" | "liability", key) pair
    pub fn parse(category: &str, key: &str) -> Result<Self> {
        let resolved = match category {
            "asset" => AssetBucket::parse(key).map(Bucket::Asset),
            "liability" => LiabilityBucket::parse(key).map(Bucket::Liability),
            _ => None,
        };
        resolved.ok_or_else(|| FinanceError::UnknownBucket(format!("{category}/{key}")))
    }

    pub fn keys(&self) -> BucketKeys {
        match self {
            Bucket::Asset(b) => b.keys(),
            Bucket::Liability(b) => b.keys(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_table_matches_variants() {
        assert_eq!(AssetBucket::Cash.keys().items, "cashItems");
        assert_eq!(AssetBucket::Other.keys().summary, "other");
        assert_eq!(LiabilityBucket::OtherDebts.keys().items, "debtItems");
        assert_eq!(LiabilityBucket::Mortgage.keys().summary, "mortgage");
    }

    #[test]
    fn test_parse_legacy_pairs() {
        assert_eq!(Bucket::parse("asset", "cash").unwrap(), Bucket::Asset(AssetBucket::Cash));
        assert_eq!(
            Bucket::parse("asset", "investmentItems").unwrap(),
            Bucket::Asset(AssetBucket::Investments)
        );
        assert_eq!(
            Bucket::parse("liability", "otherDebts").unwrap(),
            Bucket::Liability(LiabilityBucket::OtherDebts)
        );
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            Bucket::parse("asset", "mortgage"),
            Err(FinanceError::UnknownBucket(_))
        ));
        assert!(Bucket::parse("equity", "cash").is_err());
        assert!(Bucket::parse("asset", "details").is_err());
    }

    #[test]
    fn test_accessors_hit_the_right_fields() {
        let mut assets = Assets::default();
        *AssetBucket::Property.summary_mut(&mut assets) = 250_000.0;
        assert_eq!(assets.property, 250_000.0);
        assert_eq!(AssetBucket::Property.summary(&assets), 250_000.0);

        let mut liabilities = Liabilities::default();
        *LiabilityBucket::OtherDebts.summary_mut(&mut liabilities) = 1200.0;
        assert_eq!(liabilities.other_debts, 1200.0);
        assert_eq!(liabilities.mortgage, 0.0);
    }
}
