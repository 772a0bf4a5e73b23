// ⚖️ Reconciliation - Stored document + defaults → complete FinancialData
//
// Field-level override merge:
//   remote value if present and well-formed, else the default at that path
//
// - monthlyFinances, assets, liabilities merge key by key
// - details merge key by key; each item list is taken wholesale
// - accounts / transactions are taken wholesale
// - null, missing, or non-numeric values never reach the result
//
// The one place bucket totals are forced back in sync with their item
// lists is `apply_item_list_edit`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::buckets::{AssetBucket, Bucket, LiabilityBucket};
use crate::coerce;
use crate::error::FinanceError;
use crate::entities::items::total;
use crate::entities::{
    ensure_finite, Account, AccountCategory, AccountType, AssetItem, Assets, DetailItem,
    FinancialData, Liabilities, LiabilityItem, MonthlyFinances, Transaction, TransactionCategory,
};

// ============================================================================
// MERGE
// ============================================================================

/// Merge a stored `financialData` value over `defaults`.
///
/// `None`, or anything that is not a JSON object, yields a copy of `defaults`.
pub fn merge(remote: Option<&Value>, defaults: &FinancialData) -> FinancialData {
    let Some(remote) = remote.and_then(Value::as_object) else {
        return defaults.clone();
    };

    let fallback_time = defaults.last_modified;

    FinancialData {
        monthly_finances: merge_monthly(
            coerce::object(remote.get("monthlyFinances")),
            &defaults.monthly_finances,
        ),
        assets: merge_assets(coerce::object(remote.get("assets")), &defaults.assets, fallback_time),
        liabilities: merge_liabilities(
            coerce::object(remote.get("liabilities")),
            &defaults.liabilities,
            fallback_time,
        ),
        emergency_fund: number_field(Some(remote), "emergencyFund", defaults.emergency_fund),
        accounts: decode_list(Some(remote), "accounts", |v| decode_account(v, fallback_time))
            .unwrap_or_else(|| defaults.accounts.clone()),
        transactions: decode_list(Some(remote), "transactions", |v| {
            decode_transaction(v, fallback_time)
        })
        .unwrap_or_else(|| defaults.transactions.clone()),
        last_modified: coerce::timestamp(remote.get("lastModified")).unwrap_or(fallback_time),
    }
}

fn merge_monthly(remote: Option<&Map<String, Value>>, defaults: &MonthlyFinances) -> MonthlyFinances {
    MonthlyFinances {
        income: number_field(remote, "income", defaults.income),
        expenses: number_field(remote, "expenses", defaults.expenses),
    }
}

fn merge_assets(
    remote: Option<&Map<String, Value>>,
    defaults: &Assets,
    fallback_time: DateTime<Utc>,
) -> Assets {
    let mut merged = defaults.clone();
    let details = remote.and_then(|m| coerce::object(m.get("details")));

    for bucket in AssetBucket::ALL {
        let keys = bucket.keys();
        *bucket.summary_mut(&mut merged) = number_field(remote, keys.summary, bucket.summary(defaults));

        if let Some(items) = decode_list(details, keys.items, |v| decode_asset_item(v, fallback_time)) {
            *bucket.items_mut(&mut merged.details) = items;
        }
    }

    merged
}

fn merge_liabilities(
    remote: Option<&Map<String, Value>>,
    defaults: &Liabilities,
    fallback_time: DateTime<Utc>,
) -> Liabilities {
    let mut merged = defaults.clone();
    let details = remote.and_then(|m| coerce::object(m.get("details")));

    for bucket in LiabilityBucket::ALL {
        let keys = bucket.keys();
        *bucket.summary_mut(&mut merged) = number_field(remote, keys.summary, bucket.summary(defaults));

        if let Some(items) =
            decode_list(details, keys.items, |v| decode_liability_item(v, fallback_time))
        {
            *bucket.items_mut(&mut merged.details) = items;
        }
    }

    merged
}

// ============================================================================
// FIELD HELPERS
// ============================================================================

fn number_field(parent: Option<&Map<String, Value>>, key: &str, default: f64) -> f64 {
    let raw = parent.and_then(|m| m.get(key));
    match coerce::number(raw) {
        Some(n) => n,
        None => {
            if coerce::is_present(raw) {
                debug!(field = key, "non-numeric stored value, using default");
            }
            default
        }
    }
}

/// Decode an array field element by element.
///
/// `None` when the key is absent, null, or not an array (caller keeps its default).
/// Elements the decoder rejects are dropped.
fn decode_list<T>(
    parent: Option<&Map<String, Value>>,
    key: &str,
    decode: impl Fn(&Value) -> Option<T>,
) -> Option<Vec<T>> {
    let raw = parent.and_then(|m| m.get(key));
    let Some(elements) = coerce::array(raw) else {
        if coerce::is_present(raw) {
            warn!(field = key, "stored list is not an array, using default");
        }
        return None;
    };

    let decoded: Vec<T> = elements.iter().filter_map(&decode).collect();
    let dropped = elements.len() - decoded.len();
    if dropped > 0 {
        warn!(field = key, dropped, "dropped malformed list entries");
    }

    Some(decoded)
}

/// Every element needs a non-empty string id to be kept
fn element_id(obj: &Map<String, Value>) -> Option<String> {
    coerce::text(obj.get("id")).filter(|id| !id.is_empty())
}

fn decode_asset_item(value: &Value, fallback_time: DateTime<Utc>) -> Option<AssetItem> {
    let obj = value.as_object()?;
    Some(AssetItem {
        id: element_id(obj)?,
        name: coerce::text(obj.get("name")).unwrap_or_default(),
        amount: coerce::number(obj.get("amount")).unwrap_or(0.0),
        notes: coerce::text(obj.get("notes")),
        last_modified: coerce::timestamp(obj.get("lastModified")).unwrap_or(fallback_time),
    })
}

fn decode_liability_item(value: &Value, fallback_time: DateTime<Utc>) -> Option<LiabilityItem> {
    let obj = value.as_object()?;
    Some(LiabilityItem {
        id: element_id(obj)?,
        name: coerce::text(obj.get("name")).unwrap_or_default(),
        amount: coerce::number(obj.get("amount")).unwrap_or(0.0),
        interest_rate: coerce::number(obj.get("interestRate")),
        notes: coerce::text(obj.get("notes")),
        last_modified: coerce::timestamp(obj.get("lastModified")).unwrap_or(fallback_time),
    })
}

fn decode_account(value: &Value, fallback_time: DateTime<Utc>) -> Option<Account> {
    let obj = value.as_object()?;
    let id = element_id(obj)?;

    let account_type = coerce::text(obj.get("type"))
        .and_then(|t| AccountType::parse(&t))
        .unwrap_or(AccountType::Other);
    let category = coerce::text(obj.get("category"))
        .and_then(|c| AccountCategory::parse(&c))
        .unwrap_or_else(|| account_type.implied_category());

    // A type from the other category collapses to Other, which is valid for both
    let account_type = if account_type.is_valid_for(category) {
        account_type
    } else {
        debug!(account = %id, "account type invalid for category, using Other");
        AccountType::Other
    };

    Some(Account {
        id,
        name: coerce::text(obj.get("name")).unwrap_or_default(),
        account_type,
        category,
        balance: coerce::number(obj.get("balance")).unwrap_or(0.0),
        last_modified: coerce::timestamp(obj.get("lastModified")).unwrap_or(fallback_time),
        description: coerce::text(obj.get("description")),
        interest_rate: coerce::number(obj.get("interestRate")),
        institution: coerce::text(obj.get("institution")),
        account_number: coerce::text(obj.get("accountNumber")),
    })
}

fn decode_transaction(value: &Value, fallback_time: DateTime<Utc>) -> Option<Transaction> {
    let obj = value.as_object()?;
    Some(Transaction {
        id: element_id(obj)?,
        date: coerce::timestamp(obj.get("date")).unwrap_or(fallback_time),
        account_id: coerce::text(obj.get("accountId")).unwrap_or_default(),
        account_holder: coerce::text(obj.get("accountHolder")).unwrap_or_default(),
        amount: coerce::number(obj.get("amount")).unwrap_or(0.0),
        category: coerce::text(obj.get("category"))
            .and_then(|c| TransactionCategory::parse(&c))
            .unwrap_or(TransactionCategory::Other),
        description: coerce::text(obj.get("description")),
        last_modified: coerce::timestamp(obj.get("lastModified")).unwrap_or(fallback_time),
    })
}

// ============================================================================
// ITEM LIST EDITS
// ============================================================================

/// Replacement of one bucket's detail list
#[derive(Debug, Clone, PartialEq)]
pub enum ItemListEdit {
    Asset { bucket: AssetBucket, items: Vec<AssetItem> },
    Liability { bucket: LiabilityBucket, items: Vec<LiabilityItem> },
}

impl ItemListEdit {
    pub fn bucket(&self) -> Bucket {
        match self {
            ItemListEdit::Asset { bucket, .. } => Bucket::Asset(*bucket),
            ItemListEdit::Liability { bucket, .. } => Bucket::Liability(*bucket),
        }
    }

    /// Build an edit for `bucket` from a JSON array of items
    pub fn from_json(bucket: Bucket, items: Value) -> Result<Self, serde_json::Error> {
        Ok(match bucket {
            Bucket::Asset(bucket) => ItemListEdit::Asset {
                bucket,
                items: serde_json::from_value(items)?,
            },
            Bucket::Liability(bucket) => ItemListEdit::Liability {
                bucket,
                items: serde_json::from_value(items)?,
            },
        })
    }
}

/// Replace a bucket's detail list and set its summary to the items' total.
///
/// Every item is stamped `now`. The input `data` is left untouched. An item
/// list whose amounts are not finite, or whose total overflows, is rejected.
pub fn apply_item_list_edit(
    data: &FinancialData,
    edit: ItemListEdit,
    now: DateTime<Utc>,
) -> Result<FinancialData, FinanceError> {
    let mut next = data.clone();
    let bucket = edit.bucket();

    match edit {
        ItemListEdit::Asset { bucket, mut items } => {
            let sum = checked_total(&items, Bucket::Asset(bucket))?;
            stamp_all(&mut items, now);
            *bucket.summary_mut(&mut next.assets) = sum;
            *bucket.items_mut(&mut next.assets.details) = items;
        }
        ItemListEdit::Liability { bucket, mut items } => {
            let sum = checked_total(&items, Bucket::Liability(bucket))?;
            stamp_all(&mut items, now);
            *bucket.summary_mut(&mut next.liabilities) = sum;
            *bucket.items_mut(&mut next.liabilities.details) = items;
        }
    }

    debug!(bucket = bucket.keys().summary, "item list replaced");
    Ok(next)
}

fn checked_total<T: DetailItem>(items: &[T], bucket: Bucket) -> Result<f64, FinanceError> {
    for item in items {
        ensure_finite(&format!("{} item amount", bucket.keys().items), item.amount())?;
    }
    let sum = total(items);
    ensure_finite(&format!("{} total", bucket.keys().summary), sum)?;
    Ok(sum)
}

fn stamp_all<T: DetailItem>(items: &mut [T], now: DateTime<Utc>) {
    for item in items.iter_mut() {
        item.stamp(now);
    }
}


#[cfg(test)]
#[path = "reconciliation_tests.rs"]
mod property_tests;
