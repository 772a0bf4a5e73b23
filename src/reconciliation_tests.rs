// Property-based tests for the merge rule.
//
// Remote documents are generated with any subset of the known keys present,
// each holding a well-formed value, numeric text, or junk of the wrong type.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

use super::merge;
use crate::entities::FinancialData;

const ITEM_KEYS: &[&str] = &["name", "amount", "interestRate", "notes", "lastModified"];
const ACCOUNT_KEYS: &[&str] = &[
    "name",
    "type",
    "category",
    "balance",
    "lastModified",
    "description",
    "interestRate",
    "institution",
    "accountNumber",
];
const TRANSACTION_KEYS: &[&str] = &[
    "date",
    "accountId",
    "accountHolder",
    "amount",
    "category",
    "description",
    "lastModified",
];

fn defaults() -> FinancialData {
    FinancialData::empty(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

// ============================================================================
// Strategies
// ============================================================================

/// Anything a stored scalar might hold
fn leaf_strategy() -> BoxedStrategy<Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        // NaN and infinities become null through Value::from
        any::<f64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(|n| Value::String(n.to_string())),
        prop_oneof![Just("NaN"), Just("inf"), Just(""), Just("abc"), Just("1e400")]
            .prop_map(|s| Value::String(s.to_string())),
        Just(json!({})),
        Just(json!([1, 2])),
    ]
    .boxed()
}

fn text_strategy() -> BoxedStrategy<Value> {
    prop_oneof![
        prop_oneof![
            Just("Asset"),
            Just("Liability"),
            Just("HELOC"),
            Just("Real Estate"),
            Just("Mortgage"),
            Just("Savings"),
            Just("Food"),
            Just("Income"),
            Just("Other"),
        ]
        .prop_map(|s| Value::String(s.to_string())),
        "[A-Za-z ]{0,12}".prop_map(Value::String),
    ]
    .boxed()
}

fn timestamp_strategy() -> BoxedStrategy<Value> {
    prop_oneof![
        Just(json!("2024-05-02T08:00:00.123456789Z")),
        Just(json!("2024-03-01T10:30:00-05:00")),
        Just(json!("2023-12-31")),
        Just(json!("yesterday")),
    ]
    .boxed()
}

fn field_strategy() -> BoxedStrategy<Value> {
    prop_oneof![
        3 => leaf_strategy(),
        2 => text_strategy(),
        1 => timestamp_strategy(),
    ]
    .boxed()
}

/// Object holding some subset of `keys`
fn partial_object(keys: &'static [&'static str], value: BoxedStrategy<Value>) -> BoxedStrategy<Value> {
    prop::collection::vec(prop::option::of(value), keys.len())
        .prop_map(move |values| {
            let map: Map<String, Value> = keys
                .iter()
                .zip(values)
                .filter_map(|(key, v)| v.map(|v| (key.to_string(), v)))
                .collect();
            Value::Object(map)
        })
        .boxed()
}

fn with_key(target: &mut Value, key: &str, value: Option<Value>) {
    if let (Value::Object(map), Some(value)) = (target, value) {
        map.insert(key.to_string(), value);
    }
}

/// List element: usually an object with some id, sometimes not an object at all
fn element_strategy(keys: &'static [&'static str]) -> BoxedStrategy<Value> {
    let id = prop::option::of(prop_oneof![
        "[a-z0-9]{1,8}".prop_map(Value::String),
        Just(json!("")),
        Just(Value::Null),
        any::<i32>().prop_map(Value::from),
    ]);

    prop_oneof![
        4 => (id, partial_object(keys, field_strategy())).prop_map(|(id, mut element)| {
            with_key(&mut element, "id", id);
            element
        }),
        1 => leaf_strategy(),
    ]
    .boxed()
}

fn list_strategy(keys: &'static [&'static str]) -> BoxedStrategy<Value> {
    prop_oneof![
        3 => prop::collection::vec(element_strategy(keys), 0..4).prop_map(Value::Array),
        1 => leaf_strategy(),
    ]
    .boxed()
}

fn assets_strategy() -> BoxedStrategy<Value> {
    let details = partial_object(
        &["cashItems", "investmentItems", "propertyItems", "otherItems"],
        list_strategy(ITEM_KEYS),
    );
    (
        partial_object(&["cash", "investments", "property", "other"], leaf_strategy()),
        prop::option::of(details),
    )
        .prop_map(|(mut assets, details)| {
            with_key(&mut assets, "details", details);
            assets
        })
        .boxed()
}

fn liabilities_strategy() -> BoxedStrategy<Value> {
    let details = partial_object(&["mortgageItems", "debtItems"], list_strategy(ITEM_KEYS));
    (
        partial_object(&["mortgage", "otherDebts"], leaf_strategy()),
        prop::option::of(details),
    )
        .prop_map(|(mut liabilities, details)| {
            with_key(&mut liabilities, "details", details);
            liabilities
        })
        .boxed()
}

/// A stored `financialData` value: mostly partial documents, sometimes not an object
fn remote_strategy() -> BoxedStrategy<Value> {
    let document = (
        prop::option::of(partial_object(&["income", "expenses"], leaf_strategy())),
        prop::option::of(assets_strategy()),
        prop::option::of(liabilities_strategy()),
        prop::option::of(leaf_strategy()),
        prop::option::of(list_strategy(ACCOUNT_KEYS)),
        prop::option::of(list_strategy(TRANSACTION_KEYS)),
        prop::option::of(timestamp_strategy()),
    )
        .prop_map(|(monthly, assets, liabilities, emergency, accounts, transactions, modified)| {
            let mut doc = Value::Object(Map::new());
            with_key(&mut doc, "monthlyFinances", monthly);
            with_key(&mut doc, "assets", assets);
            with_key(&mut doc, "liabilities", liabilities);
            with_key(&mut doc, "emergencyFund", emergency);
            with_key(&mut doc, "accounts", accounts);
            with_key(&mut doc, "transactions", transactions);
            with_key(&mut doc, "lastModified", modified);
            doc
        });

    prop_oneof![
        9 => document,
        1 => leaf_strategy(),
    ]
    .boxed()
}

/// Path of the first null or non-finite leaf, if any
fn first_bad_leaf(value: &Value, path: &str) -> Option<String> {
    match value {
        Value::Null => Some(path.to_string()),
        Value::Number(n) if !n.as_f64().is_some_and(f64::is_finite) => Some(path.to_string()),
        Value::Object(map) => map
            .iter()
            .find_map(|(k, v)| first_bad_leaf(v, &format!("{path}.{k}"))),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, v)| first_bad_leaf(v, &format!("{path}[{i}]"))),
        _ => None,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// *For any* stored value, the merged snapshot has every field present
    /// and every number finite.
    #[test]
    fn prop_merge_leaves_no_null_or_non_finite_field(remote in remote_strategy()) {
        let merged = merge(Some(&remote), &defaults());

        prop_assert!(merged.check_amounts().is_ok(), "non-finite amount in {:?}", merged);

        let serialized = serde_json::to_value(&merged).unwrap();
        let bad = first_bad_leaf(&serialized, "financialData");
        prop_assert!(bad.is_none(), "bad leaf at {:?} for remote {}", bad, remote);
    }

    /// *For any* stored value R, merge(serialize(merge(R, D)), D) == merge(R, D).
    #[test]
    fn prop_merge_is_idempotent(remote in remote_strategy()) {
        let d = defaults();
        let once = merge(Some(&remote), &d);
        let flattened = serde_json::to_value(&once).unwrap();
        let twice = merge(Some(&flattened), &d);

        prop_assert_eq!(once, twice);
    }

    /// Numeric fields that were stored as finite numbers survive unchanged.
    #[test]
    fn prop_finite_numbers_are_kept(income in -1.0e12f64..1.0e12, cash in -1.0e12f64..1.0e12) {
        let remote = json!({ "monthlyFinances": { "income": income }, "assets": { "cash": cash } });
        let merged = merge(Some(&remote), &defaults());

        prop_assert_eq!(merged.monthly_finances.income, income);
        prop_assert_eq!(merged.assets.cash, cash);
        prop_assert_eq!(merged.monthly_finances.expenses, 0.0);
    }
}
