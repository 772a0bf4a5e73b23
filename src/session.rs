// 🧭 Finance Session - Consumer-facing API for one user's dashboard
//
// A session subscribes to the user's document on open, keeps the latest
// merged `FinancialData` in memory, and writes edits back with merge-writes.
// Everything except `save` is synchronous work over in-memory values.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Map;
use tracing::{error, info, warn};

use crate::entities::{default_financial_data, FinancialData};
use crate::error::{FinanceError, Result};
use crate::health::{self, HealthIndicators};
use crate::reconciliation::{self, ItemListEdit};
use crate::store::DocumentStore;
use crate::sync::{SnapshotEvent, Subscription, FINANCIAL_DATA_KEY};

pub struct FinanceSession {
    store: Arc<dyn DocumentStore>,
    user_id: String,
    data: FinancialData,
    subscription: Option<Subscription>,
    last_error: Option<FinanceError>,
}

impl FinanceSession {
    /// Subscribe to `user_id`'s document and apply the initial snapshot
    pub fn open(store: Arc<dyn DocumentStore>, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let subscription = store.subscribe(&user_id);

        let mut session = FinanceSession {
            store,
            user_id,
            data: default_financial_data(),
            subscription: Some(subscription),
            last_error: None,
        };
        session.sync();
        session
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn current_data(&self) -> &FinancialData {
        &self.data
    }

    /// Most recent read or write failure, cleared by the next success
    pub fn last_error(&self) -> Option<&FinanceError> {
        self.last_error.as_ref()
    }

    /// Apply every snapshot delivered so far. Returns how many items were handled.
    pub fn sync(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.subscription.as_ref().and_then(Subscription::try_next) {
            self.apply_event(event);
            handled += 1;
        }
        handled
    }

    /// Block up to `timeout` for the next delivery, then drain the rest.
    /// Returns false when nothing arrived.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        let Some(event) = self
            .subscription
            .as_ref()
            .and_then(|sub| sub.next_timeout(timeout))
        else {
            return false;
        };
        self.apply_event(event);
        self.sync();
        true
    }

    fn apply_event(&mut self, event: SnapshotEvent) {
        match event {
            Ok(snapshot) => {
                self.data = reconciliation::merge(snapshot.financial_data(), &default_financial_data());
                self.last_error = None;
            }
            Err(err) => {
                // Keep the prior state; the next good snapshot replaces it
                warn!(user_id = %self.user_id, error = %err, "snapshot delivery failed");
                self.last_error = Some(err);
            }
        }
    }

    /// Stamp `last_modified` and persist with a merge-write.
    ///
    /// A snapshot with a non-finite number is rejected before any write.
    /// On failure the in-memory state is unchanged so the same edit can be retried.
    pub fn save(&mut self, data: FinancialData) -> Result<&FinancialData> {
        data.check_amounts()?;

        let mut stamped = data;
        stamped.last_modified = Utc::now();

        let body = serde_json::to_value(&stamped)
            .map_err(|e| FinanceError::StorageWrite(e.to_string()))?;
        let mut fields = Map::new();
        fields.insert(FINANCIAL_DATA_KEY.to_string(), body);

        match self.store.merge_write(&self.user_id, fields) {
            Ok(()) => {
                info!(user_id = %self.user_id, "financial data saved");
                self.data = stamped;
                self.last_error = None;
                Ok(&self.data)
            }
            Err(e) => {
                error!(user_id = %self.user_id, error = %e, "save failed");
                let err = FinanceError::StorageWrite(e.to_string());
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Replace one bucket's items (total recomputed) and save
    pub fn save_item_list(&mut self, edit: ItemListEdit) -> Result<&FinancialData> {
        let next = reconciliation::apply_item_list_edit(&self.data, edit, Utc::now())?;
        self.save(next)
    }

    pub fn compute_indicators(&self) -> HealthIndicators {
        health::compute_indicators(&self.data)
    }

    pub fn compute_net_worth(&self) -> f64 {
        health::compute_net_worth(&self.data)
    }

    /// Stop receiving snapshots. The last merged state stays readable.
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }

    pub fn is_live(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckets::AssetBucket;
    use crate::edits;
    use crate::entities::AssetItem;
    use crate::error::StoreError;
    use crate::store::SqliteDocumentStore;
    use crate::sync::{DocumentSnapshot, SubscriberRegistry};
    use serde_json::{json, Value};

    /// Store whose writes always fail; reads report an absent document
    struct FailingStore {
        subscribers: Arc<SubscriberRegistry>,
    }

    impl FailingStore {
        fn new() -> Self {
            FailingStore { subscribers: SubscriberRegistry::new() }
        }
    }

    impl DocumentStore for FailingStore {
        fn read(&self, _user_id: &str) -> std::result::Result<DocumentSnapshot, StoreError> {
            Ok(DocumentSnapshot::Absent)
        }

        fn merge_write(&self, _user_id: &str, _fields: Map<String, Value>) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("permission denied".to_string()))
        }

        fn subscribe(&self, user_id: &str) -> Subscription {
            self.subscribers.register(user_id, Ok(DocumentSnapshot::Absent))
        }
    }

    fn sqlite_store() -> Arc<SqliteDocumentStore> {
        Arc::new(SqliteDocumentStore::open_in_memory().unwrap())
    }

    #[test]
    fn test_new_user_starts_with_defaults() {
        let session = FinanceSession::open(sqlite_store(), "new-user");

        let data = session.current_data();
        assert_eq!(data.monthly_finances.income, 0.0);
        assert!(data.accounts.is_empty());
        assert_eq!(session.compute_net_worth(), 0.0);
        assert!(session.last_error().is_none());
        assert!(session.is_live());
    }

    #[test]
    fn test_save_then_snapshot_reflects_write() {
        let store = sqlite_store();
        let mut session = FinanceSession::open(store.clone(), "u1");

        let edited = edits::set_monthly_finances(session.current_data(), 5000.0, 4000.0, Utc::now()).unwrap();
        let saved = session.save(edited).unwrap().clone();

        // The write comes back through the subscription and merges to the same value
        assert_eq!(session.sync(), 1);
        assert_eq!(session.current_data(), &saved);
        assert!((session.compute_indicators().savings_rate - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_sessions_see_each_others_writes() {
        let store = sqlite_store();
        let mut writer = FinanceSession::open(store.clone(), "shared");
        let mut reader = FinanceSession::open(store, "shared");

        let edited = edits::set_emergency_fund(writer.current_data(), 9000.0, Utc::now()).unwrap();
        writer.save(edited).unwrap();

        assert!(reader.wait_for_update(Duration::from_millis(100)));
        assert_eq!(reader.current_data().emergency_fund, 9000.0);
    }

    #[test]
    fn test_partial_stored_document_is_completed() {
        let store = sqlite_store();
        let mut fields = Map::new();
        fields.insert(
            FINANCIAL_DATA_KEY.to_string(),
            json!({ "assets": { "cash": 1000, "investments": 2000 }, "liabilities": { "mortgage": 500 } }),
        );
        store.merge_write("legacy", fields).unwrap();

        let session = FinanceSession::open(store, "legacy");
        assert_eq!(session.compute_net_worth(), 2500.0);
        assert_eq!(session.current_data().monthly_finances.expenses, 0.0);
    }

    #[test]
    fn test_failed_save_leaves_state_unchanged() {
        let mut session = FinanceSession::open(Arc::new(FailingStore::new()), "u1");
        let before = session.current_data().clone();

        let edited = edits::set_emergency_fund(&before, 500.0, Utc::now()).unwrap();
        let err = session.save(edited).unwrap_err();

        assert!(matches!(err, FinanceError::StorageWrite(ref msg) if msg.contains("permission denied")));
        assert_eq!(session.current_data(), &before);
        assert_eq!(session.last_error(), Some(&err));
    }

    #[test]
    fn test_read_error_keeps_prior_state() {
        let store = sqlite_store();
        let mut session = FinanceSession::open(store.clone(), "u1");
        let edited = edits::set_emergency_fund(session.current_data(), 42.0, Utc::now()).unwrap();
        session.save(edited).unwrap();
        session.sync();

        // Simulate a failed delivery on the live subscription
        session.apply_event(Err(FinanceError::StorageRead("network down".to_string())));

        assert_eq!(session.current_data().emergency_fund, 42.0);
        assert!(matches!(session.last_error(), Some(FinanceError::StorageRead(_))));
    }

    #[test]
    fn test_save_item_list_updates_total() {
        let mut session = FinanceSession::open(sqlite_store(), "u1");
        let now = Utc::now();

        session
            .save_item_list(ItemListEdit::Asset {
                bucket: AssetBucket::Cash,
                items: vec![AssetItem::new("Wallet", 100.0, now), AssetItem::new("Jar", 250.0, now)],
            })
            .unwrap();

        assert_eq!(session.current_data().assets.cash, 350.0);
        assert_eq!(session.current_data().assets.details.cash_items.len(), 2);
    }

    #[test]
    fn test_overflowing_item_total_is_not_saved() {
        let store = sqlite_store();
        let mut session = FinanceSession::open(store.clone(), "u1");
        let now = Utc::now();

        let err = session
            .save_item_list(ItemListEdit::Asset {
                bucket: AssetBucket::Cash,
                items: vec![AssetItem::new("a", 1e308, now), AssetItem::new("b", 1e308, now)],
            })
            .unwrap_err();

        assert!(matches!(err, FinanceError::Validation(_)));
        assert_eq!(session.current_data().assets.cash, 0.0);
        assert!(session.current_data().assets.details.cash_items.is_empty());
        assert_eq!(session.compute_net_worth(), 0.0);
        assert!(matches!(store.read("u1").unwrap(), DocumentSnapshot::Absent));
    }

    #[test]
    fn test_save_rejects_non_finite_snapshot() {
        let store = sqlite_store();
        let mut session = FinanceSession::open(store.clone(), "u1");
        let mut edited = session.current_data().clone();
        edited.monthly_finances.income = f64::NAN;

        assert!(matches!(session.save(edited), Err(FinanceError::Validation(_))));
        assert_eq!(session.current_data().monthly_finances.income, 0.0);
        assert!(!store.read("u1").unwrap().exists());
    }

    #[test]
    fn test_close_releases_subscription() {
        let store = sqlite_store();
        let mut session = FinanceSession::open(store.clone(), "u1");
        assert_eq!(store.subscriber_count("u1"), 1);

        session.close();
        assert_eq!(store.subscriber_count("u1"), 0);
        assert!(!session.is_live());
        assert_eq!(session.sync(), 0);
    }
}
